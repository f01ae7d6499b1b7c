use rust_embed::RustEmbed;

/// Dashboard HTML templates, embedded into the binary at compile time.
/// Path is relative to the crate's Cargo.toml location.
#[derive(RustEmbed)]
#[folder = "templates/"]
pub struct DashboardAssets;

impl DashboardAssets {
    /// Template source as UTF-8 text
    pub fn template(name: &str) -> Option<String> {
        Self::get(name).map(|file| String::from_utf8_lossy(&file.data).into_owned())
    }
}
