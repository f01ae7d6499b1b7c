pub mod string_ext;

pub use string_ext::{StringExt, escape_html};
