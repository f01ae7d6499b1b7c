//! String helpers used when rendering records into HTML.

/// Escape text for use in HTML element content and quoted attribute values
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

const ELLIPSIS: &str = "...";

/// Overshoot tolerated before a string is cut at all
const TRUNCATE_LEEWAY: usize = 5;

/// String display extension trait
pub trait StringExt {
    /// Cut to `max_chars` characters including a trailing "...".
    ///
    /// Strings up to `max_chars + 5` characters are returned unchanged.
    fn truncate_chars(&self, max_chars: usize) -> String;
}

impl StringExt for str {
    #[inline]
    fn truncate_chars(&self, max_chars: usize) -> String {
        if self.char_indices().nth(max_chars + TRUNCATE_LEEWAY).is_none() {
            return self.to_string();
        }
        let keep = max_chars.saturating_sub(ELLIPSIS.len());
        let end = self.char_indices().nth(keep).map_or(self.len(), |(idx, _)| idx);
        format!("{}{}", &self[..end], ELLIPSIS)
    }
}

impl StringExt for String {
    #[inline]
    fn truncate_chars(&self, max_chars: usize) -> String {
        self.as_str().truncate_chars(max_chars)
    }
}
