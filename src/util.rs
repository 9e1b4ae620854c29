// Utility helpers for parsing and formatting.
//
// This module centralizes the "dirty" CSV/number handling so the rest of
// the code can assume clean, typed values.
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `u64` while being forgiving about
/// formatting issues that are common in spreadsheet exports.
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_u64_safe(s: Option<&str>) -> Option<u64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(",", "");
    s.parse::<u64>().ok()
}

/// Render a percentage with two decimal places, matching the precision the
/// report tables use everywhere.
pub fn format_percent(p: f64) -> String {
    format!("{:.2}%", p)
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values. This is used
    // for counts in console messages (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

/// Escape a data string for inclusion in HTML text or attribute content.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_u64_strips_separators() {
        assert_eq!(parse_u64_safe(Some("1,250")), Some(1250));
        assert_eq!(parse_u64_safe(Some(" 42 ")), Some(42));
    }

    #[test]
    fn parse_u64_rejects_junk() {
        assert_eq!(parse_u64_safe(None), None);
        assert_eq!(parse_u64_safe(Some("")), None);
        assert_eq!(parse_u64_safe(Some("n/a")), None);
        assert_eq!(parse_u64_safe(Some("-5")), None);
        assert_eq!(parse_u64_safe(Some("12.5")), None);
    }

    #[test]
    fn escape_html_covers_markup() {
        assert_eq!(
            escape_html(r#"<b>"A&B"</b>"#),
            "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;"
        );
        assert_eq!(escape_html("Male'"), "Male&#39;");
    }
}
