use std::sync::LazyLock;

use regex::Regex;

static PAGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(p\.\s*(\d+)").unwrap());
static ANNOTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(p\.\s*\d+[^)]*\)").unwrap());

/// How an explicit page column treats values it cannot parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDefault {
    Absent,
    /// Folder-per-book CSV exports record `0` for blank or non-numeric pages.
    Zero,
}

/// First page number from a `(p. N ...)` annotation.
pub fn extract_page(text: &str) -> Option<u32> {
    let caps = PAGE_RE.captures(text)?;
    caps[1].parse::<u32>().ok().filter(|p| *p > 0)
}

/// Remove every `(p. N ...)` annotation along with the whitespace before it.
pub fn strip_annotations(text: &str) -> String {
    ANNOTATION_RE.replace_all(text, "").into_owned()
}

/// Parse an explicit page field such as `"42"`, `"42, 43"` or `"42.0"`.
pub fn parse_page_field(raw: &str, default: PageDefault) -> Option<u32> {
    let first = raw.trim().split(',').next().unwrap_or_default().trim();
    match default {
        PageDefault::Zero => Some(if !first.is_empty() && first.chars().all(|c| c.is_ascii_digit()) {
            first.parse::<u32>().unwrap_or(0)
        } else {
            0
        }),
        PageDefault::Absent => parse_number(first),
    }
}

/// Integer or float text truncated to a positive page number.
pub fn parse_number(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<u32>() {
        return Some(n).filter(|n| *n > 0);
    }
    let f = raw.parse::<f64>().ok()?;
    page_from_float(f)
}

pub fn page_from_float(f: f64) -> Option<u32> {
    if f.is_finite() && f >= 1.0 && f <= u32::MAX as f64 {
        Some(f.trunc() as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotation_page() {
        assert_eq!(extract_page("blah blah (p. 42)"), Some(42));
        assert_eq!(extract_page("blah (p. 7, 9)"), Some(7));
        assert_eq!(extract_page("blah (p.12-13)"), Some(12));
        assert_eq!(extract_page("no page here"), None);
        assert_eq!(extract_page("(p. 0)"), None);
        assert_eq!(extract_page("(p. -4)"), None);
    }

    #[test]
    fn strips_all_annotations() {
        assert_eq!(strip_annotations("a curse (p. 12) and a pig (p. 30, 31)"), "a curse and a pig");
    }

    #[test]
    fn page_field_absent_default() {
        assert_eq!(parse_page_field("42", PageDefault::Absent), Some(42));
        assert_eq!(parse_page_field(" 42, 57 ", PageDefault::Absent), Some(42));
        assert_eq!(parse_page_field("12.0", PageDefault::Absent), Some(12));
        assert_eq!(parse_page_field("", PageDefault::Absent), None);
        assert_eq!(parse_page_field("n/a", PageDefault::Absent), None);
    }

    #[test]
    fn page_field_zero_default_quirk() {
        assert_eq!(parse_page_field("42, 57", PageDefault::Zero), Some(42));
        assert_eq!(parse_page_field("", PageDefault::Zero), Some(0));
        assert_eq!(parse_page_field("12-13", PageDefault::Zero), Some(0));
    }
}
