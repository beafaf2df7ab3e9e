/// Two-part markers as they appear at the start of source questions.
/// Longer forms come before their prefixes so the first match is the full marker.
pub const TWO_PART_MARKERS: &[&str] = &[
    "[TWO PART QUESTION]",
    "[Two-Part Question]",
    "[Two Part Question]",
    "[2 part question]",
    "[Two Part]",
    "(2 PARTS)",
    "(Two part)",
    "(Two-part)",
    "(TWO PART)",
    "TWO PART QUESTION",
    "Two-Part Question",
    "Two Part Question",
    "Two Parts",
    "Two - Part Question",
];

pub const IN_WHICH_BOOK_PREFIXES: &[&str] = &["in which book", "iwb"];

/// `{title}` is replaced with the book title, optionally followed by " by <author>".
pub const CONTENT_TEMPLATES: &[&str] = &["in the book, {title}", "in the book {title}", "in {title}"];

/// Case-insensitive ASCII prefix test returning the remainder on a match.
pub fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

/// Unicode-aware variant for titles and authors.
pub fn strip_prefix_unicode_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let mut chars = text.char_indices();
    for p in prefix.chars() {
        let (_, c) = chars.next()?;
        if !c.to_lowercase().eq(p.to_lowercase()) {
            return None;
        }
    }
    match chars.next() {
        Some((idx, _)) => Some(&text[idx..]),
        None => Some(""),
    }
}

/// Remove a leading two-part marker and any `:`/`;` and whitespace after it.
pub fn strip_two_part_marker<'a, S: AsRef<str>>(text: &'a str, markers: &[S]) -> (&'a str, bool) {
    let trimmed = text.trim();
    for marker in markers {
        if let Some(rest) = strip_prefix_ci(trimmed, marker.as_ref()) {
            let rest = rest.trim_start_matches(|c: char| c == ':' || c == ';' || c.is_whitespace());
            return (rest, true);
        }
    }
    (trimmed, false)
}
