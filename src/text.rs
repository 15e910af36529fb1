//! Text normalization helpers shared by extraction and mapping
//!
//! Scraped text is messy: non-breaking spaces, irregular whitespace,
//! currency symbols mixed into prices. Everything that leaves this crate
//! goes through these helpers first.

use regex::Regex;

/// Collapses whitespace runs to single spaces and trims
///
/// Non-breaking spaces (U+00A0) are treated as ordinary spaces.
pub fn clean_text(text: &str) -> String {
    text.replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Converts a product name into a URL-safe slug
///
/// ASCII alphanumerics are kept, every other run of characters becomes a
/// single hyphen, and the result is lowercased with no leading or trailing
/// hyphens. Non-ASCII characters are dropped rather than transliterated.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Like [`clean_text`] but keeps line structure intact
///
/// Each line is cleaned individually and blank lines are dropped, so
/// bullet lists inside descriptions survive normalization.
pub fn clean_lines(text: &str) -> String {
    text.replace('\u{a0}', " ")
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extracts the first numeric value from a price string
///
/// Takes the first digit run (commas and dots allowed), strips the
/// thousands separators, and parses the remainder as a float.
/// "EGP 1,299.50" parses to 1299.5.
pub fn parse_price(text: &str) -> Option<f64> {
    let re = Regex::new(r"\d[\d,\.]*").ok()?;
    let m = re.find(text)?;
    m.as_str().replace(',', "").parse::<f64>().ok()
}

/// Truncates a string to at most `max` characters (not bytes)
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Title-cases each whitespace-separated word ("out of stock" -> "Out Of Stock")
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
