//! Hex color handling.
//!
//! Every color that reaches storage is normalized to upper-case `#RRGGBB`.

use std::collections::HashSet;

/// Error returned when a string is not a usable hex color.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid hex color: {0:?}")]
pub struct ColorError(pub String);

/// Normalize a hex color to `#RRGGBB`.
///
/// Accepts the value with or without a leading `#`, in any case.
pub fn normalize_hex(input: &str) -> Result<String, ColorError> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ColorError(input.to_string()));
    }

    Ok(format!("#{}", digits.to_ascii_uppercase()))
}

/// Check whether a string is already a normalized `#RRGGBB` color.
pub fn is_hex_color(value: &str) -> bool {
    normalize_hex(value).map(|n| n == value).unwrap_or(false)
}

/// Convert RGB components to `#RRGGBB`. Components are rounded and clamped to 0..=255.
pub fn rgb_to_hex(r: f64, g: f64, b: f64) -> String {
    let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
    format!("#{:02X}{:02X}{:02X}", channel(r), channel(g), channel(b))
}

/// Normalize a list of raw color strings, dropping malformed entries and
/// duplicates (first occurrence wins), keeping at most `cap` colors.
pub fn unique_colors<I, S>(raw: I, cap: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .filter_map(|c| normalize_hex(c.as_ref()).ok())
        .filter(|c| seen.insert(c.clone()))
        .take(cap)
        .collect()
}
