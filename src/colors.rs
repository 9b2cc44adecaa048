// ABOUTME: Color parsing for text and fill styling
// ABOUTME: Accepts hex, rgb(), CSS names and theme scheme slots, and lightens or darkens RGB values

use crate::errors::{Result, SlideError};
use serde::{Deserialize, Serialize};
use std::fmt;

const NAMED_COLORS: &[(&str, &str)] = &[
    ("black", "000000"),
    ("white", "FFFFFF"),
    ("red", "FF0000"),
    ("green", "00FF00"),
    ("blue", "0000FF"),
    ("yellow", "FFFF00"),
    ("cyan", "00FFFF"),
    ("magenta", "FF00FF"),
    ("gray", "808080"),
    ("grey", "808080"),
    ("silver", "C0C0C0"),
    ("maroon", "800000"),
    ("olive", "808000"),
    ("lime", "00FF00"),
    ("teal", "008080"),
    ("navy", "000080"),
    ("purple", "800080"),
    ("orange", "FFA500"),
    ("pink", "FFC0CB"),
    ("brown", "A52A2A"),
    ("gold", "FFD700"),
    ("coral", "FF7F50"),
    ("salmon", "FA8072"),
    ("tomato", "FF6347"),
    ("crimson", "DC143C"),
    ("indigo", "4B0082"),
    ("violet", "EE82EE"),
    ("tan", "D2B48C"),
    ("beige", "F5F5DC"),
    ("ivory", "FFFFF0"),
    ("khaki", "F0E68C"),
    ("lavender", "E6E6FA"),
    ("wheat", "F5DEB3"),
];

pub const THEME_SLOTS: &[&str] = &[
    "dk1", "lt1", "dk2", "lt2", "accent1", "accent2", "accent3", "accent4", "accent5", "accent6",
    "hlink", "folHlink", "tx1", "tx2", "bg1", "bg2",
];

/// A resolved color: either a literal RGB value or a theme scheme slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    /// Uppercase six-digit hex without `#`.
    Rgb(String),
    Scheme(String),
}

impl Color {
    pub fn rgb(&self) -> Option<&str> {
        match self {
            Color::Rgb(hex) => Some(hex),
            Color::Scheme(_) => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Rgb(hex) => write!(f, "#{}", hex),
            Color::Scheme(slot) => write!(f, "scheme:{}", slot),
        }
    }
}

pub fn parse_color(value: &str) -> Result<Color> {
    let value = value.trim();

    if let Some(hex) = normalize_hex(value) {
        return Ok(Color::Rgb(hex));
    }

    let lower = value.to_ascii_lowercase();
    if lower.starts_with("rgb") {
        let (r, g, b) = parse_rgb_function(&lower)?;
        return Ok(Color::Rgb(rgb_to_hex(r, g, b)));
    }
    if let Some((_, hex)) = NAMED_COLORS.iter().find(|(name, _)| *name == lower) {
        return Ok(Color::Rgb(hex.to_string()));
    }
    let slot = lower.strip_prefix("scheme:").unwrap_or(&lower);
    if let Some(found) = THEME_SLOTS.iter().find(|s| s.to_ascii_lowercase() == slot) {
        return Ok(Color::Scheme(found.to_string()));
    }

    Err(SlideError::StyleError(format!(
        "Unrecognized color format: {}",
        value
    )))
}

/// `#F60`, `ff6600` or `#FF6600` -> `FF6600`.
pub fn normalize_hex(value: &str) -> Option<String> {
    let hex = value.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => Some(hex.to_ascii_uppercase()),
        3 => Some(
            hex.chars()
                .flat_map(|c| [c, c])
                .collect::<String>()
                .to_ascii_uppercase(),
        ),
        _ => None,
    }
}

fn parse_rgb_function(value: &str) -> Result<(u8, u8, u8)> {
    let invalid = || SlideError::StyleError(format!("Invalid rgb() color: {}", value));
    let inner = value
        .trim_start_matches("rgb")
        .trim()
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(invalid)?;
    let parts: Vec<&str> = inner
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    if parts.len() != 3 {
        return Err(invalid());
    }
    let mut channels = [0u8; 3];
    for (slot, part) in channels.iter_mut().zip(parts) {
        *slot = part.parse::<u8>().map_err(|_| invalid())?;
    }
    Ok((channels[0], channels[1], channels[2]))
}

pub fn hex_to_rgb(hex: &str) -> Result<(u8, u8, u8)> {
    let hex = normalize_hex(hex)
        .ok_or_else(|| SlideError::StyleError(format!("Invalid hex color: {}", hex)))?;
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
    Ok((channel(0), channel(2), channel(4)))
}

pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("{:02X}{:02X}{:02X}", r, g, b)
}

pub fn lighten(hex: &str, amount: f64) -> Result<String> {
    let (r, g, b) = hex_to_rgb(hex)?;
    let up = |c: u8| (c as f64 + (255.0 - c as f64) * amount).clamp(0.0, 255.0) as u8;
    Ok(rgb_to_hex(up(r), up(g), up(b)))
}

pub fn darken(hex: &str, amount: f64) -> Result<String> {
    let (r, g, b) = hex_to_rgb(hex)?;
    let down = |c: u8| (c as f64 * (1.0 - amount)).clamp(0.0, 255.0) as u8;
    Ok(rgb_to_hex(down(r), down(g), down(b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color_forms() {
        assert_eq!(parse_color("#f60").unwrap(), Color::Rgb("FF6600".into()));
        assert_eq!(parse_color("4472c4").unwrap(), Color::Rgb("4472C4".into()));
        assert_eq!(
            parse_color("rgb(255, 102, 0)").unwrap(),
            Color::Rgb("FF6600".into())
        );
        assert_eq!(parse_color("Navy").unwrap(), Color::Rgb("000080".into()));
        assert_eq!(parse_color("accent1").unwrap(), Color::Scheme("accent1".into()));
        assert_eq!(parse_color("folhlink").unwrap(), Color::Scheme("folHlink".into()));
        assert!(parse_color("rgb(300, 0, 0)").is_err());
        assert!(parse_color("not-a-color").is_err());
    }

    #[test]
    fn test_lighten_and_darken() {
        assert_eq!(lighten("000000", 0.5).unwrap(), "7F7F7F");
        assert_eq!(darken("FFFFFF", 0.5).unwrap(), "7F7F7F");
        assert_eq!(Color::Rgb("ABCDEF".into()).to_string(), "#ABCDEF");
    }
}
