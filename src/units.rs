// ABOUTME: Length units for DrawingML geometry
// ABOUTME: Converts inches, centimetres, millimetres, points and pixels to and from EMUs

use crate::errors::{Result, SlideError};

pub const EMU_PER_INCH: i64 = 914_400;
pub const EMU_PER_CM: i64 = 360_000;
pub const EMU_PER_MM: i64 = 36_000;
pub const EMU_PER_PT: i64 = 12_700;
const PX_PER_INCH: f64 = 96.0;

pub fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH as f64).round() as i64
}

pub fn cm(value: f64) -> i64 {
    (value * EMU_PER_CM as f64).round() as i64
}

pub fn mm(value: f64) -> i64 {
    (value * EMU_PER_MM as f64).round() as i64
}

pub fn pt(value: f64) -> i64 {
    (value * EMU_PER_PT as f64).round() as i64
}

pub fn emu_to_inches(emu: i64) -> f64 {
    emu as f64 / EMU_PER_INCH as f64
}

pub fn emu_to_pt(emu: i64) -> f64 {
    emu as f64 / EMU_PER_PT as f64
}

/// Font sizes in DrawingML are stored in hundredths of a point.
pub fn pt_to_centipoints(points: f64) -> i64 {
    (points * 100.0).round() as i64
}

pub fn centipoints_to_pt(centipoints: i64) -> f64 {
    centipoints as f64 / 100.0
}

/// Parse a length such as `1in`, `2.5cm`, `10mm`, `12pt`, `96px` or a bare
/// EMU count.
pub fn parse_length(value: &str) -> Result<i64> {
    let trimmed = value.trim();
    let split = trimmed
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);
    let num: f64 = number
        .trim()
        .parse()
        .map_err(|_| SlideError::InvalidArgument(format!("Invalid length format: {}", value)))?;

    match unit.trim().to_ascii_lowercase().as_str() {
        "in" | "inch" | "inches" => Ok(inches(num)),
        "cm" => Ok(cm(num)),
        "mm" => Ok(mm(num)),
        "pt" => Ok(pt(num)),
        "px" => Ok(inches(num / PX_PER_INCH)),
        "" | "emu" => Ok(num.round() as i64),
        other => Err(SlideError::InvalidArgument(format!(
            "Unknown length unit '{}' in {}",
            other, value
        ))),
    }
}

/// Human-readable length, e.g. `1.50in`.
pub fn format_emu(emu: i64, unit: &str) -> String {
    match unit {
        "cm" => format!("{:.2}cm", emu as f64 / EMU_PER_CM as f64),
        "mm" => format!("{:.1}mm", emu as f64 / EMU_PER_MM as f64),
        "pt" => format!("{:.1}pt", emu_to_pt(emu)),
        "emu" => emu.to_string(),
        _ => format!("{:.2}in", emu_to_inches(emu)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_length_units() {
        assert_eq!(parse_length("1in").unwrap(), 914_400);
        assert_eq!(parse_length("2.54cm").unwrap(), 914_400);
        assert_eq!(parse_length("25.4 mm").unwrap(), 914_400);
        assert_eq!(parse_length("72pt").unwrap(), 914_400);
        assert_eq!(parse_length("96px").unwrap(), 914_400);
        assert_eq!(parse_length("12345").unwrap(), 12_345);
        assert!(parse_length("3 furlongs").is_err());
        assert!(parse_length("in").is_err());
    }

    #[test]
    fn test_centipoints() {
        assert_eq!(pt_to_centipoints(18.0), 1800);
        assert_eq!(centipoints_to_pt(1050), 10.5);
        assert_eq!(format_emu(1_371_600, "in"), "1.50in");
    }
}
