// ABOUTME: Design tokens: named brand colors, fonts and spacing
// ABOUTME: Loaded from and saved to JSON, resolved into colors, run styles and EMU lengths

use crate::colors::{parse_color, Color};
use crate::errors::{Result, SlideError};
use crate::oxml::text::RunStyle;
use crate::units::parse_length;
use crate::utils::write_file_atomic;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FontTokenRepr")]
pub struct FontToken {
    pub family: String,
    /// e.g. "32pt"
    pub size: Option<String>,
    /// "normal" or "bold"
    pub weight: Option<String>,
}

/// Fonts may be written as a bare family name.
#[derive(Deserialize)]
#[serde(untagged)]
enum FontTokenRepr {
    Family(String),
    Full {
        #[serde(default = "default_family")]
        family: String,
        #[serde(default)]
        size: Option<String>,
        #[serde(default)]
        weight: Option<String>,
    },
}

fn default_family() -> String {
    "Arial".to_string()
}

impl From<FontTokenRepr> for FontToken {
    fn from(repr: FontTokenRepr) -> Self {
        match repr {
            FontTokenRepr::Family(family) => FontToken::new(&family, None),
            FontTokenRepr::Full { family, size, weight } => FontToken { family, size, weight },
        }
    }
}

impl FontToken {
    pub fn new(family: &str, size: Option<&str>) -> Self {
        Self {
            family: family.to_string(),
            size: size.map(|s| s.to_string()),
            weight: None,
        }
    }

    /// Size in points; accepts "32pt", "32" and other length units.
    pub fn size_pt(&self) -> Result<Option<f64>> {
        match &self.size {
            None => Ok(None),
            Some(size) => {
                let emu = parse_length(&format_points(size))?;
                Ok(Some(crate::units::emu_to_pt(emu)))
            }
        }
    }

    pub fn run_style(&self) -> Result<RunStyle> {
        Ok(RunStyle {
            size_pt: self.size_pt()?,
            bold: self.weight.as_deref().map(|w| w.eq_ignore_ascii_case("bold")),
            font: Some(self.family.clone()),
            ..RunStyle::default()
        })
    }
}

/// Bare numbers in a font size mean points.
fn format_points(size: &str) -> String {
    let trimmed = size.trim();
    if trimmed.parse::<f64>().is_ok() {
        format!("{}pt", trimmed)
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignTokens {
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
    #[serde(default)]
    pub fonts: BTreeMap<String, FontToken>,
    #[serde(default)]
    pub spacing: BTreeMap<String, String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl DesignTokens {
    /// The Office-style default token set.
    pub fn office() -> Self {
        let colors = [
            ("primary", "#4472C4"),
            ("secondary", "#ED7D31"),
            ("success", "#70AD47"),
            ("warning", "#FFC000"),
            ("error", "#C00000"),
            ("text-dark", "#333333"),
            ("text-light", "#666666"),
            ("background", "#FFFFFF"),
        ];
        let fonts = [
            ("heading", "Calibri Light", "44pt"),
            ("subheading", "Calibri Light", "32pt"),
            ("body", "Calibri", "18pt"),
            ("caption", "Calibri", "12pt"),
        ];
        Self {
            colors: colors
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            fonts: fonts
                .iter()
                .map(|(k, family, size)| (k.to_string(), FontToken::new(family, Some(size))))
                .collect(),
            ..Self::default()
        }
    }

    /// Builds tokens from JSON, normalizing every color to `#RRGGBB`.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let mut tokens: DesignTokens = serde_json::from_value(value)?;
        for (name, color) in tokens.colors.iter_mut() {
            match parse_color(color)? {
                Color::Rgb(hex) => *color = format!("#{}", hex),
                Color::Scheme(_) => {
                    return Err(SlideError::StyleError(format!(
                        "Color token '{}' must be a literal color, got '{}'",
                        name, color
                    )))
                }
            }
        }
        Ok(tokens)
    }

    pub fn color(&self, name: &str) -> Option<&str> {
        self.colors.get(name).map(|s| s.as_str())
    }

    pub fn font(&self, name: &str) -> Option<&FontToken> {
        self.fonts.get(name)
    }

    /// A token name or any literal color `parse_color` accepts.
    pub fn resolve_color(&self, value: &str) -> Result<Color> {
        match self.colors.get(value) {
            Some(token) => parse_color(token),
            None => parse_color(value),
        }
    }

    /// A spacing token or literal length, in EMUs.
    pub fn resolve_spacing(&self, value: &str) -> Result<i64> {
        parse_length(self.spacing.get(value).map(|s| s.as_str()).unwrap_or(value))
    }

    pub fn load(path: &Path) -> Result<Self> {
        crate::utils::validate_file_exists(path)?;
        let text = std::fs::read_to_string(path)?;
        Self::from_json(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        write_file_atomic(path, json.as_bytes())?;
        info!("Saved design tokens to {:?}", path);
        Ok(())
    }
}
