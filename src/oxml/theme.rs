// ABOUTME: Theme part reader for color schemes and font schemes
// ABOUTME: Extracts the twelve scheme colors and the major/minor Latin typefaces

use crate::errors::Result;
use crate::oxml::xml::Element;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_HEADING_FONT: &str = "Calibri Light";
pub const DEFAULT_BODY_FONT: &str = "Calibri";

/// Scheme slots in the order they appear in `a:clrScheme`.
pub const COLOR_SLOTS: [&str; 12] = [
    "dk1", "lt1", "dk2", "lt2", "accent1", "accent2", "accent3", "accent4", "accent5", "accent6",
    "hlink", "folHlink",
];

pub const DEFAULT_COLORS: [&str; 12] = [
    "000000", "FFFFFF", "44546A", "E7E6E6", "4472C4", "ED7D31", "A5A5A5", "FFC000", "5B9BD5",
    "70AD47", "0563C1", "954F72",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeFonts {
    pub heading: String,
    pub body: String,
}

impl Default for ThemeFonts {
    fn default() -> Self {
        Self {
            heading: DEFAULT_HEADING_FONT.to_string(),
            body: DEFAULT_BODY_FONT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeInfo {
    pub name: String,
    /// Slot name -> `#RRGGBB`.
    pub colors: BTreeMap<String, String>,
    pub fonts: ThemeFonts,
}

impl Default for ThemeInfo {
    fn default() -> Self {
        let colors = COLOR_SLOTS
            .iter()
            .zip(DEFAULT_COLORS.iter())
            .map(|(slot, hex)| (slot.to_string(), format!("#{}", hex)))
            .collect();
        Self {
            name: "Office Theme".to_string(),
            colors,
            fonts: ThemeFonts::default(),
        }
    }
}

impl ThemeInfo {
    /// Resolves a scheme slot, mapping the tx/bg aliases onto dk/lt slots.
    pub fn color(&self, slot: &str) -> Option<&str> {
        let slot = match slot {
            "tx1" => "dk1",
            "bg1" => "lt1",
            "tx2" => "dk2",
            "bg2" => "lt2",
            other => other,
        };
        self.colors.get(slot).map(|s| s.as_str())
    }
}

pub fn parse_theme(bytes: &[u8]) -> Result<ThemeInfo> {
    let root = Element::parse(bytes)?;
    let mut theme = ThemeInfo {
        name: root.attr("name").unwrap_or("Theme").to_string(),
        colors: BTreeMap::new(),
        fonts: ThemeFonts::default(),
    };

    if let Some(scheme) = root.find(&["themeElements", "clrScheme"]) {
        for slot in scheme.elements() {
            let value = slot
                .child("srgbClr")
                .and_then(|c| c.attr("val"))
                .or_else(|| slot.child("sysClr").and_then(|c| c.attr("lastClr")));
            if let Some(hex) = value {
                theme
                    .colors
                    .insert(slot.local_name().to_string(), format!("#{}", hex.to_ascii_uppercase()));
            }
        }
    }

    if let Some(fonts) = root.find(&["themeElements", "fontScheme"]) {
        let latin = |which: &str| {
            fonts
                .child(which)
                .and_then(|f| f.child("latin"))
                .and_then(|l| l.attr("typeface"))
                .filter(|t| !t.is_empty())
                .map(|t| t.to_string())
        };
        if let Some(heading) = latin("majorFont") {
            theme.fonts.heading = heading;
        }
        if let Some(body) = latin("minorFont") {
            theme.fonts.body = body;
        }
    }

    Ok(theme)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_theme_colors_and_fonts() {
        let xml = br#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Brand">
  <a:themeElements>
    <a:clrScheme name="Brand">
      <a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>
      <a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>
      <a:accent1><a:srgbClr val="1f4e79"/></a:accent1>
    </a:clrScheme>
    <a:fontScheme name="Brand">
      <a:majorFont><a:latin typeface="Georgia"/></a:majorFont>
      <a:minorFont><a:latin typeface=""/></a:minorFont>
    </a:fontScheme>
  </a:themeElements>
</a:theme>"#;
        let theme = parse_theme(xml).unwrap();
        assert_eq!(theme.name, "Brand");
        assert_eq!(theme.color("accent1"), Some("#1F4E79"));
        assert_eq!(theme.color("tx1"), Some("#000000"));
        assert_eq!(theme.fonts.heading, "Georgia");
        assert_eq!(theme.fonts.body, DEFAULT_BODY_FONT);
    }
}
