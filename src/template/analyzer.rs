// ABOUTME: Read-only template introspection: layouts, placeholders, theme and slide size
// ABOUTME: Produces a serializable analysis that can be exported as a JSON schema or plain text

use crate::core::presentation::Presentation;
use crate::errors::Result;
use crate::oxml::shapes::Position;
use crate::template::classify::{classify_layout, LayoutType};
use crate::template::matcher::canonical_family;
use crate::units::emu_to_inches;
use crate::utils::{validate_file_exists, write_file_atomic};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderAnalysis {
    #[serde(rename = "type")]
    pub ph_type: String,
    pub idx: u32,
    pub name: String,
    pub bounds: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutAnalysis {
    pub name: String,
    pub index: usize,
    pub layout_type: LayoutType,
    #[serde(default)]
    pub best_for: Vec<String>,
    /// Keyed by `type` or `type_idx`.
    #[serde(default)]
    pub placeholders: BTreeMap<String, PlaceholderAnalysis>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeAnalysis {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
    /// `heading` and `body`.
    #[serde(default)]
    pub fonts: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideSize {
    pub width: i64,
    pub height: i64,
    pub width_inches: f64,
    pub height_inches: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateAnalysis {
    #[serde(default)]
    pub layouts: Vec<LayoutAnalysis>,
    #[serde(default)]
    pub theme: ThemeAnalysis,
    #[serde(default)]
    pub slide_size: SlideSize,
    /// Layouts outside the standard Office set.
    #[serde(default)]
    pub custom_layouts: Vec<String>,
}

impl TemplateAnalysis {
    pub fn layout(&self, name: &str) -> Option<&LayoutAnalysis> {
        self.layouts.iter().find(|l| l.name == name)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

pub fn analyze(pres: &Presentation) -> TemplateAnalysis {
    let mut analysis = TemplateAnalysis::default();

    for layout in pres.layouts() {
        let layout_type = classify_layout(layout);
        let placeholders = layout
            .placeholders
            .iter()
            .map(|ph| {
                (
                    ph.key.clone(),
                    PlaceholderAnalysis {
                        ph_type: ph.ph_type.clone(),
                        idx: ph.idx,
                        name: ph.name.clone(),
                        bounds: ph.position,
                    },
                )
            })
            .collect();
        // Standard names normalize to their own family.
        let standard = canonical_family(&layout.name)
            .map(|family| family == layout.name.to_lowercase())
            .unwrap_or(false);
        if !standard {
            analysis.custom_layouts.push(layout.name.clone());
        }
        analysis.layouts.push(LayoutAnalysis {
            name: layout.name.clone(),
            index: layout.index,
            layout_type,
            best_for: layout_type.best_for().iter().map(|s| s.to_string()).collect(),
            placeholders,
        });
    }

    let theme = pres.theme();
    analysis.theme = ThemeAnalysis {
        name: theme.name.clone(),
        colors: theme.colors.clone(),
        fonts: [
            ("heading".to_string(), theme.fonts.heading.clone()),
            ("body".to_string(), theme.fonts.body.clone()),
        ]
        .into_iter()
        .collect(),
    };

    let (width, height) = pres.slide_size();
    analysis.slide_size = SlideSize {
        width,
        height,
        width_inches: emu_to_inches(width),
        height_inches: emu_to_inches(height),
    };
    analysis
}

pub fn analyze_template(path: &Path) -> Result<TemplateAnalysis> {
    let pres = Presentation::open(path)?;
    let analysis = analyze(&pres);
    info!(
        "Analyzed {:?}: {} layouts ({} custom)",
        path,
        analysis.layouts.len(),
        analysis.custom_layouts.len()
    );
    Ok(analysis)
}

pub fn export_template_schema(analysis: &TemplateAnalysis, path: &Path) -> Result<()> {
    write_file_atomic(path, analysis.to_json()?.as_bytes())
}

pub fn load_template_schema(path: &Path) -> Result<TemplateAnalysis> {
    validate_file_exists(path)?;
    TemplateAnalysis::from_json(&std::fs::read_to_string(path)?)
}

/// Plain-text summary suitable for prompts and terminal output.
pub fn describe_as_text(analysis: &TemplateAnalysis) -> String {
    let mut out = String::new();
    let size = &analysis.slide_size;
    let _ = writeln!(
        out,
        "Slide size: {:.2}in x {:.2}in",
        size.width_inches, size.height_inches
    );
    if let (Some(heading), Some(body)) = (
        analysis.theme.fonts.get("heading"),
        analysis.theme.fonts.get("body"),
    ) {
        let _ = writeln!(out, "Fonts: heading {}, body {}", heading, body);
    }
    if !analysis.theme.colors.is_empty() {
        let colors: Vec<String> = analysis
            .theme
            .colors
            .iter()
            .filter(|(slot, _)| slot.starts_with("accent"))
            .map(|(slot, hex)| format!("{} {}", slot, hex))
            .collect();
        let _ = writeln!(out, "Accent colors: {}", colors.join(", "));
    }

    let _ = writeln!(out, "\nLayouts:");
    for layout in &analysis.layouts {
        let mut placeholders: Vec<&PlaceholderAnalysis> = layout.placeholders.values().collect();
        placeholders.sort_by_key(|p| p.idx);
        let kinds: Vec<&str> = placeholders.iter().map(|p| p.ph_type.as_str()).collect();
        let _ = writeln!(
            out,
            "  {}. {} [{}] - {}",
            layout.index + 1,
            layout.name,
            layout.layout_type,
            layout.layout_type.description()
        );
        if !kinds.is_empty() {
            let _ = writeln!(out, "     placeholders: {}", kinds.join(", "));
        }
    }
    if !analysis.custom_layouts.is_empty() {
        let _ = writeln!(out, "\nCustom layouts: {}", analysis.custom_layouts.join(", "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_blank_presentation() {
        let pres = Presentation::new().unwrap();
        let analysis = analyze(&pres);
        assert_eq!(analysis.layouts.len(), 9);
        assert!(analysis.custom_layouts.is_empty());
        assert_eq!(analysis.slide_size.width_inches, 10.0);
        assert_eq!(analysis.theme.fonts["heading"], "Calibri Light");

        let content = analysis.layout("Title and Content").unwrap();
        assert_eq!(content.layout_type, LayoutType::TitleAndContent);
        assert!(content.placeholders.contains_key("title"));
        assert!(content.placeholders.contains_key("body_1"));
    }

    #[test]
    fn test_schema_round_trip_and_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        let analysis = analyze(&Presentation::new().unwrap());
        export_template_schema(&analysis, &path).unwrap();
        let loaded = load_template_schema(&path).unwrap();
        assert_eq!(loaded, analysis);

        let text = describe_as_text(&loaded);
        assert!(text.contains("Slide size: 10.00in x 7.50in"));
        assert!(text.contains("1. Title Slide [title_slide]"));
    }
}
