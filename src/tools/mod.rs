// ABOUTME: Stateless tool functions over a Presentation for agents and scripts
// ABOUTME: Each operation returns a typed Result and can be wrapped in a JSON-friendly ToolResult

pub mod content;
pub mod inspection;
pub mod media;
pub mod presentation;
pub mod slides;
pub mod style;

pub use content::{
    add_bullet, add_text_box, get_notes, set_body, set_notes, set_placeholder_text, set_subtitle, set_title,
};
pub use inspection::{
    describe_slide, get_placeholders, get_theme_colors, get_theme_fonts, list_layouts, LayoutSummary,
};
pub use media::{add_image, add_table, update_table_cell};
pub use presentation::{create_presentation, get_slide_count, open_presentation, save_presentation};
pub use slides::{add_slide, add_slide_for_content, delete_slide, duplicate_slide, reorder_slides};
pub use style::set_text_style;

use crate::colors::parse_color;
use crate::errors::{Result, SlideError};
use crate::oxml::shapes::Position;
use crate::oxml::text::RunStyle;
use crate::units::parse_length;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured error payload for agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub available: Vec<String>,
}

impl From<&SlideError> for ToolError {
    fn from(err: &SlideError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            suggestion: err.suggestion().map(|s| s.to_string()),
            available: err.available().to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Value::is_null", default)]
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
}

impl ToolResult {
    pub fn from_result<T: Serialize>(result: Result<T>) -> Self {
        match result.and_then(|v| Ok(serde_json::to_value(v)?)) {
            Ok(value) => Self {
                success: true,
                value,
                error: None,
            },
            Err(err) => Self {
                success: false,
                value: Value::Null,
                error: Some(ToolError::from(&err)),
            },
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"success":false,"error":{{"code":"JSON_ERROR","message":"{}"}}}}"#, e)
        })
    }
}

/// Text formatting accepted by the content tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOptions {
    /// Points.
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    /// Hex, `rgb()`, a color name or a theme slot.
    pub color: Option<String>,
}

impl TextOptions {
    /// `None` when no formatting was requested.
    pub fn run_style(&self) -> Result<Option<RunStyle>> {
        if let Some(size) = self.font_size {
            if !(1.0..=4000.0).contains(&size) {
                return Err(SlideError::InvalidArgument(format!(
                    "Font size must be between 1 and 4000 points, got {}",
                    size
                )));
            }
        }
        let style = RunStyle {
            size_pt: self.font_size,
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
            font: self.font_family.clone(),
            color: self.color.as_deref().map(parse_color).transpose()?,
        };
        Ok(if style.is_empty() { None } else { Some(style) })
    }
}

/// Where to put an image or table: a placeholder, explicit bounds, or
/// neither for a centered default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placement {
    pub placeholder: Option<String>,
    pub left: Option<String>,
    pub top: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
}

impl Placement {
    pub fn in_placeholder(name: &str) -> Self {
        Self {
            placeholder: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn at(left: &str, top: &str, width: Option<&str>, height: Option<&str>) -> Self {
        Self {
            placeholder: None,
            left: Some(left.to_string()),
            top: Some(top.to_string()),
            width: width.map(|w| w.to_string()),
            height: height.map(|h| h.to_string()),
        }
    }

    fn length(value: &Option<String>) -> Result<Option<i64>> {
        value.as_deref().map(parse_length).transpose()
    }

    /// Parsed (left, top, width, height) in EMUs.
    pub(crate) fn bounds(&self) -> Result<(Option<i64>, Option<i64>, Option<i64>, Option<i64>)> {
        let bounds = (
            Self::length(&self.left)?,
            Self::length(&self.top)?,
            Self::length(&self.width)?,
            Self::length(&self.height)?,
        );
        if bounds.2.map(|w| w <= 0).unwrap_or(false) || bounds.3.map(|h| h <= 0).unwrap_or(false) {
            return Err(SlideError::InvalidArgument(
                "Width and height must be positive".to_string(),
            ));
        }
        Ok(bounds)
    }
}

/// A box of the given size centered on the slide.
pub(crate) fn centered(slide_size: (i64, i64), cx: i64, cy: i64) -> Position {
    Position::new((slide_size.0 - cx) / 2, (slide_size.1 - cy) / 2, cx, cy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::Color;

    #[test]
    fn test_tool_result_json() {
        let ok = ToolResult::from_result(Ok(3usize));
        assert_eq!(ok.to_json(), r#"{"success":true,"value":3}"#);

        let err: Result<()> = Err(SlideError::LayoutNotFound {
            requested: "Agendaa".to_string(),
            available: vec!["Agenda".to_string()],
            suggestion: Some("Agenda".to_string()),
        });
        let failed = ToolResult::from_result(err);
        assert!(!failed.success);
        let error = failed.error.unwrap();
        assert_eq!(error.code, "LAYOUT_NOT_FOUND");
        assert_eq!(error.suggestion.as_deref(), Some("Agenda"));
        assert_eq!(error.available, vec!["Agenda"]);
    }

    #[test]
    fn test_text_options() {
        assert_eq!(TextOptions::default().run_style().unwrap(), None);
        let style = TextOptions {
            font_size: Some(24.0),
            color: Some("navy".to_string()),
            ..TextOptions::default()
        }
        .run_style()
        .unwrap()
        .unwrap();
        assert_eq!(style.color, Some(Color::Rgb("000080".to_string())));
        assert!(TextOptions {
            font_size: Some(0.0),
            ..TextOptions::default()
        }
        .run_style()
        .is_err());
    }

    #[test]
    fn test_placement_bounds() {
        let p = Placement::at("1in", "2cm", Some("72pt"), None);
        assert_eq!(p.bounds().unwrap(), (Some(914_400), Some(720_000), Some(914_400), None));
        assert!(Placement::at("1in", "1in", Some("-1in"), None).bounds().is_err());
        assert!(Placement::at("wide", "1in", None, None).bounds().is_err());
    }
}
