// ABOUTME: Style guide rule set for validating presentations
// ABOUTME: Deserializable from JSON, with corporate, accessible and minimal presets

use crate::errors::{Result, SlideError};
use crate::utils::validate_file_exists;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Declarative presentation rules. Unset limits are not checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleGuide {
    // Content limits
    pub max_slides: Option<usize>,
    pub min_slide_count: Option<usize>,
    /// Per slide.
    pub max_bullet_points: Option<usize>,
    pub max_words_per_bullet: Option<usize>,
    /// Characters.
    pub max_title_length: Option<usize>,

    // Required elements
    pub required_layouts: Vec<String>,
    pub required_first_slide: Option<String>,
    pub required_last_slide: Option<String>,

    // Typography
    pub allowed_fonts: Option<BTreeSet<String>>,
    pub forbidden_fonts: BTreeSet<String>,
    /// Points; accepts `12` or `"12pt"`.
    #[serde(deserialize_with = "points")]
    pub min_font_size: Option<f64>,
    #[serde(deserialize_with = "points")]
    pub max_font_size: Option<f64>,

    // Colors, as anything `parse_color` accepts
    pub allowed_colors: Option<BTreeSet<String>>,
    pub forbidden_colors: BTreeSet<String>,
    /// Flags literal RGB colors in favour of theme slots.
    pub require_theme_colors: bool,

    // Images
    pub require_image_alt_text: bool,
    pub max_images_per_slide: Option<usize>,

    // Tables
    pub max_table_rows: Option<usize>,
    pub max_table_columns: Option<usize>,
    pub require_table_header: bool,

    // Accessibility and quality
    pub require_slide_titles: bool,
    pub check_empty_placeholders: bool,
}

fn points<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Points {
        Number(f64),
        Text(String),
    }

    match Option::<Points>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Points::Number(n)) => Ok(Some(n)),
        Some(Points::Text(text)) => {
            let trimmed = text.trim();
            let number = trimmed.strip_suffix("pt").unwrap_or(trimmed).trim();
            number
                .parse()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("invalid font size '{}'", text)))
        }
    }
}

fn font_set(fonts: &[&str]) -> BTreeSet<String> {
    fonts.iter().map(|f| f.to_string()).collect()
}

impl StyleGuide {
    pub fn corporate() -> Self {
        Self {
            max_slides: Some(30),
            max_bullet_points: Some(6),
            max_words_per_bullet: Some(12),
            max_title_length: Some(50),
            min_font_size: Some(12.0),
            forbidden_fonts: font_set(&["Comic Sans MS", "Papyrus", "Curlz MT"]),
            require_slide_titles: true,
            require_image_alt_text: true,
            require_theme_colors: true,
            ..Self::default()
        }
    }

    pub fn accessible() -> Self {
        Self {
            min_font_size: Some(18.0),
            require_image_alt_text: true,
            require_slide_titles: true,
            max_words_per_bullet: Some(15),
            ..Self::default()
        }
    }

    pub fn minimal() -> Self {
        Self {
            max_bullet_points: Some(8),
            max_slides: Some(50),
            forbidden_fonts: font_set(&["Comic Sans MS"]),
            ..Self::default()
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "corporate" => Some(Self::corporate()),
            "accessible" | "accessibility" => Some(Self::accessible()),
            "minimal" => Some(Self::minimal()),
            _ => None,
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        validate_file_exists(path)?;
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// A preset name or a path to a JSON style guide.
    pub fn resolve(name_or_path: &str) -> Result<Self> {
        if let Some(guide) = Self::preset(name_or_path) {
            return Ok(guide);
        }
        let path = Path::new(name_or_path);
        if path.exists() {
            return Self::load(path);
        }
        Err(SlideError::ConfigError(format!(
            "Unknown style guide '{}': use corporate, accessible, minimal or a JSON file",
            name_or_path
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let corporate = StyleGuide::corporate();
        assert_eq!(corporate.max_slides, Some(30));
        assert!(corporate.forbidden_fonts.contains("Papyrus"));
        assert_eq!(StyleGuide::preset("Accessible").unwrap().min_font_size, Some(18.0));
        assert!(StyleGuide::preset("loud").is_none());
    }

    #[test]
    fn test_from_json_accepts_point_strings() {
        let guide = StyleGuide::from_json(
            r#"{"min_font_size": "14pt", "max_font_size": 40, "forbidden_fonts": ["Papyrus"], "require_slide_titles": true}"#,
        )
        .unwrap();
        assert_eq!(guide.min_font_size, Some(14.0));
        assert_eq!(guide.max_font_size, Some(40.0));
        assert!(guide.require_slide_titles);
        assert!(guide.allowed_fonts.is_none());
        assert!(StyleGuide::from_json(r#"{"min_font_size": "big"}"#).is_err());
    }

    #[test]
    fn test_resolve_file_or_preset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide.json");
        std::fs::write(&path, r#"{"max_slides": 3}"#).unwrap();
        assert_eq!(StyleGuide::resolve(path.to_str().unwrap()).unwrap().max_slides, Some(3));
        assert_eq!(StyleGuide::resolve("minimal").unwrap(), StyleGuide::minimal());
        assert!(StyleGuide::resolve("/no/such/guide.json").is_err());
    }
}
