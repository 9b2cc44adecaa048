// ABOUTME: Configuration module for the slidesmith application
// ABOUTME: Provides defaults for templates and layout matching, overridable from the environment

use crate::errors::{Result, SlideError};
use crate::template::matcher::DEFAULT_THRESHOLD;
use crate::validation::StyleGuide;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_LAYOUT: &str = "Title and Content";

/// Global configuration for the application
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Template (.pptx/.potx) new decks start from; the built-in blank
    /// template when unset.
    pub template: Option<PathBuf>,
    /// Layout used when a requested layout cannot be matched.
    pub default_layout: String,
    /// Minimum similarity for fuzzy layout names, 0.0 to 1.0.
    pub match_threshold: f64,
    /// Preset name or path of a JSON style guide.
    pub style_guide: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template: None,
            default_layout: DEFAULT_LAYOUT.to_string(),
            match_threshold: DEFAULT_THRESHOLD,
            style_guide: None,
        }
    }
}

impl Config {
    /// Create a new configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let match_threshold = match non_empty("SLIDESMITH_MATCH_THRESHOLD") {
            Some(raw) => {
                let value: f64 = raw.trim().parse().map_err(|_| {
                    SlideError::ConfigError(format!(
                        "SLIDESMITH_MATCH_THRESHOLD must be a number, got '{}'",
                        raw
                    ))
                })?;
                check_threshold(value)?
            }
            None => defaults.match_threshold,
        };

        Ok(Self {
            template: non_empty("SLIDESMITH_TEMPLATE").map(PathBuf::from),
            default_layout: non_empty("SLIDESMITH_DEFAULT_LAYOUT").unwrap_or(defaults.default_layout),
            match_threshold,
            style_guide: non_empty("SLIDESMITH_STYLE_GUIDE"),
        })
    }

    pub fn with_template(mut self, template: Option<PathBuf>) -> Self {
        if template.is_some() {
            self.template = template;
        }
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Result<Self> {
        self.match_threshold = check_threshold(threshold)?;
        Ok(self)
    }

    /// The configured style guide, if any.
    pub fn style_guide(&self) -> Result<Option<StyleGuide>> {
        self.style_guide
            .as_deref()
            .map(StyleGuide::resolve)
            .transpose()
    }
}

fn check_threshold(value: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SlideError::ConfigError(format!(
            "Match threshold must be between 0 and 1, got {}",
            value
        )));
    }
    Ok(value)
}
