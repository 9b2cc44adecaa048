// ABOUTME: Error types for the slidesmith library
// ABOUTME: Provides structured, code-tagged errors for package, layout, slide and style failures

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlideError {
    #[error("Failed to read file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    PathNotFoundError(PathBuf),

    #[error("Invalid template {path}: {reason}")]
    InvalidTemplate { path: String, reason: String },

    #[error("PPTX package error: {0}")]
    PackageError(String),

    #[error("XML error: {0}")]
    XmlError(String),

    #[error("Layout '{requested}' not found{}", suggestion_suffix(.suggestion))]
    LayoutNotFound {
        requested: String,
        available: Vec<String>,
        suggestion: Option<String>,
    },

    #[error("Slide {requested} not found (presentation has {total} slides)")]
    SlideNotFound { requested: usize, total: usize },

    #[error("Placeholder '{requested}' not found on slide {slide}{}", suggestion_suffix(.suggestion))]
    PlaceholderNotFound {
        requested: String,
        slide: usize,
        available: Vec<String>,
        suggestion: Option<String>,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Content error: {0}")]
    ContentError(String),

    #[error("Style error: {0}")]
    StyleError(String),

    #[error("Style guide violated with {} error(s): {}", .0.len(), .0.join("; "))]
    StyleViolation(Vec<String>),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("Markdown error: {0}")]
    MarkdownError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown error: {0}")]
    UnknownError(String),
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(". Did you mean '{}'?", s),
        None => String::new(),
    }
}

impl SlideError {
    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            SlideError::FileReadError(_) => "IO_ERROR",
            SlideError::PathNotFoundError(_) => "FILE_NOT_FOUND",
            SlideError::InvalidTemplate { .. } => "INVALID_TEMPLATE",
            SlideError::PackageError(_) => "PACKAGE_ERROR",
            SlideError::XmlError(_) => "XML_ERROR",
            SlideError::LayoutNotFound { .. } => "LAYOUT_NOT_FOUND",
            SlideError::SlideNotFound { .. } => "SLIDE_NOT_FOUND",
            SlideError::PlaceholderNotFound { .. } => "PLACEHOLDER_NOT_FOUND",
            SlideError::InvalidArgument(_) => "INVALID_ARGUMENT",
            SlideError::ContentError(_) => "CONTENT_ERROR",
            SlideError::StyleError(_) => "STYLE_ERROR",
            SlideError::StyleViolation(_) => "STYLE_VIOLATION",
            SlideError::ImageError(_) => "IMAGE_ERROR",
            SlideError::MarkdownError(_) => "MARKDOWN_ERROR",
            SlideError::JsonError(_) => "JSON_ERROR",
            SlideError::ConfigError(_) => "CONFIG_ERROR",
            SlideError::UnknownError(_) => "UNKNOWN_ERROR",
        }
    }

    /// Suggested correction, when the error carries one.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            SlideError::LayoutNotFound { suggestion, .. }
            | SlideError::PlaceholderNotFound { suggestion, .. } => suggestion.as_deref(),
            _ => None,
        }
    }

    /// Valid alternatives the caller could have used.
    pub fn available(&self) -> &[String] {
        match self {
            SlideError::LayoutNotFound { available, .. }
            | SlideError::PlaceholderNotFound { available, .. } => available,
            _ => &[],
        }
    }
}

impl From<anyhow::Error> for SlideError {
    fn from(err: anyhow::Error) -> Self {
        SlideError::UnknownError(err.to_string())
    }
}

impl From<zip::result::ZipError> for SlideError {
    fn from(err: zip::result::ZipError) -> Self {
        SlideError::PackageError(format!("ZIP operation failed: {}", err))
    }
}

impl From<quick_xml::Error> for SlideError {
    fn from(err: quick_xml::Error) -> Self {
        SlideError::XmlError(err.to_string())
    }
}

impl From<image::ImageError> for SlideError {
    fn from(err: image::ImageError) -> Self {
        SlideError::ImageError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SlideError>;
