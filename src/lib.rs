// ABOUTME: Library module for the slidesmith program.
// ABOUTME: Template-driven .pptx editing, layout matching, markdown building and style validation.

pub mod colors;
pub mod config;
pub mod core;
pub mod errors;
pub mod markdown;
pub mod oxml;
pub mod template;
pub mod tools;
pub mod units;
pub mod utils;
pub mod validation;

// Reexport common types and functions
pub use crate::core::{LayoutInfo, LayoutRef, Presentation, Slide, SlideDescription};
pub use config::Config;
pub use errors::{Result, SlideError};
pub use markdown::{build_from_markdown, build_from_markdown_file, to_markdown};
pub use template::{analyze_template, LayoutMatcher, LayoutType, TemplateAnalysis};
pub use tools::{Placement, TextOptions, ToolResult};
pub use validation::{validate, Severity, StyleGuide, ValidationIssue};

#[cfg(test)]
mod tests;
