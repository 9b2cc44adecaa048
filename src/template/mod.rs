// ABOUTME: Template intelligence: analysis, layout matching, classification and design tokens
// ABOUTME: Everything here reads templates; nothing mutates a presentation

pub mod analyzer;
pub mod classify;
pub mod matcher;
pub mod tokens;

pub use analyzer::{analyze_template, TemplateAnalysis};
pub use classify::{classify_layout, recommend_layouts, LayoutType};
pub use matcher::{find_similar, LayoutMatch, LayoutMatcher};
pub use tokens::DesignTokens;
