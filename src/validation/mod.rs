// ABOUTME: Style-guide validation of presentations
// ABOUTME: Rule definitions and presets plus the checker that reports issues

pub mod rules;
pub mod validator;

pub use rules::StyleGuide;
pub use validator::{ensure_valid, summarize, validate, Severity, ValidationIssue, ValidationSummary};
