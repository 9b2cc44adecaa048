// ABOUTME: Checks a presentation against a style guide and reports issues
// ABOUTME: Presentation-level rules first, then each slide in order, shapes in tree order

use crate::colors::{parse_color, Color};
use crate::core::presentation::Presentation;
use crate::core::slide::Slide;
use crate::errors::{Result, SlideError};
use crate::oxml::shapes::{ShapeInfo, ShapeKind};
use crate::template::matcher::normalize_name;
use crate::validation::rules::StyleGuide;
use log::{debug, warn};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// `None` for presentation-level issues.
    pub slide: Option<usize>,
    pub severity: Severity,
    pub rule: String,
    pub message: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub details: Value,
}

impl ValidationIssue {
    fn new(slide: Option<usize>, severity: Severity, rule: &str, message: String) -> Self {
        Self {
            slide,
            severity,
            rule: rule.to_string(),
            message,
            details: Value::Null,
        }
    }

    fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slide {
            Some(n) => write!(f, "[{}] slide {}: {} ({})", self.severity, n, self.message, self.rule),
            None => write!(f, "[{}] {} ({})", self.severity, self.message, self.rule),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationSummary {
    pub total: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub by_rule: BTreeMap<String, usize>,
    /// Slide number as a string, or `presentation`.
    pub by_slide: BTreeMap<String, usize>,
}

pub fn validate(pres: &Presentation, guide: &StyleGuide) -> Vec<ValidationIssue> {
    let mut issues = check_presentation(pres, guide);
    for slide in pres.slides() {
        issues.extend(check_slide(slide, guide));
    }
    debug!("Validation found {} issues", issues.len());
    issues
}

/// Fails with `StyleViolation` when any error-severity issue is found.
pub fn ensure_valid(pres: &Presentation, guide: &StyleGuide) -> Result<Vec<ValidationIssue>> {
    let issues = validate(pres, guide);
    let errors: Vec<String> = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .map(|i| i.to_string())
        .collect();
    if errors.is_empty() {
        Ok(issues)
    } else {
        warn!("Style guide violated: {} errors", errors.len());
        Err(SlideError::StyleViolation(errors))
    }
}

pub fn summarize(issues: &[ValidationIssue]) -> ValidationSummary {
    let mut summary = ValidationSummary {
        total: issues.len(),
        ..ValidationSummary::default()
    };
    for issue in issues {
        match issue.severity {
            Severity::Error => summary.error_count += 1,
            Severity::Warning => summary.warning_count += 1,
            Severity::Info => summary.info_count += 1,
        }
        *summary.by_rule.entry(issue.rule.clone()).or_default() += 1;
        let key = issue
            .slide
            .map(|n| n.to_string())
            .unwrap_or_else(|| "presentation".to_string());
        *summary.by_slide.entry(key).or_default() += 1;
    }
    summary
}

fn same_layout(actual: &str, wanted: &str) -> bool {
    normalize_name(actual) == normalize_name(wanted)
}

fn check_presentation(pres: &Presentation, guide: &StyleGuide) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let count = pres.slide_count();

    if let Some(max) = guide.max_slides {
        if count > max {
            issues.push(
                ValidationIssue::new(
                    None,
                    Severity::Error,
                    "max_slides",
                    format!("Too many slides ({} > {} max)", count, max),
                )
                .with_details(json!({"actual": count, "max": max})),
            );
        }
    }
    if let Some(min) = guide.min_slide_count {
        if count < min {
            issues.push(
                ValidationIssue::new(
                    None,
                    Severity::Warning,
                    "min_slide_count",
                    format!("Too few slides ({} < {} min)", count, min),
                )
                .with_details(json!({"actual": count, "min": min})),
            );
        }
    }

    let layouts = pres.layout_names();
    for required in &guide.required_layouts {
        if !layouts.iter().any(|l| same_layout(l, required)) {
            issues.push(ValidationIssue::new(
                None,
                Severity::Warning,
                "required_layout",
                format!("Required layout '{}' not available in template", required),
            ));
        }
    }

    let edges = [
        ("required_first_slide", &guide.required_first_slide, pres.slides().first()),
        ("required_last_slide", &guide.required_last_slide, pres.slides().last()),
    ];
    for (rule, wanted, slide) in edges {
        let Some(wanted) = wanted else { continue };
        let actual = slide.map(|s| s.layout_name().to_string());
        if !actual.as_deref().map(|a| same_layout(a, wanted)).unwrap_or(false) {
            issues.push(
                ValidationIssue::new(
                    slide.map(|s| s.number()),
                    Severity::Warning,
                    rule,
                    format!("Expected layout '{}' here", wanted),
                )
                .with_details(json!({"expected": wanted, "actual": actual})),
            );
        }
    }
    issues
}

fn check_slide(slide: &Slide, guide: &StyleGuide) -> Vec<ValidationIssue> {
    let shapes = slide.shapes();
    let mut issues = Vec::new();
    check_content(slide, &shapes, guide, &mut issues);
    check_typography(slide.number(), &shapes, guide, &mut issues);
    check_colors(slide, guide, &mut issues);
    check_images(slide.number(), &shapes, guide, &mut issues);
    check_tables(slide, &shapes, guide, &mut issues);
    if guide.require_slide_titles && slide.title().map(|t| t.trim().is_empty()).unwrap_or(true) {
        issues.push(ValidationIssue::new(
            Some(slide.number()),
            Severity::Warning,
            "require_slide_title",
            "Slide is missing a title (accessibility)".to_string(),
        ));
    }
    issues
}

fn check_content(slide: &Slide, shapes: &[ShapeInfo], guide: &StyleGuide, issues: &mut Vec<ValidationIssue>) {
    let n = Some(slide.number());
    let body = slide.body();

    if let Some(max) = guide.max_bullet_points {
        if body.len() > max {
            issues.push(
                ValidationIssue::new(
                    n,
                    Severity::Error,
                    "max_bullet_points",
                    format!("Too many bullet points ({} > {} max)", body.len(), max),
                )
                .with_details(json!({"actual": body.len(), "max": max})),
            );
        }
    }

    if let Some(max) = guide.max_words_per_bullet {
        for (i, bullet) in body.iter().enumerate() {
            let words = bullet.split_whitespace().count();
            if words > max {
                let preview: String = if bullet.chars().count() > 50 {
                    format!("{}...", bullet.chars().take(50).collect::<String>())
                } else {
                    bullet.clone()
                };
                issues.push(
                    ValidationIssue::new(
                        n,
                        Severity::Warning,
                        "max_words_per_bullet",
                        format!("Bullet {} has too many words ({} > {} max)", i + 1, words, max),
                    )
                    .with_details(json!({"bullet_index": i, "actual": words, "max": max, "text": preview})),
                );
            }
        }
    }

    if let (Some(max), Some(title)) = (guide.max_title_length, slide.title()) {
        let len = title.chars().count();
        if len > max {
            issues.push(
                ValidationIssue::new(
                    n,
                    Severity::Warning,
                    "max_title_length",
                    format!("Title too long ({} > {} chars)", len, max),
                )
                .with_details(json!({"actual": len, "max": max})),
            );
        }
    }

    if guide.check_empty_placeholders {
        for shape in shapes.iter().filter(|s| s.kind == ShapeKind::Text) {
            let Some(ph) = &shape.placeholder else { continue };
            if shape.text().trim().is_empty() {
                let ph_type = ph.effective_type();
                issues.push(
                    ValidationIssue::new(
                        n,
                        Severity::Info,
                        "empty_placeholder",
                        format!("Empty placeholder: {}", ph_type),
                    )
                    .with_details(json!({"placeholder_type": ph_type})),
                );
            }
        }
    }
}

fn check_typography(number: usize, shapes: &[ShapeInfo], guide: &StyleGuide, issues: &mut Vec<ValidationIssue>) {
    let n = Some(number);
    let runs = || {
        shapes
            .iter()
            .flat_map(|s| s.paragraphs.iter())
            .flat_map(|p| p.runs.iter())
    };

    if guide.allowed_fonts.is_some() || !guide.forbidden_fonts.is_empty() {
        let fonts: BTreeSet<&str> = runs().filter_map(|r| r.style.font.as_deref()).collect();
        for font in fonts {
            if guide.forbidden_fonts.contains(font) {
                issues.push(
                    ValidationIssue::new(
                        n,
                        Severity::Error,
                        "forbidden_font",
                        format!("Font '{}' is not allowed", font),
                    )
                    .with_details(json!({"font": font})),
                );
            } else if let Some(allowed) = &guide.allowed_fonts {
                if !allowed.contains(font) {
                    issues.push(
                        ValidationIssue::new(
                            n,
                            Severity::Warning,
                            "allowed_fonts",
                            format!("Font '{}' not in allowed list", font),
                        )
                        .with_details(json!({"font": font, "allowed": allowed})),
                    );
                }
            }
        }
    }

    if guide.min_font_size.is_some() || guide.max_font_size.is_some() {
        let mut sizes: Vec<f64> = runs().filter_map(|r| r.style.size_pt).collect();
        sizes.sort_by(|a, b| a.total_cmp(b));
        sizes.dedup();
        for size in sizes {
            if let Some(min) = guide.min_font_size.filter(|min| size < *min) {
                issues.push(
                    ValidationIssue::new(
                        n,
                        Severity::Warning,
                        "min_font_size",
                        format!("Font size {}pt is below minimum {}pt", size, min),
                    )
                    .with_details(json!({"actual": size, "min": min})),
                );
            }
            if let Some(max) = guide.max_font_size.filter(|max| size > *max) {
                issues.push(
                    ValidationIssue::new(
                        n,
                        Severity::Warning,
                        "max_font_size",
                        format!("Font size {}pt exceeds maximum {}pt", size, max),
                    )
                    .with_details(json!({"actual": size, "max": max})),
                );
            }
        }
    }
}

/// Literal colors (`a:srgbClr`) anywhere on the slide, uppercase hex.
fn literal_colors(slide: &Slide) -> BTreeSet<String> {
    slide
        .xml()
        .descendants("srgbClr")
        .iter()
        .filter_map(|c| c.attr("val"))
        .map(|v| v.to_ascii_uppercase())
        .collect()
}

fn color_set(values: &BTreeSet<String>) -> BTreeSet<String> {
    values
        .iter()
        .filter_map(|v| match parse_color(v) {
            Ok(Color::Rgb(hex)) => Some(hex),
            Ok(Color::Scheme(_)) => None,
            Err(e) => {
                warn!("Ignoring style guide color '{}': {}", v, e);
                None
            }
        })
        .collect()
}

fn check_colors(slide: &Slide, guide: &StyleGuide, issues: &mut Vec<ValidationIssue>) {
    if guide.allowed_colors.is_none() && guide.forbidden_colors.is_empty() && !guide.require_theme_colors {
        return;
    }
    let n = Some(slide.number());
    let used = literal_colors(slide);
    let forbidden = color_set(&guide.forbidden_colors);
    let allowed = guide.allowed_colors.as_ref().map(color_set);

    for hex in &used {
        if forbidden.contains(hex) {
            issues.push(
                ValidationIssue::new(
                    n,
                    Severity::Error,
                    "forbidden_color",
                    format!("Color #{} is not allowed", hex),
                )
                .with_details(json!({"color": format!("#{}", hex)})),
            );
        } else if allowed.as_ref().map(|a| !a.contains(hex)).unwrap_or(false) {
            issues.push(
                ValidationIssue::new(
                    n,
                    Severity::Warning,
                    "allowed_colors",
                    format!("Color #{} not in allowed list", hex),
                )
                .with_details(json!({"color": format!("#{}", hex)})),
            );
        } else if guide.require_theme_colors && allowed.is_none() {
            issues.push(ValidationIssue::new(
                n,
                Severity::Info,
                "require_theme_colors",
                format!("Color #{} is not a theme color", hex),
            ));
        }
    }
}

fn check_images(number: usize, shapes: &[ShapeInfo], guide: &StyleGuide, issues: &mut Vec<ValidationIssue>) {
    let n = Some(number);
    let images: Vec<&ShapeInfo> = shapes.iter().filter(|s| s.kind == ShapeKind::Picture).collect();

    if let Some(max) = guide.max_images_per_slide {
        if images.len() > max {
            issues.push(
                ValidationIssue::new(
                    n,
                    Severity::Warning,
                    "max_images_per_slide",
                    format!("Too many images ({} > {} max)", images.len(), max),
                )
                .with_details(json!({"actual": images.len(), "max": max})),
            );
        }
    }
    if guide.require_image_alt_text {
        for (i, _) in images.iter().enumerate().filter(|(_, img)| img.alt_text.is_none()) {
            issues.push(
                ValidationIssue::new(
                    n,
                    Severity::Warning,
                    "image_alt_text",
                    format!("Image {} missing alt text (accessibility)", i + 1),
                )
                .with_details(json!({"image_index": i})),
            );
        }
    }
}

fn check_tables(slide: &Slide, shapes: &[ShapeInfo], guide: &StyleGuide, issues: &mut Vec<ValidationIssue>) {
    let n = Some(slide.number());
    let header_flags: Vec<bool> = slide
        .xml()
        .descendants("tbl")
        .iter()
        .map(|tbl| {
            tbl.child("tblPr")
                .and_then(|p| p.attr_bool("firstRow"))
                .unwrap_or(false)
        })
        .collect();
    let tables = shapes.iter().filter_map(|s| s.table.as_ref());

    for (i, rows) in tables.enumerate() {
        let columns = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        if let Some(max) = guide.max_table_rows.filter(|max| rows.len() > *max) {
            issues.push(
                ValidationIssue::new(
                    n,
                    Severity::Warning,
                    "max_table_rows",
                    format!("Table {} has too many rows ({} > {} max)", i + 1, rows.len(), max),
                )
                .with_details(json!({"table_index": i, "actual": rows.len(), "max": max})),
            );
        }
        if let Some(max) = guide.max_table_columns.filter(|max| columns > *max) {
            issues.push(
                ValidationIssue::new(
                    n,
                    Severity::Warning,
                    "max_table_columns",
                    format!("Table {} has too many columns ({} > {} max)", i + 1, columns, max),
                )
                .with_details(json!({"table_index": i, "actual": columns, "max": max})),
            );
        }
        if guide.require_table_header && !header_flags.get(i).copied().unwrap_or(false) {
            issues.push(
                ValidationIssue::new(
                    n,
                    Severity::Warning,
                    "require_table_header",
                    format!("Table {} has no header row", i + 1),
                )
                .with_details(json!({"table_index": i})),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::presentation::LayoutRef;
    use crate::oxml::shapes::Position;
    use crate::oxml::text::RunStyle;

    fn deck() -> Presentation {
        let mut pres = Presentation::new().unwrap();
        pres.add_slide(&LayoutRef::from("Title and Content"), None).unwrap();
        pres
    }

    #[test]
    fn test_font_size_violation_is_deterministic() {
        let mut pres = deck();
        let small = RunStyle {
            size_pt: Some(10.0),
            ..RunStyle::default()
        };
        let slide = pres.slide_mut(1).unwrap();
        slide.set_title("Quarterly review", None).unwrap();
        slide
            .set_body(&[("Revenue up".to_string(), 0)], Some(&small))
            .unwrap();
        slide
            .add_text_box("Footnote", Position::new(0, 0, 914_400, 914_400), Some(&RunStyle {
                size_pt: Some(8.0),
                ..RunStyle::default()
            }))
            .unwrap();

        let guide = StyleGuide {
            min_font_size: Some(12.0),
            ..StyleGuide::default()
        };
        let first = validate(&pres, &guide);
        assert_eq!(first, validate(&pres, &guide));
        let rules: Vec<&str> = first.iter().map(|i| i.rule.as_str()).collect();
        assert_eq!(rules, vec!["min_font_size", "min_font_size"]);
        assert_eq!(first[0].slide, Some(1));
        assert_eq!(first[0].details["actual"], 8.0);
        assert_eq!(first[1].details["actual"], 10.0);
    }

    #[test]
    fn test_content_rules_and_summary() {
        let mut pres = deck();
        let bullets: Vec<(String, u32)> = (0..4)
            .map(|i| (format!("one two three four five six {}", i), 0))
            .collect();
        pres.slide_mut(1).unwrap().set_body(&bullets, None).unwrap();

        let guide = StyleGuide {
            max_slides: Some(0),
            max_bullet_points: Some(3),
            max_words_per_bullet: Some(6),
            require_slide_titles: true,
            ..StyleGuide::default()
        };
        let issues = validate(&pres, &guide);
        assert_eq!(issues[0].rule, "max_slides");
        assert_eq!(issues[0].slide, None);
        assert_eq!(issues[1].rule, "max_bullet_points");
        assert!(issues.iter().any(|i| i.rule == "require_slide_title"));

        let summary = summarize(&issues);
        assert_eq!(summary.error_count, 2);
        assert_eq!(summary.warning_count, 5);
        assert_eq!(summary.by_rule["max_words_per_bullet"], 4);
        assert_eq!(summary.by_slide["presentation"], 1);
        assert_eq!(summary.by_slide["1"], 6);

        match ensure_valid(&pres, &guide) {
            Err(SlideError::StyleViolation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected violation, got {:?}", other),
        }
    }

    #[test]
    fn test_fonts_colors_and_tables() {
        let mut pres = deck();
        let loud = RunStyle {
            font: Some("Papyrus".to_string()),
            color: Some(Color::Rgb("FF0000".to_string())),
            ..RunStyle::default()
        };
        let slide = pres.slide_mut(1).unwrap();
        slide.set_title("Fonts", Some(&loud)).unwrap();
        let rows = vec![
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec!["1".to_string(), "2".to_string(), "3".to_string()],
        ];
        slide
            .add_table(&rows, Position::new(0, 0, 914_400, 914_400), false)
            .unwrap();

        let guide = StyleGuide {
            forbidden_fonts: ["Papyrus".to_string()].into_iter().collect(),
            forbidden_colors: ["red".to_string()].into_iter().collect(),
            max_table_columns: Some(2),
            require_table_header: true,
            check_empty_placeholders: true,
            ..StyleGuide::default()
        };
        let rules: Vec<String> = validate(&pres, &guide).into_iter().map(|i| i.rule).collect();
        assert_eq!(
            rules,
            vec![
                "empty_placeholder",
                "forbidden_font",
                "forbidden_color",
                "max_table_columns",
                "require_table_header"
            ]
        );
    }

    #[test]
    fn test_required_layouts_and_first_slide() {
        let pres = deck();
        let guide = StyleGuide {
            required_layouts: vec!["title_slide".to_string(), "Agenda".to_string()],
            required_first_slide: Some("Title Slide".to_string()),
            ..StyleGuide::default()
        };
        let issues = validate(&pres, &guide);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].message, "Required layout 'Agenda' not available in template");
        assert_eq!(issues[1].rule, "required_first_slide");
        assert_eq!(issues[1].slide, Some(1));
    }
}
