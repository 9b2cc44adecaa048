// ABOUTME: Semantic classification of slide layouts and content-driven layout recommendation
// ABOUTME: Uses the layout name first and its placeholder arrangement second

use crate::core::layout::LayoutInfo;
use crate::core::placeholder::METADATA_TYPES;
use crate::template::matcher::{canonical_family, LayoutMatcher};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutType {
    TitleSlide,
    SectionHeader,
    TitleAndContent,
    TwoContent,
    Comparison,
    TitleOnly,
    Blank,
    ContentWithCaption,
    PictureWithCaption,
    Other,
}

impl LayoutType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutType::TitleSlide => "title_slide",
            LayoutType::SectionHeader => "section_header",
            LayoutType::TitleAndContent => "title_and_content",
            LayoutType::TwoContent => "two_content",
            LayoutType::Comparison => "comparison",
            LayoutType::TitleOnly => "title_only",
            LayoutType::Blank => "blank",
            LayoutType::ContentWithCaption => "content_with_caption",
            LayoutType::PictureWithCaption => "picture_with_caption",
            LayoutType::Other => "other",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            LayoutType::TitleSlide => "Opening slide with a large centered title and subtitle",
            LayoutType::SectionHeader => "Divider introducing a new section",
            LayoutType::TitleAndContent => "Title with a single content area for bullets, tables or charts",
            LayoutType::TwoContent => "Title with two side-by-side content areas",
            LayoutType::Comparison => "Two content areas, each with its own heading",
            LayoutType::TitleOnly => "Title with free space for custom shapes",
            LayoutType::Blank => "Empty slide",
            LayoutType::ContentWithCaption => "Content area with a caption and side text",
            LayoutType::PictureWithCaption => "Large picture with a caption",
            LayoutType::Other => "Custom layout",
        }
    }

    /// Content tags this layout type suits.
    pub fn best_for(&self) -> &'static [&'static str] {
        match self {
            LayoutType::TitleSlide => &["title", "opening", "closing"],
            LayoutType::SectionHeader => &["section", "divider", "quote"],
            LayoutType::TitleAndContent => &["bullets", "agenda", "table", "chart"],
            LayoutType::TwoContent => &["two_column", "comparison"],
            LayoutType::Comparison => &["comparison", "pros_cons"],
            LayoutType::TitleOnly => &["custom", "diagram", "quote"],
            LayoutType::Blank => &["blank", "image", "custom"],
            LayoutType::ContentWithCaption => &["image", "chart"],
            LayoutType::PictureWithCaption => &["image", "photo"],
            LayoutType::Other => &[],
        }
    }

    fn from_family(family: &str) -> Option<Self> {
        Some(match family {
            "title slide" => LayoutType::TitleSlide,
            "title and content" => LayoutType::TitleAndContent,
            "section header" => LayoutType::SectionHeader,
            "two content" => LayoutType::TwoContent,
            "comparison" => LayoutType::Comparison,
            "title only" => LayoutType::TitleOnly,
            "blank" => LayoutType::Blank,
            "content with caption" => LayoutType::ContentWithCaption,
            "picture with caption" => LayoutType::PictureWithCaption,
            _ => return None,
        })
    }

    /// The `type` attribute PowerPoint writes on `p:sldLayout`.
    fn from_ooxml(value: &str) -> Option<Self> {
        Some(match value {
            "title" => LayoutType::TitleSlide,
            "secHead" => LayoutType::SectionHeader,
            "obj" | "tx" => LayoutType::TitleAndContent,
            "twoObj" | "twoColTx" => LayoutType::TwoContent,
            "twoTxTwoObj" => LayoutType::Comparison,
            "titleOnly" => LayoutType::TitleOnly,
            "blank" => LayoutType::Blank,
            "objTx" => LayoutType::ContentWithCaption,
            "picTx" => LayoutType::PictureWithCaption,
            _ => return None,
        })
    }
}

impl fmt::Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify from a layout name and its placeholder types.
pub fn classify(name: &str, placeholder_types: &[String]) -> LayoutType {
    if let Some(t) = canonical_family(name).and_then(LayoutType::from_family) {
        return t;
    }

    let types: Vec<&str> = placeholder_types
        .iter()
        .map(|t| t.as_str())
        .filter(|t| !METADATA_TYPES.contains(t))
        .collect();
    let has = |t: &str| types.contains(&t);
    let has_title = has("title") || has("ctrTitle");
    let content = types
        .iter()
        .filter(|t| matches!(**t, "body" | "obj" | "tbl" | "chart" | "dgm" | "media"))
        .count();

    if types.is_empty() {
        LayoutType::Blank
    } else if has("pic") {
        LayoutType::PictureWithCaption
    } else if has("ctrTitle") || (has_title && has("subTitle")) {
        LayoutType::TitleSlide
    } else if has_title && content >= 4 {
        LayoutType::Comparison
    } else if has_title && content >= 2 {
        LayoutType::TwoContent
    } else if has_title && content == 1 {
        LayoutType::TitleAndContent
    } else if has_title {
        LayoutType::TitleOnly
    } else {
        LayoutType::Other
    }
}

/// Classify a template layout: name, then the layout's own type
/// attribute, then its placeholders.
pub fn classify_layout(layout: &LayoutInfo) -> LayoutType {
    if let Some(t) = canonical_family(&layout.name).and_then(LayoutType::from_family) {
        return t;
    }
    if let Some(t) = layout.layout_type.as_deref().and_then(LayoutType::from_ooxml) {
        return t;
    }
    classify(&layout.name, &layout.placeholder_types())
}

/// Layout types for a content tag, with preference weights.
fn preferences(content_type: &str) -> &'static [(LayoutType, f64)] {
    use LayoutType::*;
    match content_type {
        "title" | "opening" | "cover" => &[(TitleSlide, 1.0), (SectionHeader, 0.5)],
        "section" | "divider" => &[(SectionHeader, 1.0), (TitleOnly, 0.6), (TitleSlide, 0.4)],
        "bullets" | "content" | "text" | "list" | "agenda" => &[
            (TitleAndContent, 1.0),
            (TwoContent, 0.5),
            (ContentWithCaption, 0.4),
        ],
        "comparison" | "versus" | "pros_cons" => &[(Comparison, 1.0), (TwoContent, 0.8)],
        "two_column" | "two_content" => &[(TwoContent, 1.0), (Comparison, 0.7)],
        "image" | "picture" | "photo" => &[
            (PictureWithCaption, 1.0),
            (ContentWithCaption, 0.6),
            (TitleOnly, 0.4),
            (Blank, 0.3),
        ],
        "table" | "chart" | "diagram" => &[(TitleAndContent, 0.9), (TitleOnly, 0.7), (Blank, 0.3)],
        "quote" => &[(SectionHeader, 0.7), (TitleOnly, 0.6), (Blank, 0.5)],
        "closing" | "thank_you" | "end" => &[(TitleSlide, 0.8), (SectionHeader, 0.7)],
        "blank" | "empty" | "custom" => &[(Blank, 1.0), (TitleOnly, 0.6)],
        _ => &[],
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutRecommendation {
    pub layout_name: String,
    pub layout_index: usize,
    pub layout_type: LayoutType,
    pub score: f64,
}

/// Layouts suited to a content tag, best first. Unknown tags yield none.
pub fn recommend_layouts(layouts: &[LayoutInfo], content_type: &str) -> Vec<LayoutRecommendation> {
    let tag = content_type
        .trim()
        .to_lowercase()
        .replace(|c: char| c == ' ' || c == '-', "_");
    let prefs = preferences(&tag);
    let mut ranked: Vec<LayoutRecommendation> = layouts
        .iter()
        .filter_map(|layout| {
            let layout_type = classify_layout(layout);
            let (_, score) = prefs.iter().find(|(t, _)| *t == layout_type)?;
            Some(LayoutRecommendation {
                layout_name: layout.name.clone(),
                layout_index: layout.index,
                layout_type,
                score: *score,
            })
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.layout_index.cmp(&b.layout_index))
    });
    ranked
}

/// Picks a layout index for a content tag or layout name. Tags are tried
/// first, then fuzzy name matching; otherwise the default layout is used,
/// and failing that the first layout.
pub fn resolve_layout(layouts: &[LayoutInfo], request: &str, default_layout: &str, threshold: f64) -> Option<usize> {
    if layouts.is_empty() {
        return None;
    }
    if let Some(best) = recommend_layouts(layouts, request).first() {
        return Some(best.layout_index);
    }
    let names: Vec<String> = layouts.iter().map(|l| l.name.clone()).collect();
    let matcher = LayoutMatcher::new(&names).with_threshold(threshold);
    if let Some(i) = matcher.match_name(request).layout_index {
        return Some(i);
    }
    debug!("No layout for '{}', falling back to '{}'", request, default_layout);
    Some(matcher.match_name(default_layout).layout_index.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::layout::load_layouts;
    use crate::oxml::blank::blank_package;

    fn types(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classify_by_name_then_placeholders() {
        assert_eq!(classify("Title Slide", &[]), LayoutType::TitleSlide);
        assert_eq!(classify("1_Section Header", &[]), LayoutType::SectionHeader);
        assert_eq!(
            classify("Agenda", &types(&["title", "body", "dt", "ftr", "sldNum"])),
            LayoutType::TitleAndContent
        );
        assert_eq!(
            classify("Kicker", &types(&["title", "body", "obj", "body", "obj"])),
            LayoutType::Comparison
        );
        assert_eq!(classify("Photo Grid", &types(&["title", "pic"])), LayoutType::PictureWithCaption);
        assert_eq!(classify("Outro", &types(&["dt"])), LayoutType::Blank);
        assert_eq!(classify("Outro", &types(&["title"])), LayoutType::TitleOnly);
    }

    #[test]
    fn test_blank_template_layouts_classify() {
        let layouts = load_layouts(&blank_package("Deck").unwrap()).unwrap();
        let classified: Vec<LayoutType> = layouts.iter().map(classify_layout).collect();
        assert_eq!(classified[0], LayoutType::TitleSlide);
        assert!(classified.contains(&LayoutType::Comparison));
        assert!(!classified.contains(&LayoutType::Other));
    }

    #[test]
    fn test_recommend_and_resolve() {
        let layouts = load_layouts(&blank_package("Deck").unwrap()).unwrap();
        let recs = recommend_layouts(&layouts, "comparison");
        assert_eq!(recs[0].layout_name, "Comparison");
        assert_eq!(recs[1].layout_name, "Two Content");

        assert_eq!(resolve_layout(&layouts, "bullets", "Title and Content", 0.6), Some(1));
        assert_eq!(resolve_layout(&layouts, "Title Only", "Title and Content", 0.6), Some(5));
        assert_eq!(resolve_layout(&layouts, "qqqq", "Title and Content", 0.6), Some(1));
        assert!(resolve_layout(&[], "title", "Blank", 0.6).is_none());
    }
}
