// ABOUTME: Read-only inspection tools: layouts, slide descriptions, placeholders and theme
// ABOUTME: Results are plain serializable structs and maps for agents

use crate::core::presentation::Presentation;
use crate::core::slide::SlideDescription;
use crate::errors::Result;
use crate::template::classify::{classify_layout, LayoutType};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutSummary {
    pub name: String,
    pub index: usize,
    pub layout_type: LayoutType,
    pub description: String,
    /// `type` or `type_idx` keys.
    pub placeholders: Vec<String>,
}

pub fn list_layouts(pres: &Presentation) -> Vec<LayoutSummary> {
    pres.layouts()
        .iter()
        .map(|layout| {
            let layout_type = classify_layout(layout);
            LayoutSummary {
                name: layout.name.clone(),
                index: layout.index,
                layout_type,
                description: layout_type.description().to_string(),
                placeholders: layout.placeholders.iter().map(|p| p.key.clone()).collect(),
            }
        })
        .collect()
}

pub fn describe_slide(pres: &Presentation, slide_number: usize) -> Result<SlideDescription> {
    Ok(pres.slide(slide_number)?.describe())
}

/// Friendly placeholder name -> current text.
pub fn get_placeholders(pres: &Presentation, slide_number: usize) -> Result<BTreeMap<String, String>> {
    let slide = pres.slide(slide_number)?;
    Ok(slide
        .placeholders()
        .into_iter()
        .map(|name| {
            let text = slide.placeholder_text(&name).unwrap_or_default();
            (name, text)
        })
        .collect())
}

pub fn get_theme_colors(pres: &Presentation) -> BTreeMap<String, String> {
    pres.theme().colors
}

pub fn get_theme_fonts(pres: &Presentation) -> BTreeMap<String, String> {
    let fonts = pres.theme().fonts;
    BTreeMap::from([
        ("heading".to_string(), fonts.heading),
        ("body".to_string(), fonts.body),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::presentation::LayoutRef;

    #[test]
    fn test_list_layouts() {
        let pres = Presentation::new().unwrap();
        let layouts = list_layouts(&pres);
        assert_eq!(layouts.len(), 9);
        assert_eq!(layouts[1].name, "Title and Content");
        assert_eq!(layouts[1].placeholders, vec!["title", "body_1"]);
        assert_eq!(layouts[4].layout_type, LayoutType::Comparison);
    }

    #[test]
    fn test_describe_and_placeholders() {
        let mut pres = Presentation::new().unwrap();
        pres.add_slide(&LayoutRef::from("Title and Content"), None).unwrap();
        let slide = pres.slide_mut(1).unwrap();
        slide.set_title("Agenda", None).unwrap();
        slide
            .set_body(&[("One".to_string(), 0), ("Two".to_string(), 0)], None)
            .unwrap();

        let description = describe_slide(&pres, 1).unwrap();
        assert_eq!(description.layout, "Title and Content");
        assert_eq!(description.title.as_deref(), Some("Agenda"));
        assert_eq!(description.body, vec!["One", "Two"]);

        let placeholders = get_placeholders(&pres, 1).unwrap();
        assert_eq!(placeholders["title"], "Agenda");
        assert_eq!(placeholders["body"], "One\nTwo");
        assert!(describe_slide(&pres, 2).is_err());
    }

    #[test]
    fn test_theme_defaults() {
        let pres = Presentation::new().unwrap();
        assert_eq!(get_theme_colors(&pres)["accent1"], "#4472C4");
        assert_eq!(get_theme_fonts(&pres)["heading"], "Calibri Light");
    }
}
