// ABOUTME: Slide structure tools: add, delete, duplicate and reorder slides
// ABOUTME: Layouts are requested by fuzzy name, numeric index or content tag

use crate::core::presentation::{LayoutRef, Presentation};
use crate::errors::{Result, SlideError};
use crate::template::classify::resolve_layout;
use log::debug;

/// Adds a slide and returns its number. `layout` is a layout name (fuzzy
/// matched) or a 0-based layout index written as digits.
pub fn add_slide(pres: &mut Presentation, layout: &str, position: Option<usize>) -> Result<usize> {
    let layout_ref = match layout.trim().parse::<usize>() {
        Ok(index) => LayoutRef::Index(index),
        Err(_) => LayoutRef::Name(layout.to_string()),
    };
    pres.add_slide(&layout_ref, position)
}

/// Adds a slide whose layout suits a content tag such as `bullets`,
/// `comparison` or `image`, falling back to `default_layout`.
pub fn add_slide_for_content(
    pres: &mut Presentation,
    content_type: &str,
    default_layout: &str,
    threshold: f64,
) -> Result<usize> {
    let index = resolve_layout(pres.layouts(), content_type, default_layout, threshold)
        .ok_or_else(|| SlideError::LayoutNotFound {
            requested: content_type.to_string(),
            available: Vec::new(),
            suggestion: None,
        })?;
    debug!("Content '{}' resolved to layout #{}", content_type, index);
    pres.add_slide(&LayoutRef::Index(index), None)
}

pub fn delete_slide(pres: &mut Presentation, slide_number: usize) -> Result<()> {
    pres.delete_slide(slide_number)
}

pub fn duplicate_slide(pres: &mut Presentation, slide_number: usize) -> Result<usize> {
    pres.duplicate_slide(slide_number)
}

pub fn reorder_slides(pres: &mut Presentation, order: &[usize]) -> Result<()> {
    pres.reorder_slides(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(pres: &mut Presentation, layout: &str, title: &str) -> usize {
        let n = add_slide(pres, layout, None).unwrap();
        pres.slide_mut(n).unwrap().set_title(title, None).unwrap();
        n
    }

    #[test]
    fn test_add_by_name_index_and_position() {
        let mut pres = Presentation::new().unwrap();
        assert_eq!(add_slide(&mut pres, "title", None).unwrap(), 1);
        assert_eq!(pres.slide(1).unwrap().layout_name(), "Title Slide");
        assert_eq!(add_slide(&mut pres, "6", None).unwrap(), 2);
        assert_eq!(pres.slide(2).unwrap().layout_name(), "Blank");
        assert_eq!(add_slide(&mut pres, "Section Header", Some(1)).unwrap(), 1);
        assert_eq!(pres.slide(2).unwrap().layout_name(), "Title Slide");
        assert!(add_slide(&mut pres, "Title Only", Some(9)).is_err());
    }

    #[test]
    fn test_unknown_layout_suggests() {
        let mut pres = Presentation::new().unwrap();
        let err = add_slide(&mut pres, "zzzz", None).unwrap_err();
        assert_eq!(err.code(), "LAYOUT_NOT_FOUND");
        assert_eq!(err.available().len(), 9);
        assert_eq!(pres.slide_count(), 0);
    }

    #[test]
    fn test_content_tag_layouts() {
        let mut pres = Presentation::new().unwrap();
        let n = add_slide_for_content(&mut pres, "comparison", "Title and Content", 0.6).unwrap();
        assert_eq!(pres.slide(n).unwrap().layout_name(), "Comparison");
        let n = add_slide_for_content(&mut pres, "mystery", "Title and Content", 0.6).unwrap();
        assert_eq!(pres.slide(n).unwrap().layout_name(), "Title and Content");
    }

    #[test]
    fn test_duplicate_delete_reorder() {
        let mut pres = Presentation::new().unwrap();
        titled(&mut pres, "Title and Content", "A");
        titled(&mut pres, "Title and Content", "B");
        titled(&mut pres, "Title and Content", "C");

        assert_eq!(duplicate_slide(&mut pres, 1).unwrap(), 2);
        assert_eq!(pres.slide(2).unwrap().title().as_deref(), Some("A"));
        delete_slide(&mut pres, 2).unwrap();

        reorder_slides(&mut pres, &[3, 1, 2]).unwrap();
        let titles: Vec<String> = pres.slides().iter().filter_map(|s| s.title()).collect();
        assert_eq!(titles, vec!["C", "A", "B"]);
        assert_eq!(pres.slide(1).unwrap().number(), 1);

        assert!(reorder_slides(&mut pres, &[1, 1, 2]).is_err());
        assert!(reorder_slides(&mut pres, &[1, 2]).is_err());
        assert_eq!(delete_slide(&mut pres, 7).unwrap_err().code(), "SLIDE_NOT_FOUND");
    }
}
