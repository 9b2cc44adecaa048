// ABOUTME: Text content tools: titles, body bullets, named placeholders, text boxes and speaker notes
// ABOUTME: Formatting options are validated and converted into run styles before editing

use crate::core::presentation::Presentation;
use crate::errors::{Result, SlideError};
use crate::oxml::shapes::Position;
use crate::tools::TextOptions;
use crate::units::parse_length;

/// Deepest bullet level PowerPoint supports.
pub const MAX_LEVEL: u32 = 8;

fn check_level(level: u32) -> Result<()> {
    if level > MAX_LEVEL {
        return Err(SlideError::InvalidArgument(format!(
            "Bullet level must be between 0 and {}, got {}",
            MAX_LEVEL, level
        )));
    }
    Ok(())
}

pub fn set_title(pres: &mut Presentation, slide_number: usize, text: &str, options: &TextOptions) -> Result<()> {
    let style = options.run_style()?;
    pres.slide_mut(slide_number)?.set_title(text, style.as_ref())
}

pub fn set_subtitle(pres: &mut Presentation, slide_number: usize, text: &str, options: &TextOptions) -> Result<()> {
    let style = options.run_style()?;
    pres.slide_mut(slide_number)?
        .set_subtitle(text, style.as_ref())
}

/// Replaces the body with bullets. `levels`, when given, must have one
/// entry per item.
pub fn set_body(
    pres: &mut Presentation,
    slide_number: usize,
    items: &[String],
    levels: Option<&[u32]>,
    options: &TextOptions,
) -> Result<()> {
    if let Some(levels) = levels {
        if levels.len() != items.len() {
            return Err(SlideError::InvalidArgument(format!(
                "Got {} levels for {} items",
                levels.len(),
                items.len()
            )));
        }
        for level in levels {
            check_level(*level)?;
        }
    }
    let paragraphs: Vec<(String, u32)> = items
        .iter()
        .enumerate()
        .map(|(i, item)| (item.clone(), levels.map(|l| l[i]).unwrap_or(0)))
        .collect();
    let style = options.run_style()?;
    pres.slide_mut(slide_number)?
        .set_body(&paragraphs, style.as_ref())
}

pub fn add_bullet(
    pres: &mut Presentation,
    slide_number: usize,
    text: &str,
    level: u32,
    options: &TextOptions,
) -> Result<()> {
    check_level(level)?;
    let style = options.run_style()?;
    pres.slide_mut(slide_number)?
        .add_bullet(text, level, style.as_ref())
}

/// Sets text in a placeholder by friendly name (`title`, `body_2`,
/// `footer`, ...).
pub fn set_placeholder_text(
    pres: &mut Presentation,
    slide_number: usize,
    placeholder: &str,
    text: &str,
    options: &TextOptions,
) -> Result<()> {
    let style = options.run_style()?;
    pres.slide_mut(slide_number)?
        .set_placeholder_text(placeholder, text, style.as_ref())
}

/// Adds a free text box. Lengths take units (`1in`, `2.5cm`, `72pt`) or raw
/// EMUs. Returns the new shape id.
#[allow(clippy::too_many_arguments)]
pub fn add_text_box(
    pres: &mut Presentation,
    slide_number: usize,
    text: &str,
    left: &str,
    top: &str,
    width: &str,
    height: &str,
    options: &TextOptions,
) -> Result<u32> {
    let position = Position::new(
        parse_length(left)?,
        parse_length(top)?,
        parse_length(width)?,
        parse_length(height)?,
    );
    if position.cx <= 0 || position.cy <= 0 {
        return Err(SlideError::InvalidArgument(
            "Text box width and height must be positive".to_string(),
        ));
    }
    let style = options.run_style()?;
    pres.slide_mut(slide_number)?
        .add_text_box(text, position, style.as_ref())
}

/// Replaces a slide's speaker notes; `\n` separates paragraphs.
pub fn set_notes(pres: &mut Presentation, slide_number: usize, text: &str) -> Result<()> {
    pres.set_notes(slide_number, text)
}

pub fn get_notes(pres: &Presentation, slide_number: usize) -> Result<Option<String>> {
    Ok(pres.slide(slide_number)?.notes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::Color;
    use crate::core::presentation::LayoutRef;

    fn deck() -> Presentation {
        let mut pres = Presentation::new().unwrap();
        pres.add_slide(&LayoutRef::from("Title Slide"), None).unwrap();
        pres.add_slide(&LayoutRef::from("Title and Content"), None).unwrap();
        pres
    }

    #[test]
    fn test_title_and_subtitle() {
        let mut pres = deck();
        let bold = TextOptions {
            bold: Some(true),
            color: Some("#0066cc".to_string()),
            ..TextOptions::default()
        };
        set_title(&mut pres, 1, "Q4 Review", &bold).unwrap();
        set_subtitle(&mut pres, 1, "Analytics", &TextOptions::default()).unwrap();
        let slide = pres.slide(1).unwrap();
        assert_eq!(slide.title().as_deref(), Some("Q4 Review"));
        assert_eq!(slide.subtitle().as_deref(), Some("Analytics"));

        let title = slide
            .shapes()
            .into_iter()
            .find(|s| s.text() == "Q4 Review")
            .unwrap();
        let style = &title.paragraphs[0].runs[0].style;
        assert_eq!(style.bold, Some(true));
        assert_eq!(style.color, Some(Color::Rgb("0066CC".to_string())));
    }

    #[test]
    fn test_body_levels_and_bullets() {
        let mut pres = deck();
        let items = vec!["Main".to_string(), "Detail".to_string()];
        set_body(&mut pres, 2, &items, Some(&[0, 1]), &TextOptions::default()).unwrap();
        add_bullet(&mut pres, 2, "Another", 0, &TextOptions::default()).unwrap();
        assert_eq!(
            pres.slide(2).unwrap().body_paragraphs(),
            vec![
                ("Main".to_string(), 0),
                ("Detail".to_string(), 1),
                ("Another".to_string(), 0)
            ]
        );
        assert!(set_body(&mut pres, 2, &items, Some(&[0]), &TextOptions::default()).is_err());
        assert!(add_bullet(&mut pres, 2, "Too deep", 9, &TextOptions::default()).is_err());
    }

    #[test]
    fn test_placeholder_errors() {
        let mut pres = deck();
        let err = set_placeholder_text(&mut pres, 1, "subtitel", "x", &TextOptions::default()).unwrap_err();
        assert_eq!(err.code(), "PLACEHOLDER_NOT_FOUND");
        assert_eq!(err.suggestion(), Some("subtitle"));

        let err = set_title(&mut pres, 5, "x", &TextOptions::default()).unwrap_err();
        assert_eq!(err.code(), "SLIDE_NOT_FOUND");

        let bad_color = TextOptions {
            color: Some("blurple".to_string()),
            ..TextOptions::default()
        };
        assert_eq!(set_title(&mut pres, 1, "x", &bad_color).unwrap_err().code(), "STYLE_ERROR");
    }

    #[test]
    fn test_text_box() {
        let mut pres = deck();
        let id = add_text_box(&mut pres, 2, "Note\nSecond", "1in", "1in", "3in", "1in", &TextOptions::default()).unwrap();
        let shape = pres
            .slide(2)
            .unwrap()
            .shapes()
            .into_iter()
            .find(|s| s.id == id)
            .unwrap();
        assert_eq!(shape.text(), "Note\nSecond");
        assert_eq!(shape.position.unwrap().x, 914_400);
        assert!(add_text_box(&mut pres, 2, "x", "1in", "1in", "0", "1in", &TextOptions::default()).is_err());
    }

    #[test]
    fn test_speaker_notes() {
        let mut pres = deck();
        assert_eq!(get_notes(&pres, 2).unwrap(), None);
        set_notes(&mut pres, 2, "Pause for questions\nThen demo").unwrap();
        set_notes(&mut pres, 2, "Demo first").unwrap();
        assert_eq!(get_notes(&pres, 2).unwrap().as_deref(), Some("Demo first"));
        assert_eq!(set_notes(&mut pres, 9, "x").unwrap_err().code(), "SLIDE_NOT_FOUND");

        let reopened = Presentation::from_bytes(&pres.to_bytes().unwrap()).unwrap();
        assert_eq!(get_notes(&reopened, 1).unwrap(), None);
        assert_eq!(get_notes(&reopened, 2).unwrap().as_deref(), Some("Demo first"));
        assert_eq!(
            reopened.slide(2).unwrap().describe().notes.as_deref(),
            Some("Demo first")
        );
    }
}
