// ABOUTME: Styling tools that change the look of text already on a slide
// ABOUTME: Restyles every run of a named placeholder without touching its content

use crate::core::presentation::Presentation;
use crate::errors::{Result, SlideError};
use crate::tools::TextOptions;
use log::info;

/// Applies font, size, color and emphasis to all text in a placeholder.
/// Unset options keep their current values. Returns the number of runs
/// restyled.
pub fn set_text_style(
    pres: &mut Presentation,
    slide_number: usize,
    placeholder: &str,
    options: &TextOptions,
) -> Result<usize> {
    let style = options.run_style()?.ok_or_else(|| {
        SlideError::InvalidArgument("No text style given; set at least one option".to_string())
    })?;
    let count = pres
        .slide_mut(slide_number)?
        .set_text_style(placeholder, &style)?;
    info!("Restyled {} runs of '{}' on slide {}", count, placeholder, slide_number);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{add_slide, set_body, set_title};

    fn deck() -> Presentation {
        let mut pres = Presentation::new().unwrap();
        add_slide(&mut pres, "Title and Content", None).unwrap();
        set_title(&mut pres, 1, "Results", &TextOptions::default()).unwrap();
        set_body(
            &mut pres,
            1,
            &["Up".to_string(), "Flat".to_string()],
            None,
            &TextOptions::default(),
        )
        .unwrap();
        pres
    }

    #[test]
    fn test_set_text_style_restyles_every_run() {
        let mut pres = deck();
        let options = TextOptions {
            font_size: Some(32.0),
            font_family: Some("Arial".to_string()),
            color: Some("#0066CC".to_string()),
            ..TextOptions::default()
        };
        assert_eq!(set_text_style(&mut pres, 1, "content", &options).unwrap(), 2);

        let bytes = pres.to_bytes().unwrap();
        let reopened = Presentation::from_bytes(&bytes).unwrap();
        let slide = reopened.slide(1).unwrap();
        assert_eq!(slide.body(), vec!["Up", "Flat"]);
        let xml = String::from_utf8(slide.xml().to_bytes().unwrap()).unwrap();
        assert_eq!(xml.matches(r#"sz="3200""#).count(), 2);
        assert_eq!(xml.matches(r#"typeface="Arial""#).count(), 2);
        assert!(xml.contains(r#"val="0066CC""#));
    }

    #[test]
    fn test_set_text_style_errors() {
        let mut pres = deck();
        let bold = TextOptions {
            bold: Some(true),
            ..TextOptions::default()
        };
        assert_eq!(
            set_text_style(&mut pres, 1, "picture", &bold).unwrap_err().code(),
            "PLACEHOLDER_NOT_FOUND"
        );
        assert_eq!(
            set_text_style(&mut pres, 1, "title", &TextOptions::default())
                .unwrap_err()
                .code(),
            "INVALID_ARGUMENT"
        );
        assert_eq!(
            set_text_style(&mut pres, 4, "title", &bold).unwrap_err().code(),
            "SLIDE_NOT_FOUND"
        );
    }
}
