// ABOUTME: Presentation lifecycle tools: create, open, save and count slides
// ABOUTME: Thin wrappers that add path checks and logging around Presentation

use crate::core::presentation::Presentation;
use crate::errors::Result;
use crate::utils::{ensure_parent_directory_exists, validate_file_exists};
use log::info;
use std::path::Path;

/// A new presentation, empty of slides. With a template, its masters,
/// layouts and theme are kept and its slides dropped.
pub fn create_presentation(template: Option<&Path>) -> Result<Presentation> {
    match template {
        Some(path) => {
            validate_file_exists(path)?;
            info!("Creating presentation from template {:?}", path);
            Presentation::from_template(path)
        }
        None => {
            info!("Creating presentation from the built-in blank template");
            Presentation::new()
        }
    }
}

pub fn open_presentation(path: &Path) -> Result<Presentation> {
    validate_file_exists(path)?;
    Presentation::open(path)
}

pub fn save_presentation(pres: &mut Presentation, path: &Path) -> Result<()> {
    ensure_parent_directory_exists(path)?;
    pres.save(path)
}

pub fn get_slide_count(pres: &Presentation) -> usize {
    pres.slide_count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SlideError;

    #[test]
    fn test_create_save_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deck.pptx");
        let mut pres = create_presentation(None).unwrap();
        assert_eq!(get_slide_count(&pres), 0);
        save_presentation(&mut pres, &path).unwrap();

        let reopened = open_presentation(&path).unwrap();
        assert_eq!(get_slide_count(&reopened), 0);
        assert_eq!(reopened.layouts().len(), 9);
    }

    #[test]
    fn test_missing_template() {
        let err = create_presentation(Some(Path::new("/no/such/template.pptx"))).unwrap_err();
        assert_eq!(err.code(), "FILE_NOT_FOUND");
        assert!(matches!(err, SlideError::PathNotFoundError(_)));
    }
}
