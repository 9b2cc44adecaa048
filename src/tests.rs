// ABOUTME: Crate-level tests that exercise several modules together
// ABOUTME: Covers round trips, templates, tool results and style validation

use super::*;
use crate::tools::{add_bullet, add_slide, set_body, set_title};
use std::io::Read;
use tempfile::TempDir;

fn sample_deck() -> Presentation {
    let mut pres = Presentation::new().expect("Failed to create presentation");
    let opening = add_slide(&mut pres, "title", None).unwrap();
    set_title(&mut pres, opening, "Quarterly Review", &TextOptions::default()).unwrap();

    let agenda = add_slide(&mut pres, "Title and Content", None).unwrap();
    set_title(&mut pres, agenda, "Agenda", &TextOptions::default()).unwrap();
    set_body(
        &mut pres,
        agenda,
        &["Results".to_string(), "Outlook".to_string()],
        None,
        &TextOptions::default(),
    )
    .unwrap();
    add_bullet(&mut pres, agenda, "Regional detail", 1, &TextOptions::default()).unwrap();
    pres
}

fn zip_entry(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).expect("Not a zip");
    let mut entry = archive.by_name(name).expect("Missing zip entry");
    let mut text = String::new();
    entry.read_to_string(&mut text).unwrap();
    text
}

#[test]
fn test_save_and_reopen_preserves_content() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("nested/deck.pptx");

    let mut pres = sample_deck();
    tools::save_presentation(&mut pres, &path).unwrap();
    assert!(path.exists());

    let reopened = Presentation::open(&path).unwrap();
    assert_eq!(reopened.slide_count(), 2);
    assert_eq!(reopened.slide(1).unwrap().layout_name(), "Title Slide");
    let agenda = reopened.slide(2).unwrap();
    assert_eq!(agenda.title().as_deref(), Some("Agenda"));
    assert_eq!(
        agenda.body_paragraphs(),
        vec![
            ("Results".to_string(), 0),
            ("Outlook".to_string(), 0),
            ("Regional detail".to_string(), 1),
        ]
    );
    assert_eq!(
        reopened.slide(1).unwrap().placeholders(),
        pres.slide(1).unwrap().placeholders()
    );
}

#[test]
fn test_saved_package_lists_every_slide() {
    let mut pres = sample_deck();
    let bytes = pres.to_bytes().unwrap();

    let content_types = zip_entry(&bytes, "[Content_Types].xml");
    assert!(content_types.contains("/ppt/slides/slide1.xml"));
    assert!(content_types.contains("/ppt/slides/slide2.xml"));

    let presentation = zip_entry(&bytes, "ppt/presentation.xml");
    assert_eq!(presentation.matches("<p:sldId ").count(), 2);

    let app = zip_entry(&bytes, "docProps/app.xml");
    assert!(app.contains("<Slides>2</Slides>"));
}

#[test]
fn test_structural_edits_keep_numbering() {
    let mut pres = sample_deck();
    let copy = tools::duplicate_slide(&mut pres, 2).unwrap();
    assert_eq!(copy, 3);
    assert_eq!(pres.slide(3).unwrap().title().as_deref(), Some("Agenda"));

    tools::reorder_slides(&mut pres, &[3, 1, 2]).unwrap();
    let numbers: Vec<usize> = pres.slides().iter().map(|s| s.number()).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(pres.slide(2).unwrap().layout_name(), "Title Slide");

    tools::delete_slide(&mut pres, 1).unwrap();
    let reopened = Presentation::from_bytes(&pres.to_bytes().unwrap()).unwrap();
    assert_eq!(reopened.slide_count(), 2);
    assert_eq!(reopened.slide(1).unwrap().layout_name(), "Title Slide");
}

#[test]
fn test_template_drops_slides_keeps_layouts() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("brand.pptx");
    sample_deck().save(&path).unwrap();

    let pres = Presentation::from_template(&path).unwrap();
    assert_eq!(pres.slide_count(), 0);
    assert_eq!(pres.layouts().len(), 9);

    let analysis = analyze_template(&path).unwrap();
    assert_eq!(analysis.layouts.len(), 9);
    assert_eq!(
        analysis.layout("Comparison").unwrap().layout_type,
        LayoutType::Comparison
    );
}

#[test]
fn test_tool_result_wraps_success_and_failure() {
    let mut pres = Presentation::new().unwrap();
    let result = ToolResult::from_result(add_slide(&mut pres, "Title Slid", None).map(|_| ()));
    assert!(result.success);

    let failed = ToolResult::from_result(tools::describe_slide(&pres, 7));
    assert!(!failed.success);
    assert_eq!(failed.error.unwrap().code, "SLIDE_NOT_FOUND");
}

#[test]
fn test_markdown_deck_validates_against_preset() {
    let markdown = "# Launch\n\n## Plan\n\n- Ship\n- Measure\n";
    let pres = build_from_markdown(None, markdown, &Config::default()).unwrap();
    assert_eq!(pres.slide_count(), 2);

    let issues = validate(&pres, &StyleGuide::minimal());
    assert!(issues.iter().all(|i| i.severity != Severity::Error));

    let strict = StyleGuide {
        max_slides: Some(1),
        ..StyleGuide::default()
    };
    let issues = validate(&pres, &strict);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].rule, "max_slides");
}

#[test]
fn test_slide_size_survives_save() {
    let mut pres = Presentation::new().unwrap();
    assert_eq!(pres.slide_size(), (9_144_000, 6_858_000));
    pres.set_slide_size(12_192_000, 6_858_000).unwrap();
    assert!(pres.set_slide_size(0, 100).is_err());

    let reopened = Presentation::from_bytes(&pres.to_bytes().unwrap()).unwrap();
    assert_eq!(reopened.slide_size(), (12_192_000, 6_858_000));
}

#[test]
fn test_deleting_slide_removes_its_notes_page() {
    let mut pres = sample_deck();
    tools::set_notes(&mut pres, 1, "Welcome everyone").unwrap();
    tools::set_notes(&mut pres, 2, "Walk through the agenda").unwrap();
    assert!(pres.package().has_part("ppt/notesSlides/notesSlide2.xml"));

    tools::delete_slide(&mut pres, 2).unwrap();
    assert!(!pres.package().has_part("ppt/notesSlides/notesSlide2.xml"));
    let bytes = pres.to_bytes().unwrap();
    assert!(!zip_entry(&bytes, "[Content_Types].xml").contains("notesSlide2.xml"));

    let reopened = Presentation::from_bytes(&bytes).unwrap();
    assert_eq!(reopened.slide(1).unwrap().notes().as_deref(), Some("Welcome everyone"));
}

#[test]
fn test_template_slides_leave_no_notes_behind() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("brand.pptx");
    let mut source = sample_deck();
    tools::set_notes(&mut source, 2, "Old template notes").unwrap();
    source.save(&path).unwrap();

    let mut pres = Presentation::from_template(&path).unwrap();
    assert!(!pres.package().part_names().any(|n| n.starts_with("ppt/notesSlides/")));

    add_slide(&mut pres, "Title and Content", None).unwrap();
    tools::set_notes(&mut pres, 1, "Fresh notes").unwrap();
    let reopened = Presentation::from_bytes(&pres.to_bytes().unwrap()).unwrap();
    assert_eq!(reopened.slide(1).unwrap().notes().as_deref(), Some("Fresh notes"));
    let rels = zip_entry(&pres.to_bytes().unwrap(), "ppt/notesSlides/_rels/notesSlide1.xml.rels");
    assert!(rels.contains("../slides/slide1.xml"));
}
