use slidesmith::tools::{
    add_image, add_slide, add_table, add_text_box, create_presentation, open_presentation,
    save_presentation, set_placeholder_text, set_title,
};
use slidesmith::validation::{ensure_valid, validate, Severity};
use slidesmith::{Placement, StyleGuide, TextOptions};
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;

fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> std::path::PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_pixel(width, height, image::Rgb([30, 60, 90]))
        .save(&path)
        .expect("Failed to write test image");
    path
}

fn zip_names(path: &Path) -> Vec<String> {
    let file = std::fs::File::open(path).expect("Failed to open output");
    let archive = zip::ZipArchive::new(file).expect("Output is not a zip");
    archive.file_names().map(|n| n.to_string()).collect()
}

#[test]
fn test_full_pipeline() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let temp_path = temp_dir.path();

    // Start from a template saved by a previous run
    let template_path = temp_path.join("template.pptx");
    let mut seed = create_presentation(None).unwrap();
    add_slide(&mut seed, "Title Slide", None).unwrap();
    save_presentation(&mut seed, &template_path).unwrap();

    let mut pres = create_presentation(Some(&template_path)).unwrap();
    assert_eq!(pres.slide_count(), 0);

    let opening = add_slide(&mut pres, "title", None).unwrap();
    set_title(&mut pres, opening, "Annual Report", &TextOptions::default()).unwrap();
    set_placeholder_text(&mut pres, opening, "subtitle", "Finance", &TextOptions::default()).unwrap();

    let chart = add_slide(&mut pres, "Picture with Caption", None).unwrap();
    set_title(&mut pres, chart, "Revenue", &TextOptions::default()).unwrap();
    let image_path = write_png(temp_path, "revenue.png", 400, 300);
    add_image(
        &mut pres,
        chart,
        &image_path,
        &Placement::in_placeholder("picture"),
        Some("Revenue by quarter"),
    )
    .unwrap();

    let table_slide = add_slide(&mut pres, "Title and Content", None).unwrap();
    set_title(&mut pres, table_slide, "Regions", &TextOptions::default()).unwrap();
    let rows = vec![
        vec!["Region".to_string(), "Revenue".to_string()],
        vec!["North".to_string(), "120".to_string()],
    ];
    add_table(&mut pres, table_slide, &rows, &Placement::in_placeholder("body"), true).unwrap();

    let output_path = temp_path.join("out/report.pptx");
    save_presentation(&mut pres, &output_path).unwrap();

    let names = zip_names(&output_path);
    for expected in [
        "[Content_Types].xml",
        "ppt/presentation.xml",
        "ppt/slides/slide1.xml",
        "ppt/slides/slide3.xml",
        "ppt/media/image1.png",
    ] {
        assert!(names.iter().any(|n| n == expected), "Missing {} in {:?}", expected, names);
    }

    let reopened = open_presentation(&output_path).unwrap();
    assert_eq!(reopened.slide_count(), 3);
    assert_eq!(reopened.slide(1).unwrap().subtitle().as_deref(), Some("Finance"));

    let issues = validate(&reopened, &StyleGuide::corporate());
    assert!(
        issues.iter().all(|i| i.severity != Severity::Error),
        "Unexpected errors: {:?}",
        issues
    );
}

#[test]
fn test_small_font_fails_validation() {
    let mut pres = create_presentation(None).unwrap();
    let n = add_slide(&mut pres, "Title Only", None).unwrap();
    set_title(&mut pres, n, "Footnotes", &TextOptions::default()).unwrap();
    let options = TextOptions {
        font_size: Some(8.0),
        font_family: Some("Comic Sans MS".to_string()),
        ..TextOptions::default()
    };
    add_text_box(&mut pres, n, "Source: internal data", "1in", "6in", "8in", "0.5in", &options).unwrap();

    let guide = StyleGuide {
        min_font_size: Some(12.0),
        forbidden_fonts: ["Comic Sans MS".to_string()].into_iter().collect(),
        ..StyleGuide::default()
    };
    let issues = validate(&pres, &guide);
    let rules: Vec<&str> = issues.iter().map(|i| i.rule.as_str()).collect();
    assert!(rules.contains(&"min_font_size"), "Got {:?}", rules);
    assert!(rules.contains(&"forbidden_font"), "Got {:?}", rules);
    assert!(issues.iter().all(|i| i.slide == Some(1)));

    let err = ensure_valid(&pres, &guide).unwrap_err();
    assert_eq!(err.code(), "STYLE_VIOLATION");
}

#[test]
fn test_saved_slide_xml_carries_text_and_size() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("deck.pptx");

    let mut pres = create_presentation(None).unwrap();
    let n = add_slide(&mut pres, "Title Only", None).unwrap();
    let options = TextOptions {
        font_size: Some(24.0),
        bold: Some(true),
        ..TextOptions::default()
    };
    set_title(&mut pres, n, "Fish & Chips", &options).unwrap();
    save_presentation(&mut pres, &path).unwrap();

    let file = std::fs::File::open(&path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut xml = String::new();
    archive
        .by_name("ppt/slides/slide1.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    assert!(xml.contains("Fish &amp; Chips"), "Got {}", xml);
    assert!(xml.contains(r#"sz="2400""#), "Got {}", xml);
    assert!(xml.contains(r#"b="1""#), "Got {}", xml);
}
