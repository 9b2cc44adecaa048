// ABOUTME: Markdown module for building decks from outlines and exporting them back
// ABOUTME: Parses with comrak and maps headings, lists and tables onto template layouts

use crate::config::Config;
use crate::core::presentation::Presentation;
use crate::core::slide::Slide;
use crate::errors::{Result, SlideError};
use crate::template::classify::{classify_layout, LayoutType};
use crate::tools::content::MAX_LEVEL;
use crate::tools::{add_slide_for_content, add_table, Placement};
use crate::utils::validate_file_exists;
use comrak::nodes::{AstNode, NodeValue};
use comrak::{parse_document, Arena, ComrakOptions};
use log::{debug, info, warn};
use std::fs;
use std::path::Path;

/// Which kind of slide a heading opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideKind {
    Title,
    Section,
    Content,
}

impl SlideKind {
    /// Content tag used to pick a layout.
    fn content_tag(self) -> &'static str {
        match self {
            SlideKind::Title => "title",
            SlideKind::Section => "section",
            SlideKind::Content => "bullets",
        }
    }
}

/// One slide worth of parsed Markdown.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideOutline {
    pub kind: SlideKind,
    pub title: String,
    /// Free paragraphs: the subtitle of title slides, the lead-in of
    /// section bodies.
    pub paragraphs: Vec<String>,
    pub bullets: Vec<(String, u32)>,
    pub tables: Vec<Vec<Vec<String>>>,
}

impl SlideOutline {
    fn new(kind: SlideKind, title: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            paragraphs: Vec::new(),
            bullets: Vec::new(),
            tables: Vec::new(),
        }
    }

    fn content_tag(&self) -> &'static str {
        if self.kind == SlideKind::Content && self.bullets.is_empty() && !self.tables.is_empty() {
            "table"
        } else {
            self.kind.content_tag()
        }
    }
}

/// A parsed Markdown deck.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    pub title: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub slides: Vec<SlideOutline>,
}

/// Splits leading `% title`, `% author`, `% date` lines from the body.
fn parse_frontmatter(content: &str) -> (Vec<String>, &str) {
    let mut fields = Vec::new();
    let mut rest = content;
    while fields.len() < 3 {
        let Some(line) = rest.lines().next() else {
            break;
        };
        let Some(value) = line.strip_prefix("% ") else {
            break;
        };
        fields.push(value.trim().to_string());
        rest = rest[line.len()..].trim_start_matches(|c: char| c == '\r' || c == '\n');
    }
    (fields, rest)
}

/// `## Section: X`, `## Slide: X`, `## Slide 3: X` or plain `## X`.
fn classify_heading(text: &str) -> (SlideKind, String) {
    if let Some((prefix, rest)) = text.split_once(':') {
        let prefix = prefix.trim().to_lowercase();
        if prefix == "section" {
            return (SlideKind::Section, rest.trim().to_string());
        }
        if let Some(number) = prefix.strip_prefix("slide") {
            if number.trim().chars().all(|c| c.is_ascii_digit()) {
                return (SlideKind::Content, rest.trim().to_string());
            }
        }
    }
    (SlideKind::Content, text.trim().to_string())
}

/// Inline text of a node, with breaks turned into spaces.
fn plain_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut out = String::new();
    for d in node.descendants() {
        match &d.data.borrow().value {
            NodeValue::Text(t) => out.push_str(t),
            NodeValue::Code(c) => out.push_str(&c.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => out.push(' '),
            _ => {}
        }
    }
    out.trim().to_string()
}

fn collect_list<'a>(list: &'a AstNode<'a>, level: u32, out: &mut Vec<(String, u32)>) {
    for item in list.children() {
        let mut text = Vec::new();
        let mut nested = Vec::new();
        for child in item.children() {
            if matches!(child.data.borrow().value, NodeValue::List(_)) {
                nested.push(child);
            } else {
                let t = plain_text(child);
                if !t.is_empty() {
                    text.push(t);
                }
            }
        }
        out.push((text.join(" "), level.min(MAX_LEVEL)));
        for child in nested {
            collect_list(child, level + 1, out);
        }
    }
}

fn collect_table<'a>(table: &'a AstNode<'a>) -> Vec<Vec<String>> {
    table
        .children()
        .map(|row| row.children().map(plain_text).collect())
        .collect()
}

/// Parses Markdown into slide outlines without touching a deck.
pub fn parse_markdown(text: &str) -> Result<Outline> {
    let (frontmatter, body) = parse_frontmatter(text);
    let mut fields = frontmatter.into_iter();
    let mut outline = Outline {
        title: fields.next(),
        author: fields.next(),
        date: fields.next(),
        slides: Vec::new(),
    };

    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    let arena = Arena::new();
    let root = parse_document(&arena, body, &options);

    for node in root.children() {
        let value = node.data.borrow().value.clone();
        match value {
            NodeValue::Heading(heading) if heading.level <= 2 => {
                let text = plain_text(node);
                let (kind, title) = if heading.level == 1 {
                    (SlideKind::Title, text)
                } else {
                    classify_heading(&text)
                };
                if kind == SlideKind::Section && title.is_empty() {
                    return Err(SlideError::MarkdownError(format!(
                        "Section heading on line {} has no title",
                        node.data.borrow().sourcepos.start.line
                    )));
                }
                outline.slides.push(SlideOutline::new(kind, &title));
            }
            NodeValue::Heading(_) => current(&mut outline).bullets.push((plain_text(node), 0)),
            NodeValue::Paragraph => {
                let text = plain_text(node);
                if text.is_empty() {
                    continue;
                }
                let slide = current(&mut outline);
                if slide.kind == SlideKind::Content {
                    slide.bullets.push((text, 0));
                } else {
                    slide.paragraphs.push(text);
                }
            }
            NodeValue::List(_) => collect_list(node, 0, &mut current(&mut outline).bullets),
            NodeValue::Table(..) => {
                let table = collect_table(node);
                current(&mut outline).tables.push(table);
            }
            NodeValue::CodeBlock(block) => {
                let slide = current(&mut outline);
                slide.bullets.extend(
                    block
                        .literal
                        .lines()
                        .filter(|l| !l.trim().is_empty())
                        .map(|l| (l.trim_end().to_string(), 0)),
                );
            }
            NodeValue::ThematicBreak => {}
            other => debug!("Skipping markdown block {:?}", other),
        }
    }
    Ok(outline)
}

/// The slide being filled, opening an untitled content slide if content
/// comes before the first heading.
fn current(outline: &mut Outline) -> &mut SlideOutline {
    if outline.slides.is_empty() {
        outline.slides.push(SlideOutline::new(SlideKind::Content, ""));
    }
    let last = outline.slides.len() - 1;
    &mut outline.slides[last]
}

fn has_placeholder(slide: &Slide, name: &str) -> bool {
    slide.placeholder_map().find(name).is_some()
}

fn fill_slide(pres: &mut Presentation, number: usize, outline: &SlideOutline) -> Result<()> {
    let slide = pres.slide_mut(number)?;
    if !outline.title.is_empty() {
        if has_placeholder(slide, "title") {
            slide.set_title(&outline.title, None)?;
        } else {
            warn!("Layout '{}' has no title placeholder; dropping '{}'", slide.layout_name(), outline.title);
        }
    }

    // Subtitle for title slides; otherwise paragraphs lead the body.
    let mut body: Vec<(String, u32)> = Vec::new();
    if outline.kind == SlideKind::Title {
        if !outline.paragraphs.is_empty() {
            if has_placeholder(slide, "subtitle") {
                slide.set_subtitle(&outline.paragraphs.join("\n"), None)?;
            } else {
                warn!("Slide {} has no subtitle placeholder for its text", number);
            }
        }
    } else {
        body.extend(outline.paragraphs.iter().map(|p| (p.clone(), 0)));
    }
    body.extend(outline.bullets.iter().cloned());

    let mut body_free = true;
    if !body.is_empty() {
        if has_placeholder(slide, "body") {
            slide.set_body(&body, None)?;
            body_free = false;
        } else {
            warn!("Slide {} has no body placeholder for {} paragraphs", number, body.len());
        }
    }

    for table in &outline.tables {
        let placement = if body_free && has_placeholder(pres.slide(number)?, "body") {
            body_free = false;
            Placement::in_placeholder("body")
        } else {
            Placement::default()
        };
        add_table(pres, number, table, &placement, true)?;
    }
    Ok(())
}

/// Appends slides for `text` to an existing deck and returns how many
/// were added.
pub fn append_markdown(pres: &mut Presentation, text: &str, config: &Config) -> Result<usize> {
    let mut outline = parse_markdown(text)?;

    // Author and date become the subtitle of an opening title slide.
    if let Some(first) = outline.slides.first_mut() {
        if first.kind == SlideKind::Title && first.paragraphs.is_empty() {
            first.paragraphs.extend(outline.author.clone());
            first.paragraphs.extend(outline.date.clone());
        }
    }
    if let Some(title) = &outline.title {
        pres.set_title(title)?;
    }

    for slide in &outline.slides {
        let number = add_slide_for_content(
            pres,
            slide.content_tag(),
            &config.default_layout,
            config.match_threshold,
        )?;
        debug!(
            "Markdown slide {:?} '{}' -> slide {} ({})",
            slide.kind,
            slide.title,
            number,
            pres.slide(number)?.layout_name()
        );
        fill_slide(pres, number, slide)?;
    }
    Ok(outline.slides.len())
}

/// Builds a new deck from Markdown on the given template, or the built-in
/// blank template.
pub fn build_from_markdown(template: Option<&Path>, text: &str, config: &Config) -> Result<Presentation> {
    let mut pres = match template {
        Some(path) => Presentation::from_template(path)?,
        None => Presentation::new()?,
    };
    let added = append_markdown(&mut pres, text, config)?;
    info!("Built {} slides from markdown", added);
    Ok(pres)
}

pub fn build_from_markdown_file(markdown_path: &Path, template: Option<&Path>, config: &Config) -> Result<Presentation> {
    info!("Building presentation from markdown: {:?}", markdown_path);
    validate_file_exists(markdown_path)?;
    let text = fs::read_to_string(markdown_path)?;
    build_from_markdown(template, &text, config)
}

fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|").replace('\n', " ")
}

fn write_table(out: &mut String, rows: &[Vec<String>]) {
    let columns = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    if columns == 0 {
        return;
    }
    for (i, row) in rows.iter().enumerate() {
        let cells: Vec<String> = (0..columns)
            .map(|c| escape_cell(row.get(c).map(String::as_str).unwrap_or("")))
            .collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
        if i == 0 {
            out.push_str(&format!("|{}\n", " --- |".repeat(columns)));
        }
    }
    out.push('\n');
}

/// Exports titles, subtitles, bullets and tables as Markdown that
/// `build_from_markdown` reads back.
pub fn to_markdown(pres: &Presentation) -> String {
    let mut out = String::new();
    if let Some(title) = pres.title() {
        out.push_str(&format!("% {}\n\n", title));
    }

    for slide in pres.slides() {
        let layout_type = slide
            .layout()
            .map(classify_layout)
            .unwrap_or(LayoutType::Other);
        let title = slide.title().unwrap_or_default();
        match layout_type {
            LayoutType::TitleSlide => {
                out.push_str(&format!("# {}\n\n", title));
                if let Some(subtitle) = slide.subtitle() {
                    for line in subtitle.lines().filter(|l| !l.trim().is_empty()) {
                        out.push_str(&format!("{}\n\n", line.trim()));
                    }
                }
            }
            LayoutType::SectionHeader => {
                out.push_str(&format!("## Section: {}\n\n", title));
                for (text, _) in slide.body_paragraphs() {
                    out.push_str(&format!("{}\n\n", text));
                }
            }
            _ => {
                if title.is_empty() {
                    out.push_str("##\n\n");
                } else {
                    out.push_str(&format!("## {}\n\n", title));
                }
                let bullets = slide.body_paragraphs();
                for (text, level) in &bullets {
                    out.push_str(&format!("{}- {}\n", "  ".repeat(*level as usize), text));
                }
                if !bullets.is_empty() {
                    out.push('\n');
                }
            }
        }
        for table in slide.shapes().into_iter().filter_map(|s| s.table) {
            write_table(&mut out, &table);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECK: &str = concat!(
        "% Quarterly Review\n% Ops Team\n% 2024-01-15\n\n",
        "# Q4 Results\n\n",
        "## Section: Revenue\n\n",
        "## Slide 1: Highlights\n\n",
        "- Revenue up 12%\n",
        "  - North region led\n",
        "- Costs flat\n\n",
        "## Numbers\n\n",
        "| Region | Q4 |\n",
        "| --- | --- |\n",
        "| North | 120 |\n",
        "| South | 95 |\n",
    );

    #[test]
    fn test_parse_frontmatter() {
        let (fields, rest) = parse_frontmatter("% Title\n% Me\n\n# Hello\n");
        assert_eq!(fields, vec!["Title", "Me"]);
        assert_eq!(rest, "# Hello\n");

        let (fields, rest) = parse_frontmatter("# No frontmatter\n");
        assert!(fields.is_empty());
        assert_eq!(rest, "# No frontmatter\n");
    }

    #[test]
    fn test_classify_heading() {
        assert_eq!(classify_heading("Section: Revenue"), (SlideKind::Section, "Revenue".to_string()));
        assert_eq!(classify_heading("Slide: Plan"), (SlideKind::Content, "Plan".to_string()));
        assert_eq!(classify_heading("Slide 12: Plan"), (SlideKind::Content, "Plan".to_string()));
        assert_eq!(classify_heading("Risks: what next"), (SlideKind::Content, "Risks: what next".to_string()));
    }

    #[test]
    fn test_parse_outline() {
        let outline = parse_markdown(DECK).unwrap();
        assert_eq!(outline.title.as_deref(), Some("Quarterly Review"));
        assert_eq!(outline.author.as_deref(), Some("Ops Team"));
        assert_eq!(outline.slides.len(), 4);

        let kinds: Vec<SlideKind> = outline.slides.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![SlideKind::Title, SlideKind::Section, SlideKind::Content, SlideKind::Content]
        );
        assert_eq!(outline.slides[2].title, "Highlights");
        assert_eq!(
            outline.slides[2].bullets,
            vec![
                ("Revenue up 12%".to_string(), 0),
                ("North region led".to_string(), 1),
                ("Costs flat".to_string(), 0),
            ]
        );
        assert_eq!(outline.slides[3].tables[0][2], vec!["South", "95"]);
        assert_eq!(outline.slides[3].content_tag(), "table");
    }

    #[test]
    fn test_nested_list_levels() {
        let outline = parse_markdown("## Levels\n\n- a\n  - b\n    - c\n- d\n").unwrap();
        assert_eq!(
            outline.slides[0].bullets,
            vec![
                ("a".to_string(), 0),
                ("b".to_string(), 1),
                ("c".to_string(), 2),
                ("d".to_string(), 0),
            ]
        );
    }

    #[test]
    fn test_section_keeps_paragraphs_before_bullets() {
        let markdown = "## Section: Results\n\nIntro paragraph\n\n- point a\n- point b\n";
        let outline = parse_markdown(markdown).unwrap();
        assert_eq!(outline.slides[0].paragraphs, vec!["Intro paragraph"]);

        let pres = build_from_markdown(None, markdown, &Config::default()).unwrap();
        let section = pres.slide(1).unwrap();
        assert_eq!(section.layout_name(), "Section Header");
        assert_eq!(section.body(), vec!["Intro paragraph", "point a", "point b"]);
    }

    #[test]
    fn test_empty_input_has_no_slides() {
        assert!(parse_markdown("").unwrap().slides.is_empty());
        let pres = build_from_markdown(None, "", &Config::default()).unwrap();
        assert_eq!(pres.slide_count(), 0);
    }

    #[test]
    fn test_untitled_section_is_an_error() {
        let err = parse_markdown("# Deck\n\n## Section:\n").unwrap_err();
        assert_eq!(err.code(), "MARKDOWN_ERROR");
    }

    #[test]
    fn test_build_deck() {
        let pres = build_from_markdown(None, DECK, &Config::default()).unwrap();
        assert_eq!(pres.slide_count(), 4);
        assert_eq!(pres.title().as_deref(), Some("Quarterly Review"));

        let opening = pres.slide(1).unwrap();
        assert_eq!(opening.layout_name(), "Title Slide");
        assert_eq!(opening.title().as_deref(), Some("Q4 Results"));
        assert_eq!(opening.subtitle().as_deref(), Some("Ops Team\n2024-01-15"));

        assert_eq!(pres.slide(2).unwrap().layout_name(), "Section Header");
        let bullets = pres.slide(3).unwrap();
        assert_eq!(bullets.layout_name(), "Title and Content");
        assert_eq!(bullets.body_paragraphs()[1], ("North region led".to_string(), 1));

        let table = pres
            .slide(4)
            .unwrap()
            .shapes()
            .into_iter()
            .find_map(|s| s.table)
            .unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table[0], vec!["Region", "Q4"]);
    }

    #[test]
    fn test_to_markdown_reads_back() {
        let pres = build_from_markdown(None, DECK, &Config::default()).unwrap();
        let markdown = to_markdown(&pres);
        assert!(markdown.starts_with("% Quarterly Review\n"));
        assert!(markdown.contains("# Q4 Results\n"));
        assert!(markdown.contains("## Section: Revenue\n"));
        assert!(markdown.contains("- Revenue up 12%\n  - North region led\n"));
        assert!(markdown.contains("| North | 120 |\n"));

        let again = build_from_markdown(None, &markdown, &Config::default()).unwrap();
        assert_eq!(again.slide_count(), pres.slide_count());
        assert_eq!(again.slide(3).unwrap().body(), pres.slide(3).unwrap().body());
    }
}
