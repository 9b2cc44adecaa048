// ABOUTME: DrawingML text bodies: paragraphs, runs and run properties
// ABOUTME: Reads a:txBody content into plain structs and writes styled paragraphs back

use crate::colors::Color;
use crate::oxml::xml::Element;
use crate::units::{centipoints_to_pt, pt_to_centipoints};

/// Character formatting for a run. `None` leaves the inherited value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStyle {
    pub size_pt: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub font: Option<String>,
    pub color: Option<Color>,
}

impl RunStyle {
    pub fn is_empty(&self) -> bool {
        *self == RunStyle::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunInfo {
    pub text: String,
    pub style: RunStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphInfo {
    pub level: u32,
    pub runs: Vec<RunInfo>,
}

impl ParagraphInfo {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

// Children of a:rPr that precede a:latin in schema order.
const BEFORE_LATIN: &[&str] = &[
    "ln", "noFill", "solidFill", "gradFill", "blipFill", "pattFill", "grpFill", "effectLst",
    "effectDag", "highlight", "uLnTx", "uLn", "uFillTx", "uFill",
];

/// A fresh text body with the mandatory bodyPr, lstStyle and one empty paragraph.
pub fn new_text_body(qualified: &str) -> Element {
    Element::new(qualified)
        .with_child(Element::new("a:bodyPr"))
        .with_child(Element::new("a:lstStyle"))
        .with_child(Element::new("a:p"))
}

pub fn read_run_style(rpr: &Element) -> RunStyle {
    let color = rpr.child("solidFill").and_then(|fill| {
        if let Some(rgb) = fill.child("srgbClr") {
            rgb.attr("val").map(|v| Color::Rgb(v.to_ascii_uppercase()))
        } else {
            fill.child("schemeClr")
                .and_then(|s| s.attr("val"))
                .map(|v| Color::Scheme(v.to_string()))
        }
    });
    RunStyle {
        size_pt: rpr.attr_i64("sz").map(centipoints_to_pt),
        bold: rpr.attr_bool("b"),
        italic: rpr.attr_bool("i"),
        underline: rpr.attr("u").map(|u| u != "none"),
        font: rpr
            .child("latin")
            .and_then(|l| l.attr("typeface"))
            .map(|s| s.to_string()),
        color,
    }
}

pub fn apply_run_style(rpr: &mut Element, style: &RunStyle) {
    if let Some(size) = style.size_pt {
        rpr.set_attr("sz", pt_to_centipoints(size));
    }
    if let Some(bold) = style.bold {
        rpr.set_attr("b", if bold { "1" } else { "0" });
    }
    if let Some(italic) = style.italic {
        rpr.set_attr("i", if italic { "1" } else { "0" });
    }
    if let Some(underline) = style.underline {
        rpr.set_attr("u", if underline { "sng" } else { "none" });
    }
    if let Some(color) = &style.color {
        rpr.remove_children("solidFill");
        rpr.remove_children("noFill");
        let clr = match color {
            Color::Rgb(hex) => Element::new("a:srgbClr").with_attr("val", hex),
            Color::Scheme(slot) => Element::new("a:schemeClr").with_attr("val", slot),
        };
        rpr.insert_after(&["ln"], Element::new("a:solidFill").with_child(clr));
    }
    if let Some(font) = &style.font {
        rpr.remove_children("latin");
        rpr.insert_after(BEFORE_LATIN, Element::new("a:latin").with_attr("typeface", font));
    }
}

/// A run; embedded newlines are not split here, see `paragraph`.
pub fn run(text: &str, style: Option<&RunStyle>) -> Element {
    let mut rpr = Element::new("a:rPr").with_attr("lang", "en-US").with_attr("dirty", "0");
    if let Some(style) = style {
        apply_run_style(&mut rpr, style);
    }
    Element::new("a:r")
        .with_child(rpr)
        .with_child(Element::new("a:t").with_text(text))
}

/// A paragraph at a bullet level; `\n` inside the text becomes a line break.
pub fn paragraph(text: &str, level: u32, style: Option<&RunStyle>) -> Element {
    let mut p = Element::new("a:p");
    if level > 0 {
        p.push(Element::new("a:pPr").with_attr("lvl", level));
    }
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            p.push(Element::new("a:br"));
        }
        if !line.is_empty() {
            p.push(run(line, style));
        }
    }
    p
}

/// Replaces every paragraph of a text body. An empty list leaves one empty
/// paragraph, since a txBody must contain at least one.
pub fn set_paragraphs(tx_body: &mut Element, paragraphs: &[(String, u32)], style: Option<&RunStyle>) {
    if tx_body.child("bodyPr").is_none() {
        tx_body.insert_element(0, Element::new("a:bodyPr"));
    }
    tx_body.remove_children("p");
    if paragraphs.is_empty() {
        tx_body.push(Element::new("a:p"));
        return;
    }
    for (text, level) in paragraphs {
        tx_body.push(paragraph(text, *level, style));
    }
}

/// Appends a paragraph, reusing a single empty paragraph if that is all there is.
pub fn append_paragraph(tx_body: &mut Element, text: &str, level: u32, style: Option<&RunStyle>) {
    let only_empty = {
        let paras: Vec<&Element> = tx_body.children_named("p").collect();
        paras.len() == 1 && paras[0].text().is_empty()
    };
    if only_empty {
        tx_body.remove_children("p");
    }
    tx_body.push(paragraph(text, level, style));
}

/// Applies `style` to every run already in a text body and returns how
/// many runs changed.
pub fn restyle_runs(tx_body: &mut Element, style: &RunStyle) -> usize {
    let mut count = 0;
    for p in tx_body.elements_mut().filter(|e| e.is("p")) {
        for r in p.elements_mut().filter(|e| e.is("r")) {
            if r.child("rPr").is_none() {
                r.insert_element(0, Element::new("a:rPr").with_attr("lang", "en-US"));
            }
            if let Some(rpr) = r.child_mut("rPr") {
                apply_run_style(rpr, style);
                count += 1;
            }
        }
    }
    count
}

pub fn read_paragraphs(tx_body: &Element) -> Vec<ParagraphInfo> {
    tx_body
        .children_named("p")
        .map(|p| {
            let level = p
                .child("pPr")
                .and_then(|ppr| ppr.attr_i64("lvl"))
                .unwrap_or(0)
                .max(0) as u32;
            let mut runs = Vec::new();
            for el in p.elements() {
                match el.local_name() {
                    "r" | "fld" => runs.push(RunInfo {
                        text: el.child("t").map(|t| t.text()).unwrap_or_default(),
                        style: el.child("rPr").map(read_run_style).unwrap_or_default(),
                    }),
                    "br" => runs.push(RunInfo {
                        text: "\n".to_string(),
                        style: RunStyle::default(),
                    }),
                    _ => {}
                }
            }
            ParagraphInfo { level, runs }
        })
        .collect()
}

/// Plain text of a text body, paragraphs joined with newlines.
pub fn body_text(tx_body: &Element) -> String {
    read_paragraphs(tx_body)
        .iter()
        .map(|p| p.text())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraphs_round_trip_levels_and_text() {
        let mut body = new_text_body("p:txBody");
        set_paragraphs(
            &mut body,
            &[("First".to_string(), 0), ("Nested".to_string(), 1)],
            None,
        );
        let paras = read_paragraphs(&body);
        assert_eq!(paras.len(), 2);
        assert_eq!(paras[0].text(), "First");
        assert_eq!(paras[1].level, 1);
        assert_eq!(body_text(&body), "First\nNested");
    }

    #[test]
    fn test_run_style_written_in_schema_order() {
        let style = RunStyle {
            size_pt: Some(24.0),
            bold: Some(true),
            font: Some("Arial".to_string()),
            color: Some(Color::Rgb("FF0000".to_string())),
            ..RunStyle::default()
        };
        let r = run("Hello", Some(&style));
        let rpr = r.child("rPr").unwrap();
        assert_eq!(rpr.attr("sz"), Some("2400"));
        let names: Vec<&str> = rpr.elements().map(|e| e.local_name()).collect();
        assert_eq!(names, vec!["solidFill", "latin"]);
        assert_eq!(read_run_style(rpr), style);
    }

    #[test]
    fn test_restyle_runs_keeps_text() {
        let mut body = new_text_body("p:txBody");
        set_paragraphs(&mut body, &[("One".to_string(), 0), ("Two".to_string(), 1)], None);
        let bold = RunStyle {
            bold: Some(true),
            ..RunStyle::default()
        };
        assert_eq!(restyle_runs(&mut body, &bold), 2);

        let paras = read_paragraphs(&body);
        assert_eq!(body_text(&body), "One\nTwo");
        assert!(paras.iter().all(|p| p.runs[0].style.bold == Some(true)));
        assert_eq!(paras[1].level, 1);
    }

    #[test]
    fn test_empty_paragraph_list_keeps_one_paragraph() {
        let mut body = new_text_body("p:txBody");
        set_paragraphs(&mut body, &[], None);
        assert_eq!(body.children_named("p").count(), 1);
        append_paragraph(&mut body, "Only", 0, None);
        assert_eq!(body.children_named("p").count(), 1);
        assert_eq!(body_text(&body), "Only");
    }
}
