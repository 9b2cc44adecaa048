// ABOUTME: Notes slide parts holding a slide's speaker notes
// ABOUTME: Builds a blank p:notes tree and reads or replaces the text of its notes placeholder

use crate::errors::{Result, SlideError};
use crate::oxml::ns::{NS_A, NS_P, NS_R};
use crate::oxml::shapes::placeholder_element;
use crate::oxml::text;
use crate::oxml::xml::Element;

/// A notes page with the slide image and an empty notes placeholder,
/// positioned for the default 7.5in x 10in notes size.
pub fn new_notes_root() -> Result<Element> {
    let xml = format!(
        r#"<p:notes xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr><p:sp><p:nvSpPr><p:cNvPr id="2" name="Slide Image Placeholder 1"/><p:cNvSpPr><a:spLocks noGrp="1" noRot="1" noChangeAspect="1"/></p:cNvSpPr><p:nvPr><p:ph type="sldImg"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="685800" y="1143000"/><a:ext cx="5486400" cy="3086100"/></a:xfrm></p:spPr></p:sp><p:sp><p:nvSpPr><p:cNvPr id="3" name="Notes Placeholder 2"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="685800" y="4400550"/><a:ext cx="5486400" cy="3600450"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p/></p:txBody></p:sp></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:notes>"#,
        a = NS_A,
        r = NS_R,
        p = NS_P
    );
    Element::parse(xml.as_bytes())
}

// The notes placeholder is the body one; old files sometimes omit its type.
fn is_notes_placeholder(shape: &Element) -> bool {
    placeholder_element(shape)
        .map(|ph| matches!(ph.attr("type"), None | Some("body")))
        .unwrap_or(false)
}

pub fn notes_text(root: &Element) -> String {
    root.find(&["cSld", "spTree"])
        .and_then(|tree| tree.elements().find(|s| is_notes_placeholder(s)))
        .and_then(|shape| shape.child("txBody"))
        .map(text::body_text)
        .unwrap_or_default()
}

/// Replaces the notes text; `\n` separates paragraphs.
pub fn set_notes_text(root: &mut Element, value: &str) -> Result<()> {
    let shape = root
        .find_mut(&["cSld", "spTree"])
        .and_then(|tree| tree.elements_mut().find(|s| is_notes_placeholder(s)))
        .ok_or_else(|| SlideError::ContentError("Notes page has no notes placeholder".to_string()))?;
    if shape.child("txBody").is_none() {
        shape.push(text::new_text_body("p:txBody"));
    }
    let body = shape
        .child_mut("txBody")
        .ok_or_else(|| SlideError::ContentError("Notes placeholder has no text body".to_string()))?;
    let paragraphs: Vec<(String, u32)> = value.split('\n').map(|l| (l.to_string(), 0)).collect();
    text::set_paragraphs(body, &paragraphs, None);
    Ok(())
}
