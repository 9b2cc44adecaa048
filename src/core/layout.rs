// ABOUTME: Slide layout discovery for a package
// ABOUTME: Lists layouts in file order with their placeholders, inheriting geometry from the master

use crate::errors::Result;
use crate::oxml::ns::{content_type, rel_type};
use crate::oxml::package::{resolve_target, Package};
use crate::oxml::shapes::{self, PlaceholderInfo, Position};
use crate::oxml::xml::Element;
use log::{debug, warn};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct LayoutPlaceholder {
    /// `type` or `type_idx`.
    pub key: String,
    #[serde(rename = "type")]
    pub ph_type: String,
    pub idx: u32,
    pub name: String,
    pub position: Option<Position>,
    /// Attributes of the layout's `p:ph`, copied onto slide placeholders.
    #[serde(skip)]
    pub ph_attributes: Vec<(String, String)>,
}

impl LayoutPlaceholder {
    pub fn info(&self) -> PlaceholderInfo {
        PlaceholderInfo {
            ph_type: self
                .ph_attributes
                .iter()
                .find(|(k, _)| k == "type")
                .map(|(_, v)| v.clone()),
            idx: self.idx,
        }
    }

    pub fn ph_element(&self) -> Element {
        let mut ph = Element::new("p:ph");
        for (k, v) in &self.ph_attributes {
            // Prompts belong to the layout, not the slide.
            if k != "hasCustomPrompt" {
                ph.set_attr(k, v);
            }
        }
        ph
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutInfo {
    pub name: String,
    /// 0-based position in layout file order.
    pub index: usize,
    pub part_name: String,
    /// The layout's own `type` attribute, when present.
    pub layout_type: Option<String>,
    pub placeholders: Vec<LayoutPlaceholder>,
}

impl LayoutInfo {
    pub fn placeholder_types(&self) -> Vec<String> {
        self.placeholders.iter().map(|p| p.ph_type.clone()).collect()
    }

    pub fn has_placeholder(&self, ph_type: &str) -> bool {
        self.placeholders.iter().any(|p| p.ph_type == ph_type)
    }

    /// The layout placeholder a slide placeholder inherits from: same idx
    /// when the slide names one, otherwise same type.
    pub fn inherited(&self, ph: &PlaceholderInfo) -> Option<&LayoutPlaceholder> {
        if ph.idx > 0 {
            if let Some(found) = self.placeholders.iter().find(|p| p.idx == ph.idx) {
                return Some(found);
            }
        }
        let ty = ph.effective_type();
        self.placeholders
            .iter()
            .find(|p| p.ph_type == ty)
            .or_else(|| match ty {
                "title" => self.placeholders.iter().find(|p| p.ph_type == "ctrTitle"),
                "ctrTitle" => self.placeholders.iter().find(|p| p.ph_type == "title"),
                _ => None,
            })
    }
}

/// Placeholder geometry on a master, keyed by type.
fn master_positions(pkg: &Package, layout_part: &str) -> Vec<(String, Position)> {
    let master = match pkg.part_rels(layout_part) {
        Ok(rels) => rels
            .find_by_type(rel_type::SLIDE_MASTER)
            .next()
            .map(|r| resolve_target(layout_part, &r.target)),
        Err(e) => {
            warn!("Unreadable relationships for {}: {}", layout_part, e);
            None
        }
    };
    let Some(master) = master else {
        return Vec::new();
    };
    let root = match pkg.xml_part(&master) {
        Ok(root) => root,
        Err(e) => {
            warn!("Unreadable slide master {}: {}", master, e);
            return Vec::new();
        }
    };
    root.find(&["cSld", "spTree"])
        .map(shapes::read_shapes)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|s| Some((s.placeholder?.effective_type().to_string(), s.position?)))
        .collect()
}

fn master_fallback(ph_type: &str, master: &[(String, Position)]) -> Option<Position> {
    let wanted: &[&str] = match ph_type {
        "title" | "ctrTitle" => &["title", "ctrTitle"],
        "dt" | "ftr" | "sldNum" => &[],
        _ => &["body", "obj"],
    };
    if let Some((_, pos)) = master.iter().find(|(t, _)| t == ph_type) {
        return Some(*pos);
    }
    master
        .iter()
        .find(|(t, _)| wanted.contains(&t.as_str()))
        .map(|(_, p)| *p)
}

pub fn read_layout(pkg: &Package, part_name: &str, index: usize) -> Result<LayoutInfo> {
    let root = pkg.xml_part(part_name)?;
    let name = root
        .child("cSld")
        .and_then(|c| c.attr("name"))
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("Layout {}", index + 1));
    let master = master_positions(pkg, part_name);

    let mut placeholders = Vec::new();
    if let Some(tree) = root.find(&["cSld", "spTree"]) {
        for shape in tree.elements() {
            let Some(ph) = shapes::placeholder_element(shape) else {
                continue;
            };
            let Some(info) = shapes::read_shape(shape) else {
                continue;
            };
            let ph_info = PlaceholderInfo::from_ph(ph);
            let ph_type = ph_info.effective_type().to_string();
            let position = info.position.or_else(|| master_fallback(&ph_type, &master));
            placeholders.push(LayoutPlaceholder {
                key: ph_info.key(),
                ph_type,
                idx: ph_info.idx,
                name: info.name,
                position,
                ph_attributes: ph.attributes.clone(),
            });
        }
    }

    Ok(LayoutInfo {
        name,
        index,
        part_name: part_name.to_string(),
        layout_type: root.attr("type").map(|s| s.to_string()),
        placeholders,
    })
}

/// All layouts in the package, ordered by layout file number.
pub fn load_layouts(pkg: &Package) -> Result<Vec<LayoutInfo>> {
    let parts = pkg.parts_of_type(content_type::SLIDE_LAYOUT);
    let mut layouts = Vec::with_capacity(parts.len());
    for (index, part) in parts.iter().enumerate() {
        layouts.push(read_layout(pkg, part, index)?);
    }
    debug!("Found {} layouts", layouts.len());
    Ok(layouts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oxml::blank::blank_package;

    #[test]
    fn test_blank_layouts_in_file_order() {
        let pkg = blank_package("Deck").unwrap();
        let layouts = load_layouts(&pkg).unwrap();
        assert_eq!(layouts[0].name, "Title Slide");
        assert_eq!(layouts[1].name, "Title and Content");
        assert!(layouts.iter().all(|l| l.index < layouts.len()));

        let title_slide = &layouts[0];
        assert_eq!(title_slide.placeholder_types(), vec!["ctrTitle", "subTitle"]);
        assert_eq!(title_slide.placeholders[1].key, "subTitle_1");

        let content = &layouts[1];
        let body = content
            .inherited(&PlaceholderInfo { ph_type: None, idx: 1 })
            .unwrap();
        assert_eq!(body.ph_type, "body");
        assert!(body.position.is_some());
        assert!(body.ph_element().attr("type").is_none());
    }
}
