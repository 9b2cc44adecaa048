// ABOUTME: A single slide: its XML, relationships and the layout it was built from
// ABOUTME: Provides placeholder-aware text editing, text boxes, tables and shape inspection

use crate::core::layout::LayoutInfo;
use crate::core::placeholder::{self, PlaceholderMap};
use crate::errors::{Result, SlideError};
use crate::oxml::notes;
use crate::oxml::rels::Relationships;
use crate::oxml::shapes::{self, PlaceholderInfo, Position, ShapeInfo, ShapeKind};
use crate::oxml::text::{self, RunStyle};
use crate::oxml::xml::Element;
use crate::template::matcher::find_similar;
use log::debug;
use serde::Serialize;

/// Serializable description of a slide, as returned by inspection tools.
#[derive(Debug, Clone, Serialize)]
pub struct SlideDescription {
    pub slide_number: usize,
    pub layout: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub body: Vec<String>,
    pub placeholders: Vec<String>,
    pub shapes: Vec<ShapeSummary>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShapeSummary {
    pub id: u32,
    pub name: String,
    pub kind: ShapeKind,
    pub placeholder: Option<String>,
    pub text: String,
    pub position: Option<Position>,
}

/// The notes page of a slide.
#[derive(Debug, Clone)]
pub(crate) struct NotesPage {
    pub(crate) part_name: String,
    pub(crate) root: Element,
}

#[derive(Debug, Clone)]
pub struct Slide {
    pub(crate) number: usize,
    pub(crate) part_name: String,
    pub(crate) slide_id: u32,
    pub(crate) r_id: String,
    pub(crate) layout: Option<LayoutInfo>,
    pub(crate) root: Element,
    pub(crate) rels: Relationships,
    pub(crate) notes: Option<NotesPage>,
}

impl Slide {
    /// 1-based position in the deck.
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    pub fn layout_name(&self) -> &str {
        self.layout.as_ref().map(|l| l.name.as_str()).unwrap_or("")
    }

    pub fn layout(&self) -> Option<&LayoutInfo> {
        self.layout.as_ref()
    }

    pub fn xml(&self) -> &Element {
        &self.root
    }

    pub fn relationships(&self) -> &Relationships {
        &self.rels
    }

    /// Speaker notes, if the slide has a notes page with text.
    pub fn notes(&self) -> Option<String> {
        self.notes
            .as_ref()
            .map(|n| notes::notes_text(&n.root))
            .filter(|t| !t.trim().is_empty())
    }

    /// Replaces the speaker notes. The notes page must already exist; see
    /// `Presentation::set_notes`.
    pub(crate) fn set_notes(&mut self, value: &str) -> Result<()> {
        let number = self.number;
        let page = self.notes.as_mut().ok_or_else(|| {
            SlideError::ContentError(format!("Slide {} has no notes page", number))
        })?;
        notes::set_notes_text(&mut page.root, value)?;
        debug!("Set notes on slide {}", number);
        Ok(())
    }

    fn sp_tree(&self) -> Result<&Element> {
        self.root
            .find(&["cSld", "spTree"])
            .ok_or_else(|| SlideError::XmlError(format!("{} has no shape tree", self.part_name)))
    }

    pub(crate) fn sp_tree_mut(&mut self) -> Result<&mut Element> {
        let part = self.part_name.clone();
        self.root
            .find_mut(&["cSld", "spTree"])
            .ok_or_else(|| SlideError::XmlError(format!("{} has no shape tree", part)))
    }

    /// Shapes in document order. Placeholders without their own geometry
    /// report the position inherited from the layout.
    pub fn shapes(&self) -> Vec<ShapeInfo> {
        let Ok(tree) = self.sp_tree() else {
            return Vec::new();
        };
        let mut shapes = shapes::read_shapes(tree);
        if let Some(layout) = &self.layout {
            for shape in shapes.iter_mut().filter(|s| s.position.is_none()) {
                if let Some(ph) = &shape.placeholder {
                    shape.position = layout.inherited(ph).and_then(|l| l.position);
                }
            }
        }
        shapes
    }

    pub fn placeholder_map(&self) -> PlaceholderMap {
        PlaceholderMap::new(self.shapes().into_iter().filter_map(|s| s.placeholder))
    }

    /// Friendly names of the placeholders on this slide.
    pub fn placeholders(&self) -> Vec<String> {
        self.placeholder_map().list_all()
    }

    /// Raw placeholder types, in document order.
    pub fn placeholder_types(&self) -> Vec<String> {
        self.shapes()
            .into_iter()
            .filter_map(|s| s.placeholder.map(|p| p.effective_type().to_string()))
            .collect()
    }

    fn not_found(&self, name: &str) -> SlideError {
        let available = self.placeholders();
        let suggestion = find_similar(name, &available, 0.4).into_iter().next();
        SlideError::PlaceholderNotFound {
            requested: name.to_string(),
            slide: self.number,
            available,
            suggestion,
        }
    }

    fn resolve(&self, name: &str) -> Result<PlaceholderInfo> {
        self.placeholder_map()
            .find(name)
            .cloned()
            .ok_or_else(|| self.not_found(name))
    }

    fn shape_for_mut(&mut self, target: &PlaceholderInfo) -> Result<&mut Element> {
        let tree = self.sp_tree_mut()?;
        tree.elements_mut()
            .find(|shape| {
                shapes::placeholder_element(shape)
                    .map(PlaceholderInfo::from_ph)
                    .as_ref()
                    == Some(target)
            })
            .ok_or_else(|| SlideError::ContentError("Placeholder shape vanished".to_string()))
    }

    fn text_body_mut(&mut self, target: &PlaceholderInfo) -> Result<&mut Element> {
        let shape = self.shape_for_mut(target)?;
        if shape.child("txBody").is_none() {
            shape.push(text::new_text_body("p:txBody"));
        }
        shape
            .child_mut("txBody")
            .ok_or_else(|| SlideError::ContentError("Placeholder has no text body".to_string()))
    }

    /// Text of a named placeholder, if it exists on this slide.
    pub fn placeholder_text(&self, name: &str) -> Option<String> {
        let target = self.placeholder_map().find(name).cloned()?;
        self.shapes()
            .into_iter()
            .find(|s| s.placeholder.as_ref() == Some(&target))
            .map(|s| s.text())
    }

    pub fn title(&self) -> Option<String> {
        self.placeholder_text("title").filter(|t| !t.trim().is_empty())
    }

    pub fn subtitle(&self) -> Option<String> {
        self.placeholder_text("subtitle")
            .filter(|t| !t.trim().is_empty())
    }

    /// Body paragraphs with their bullet level, skipping empty ones.
    pub fn body_paragraphs(&self) -> Vec<(String, u32)> {
        let Some(target) = self.placeholder_map().find("body").cloned() else {
            return Vec::new();
        };
        self.shapes()
            .into_iter()
            .find(|s| s.placeholder.as_ref() == Some(&target))
            .map(|s| {
                s.paragraphs
                    .iter()
                    .map(|p| (p.text(), p.level))
                    .filter(|(t, _)| !t.trim().is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn body(&self) -> Vec<String> {
        self.body_paragraphs().into_iter().map(|(t, _)| t).collect()
    }

    /// Replaces the text of a placeholder; `\n` separates paragraphs.
    pub fn set_placeholder_text(&mut self, name: &str, value: &str, style: Option<&RunStyle>) -> Result<()> {
        let target = self.resolve(name)?;
        let paragraphs: Vec<(String, u32)> = value.split('\n').map(|l| (l.to_string(), 0)).collect();
        let body = self.text_body_mut(&target)?;
        text::set_paragraphs(body, &paragraphs, style);
        debug!("Set {} on slide {}", target.key(), self.number);
        Ok(())
    }

    pub fn set_title(&mut self, value: &str, style: Option<&RunStyle>) -> Result<()> {
        let target = self.resolve("title")?;
        let body = self.text_body_mut(&target)?;
        text::set_paragraphs(body, &[(value.to_string(), 0)], style);
        Ok(())
    }

    pub fn set_subtitle(&mut self, value: &str, style: Option<&RunStyle>) -> Result<()> {
        self.set_placeholder_text("subtitle", value, style)
    }

    /// Replaces body content with (text, level) paragraphs.
    pub fn set_body(&mut self, items: &[(String, u32)], style: Option<&RunStyle>) -> Result<()> {
        self.set_body_in("body", items, style)
    }

    /// Like `set_body` for any text placeholder, e.g. `content_2`.
    pub fn set_body_in(&mut self, name: &str, items: &[(String, u32)], style: Option<&RunStyle>) -> Result<()> {
        let target = self.resolve(name)?;
        let body = self.text_body_mut(&target)?;
        text::set_paragraphs(body, items, style);
        Ok(())
    }

    /// Restyles the existing runs of a placeholder. Returns the number of
    /// runs touched; a placeholder without text has none.
    pub fn set_text_style(&mut self, name: &str, style: &RunStyle) -> Result<usize> {
        let target = self.resolve(name)?;
        let shape = self.shape_for_mut(&target)?;
        let count = shape
            .child_mut("txBody")
            .map(|body| text::restyle_runs(body, style))
            .unwrap_or(0);
        debug!("Restyled {} runs in {} on slide {}", count, target.key(), self.number);
        Ok(count)
    }

    pub fn add_bullet(&mut self, value: &str, level: u32, style: Option<&RunStyle>) -> Result<()> {
        let target = self.resolve("body")?;
        let body = self.text_body_mut(&target)?;
        text::append_paragraph(body, value, level, style);
        Ok(())
    }

    /// Geometry of a placeholder, falling back to the layout's.
    pub fn placeholder_position(&self, name: &str) -> Result<Position> {
        let target = self.resolve(name)?;
        self.shapes()
            .into_iter()
            .find(|s| s.placeholder.as_ref() == Some(&target))
            .and_then(|s| s.position)
            .ok_or_else(|| {
                SlideError::ContentError(format!(
                    "Placeholder '{}' on slide {} has no position",
                    name, self.number
                ))
            })
    }

    /// Removes an empty placeholder that is being replaced by other content.
    pub(crate) fn take_placeholder(&mut self, name: &str) -> Result<()> {
        let target = self.resolve(name)?;
        let tree = self.sp_tree_mut()?;
        tree.remove_where(|shape| {
            shapes::placeholder_element(shape)
                .map(PlaceholderInfo::from_ph)
                .as_ref()
                == Some(&target)
                && shape.child("txBody").map(text::body_text).unwrap_or_default().trim().is_empty()
        });
        Ok(())
    }

    fn append_shape(&mut self, build: impl FnOnce(u32) -> Result<Element>) -> Result<u32> {
        let tree = self.sp_tree_mut()?;
        let id = shapes::next_shape_id(tree);
        let shape = build(id)?;
        tree.push(shape);
        Ok(id)
    }

    pub fn add_text_box(&mut self, value: &str, position: Position, style: Option<&RunStyle>) -> Result<u32> {
        let paragraphs: Vec<(String, u32)> = value.split('\n').map(|l| (l.to_string(), 0)).collect();
        self.append_shape(|id| {
            Ok(shapes::text_box(
                id,
                &format!("TextBox {}", id - 1),
                position,
                &paragraphs,
                style,
            ))
        })
    }

    pub fn add_table(&mut self, rows: &[Vec<String>], position: Position, header: bool) -> Result<u32> {
        self.append_shape(|id| shapes::table(id, &format!("Table {}", id - 1), position, rows, header))
    }

    pub(crate) fn add_picture(&mut self, r_embed: &str, position: Position, descr: Option<&str>) -> Result<u32> {
        self.append_shape(|id| {
            Ok(shapes::picture(
                id,
                &format!("Picture {}", id - 1),
                descr,
                r_embed,
                position,
            ))
        })
    }

    /// Updates one cell of the `table_index`th table (all 0-based).
    pub fn update_table_cell(&mut self, table_index: usize, row: usize, col: usize, value: &str) -> Result<()> {
        let number = self.number;
        let tree = self.sp_tree_mut()?;
        let count = tree
            .elements()
            .filter(|e| e.is("graphicFrame") && !e.descendants("tbl").is_empty())
            .count();
        let frame = tree
            .elements_mut()
            .filter(|e| e.is("graphicFrame") && !e.descendants("tbl").is_empty())
            .nth(table_index)
            .ok_or_else(|| {
                SlideError::InvalidArgument(format!(
                    "Table index {} out of range; slide {} has {} table(s)",
                    table_index, number, count
                ))
            })?;
        shapes::set_table_cell(frame, row, col, value)
    }

    pub fn describe(&self) -> SlideDescription {
        let shapes = self.shapes();
        SlideDescription {
            slide_number: self.number,
            layout: self.layout_name().to_string(),
            title: self.title(),
            subtitle: self.subtitle(),
            body: self.body(),
            placeholders: self.placeholders(),
            shapes: shapes
                .iter()
                .map(|s| ShapeSummary {
                    id: s.id,
                    name: s.name.clone(),
                    kind: s.kind,
                    placeholder: s
                        .placeholder
                        .as_ref()
                        .map(|p| placeholder::friendly_name(p.effective_type()).to_string()),
                    text: s.text(),
                    position: s.position,
                })
                .collect(),
            notes: self.notes(),
        }
    }
}
