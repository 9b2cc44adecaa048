// ABOUTME: Shape-tree reading and shape builders for slides and layouts
// ABOUTME: Covers placeholders, text boxes, pictures and tables inside p:spTree

use crate::errors::{Result, SlideError};
use crate::oxml::ns::NS_TABLE;
use crate::oxml::text::{self, ParagraphInfo, RunStyle};
use crate::oxml::xml::Element;
use serde::{Deserialize, Serialize};

/// Default height of a freshly built table row.
pub const DEFAULT_ROW_HEIGHT: i64 = 370_840;

/// Offset and extent of a shape, in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Position {
    pub fn new(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self { x, y, cx, cy }
    }

    /// Reads `a:off`/`a:ext` from an `a:xfrm` (or `p:xfrm`) element.
    pub fn from_xfrm(xfrm: &Element) -> Option<Self> {
        let off = xfrm.child("off")?;
        let ext = xfrm.child("ext")?;
        Some(Self {
            x: off.attr_i64("x")?,
            y: off.attr_i64("y")?,
            cx: ext.attr_i64("cx")?,
            cy: ext.attr_i64("cy")?,
        })
    }

    pub fn to_xfrm(&self, qualified: &str) -> Element {
        Element::new(qualified)
            .with_child(Element::new("a:off").with_attr("x", self.x).with_attr("y", self.y))
            .with_child(
                Element::new("a:ext")
                    .with_attr("cx", self.cx)
                    .with_attr("cy", self.cy),
            )
    }
}

/// The `p:ph` marker of a placeholder shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderInfo {
    /// Raw `type` attribute; absent means a body placeholder.
    pub ph_type: Option<String>,
    pub idx: u32,
}

impl PlaceholderInfo {
    pub fn from_ph(ph: &Element) -> Self {
        Self {
            ph_type: ph.attr("type").map(|s| s.to_string()),
            idx: ph.attr_i64("idx").unwrap_or(0).max(0) as u32,
        }
    }

    pub fn effective_type(&self) -> &str {
        self.ph_type.as_deref().unwrap_or("body")
    }

    /// `type` or `type_idx`, used as a stable map key.
    pub fn key(&self) -> String {
        if self.idx > 0 {
            format!("{}_{}", self.effective_type(), self.idx)
        } else {
            self.effective_type().to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Text,
    Picture,
    Table,
    GraphicFrame,
    Group,
    Connector,
}

/// Read model of one shape in a shape tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeInfo {
    pub id: u32,
    pub name: String,
    pub kind: ShapeKind,
    pub position: Option<Position>,
    pub placeholder: Option<PlaceholderInfo>,
    pub paragraphs: Vec<ParagraphInfo>,
    pub alt_text: Option<String>,
    pub image_rel: Option<String>,
    /// Rows of cell text, for tables.
    pub table: Option<Vec<Vec<String>>>,
}

impl ShapeInfo {
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn non_visual(shape: &Element) -> Option<&Element> {
    shape
        .elements()
        .find(|e| e.local_name().starts_with("nv"))
}

/// The `p:ph` element of a shape, if it is a placeholder.
pub fn placeholder_element(shape: &Element) -> Option<&Element> {
    non_visual(shape)?.child("nvPr")?.child("ph")
}

pub fn read_shape(shape: &Element) -> Option<ShapeInfo> {
    let kind = match shape.local_name() {
        "sp" => ShapeKind::Text,
        "pic" => ShapeKind::Picture,
        "graphicFrame" => {
            if shape.descendants("tbl").is_empty() {
                ShapeKind::GraphicFrame
            } else {
                ShapeKind::Table
            }
        }
        "grpSp" => ShapeKind::Group,
        "cxnSp" => ShapeKind::Connector,
        _ => return None,
    };

    let c_nv_pr = non_visual(shape).and_then(|nv| nv.child("cNvPr"));
    let position = shape
        .child("spPr")
        .or_else(|| shape.child("grpSpPr"))
        .and_then(|sp| sp.child("xfrm"))
        .or_else(|| shape.child("xfrm"))
        .and_then(Position::from_xfrm);
    let paragraphs = shape
        .child("txBody")
        .map(text::read_paragraphs)
        .unwrap_or_default();
    let image_rel = shape
        .child("blipFill")
        .and_then(|b| b.child("blip"))
        .and_then(|b| b.attr("r:embed"))
        .map(|s| s.to_string());
    let table = if kind == ShapeKind::Table {
        shape.descendants("tbl").first().map(|tbl| read_table(tbl))
    } else {
        None
    };

    Some(ShapeInfo {
        id: c_nv_pr
            .and_then(|c| c.attr_i64("id"))
            .unwrap_or(0)
            .max(0) as u32,
        name: c_nv_pr
            .and_then(|c| c.attr("name"))
            .unwrap_or_default()
            .to_string(),
        kind,
        position,
        placeholder: placeholder_element(shape).map(PlaceholderInfo::from_ph),
        paragraphs,
        alt_text: c_nv_pr
            .and_then(|c| c.attr("descr"))
            .filter(|d| !d.trim().is_empty())
            .map(|s| s.to_string()),
        image_rel,
        table,
    })
}

/// Shapes of a tree in document order; group members follow their group.
pub fn read_shapes(sp_tree: &Element) -> Vec<ShapeInfo> {
    let mut shapes = Vec::new();
    for child in sp_tree.elements() {
        if let Some(info) = read_shape(child) {
            shapes.push(info);
        }
        if child.is("grpSp") {
            shapes.extend(read_shapes(child));
        }
    }
    shapes
}

/// One past the highest `cNvPr/@id` in the tree, never below 2.
pub fn next_shape_id(sp_tree: &Element) -> u32 {
    sp_tree
        .descendants("cNvPr")
        .iter()
        .filter_map(|c| c.attr_i64("id"))
        .max()
        .map(|m| (m + 1).max(2) as u32)
        .unwrap_or(2)
}

fn read_table(tbl: &Element) -> Vec<Vec<String>> {
    tbl.children_named("tr")
        .map(|tr| {
            tr.children_named("tc")
                .map(|tc| tc.child("txBody").map(text::body_text).unwrap_or_default())
                .collect()
        })
        .collect()
}

/// A slide shape copying a layout placeholder's `p:ph` and geometry.
pub fn placeholder_shape(id: u32, name: &str, ph: &Element, position: Option<Position>) -> Element {
    let nv = Element::new("p:nvSpPr")
        .with_child(Element::new("p:cNvPr").with_attr("id", id).with_attr("name", name))
        .with_child(
            Element::new("p:cNvSpPr")
                .with_child(Element::new("a:spLocks").with_attr("noGrp", "1")),
        )
        .with_child(Element::new("p:nvPr").with_child(ph.clone()));
    let mut sp_pr = Element::new("p:spPr");
    if let Some(pos) = position {
        sp_pr.push(pos.to_xfrm("a:xfrm"));
    }
    Element::new("p:sp")
        .with_child(nv)
        .with_child(sp_pr)
        .with_child(text::new_text_body("p:txBody"))
}

pub fn text_box(id: u32, name: &str, position: Position, paragraphs: &[(String, u32)], style: Option<&RunStyle>) -> Element {
    let nv = Element::new("p:nvSpPr")
        .with_child(Element::new("p:cNvPr").with_attr("id", id).with_attr("name", name))
        .with_child(Element::new("p:cNvSpPr").with_attr("txBox", "1"))
        .with_child(Element::new("p:nvPr"));
    let sp_pr = Element::new("p:spPr")
        .with_child(position.to_xfrm("a:xfrm"))
        .with_child(
            Element::new("a:prstGeom")
                .with_attr("prst", "rect")
                .with_child(Element::new("a:avLst")),
        )
        .with_child(Element::new("a:noFill"));
    let mut body = Element::new("p:txBody")
        .with_child(
            Element::new("a:bodyPr")
                .with_attr("wrap", "square")
                .with_attr("rtlCol", "0")
                .with_child(Element::new("a:spAutoFit")),
        )
        .with_child(Element::new("a:lstStyle"));
    text::set_paragraphs(&mut body, paragraphs, style);
    Element::new("p:sp").with_child(nv).with_child(sp_pr).with_child(body)
}

pub fn picture(id: u32, name: &str, descr: Option<&str>, r_embed: &str, position: Position) -> Element {
    let mut c_nv_pr = Element::new("p:cNvPr").with_attr("id", id).with_attr("name", name);
    if let Some(d) = descr {
        c_nv_pr.set_attr("descr", d);
    }
    let nv = Element::new("p:nvPicPr")
        .with_child(c_nv_pr)
        .with_child(
            Element::new("p:cNvPicPr")
                .with_child(Element::new("a:picLocks").with_attr("noChangeAspect", "1")),
        )
        .with_child(Element::new("p:nvPr"));
    let blip_fill = Element::new("p:blipFill")
        .with_child(Element::new("a:blip").with_attr("r:embed", r_embed))
        .with_child(Element::new("a:stretch").with_child(Element::new("a:fillRect")));
    let sp_pr = Element::new("p:spPr")
        .with_child(position.to_xfrm("a:xfrm"))
        .with_child(
            Element::new("a:prstGeom")
                .with_attr("prst", "rect")
                .with_child(Element::new("a:avLst")),
        );
    Element::new("p:pic")
        .with_child(nv)
        .with_child(blip_fill)
        .with_child(sp_pr)
}

fn table_cell(text_value: &str, bold: bool) -> Element {
    let style = RunStyle {
        bold: Some(true),
        ..RunStyle::default()
    };
    let mut body = Element::new("a:txBody")
        .with_child(Element::new("a:bodyPr"))
        .with_child(Element::new("a:lstStyle"));
    text::set_paragraphs(
        &mut body,
        &[(text_value.to_string(), 0)],
        if bold { Some(&style) } else { None },
    );
    Element::new("a:tc")
        .with_child(body)
        .with_child(Element::new("a:tcPr"))
}

/// A table graphic frame. Rows may be ragged; short rows are padded.
pub fn table(id: u32, name: &str, position: Position, rows: &[Vec<String>], header: bool) -> Result<Element> {
    let n_rows = rows.len();
    let n_cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    if n_rows == 0 || n_cols == 0 {
        return Err(SlideError::ContentError(
            "Table needs at least one row and one column".to_string(),
        ));
    }

    let col_width = position.cx / n_cols as i64;
    let row_height = (position.cy / n_rows as i64).max(DEFAULT_ROW_HEIGHT);

    let mut tbl_pr = Element::new("a:tblPr").with_attr("bandRow", "1");
    if header {
        tbl_pr.set_attr("firstRow", "1");
    }
    let mut grid = Element::new("a:tblGrid");
    for _ in 0..n_cols {
        grid.push(Element::new("a:gridCol").with_attr("w", col_width));
    }
    let mut tbl = Element::new("a:tbl").with_child(tbl_pr).with_child(grid);
    for (r, row) in rows.iter().enumerate() {
        let mut tr = Element::new("a:tr").with_attr("h", row_height);
        for c in 0..n_cols {
            let value = row.get(c).map(|s| s.as_str()).unwrap_or("");
            tr.push(table_cell(value, header && r == 0));
        }
        tbl.push(tr);
    }

    let nv = Element::new("p:nvGraphicFramePr")
        .with_child(Element::new("p:cNvPr").with_attr("id", id).with_attr("name", name))
        .with_child(
            Element::new("p:cNvGraphicFramePr")
                .with_child(Element::new("a:graphicFrameLocks").with_attr("noGrp", "1")),
        )
        .with_child(Element::new("p:nvPr"));
    let graphic = Element::new("a:graphic").with_child(
        Element::new("a:graphicData")
            .with_attr("uri", NS_TABLE)
            .with_child(tbl),
    );
    Ok(Element::new("p:graphicFrame")
        .with_child(nv)
        .with_child(position.to_xfrm("p:xfrm"))
        .with_child(graphic))
}

/// Replaces the text of one table cell (0-based row and column).
pub fn set_table_cell(frame: &mut Element, row: usize, col: usize, value: &str) -> Result<()> {
    let tbl = frame
        .find_mut(&["graphic", "graphicData", "tbl"])
        .ok_or_else(|| SlideError::ContentError("Shape is not a table".to_string()))?;
    let rows = tbl.children_named("tr").count();
    let tr = tbl
        .elements_mut()
        .filter(|e| e.is("tr"))
        .nth(row)
        .ok_or_else(|| {
            SlideError::InvalidArgument(format!("Row {} out of range (table has {} rows)", row, rows))
        })?;
    let cols = tr.children_named("tc").count();
    let tc = tr
        .elements_mut()
        .filter(|e| e.is("tc"))
        .nth(col)
        .ok_or_else(|| {
            SlideError::InvalidArgument(format!(
                "Column {} out of range (row has {} cells)",
                col, cols
            ))
        })?;
    let body = tc.get_or_create("a:txBody");
    // Keep the formatting of the first existing run.
    let style = text::read_paragraphs(body)
        .first()
        .and_then(|p| p.runs.first())
        .map(|r| r.style.clone())
        .filter(|s| !s.is_empty());
    text::set_paragraphs(body, &[(value.to_string(), 0)], style.as_ref());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_build_and_update() {
        let rows = vec![
            vec!["Name".to_string(), "Score".to_string()],
            vec!["Ada".to_string()],
        ];
        let mut frame = table(5, "Table 1", Position::new(0, 0, 6_000_000, 1_000_000), &rows, true).unwrap();
        let info = read_shape(&frame).unwrap();
        assert_eq!(info.kind, ShapeKind::Table);
        assert_eq!(
            info.table.as_ref().unwrap(),
            &vec![
                vec!["Name".to_string(), "Score".to_string()],
                vec!["Ada".to_string(), String::new()],
            ]
        );

        set_table_cell(&mut frame, 1, 1, "97").unwrap();
        let info = read_shape(&frame).unwrap();
        assert_eq!(info.table.unwrap()[1][1], "97");
        assert!(set_table_cell(&mut frame, 4, 0, "x").is_err());
    }

    #[test]
    fn test_picture_and_placeholder_read_back() {
        let pic = picture(3, "Picture 2", Some("A chart"), "rId2", Position::new(1, 2, 3, 4));
        let info = read_shape(&pic).unwrap();
        assert_eq!(info.kind, ShapeKind::Picture);
        assert_eq!(info.alt_text.as_deref(), Some("A chart"));
        assert_eq!(info.image_rel.as_deref(), Some("rId2"));
        assert_eq!(info.position, Some(Position::new(1, 2, 3, 4)));

        let ph = Element::new("p:ph").with_attr("idx", "1");
        let sp = placeholder_shape(4, "Content Placeholder 3", &ph, None);
        let info = read_shape(&sp).unwrap();
        let placeholder = info.placeholder.unwrap();
        assert_eq!(placeholder.effective_type(), "body");
        assert_eq!(placeholder.key(), "body_1");
    }

    #[test]
    fn test_next_shape_id() {
        let mut tree = Element::new("p:spTree");
        assert_eq!(next_shape_id(&tree), 2);
        tree.push(picture(7, "Picture", None, "rId1", Position::new(0, 0, 1, 1)));
        assert_eq!(next_shape_id(&tree), 8);
    }
}
