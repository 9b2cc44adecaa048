// ABOUTME: Media tools: images and tables placed into placeholders or at explicit positions
// ABOUTME: Image dimensions come from the image crate so aspect ratio is preserved

use crate::core::presentation::Presentation;
use crate::errors::{Result, SlideError};
use crate::oxml::ns::content_type;
use crate::oxml::shapes::{self, Position, DEFAULT_ROW_HEIGHT};
use crate::tools::{centered, Placement};
use crate::utils::{file_extension, validate_file_exists};
use log::{debug, info};
use std::io::Cursor;
use std::path::Path;

/// EMUs per pixel at 96 dpi.
const EMU_PER_PIXEL: i64 = 9_525;

/// Pixel size and file extension of an encoded image. The format sniffed
/// from the bytes wins over the file name.
fn inspect_image(data: &[u8], path: &Path) -> Result<(u32, u32, String)> {
    let reader = image::io::Reader::new(Cursor::new(data)).with_guessed_format()?;
    let guessed = reader
        .format()
        .and_then(|f| f.extensions_str().first().map(|e| e.to_string()));
    let ext = guessed
        .or_else(|| file_extension(path))
        .ok_or_else(|| SlideError::ImageError(format!("Cannot tell the format of {:?}", path)))?;
    if content_type::for_image_extension(&ext).is_none() {
        return Err(SlideError::ImageError(format!("Unsupported image format: .{}", ext)));
    }
    let (w, h) = reader.into_dimensions()?;
    if w == 0 || h == 0 {
        return Err(SlideError::ImageError(format!("Image {:?} has no pixels", path)));
    }
    Ok((w, h, ext))
}

/// Largest box with the image's aspect ratio that fits `frame`, centered in it.
fn fit(frame: Position, px_w: u32, px_h: u32) -> Position {
    let scale = (frame.cx as f64 / px_w as f64).min(frame.cy as f64 / px_h as f64);
    let cx = (px_w as f64 * scale).round() as i64;
    let cy = (px_h as f64 * scale).round() as i64;
    Position::new(frame.x + (frame.cx - cx) / 2, frame.y + (frame.cy - cy) / 2, cx, cy)
}

fn image_position(
    pres: &Presentation,
    slide_number: usize,
    placement: &Placement,
    px_w: u32,
    px_h: u32,
) -> Result<Position> {
    if let Some(name) = &placement.placeholder {
        let frame = pres.slide(slide_number)?.placeholder_position(name)?;
        return Ok(fit(frame, px_w, px_h));
    }
    let aspect = px_h as f64 / px_w as f64;
    match placement.bounds()? {
        (Some(x), Some(y), Some(cx), Some(cy)) => Ok(Position::new(x, y, cx, cy)),
        (Some(x), Some(y), Some(cx), None) => Ok(Position::new(x, y, cx, (cx as f64 * aspect).round() as i64)),
        (Some(x), Some(y), None, Some(cy)) => Ok(Position::new(x, y, (cy as f64 / aspect).round() as i64, cy)),
        (Some(x), Some(y), None, None) => Ok(Position::new(
            x,
            y,
            px_w as i64 * EMU_PER_PIXEL,
            px_h as i64 * EMU_PER_PIXEL,
        )),
        (None, None, None, None) => {
            let (w, h) = pres.slide_size();
            Ok(fit(centered((w, h), w / 2, h / 2), px_w, px_h))
        }
        _ => Err(SlideError::InvalidArgument(
            "Give both left and top, or neither".to_string(),
        )),
    }
}

/// Embeds an image file on a slide and returns the picture's shape id.
/// An empty placeholder used as the target is replaced by the picture.
pub fn add_image(
    pres: &mut Presentation,
    slide_number: usize,
    path: &Path,
    placement: &Placement,
    alt_text: Option<&str>,
) -> Result<u32> {
    validate_file_exists(path)?;
    pres.slide(slide_number)?;
    let data = std::fs::read(path)?;
    let (px_w, px_h, ext) = inspect_image(&data, path)?;
    let position = image_position(pres, slide_number, placement, px_w, px_h)?;
    if let Some(name) = &placement.placeholder {
        pres.slide_mut(slide_number)?.take_placeholder(name)?;
    }
    debug!("Placing {}x{} image at {:?}", px_w, px_h, position);
    let id = pres.add_image_bytes(slide_number, data, &ext, position, alt_text)?;
    info!("Added image {:?} to slide {}", path, slide_number);
    Ok(id)
}

/// Adds a table and returns its shape id. With `header`, the first row is
/// styled as a header row.
pub fn add_table(
    pres: &mut Presentation,
    slide_number: usize,
    rows: &[Vec<String>],
    placement: &Placement,
    header: bool,
) -> Result<u32> {
    if rows.is_empty() || rows.iter().all(|r| r.is_empty()) {
        return Err(SlideError::ContentError(
            "Table needs at least one row and one column".to_string(),
        ));
    }
    pres.slide(slide_number)?;
    let (slide_w, slide_h) = pres.slide_size();
    let natural_height = rows.len() as i64 * DEFAULT_ROW_HEIGHT;

    let position = if let Some(name) = &placement.placeholder {
        let frame = pres.slide(slide_number)?.placeholder_position(name)?;
        Position::new(frame.x, frame.y, frame.cx, natural_height.min(frame.cy).max(DEFAULT_ROW_HEIGHT))
    } else {
        match placement.bounds()? {
            (Some(x), Some(y), cx, cy) => Position::new(
                x,
                y,
                cx.unwrap_or((slide_w - 2 * x).max(slide_w / 4)),
                cy.unwrap_or(natural_height),
            ),
            (None, None, None, None) => centered((slide_w, slide_h), slide_w * 8 / 10, natural_height),
            _ => {
                return Err(SlideError::InvalidArgument(
                    "Give both left and top, or neither".to_string(),
                ))
            }
        }
    };
    // Must fail before the placeholder is removed.
    shapes::table(0, "", position, rows, header)?;
    let slide = pres.slide_mut(slide_number)?;
    if let Some(name) = &placement.placeholder {
        slide.take_placeholder(name)?;
    }
    slide.add_table(rows, position, header)
}

pub fn update_table_cell(
    pres: &mut Presentation,
    slide_number: usize,
    table_index: usize,
    row: usize,
    col: usize,
    value: &str,
) -> Result<()> {
    pres.slide_mut(slide_number)?
        .update_table_cell(table_index, row, col, value)
}
