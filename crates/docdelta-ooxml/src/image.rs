//! Embedded image resolution
//!
//! A drawing in `word/document.xml` points at its picture through a
//! relationship ID. The picture's identity is the SHA-256 of the media part,
//! or of the target URL for linked (external) pictures.
//!
//! OOXML uses EMUs (English Metric Units) for dimensions:
//! - 914400 EMUs = 1 inch
//! - 9525 EMUs = 1 pixel (at 96 DPI)

use docdelta_model::{content_hash, Image};

use crate::archive::OoxmlArchive;
use crate::document::RawDrawing;
use crate::error::{ExtractionError, Result};
use crate::relationships::{LinkTarget, Relationships};

/// EMUs per pixel at 96 DPI (9525)
pub const EMU_PER_PIXEL: i64 = 9525;

/// Convert EMUs to pixels at 96 DPI
pub fn emu_to_pixels(emu: i64) -> i64 {
    (emu as f64 / EMU_PER_PIXEL as f64).round() as i64
}

fn dimension(emu: Option<i64>) -> Option<u32> {
    emu.and_then(|e| u32::try_from(emu_to_pixels(e)).ok())
}

/// Build a model image from a parsed drawing
pub fn resolve_image(
    drawing: &RawDrawing,
    rels: &Relationships,
    archive: &OoxmlArchive,
) -> Result<Image> {
    let rel_id = drawing.rel_id.as_deref().unwrap_or_default();
    let hash = match rels.resolve(rel_id) {
        Some(LinkTarget::External(url)) => content_hash(url.as_bytes()),
        Some(LinkTarget::Part(path)) => {
            let bytes = archive
                .get(path)
                .ok_or_else(|| ExtractionError::UnreadablePart {
                    part: path.clone(),
                    reason: "media part missing from container".to_string(),
                })?;
            content_hash(bytes)
        }
        None => {
            return Err(ExtractionError::UnreadablePart {
                part: rel_id.to_string(),
                reason: "image relationship not found".to_string(),
            })
        }
    };

    Ok(Image {
        content_hash: hash,
        width: dimension(drawing.width_emu),
        height: dimension(drawing.height_emu),
        alt_text: drawing.alt.clone(),
        caption: None,
    })
}
