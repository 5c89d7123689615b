//! Print page rendering.
//!
//! The booth prints on a 425 x 638 pt page. Source photos are scaled to fill
//! that page at 300 DPI, center-cropped, and spooled as a JPEG that the print
//! command can send as-is.

use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use tempfile::NamedTempFile;

use crate::error::AgentError;

/// Page width in pixels (425 pt at 300 DPI).
pub const PAGE_WIDTH_PX: u32 = 1771;

/// Page height in pixels (638 pt at 300 DPI).
pub const PAGE_HEIGHT_PX: u32 = 2658;

const JPEG_QUALITY: u8 = 92;

/// Render `source` into a print-ready JPEG inside `spool_dir`.
///
/// The returned file is deleted when dropped.
pub fn render_page(source: &[u8], spool_dir: &Path) -> Result<NamedTempFile, AgentError> {
    let image = image::load_from_memory(source)?;
    let page = image
        .resize_to_fill(PAGE_WIDTH_PX, PAGE_HEIGHT_PX, FilterType::Lanczos3)
        .to_rgb8();

    let mut file = tempfile::Builder::new()
        .prefix("print-")
        .suffix(".jpg")
        .tempfile_in(spool_dir)
        .map_err(|e| AgentError::Render(format!("cannot create spool file: {e}")))?;

    {
        let mut writer = BufWriter::new(file.as_file_mut());
        JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY).encode_image(&page)?;
        writer
            .flush()
            .map_err(|e| AgentError::Render(format!("cannot write spool file: {e}")))?;
    }

    Ok(file)
}
