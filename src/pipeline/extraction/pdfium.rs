//! PDF page rasterization via Google PDFium.
//!
//! `PdfiumRenderer` is stateless (`Send + Sync`). Each operation creates a
//! fresh `Pdfium` instance because the upstream type is `!Send`. The OS
//! caches `dlopen`/`LoadLibrary` calls, so repeat loads are near-free.

use std::io::Cursor;

use image::ImageOutputFormat;
use pdfium_render::prelude::*;
use tracing::{debug, warn};

use super::types::PdfPageRenderer;
use super::ExtractionError;

/// Maximum dimension (width or height) for rendered page images.
/// Prevents OOM on extremely large pages; a Letter page at 500 DPI
/// (4250x5500 px) stays under this guard.
const MAX_DIMENSION_PX: u32 = 8192;

/// PDF points per inch (standard PDF unit).
const POINTS_PER_INCH: f32 = 72.0;

/// Renders PDF pages to PNG images using Google PDFium.
pub struct PdfiumRenderer;

/// Load the PDFium dynamic library.
///
/// Discovery order:
/// 1. `PDFIUM_DYNAMIC_LIB_PATH` env var (explicit path to the library file)
/// 2. Alongside the running executable
/// 3. System library search paths
fn load_pdfium() -> Result<Pdfium, ExtractionError> {
    if let Ok(path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        debug!(path = %path, "Loading PDFium from env var");
        let bindings =
            Pdfium::bind_to_library(&path).map_err(|e| ExtractionError::PdfRendering {
                page: 0,
                reason: format!("Failed to load PDFium from {path}: {e}"),
            })?;
        return Ok(Pdfium::new(bindings));
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(exe_dir) = exe.parent() {
            let lib_path =
                Pdfium::pdfium_platform_library_name_at_path(exe_dir.to_string_lossy().as_ref());
            if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
                debug!(dir = %exe_dir.display(), "Loaded PDFium from executable directory");
                return Ok(Pdfium::new(bindings));
            }
        }
    }

    let bindings = Pdfium::bind_to_system_library().map_err(|e| ExtractionError::PdfRendering {
        page: 0,
        reason: format!(
            "PDFium library not found. Set PDFIUM_DYNAMIC_LIB_PATH or install PDFium: {e}"
        ),
    })?;
    Ok(Pdfium::new(bindings))
}

/// Compute pixel dimensions for rendering, applying the dimension guard.
///
/// Returns (width_px, height_px), both clamped to [1, MAX_DIMENSION_PX],
/// preserving aspect ratio when capping.
fn compute_render_dimensions(width_points: f32, height_points: f32, dpi: u32) -> (u32, u32) {
    let scale = dpi as f32 / POINTS_PER_INCH;
    let raw_w = (width_points * scale).max(1.0);
    let raw_h = (height_points * scale).max(1.0);

    let max_dim = raw_w.max(raw_h);
    if max_dim > MAX_DIMENSION_PX as f32 {
        let ratio = MAX_DIMENSION_PX as f32 / max_dim;
        let w = ((raw_w * ratio) as u32).clamp(1, MAX_DIMENSION_PX);
        let h = ((raw_h * ratio) as u32).clamp(1, MAX_DIMENSION_PX);
        (w, h)
    } else {
        (raw_w as u32, raw_h as u32)
    }
}

impl PdfPageRenderer for PdfiumRenderer {
    fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, ExtractionError> {
        let pdfium = load_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(|e| ExtractionError::PdfParsing(format!("Failed to load PDF: {e}")))?;
        Ok(document.pages().len() as usize)
    }

    fn render_page(
        &self,
        pdf_bytes: &[u8],
        page_index: usize,
        dpi: u32,
    ) -> Result<Vec<u8>, ExtractionError> {
        let pdfium = load_pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(|e| ExtractionError::PdfParsing(format!("Failed to load PDF: {e}")))?;

        let pages = document.pages();
        let index = u16::try_from(page_index).map_err(|_| ExtractionError::PdfRendering {
            page: page_index,
            reason: format!("Page index {page_index} exceeds u16 maximum"),
        })?;

        let page = pages.get(index).map_err(|_| ExtractionError::PdfRendering {
            page: page_index,
            reason: format!(
                "Page {page_index} out of range (document has {} pages)",
                pages.len()
            ),
        })?;

        let width_points = page.width().value;
        let height_points = page.height().value;
        let (target_w, target_h) = compute_render_dimensions(width_points, height_points, dpi);

        let uncapped_w = (width_points * dpi as f32 / POINTS_PER_INCH) as u32;
        if target_w != uncapped_w {
            warn!(
                page = page_index,
                raw_width = uncapped_w,
                capped_width = target_w,
                "Page dimensions capped to {MAX_DIMENSION_PX}px"
            );
        }

        let config = PdfRenderConfig::new()
            .set_target_width(target_w as i32)
            .set_maximum_height(target_h as i32);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| ExtractionError::PdfRendering {
                page: page_index,
                reason: format!("Rendering failed: {e}"),
            })?;

        let mut png_buf = Cursor::new(Vec::new());
        bitmap
            .as_image()
            .write_to(&mut png_buf, ImageOutputFormat::Png)
            .map_err(|e| ExtractionError::ImageProcessing(format!("Failed to encode PNG: {e}")))?;

        debug!(
            page = page_index,
            width = target_w,
            height = target_h,
            png_size = png_buf.get_ref().len(),
            "Rendered PDF page"
        );

        Ok(png_buf.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_scale_with_dpi() {
        // Letter page: 612x792 points
        let (w, h) = compute_render_dimensions(612.0, 792.0, 72);
        assert_eq!((w, h), (612, 792));

        let (w, h) = compute_render_dimensions(612.0, 792.0, 144);
        assert_eq!((w, h), (1224, 1584));
    }

    #[test]
    fn letter_page_at_500_dpi_is_not_capped() {
        let (w, h) = compute_render_dimensions(612.0, 792.0, 500);
        assert_eq!((w, h), (4250, 5500));
    }

    #[test]
    fn oversized_render_is_capped_preserving_aspect() {
        let (w, h) = compute_render_dimensions(612.0, 792.0, 2000);
        assert_eq!(h, MAX_DIMENSION_PX);
        assert!(w < h);
        // Aspect ratio of a Letter page, within rounding
        let ratio = w as f32 / h as f32;
        assert!((ratio - 612.0 / 792.0).abs() < 0.01);
    }

    #[test]
    fn degenerate_pages_render_at_least_one_pixel() {
        let (w, h) = compute_render_dimensions(0.0, 0.0, 300);
        assert_eq!((w, h), (1, 1));
    }
}
