use std::path::Path;

use super::ExtractionError;

/// What one extraction run produced.
///
/// The outcome is a tagged result, never an error: an engine that could not
/// read anything reports empty text under the method that ran last, and the
/// caller decides whether that constitutes a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionOutcome {
    pub text: String,
    pub method: EngineMethod,
}

/// Which extraction stage produced the returned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMethod {
    /// The PDF's embedded text layer was sufficient.
    NativeText,
    /// The OCR fallback ran (whether or not it recovered any text).
    Ocr,
}

impl EngineMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NativeText => "native-text",
            Self::Ocr => "tesseract-ocr",
        }
    }
}

/// Text-layer extraction abstraction.
pub trait PdfExtractor {
    /// Read the embedded text of every page, concatenated in page order.
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// Page rasterization abstraction for the OCR fallback.
pub trait PdfPageRenderer {
    fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, ExtractionError>;

    /// Render one page (0-based) to a PNG at the requested DPI.
    fn render_page(
        &self,
        pdf_bytes: &[u8],
        page_index: usize,
        dpi: u32,
    ) -> Result<Vec<u8>, ExtractionError>;
}

/// OCR engine abstraction (allows mocking for tests).
pub trait OcrEngine {
    fn ocr_image(&self, image_bytes: &[u8], lang: &str) -> Result<String, ExtractionError>;
}

/// Main extraction seam consumed by the ingestion workflow.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> ExtractionOutcome;
}
