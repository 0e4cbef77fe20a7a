use std::path::Path;

use tracing::{debug, info, warn};

use super::pdf::PdfTextExtractor;
use super::pdfium::PdfiumRenderer;
use super::types::{
    EngineMethod, ExtractionOutcome, OcrEngine, PdfExtractor, PdfPageRenderer, TextExtractor,
};
use super::ExtractionError;
use crate::config::DEFAULT_OCR_LANGUAGE;

/// Minimum significant characters the text layer must yield before the
/// native result is accepted without the OCR fallback.
pub const NATIVE_TEXT_THRESHOLD_CHARS: usize = 100;

/// Rasterization resolution for the OCR fallback.
pub const OCR_RENDER_DPI: u32 = 500;

/// Hybrid extraction engine: fast text-layer read first, rasterize + OCR
/// when the text layer is missing or too thin (scanned documents).
///
/// Every internal fault degrades to empty text under the method tag of the
/// stage that ran last; the engine itself never fails.
pub struct HybridExtractor {
    pdf_extractor: Box<dyn PdfExtractor + Send + Sync>,
    page_renderer: Box<dyn PdfPageRenderer + Send + Sync>,
    ocr_engine: Box<dyn OcrEngine + Send + Sync>,
    ocr_language: String,
}

impl HybridExtractor {
    pub fn new(
        pdf_extractor: Box<dyn PdfExtractor + Send + Sync>,
        page_renderer: Box<dyn PdfPageRenderer + Send + Sync>,
        ocr_engine: Box<dyn OcrEngine + Send + Sync>,
    ) -> Self {
        Self {
            pdf_extractor,
            page_renderer,
            ocr_engine,
            ocr_language: DEFAULT_OCR_LANGUAGE.to_string(),
        }
    }

    /// Set the OCR language model (e.g. "spa", "eng").
    pub fn with_language(mut self, lang: &str) -> Self {
        self.ocr_language = lang.to_string();
        self
    }

    fn native_text(&self, pdf_bytes: &[u8]) -> String {
        match self.pdf_extractor.extract_text(pdf_bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Native text extraction failed, treating as empty");
                String::new()
            }
        }
    }

    /// OCR every page and concatenate the results in page order.
    fn ocr_text(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
        let page_count = self.page_renderer.page_count(pdf_bytes)?;
        let mut text = String::new();
        for page_index in 0..page_count {
            let png = self
                .page_renderer
                .render_page(pdf_bytes, page_index, OCR_RENDER_DPI)?;
            let page_text = self.ocr_engine.ocr_image(&png, &self.ocr_language)?;
            text.push_str(&page_text);
            text.push_str("\n\n");
        }
        debug!(pages = page_count, chars = text.len(), "OCR fallback finished");
        Ok(text)
    }
}

impl TextExtractor for HybridExtractor {
    fn extract(&self, path: &Path) -> ExtractionOutcome {
        let pdf_bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read PDF file");
                Vec::new()
            }
        };

        let native = if pdf_bytes.is_empty() {
            String::new()
        } else {
            self.native_text(&pdf_bytes)
        };

        if native.trim().chars().count() >= NATIVE_TEXT_THRESHOLD_CHARS {
            debug!(chars = native.len(), "Text layer sufficient, skipping OCR");
            return ExtractionOutcome {
                text: native,
                method: EngineMethod::NativeText,
            };
        }

        info!(
            native_chars = native.trim().chars().count(),
            "Text layer insufficient, falling back to OCR"
        );

        let text = if pdf_bytes.is_empty() {
            String::new()
        } else {
            match self.ocr_text(&pdf_bytes) {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "OCR fallback failed, returning empty text");
                    String::new()
                }
            }
        };

        ExtractionOutcome {
            text,
            method: EngineMethod::Ocr,
        }
    }
}

/// Build the production engine: pdf-extract text layer, PDFium rasterizer,
/// and Tesseract when compiled in (otherwise OCR degrades to empty text).
pub fn default_engine() -> HybridExtractor {
    #[cfg(feature = "ocr")]
    let ocr: Box<dyn OcrEngine + Send + Sync> = Box::new(super::ocr::TesseractOcr::new());
    #[cfg(not(feature = "ocr"))]
    let ocr: Box<dyn OcrEngine + Send + Sync> = Box::new(super::ocr::UnavailableOcr);

    HybridExtractor::new(Box::new(PdfTextExtractor), Box::new(PdfiumRenderer), ocr)
}

/// Fixed-outcome extractor for tests of the ingestion workflow and API.
pub struct MockExtractor {
    pub text: String,
    pub method: EngineMethod,
}

impl MockExtractor {
    pub fn native(text: &str) -> Self {
        Self {
            text: text.to_string(),
            method: EngineMethod::NativeText,
        }
    }

    pub fn ocr(text: &str) -> Self {
        Self {
            text: text.to_string(),
            method: EngineMethod::Ocr,
        }
    }
}

impl TextExtractor for MockExtractor {
    fn extract(&self, _path: &Path) -> ExtractionOutcome {
        ExtractionOutcome {
            text: self.text.clone(),
            method: self.method,
        }
    }
}
