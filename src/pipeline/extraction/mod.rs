pub mod engine;
pub mod ocr;
pub mod pdf;
pub mod pdfium;
pub mod types;

pub use engine::*;
pub use ocr::*;
pub use pdf::*;
pub use pdfium::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("PDF rendering failed on page {page}: {reason}")]
    PdfRendering { page: usize, reason: String },

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("OCR initialization failed: {0}")]
    OcrInit(String),

    #[error("OCR processing failed: {0}")]
    OcrProcessing(String),

    #[error("OCR engine not available in this build")]
    OcrUnavailable,
}
