use super::types::PdfExtractor;
use super::ExtractionError;

/// Text-layer extractor backed by the pdf-extract crate.
/// Handles digital PDFs with embedded text.
pub struct PdfTextExtractor;

impl PdfExtractor for PdfTextExtractor {
    fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
            .map_err(|e| ExtractionError::PdfParsing(e.to_string()))?;
        Ok(pages.concat())
    }
}
