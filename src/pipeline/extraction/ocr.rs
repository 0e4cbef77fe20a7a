use super::types::OcrEngine;
use super::ExtractionError;

/// Bundled Tesseract OCR engine.
/// Only available when compiled with the `ocr` feature flag.
#[cfg(feature = "ocr")]
pub struct TesseractOcr {
    tessdata_dir: Option<std::path::PathBuf>,
}

#[cfg(feature = "ocr")]
impl TesseractOcr {
    /// Use the system tessdata location.
    pub fn new() -> Self {
        Self { tessdata_dir: None }
    }

    /// Point the engine at an explicit tessdata directory.
    pub fn with_tessdata(dir: &std::path::Path) -> Self {
        Self {
            tessdata_dir: Some(dir.to_path_buf()),
        }
    }
}

#[cfg(feature = "ocr")]
impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "ocr")]
impl OcrEngine for TesseractOcr {
    fn ocr_image(&self, image_bytes: &[u8], lang: &str) -> Result<String, ExtractionError> {
        let tessdata = match &self.tessdata_dir {
            Some(dir) => Some(dir.to_str().ok_or_else(|| {
                ExtractionError::OcrInit("Invalid tessdata path".into())
            })?),
            None => None,
        };

        let tess = tesseract::Tesseract::new(tessdata, Some(lang))
            .map_err(|e| ExtractionError::OcrInit(format!("{e:?}")))?;

        let mut tess = tess
            .set_image_from_mem(image_bytes)
            .map_err(|e| ExtractionError::OcrProcessing(format!("{e:?}")))?;

        tess.get_text()
            .map_err(|e| ExtractionError::OcrProcessing(format!("{e:?}")))
    }
}

/// Placeholder used when the crate is built without the `ocr` feature.
/// Every call fails, which the extraction engine degrades to empty text.
pub struct UnavailableOcr;

impl OcrEngine for UnavailableOcr {
    fn ocr_image(&self, _image_bytes: &[u8], _lang: &str) -> Result<String, ExtractionError> {
        Err(ExtractionError::OcrUnavailable)
    }
}

/// Mock OCR engine for unit testing without Tesseract.
pub struct MockOcrEngine {
    pub text: String,
}

impl MockOcrEngine {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

impl OcrEngine for MockOcrEngine {
    fn ocr_image(&self, _image_bytes: &[u8], _lang: &str) -> Result<String, ExtractionError> {
        Ok(self.text.clone())
    }
}
