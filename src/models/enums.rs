use serde::{Deserialize, Serialize};

use crate::db::DatabaseError;

/// How the stored text was obtained from the uploaded PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    /// Read directly from the PDF's embedded text layer.
    Native,
    /// Recovered from rasterized pages via optical character recognition.
    Ocr,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Ocr => "ocr",
        }
    }
}

impl std::str::FromStr for ExtractionMethod {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "native" => Ok(Self::Native),
            "ocr" => Ok(Self::Ocr),
            _ => Err(DatabaseError::InvalidEnum {
                field: "ExtractionMethod".into(),
                value: s.into(),
            }),
        }
    }
}
