use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ExtractionMethod;

/// Number of characters shown in a text preview before truncation.
const SUMMARY_CHARS: usize = 200;

/// The persisted record of one processed PDF.
///
/// Created exactly once by the ingestion workflow; afterwards only the
/// soft-delete lifecycle (and the administrative restore/hard-delete paths)
/// may mutate it. The owner reference never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub filename: String,
    pub size_bytes: u64,
    pub extracted_text: String,
    pub method: ExtractionMethod,
    /// Wall-clock extraction time in seconds, rounded to 3 decimals.
    pub processing_seconds: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted: bool,
    /// Set iff `deleted` is true.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Document {
    /// File size rendered for humans, e.g. `"2.0 KB"`.
    pub fn human_size(&self) -> String {
        human_size(self.size_bytes)
    }

    /// Preview of the extracted text: the first 200 characters, with an
    /// ellipsis replacing the tail when the text is longer.
    pub fn summary(&self) -> String {
        let total = self.extracted_text.chars().count();
        if total <= SUMMARY_CHARS {
            return self.extracted_text.clone();
        }
        let head: String = self.extracted_text.chars().take(SUMMARY_CHARS - 3).collect();
        format!("{head}...")
    }
}

/// Render a byte count with one decimal and the largest fitting unit.
pub fn human_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} TB")
}
