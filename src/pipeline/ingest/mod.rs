mod workflow;

pub use workflow::*;

use thiserror::Error;

use crate::config::MAX_UPLOAD_BYTES;

/// Terminal failures of the ingestion workflow.
///
/// Each variant maps to one stable machine-readable category at the API
/// boundary; no other error shape escapes the workflow.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("No file was sent with the request")]
    MissingFile,

    #[error("The file must be a PDF: {filename}")]
    UnsupportedFormat { filename: String },

    #[error(
        "The file is too large: {size_bytes} bytes (the limit is {MAX_UPLOAD_BYTES} bytes)"
    )]
    FileTooLarge { size_bytes: u64 },

    #[error(
        "Could not extract enough text from the PDF ({chars} significant characters). \
         The file may be corrupt or protected."
    )]
    InsufficientText { chars: usize },

    #[error("The document failed validation")]
    Validation { field: String, message: String },

    #[error("Error processing the PDF: {0}")]
    Processing(String),
}
