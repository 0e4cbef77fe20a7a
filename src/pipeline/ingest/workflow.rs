use std::io::Write;
use std::time::Instant;

use chrono::Utc;
use rusqlite::Connection;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::IngestError;
use crate::audit::AuditSink;
use crate::config::{MAX_UPLOAD_BYTES, MIN_EXTRACTED_CHARS};
use crate::db::repository::insert_document;
use crate::db::DatabaseError;
use crate::models::{Document, ExtractionMethod, User};
use crate::pipeline::extraction::{EngineMethod, TextExtractor};

/// One file taken from the upload request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Orchestrates upload validation, temp-file lifetime, extraction, result
/// validation and atomic persistence of one document.
///
/// Both collaborators are injected per call site: the extraction engine is a
/// trait object and the audit sink is request-scoped, never process-global.
pub struct IngestionWorkflow<'a> {
    engine: &'a dyn TextExtractor,
    audit: &'a dyn AuditSink,
}

impl<'a> IngestionWorkflow<'a> {
    pub fn new(engine: &'a dyn TextExtractor, audit: &'a dyn AuditSink) -> Self {
        Self { engine, audit }
    }

    /// Run the full ingestion for `owner`.
    ///
    /// On success exactly one document row exists; on any failure none does.
    pub fn ingest(
        &self,
        conn: &mut Connection,
        upload: Option<UploadedFile>,
        owner: &User,
    ) -> Result<Document, IngestError> {
        let Some(upload) = upload else {
            warn!(user = %owner.username, "Upload attempted without a file");
            self.audit
                .record(&owner.username, "upload_rejected", "no file in request");
            return Err(IngestError::MissingFile);
        };

        if !upload.filename.to_lowercase().ends_with(".pdf") {
            warn!(
                user = %owner.username,
                filename = %upload.filename,
                "Upload rejected: not a PDF"
            );
            self.audit.record(
                &owner.username,
                "upload_rejected",
                &format!("not a pdf: {}", upload.filename),
            );
            return Err(IngestError::UnsupportedFormat {
                filename: upload.filename,
            });
        }

        let size_bytes = upload.bytes.len() as u64;
        if size_bytes > MAX_UPLOAD_BYTES {
            warn!(
                user = %owner.username,
                filename = %upload.filename,
                size_bytes,
                "Upload rejected: file too large"
            );
            self.audit.record(
                &owner.username,
                "upload_rejected",
                &format!("too large: {} bytes ({})", size_bytes, upload.filename),
            );
            return Err(IngestError::FileTooLarge { size_bytes });
        }

        match self.process(conn, &upload, size_bytes, owner) {
            Ok(document) => {
                info!(
                    user = %owner.username,
                    document_id = %document.id,
                    filename = %document.filename,
                    method = document.method.as_str(),
                    seconds = document.processing_seconds,
                    "Document processed and stored"
                );
                self.audit.record(
                    &owner.username,
                    "upload_stored",
                    &format!(
                        "document:{} file:{} method:{}",
                        document.id,
                        document.filename,
                        document.method.as_str()
                    ),
                );
                Ok(document)
            }
            Err(e @ IngestError::InsufficientText { .. }) => {
                warn!(
                    user = %owner.username,
                    filename = %upload.filename,
                    "Upload rejected: insufficient extracted text"
                );
                self.audit.record(
                    &owner.username,
                    "upload_rejected",
                    &format!("insufficient text: {}", upload.filename),
                );
                Err(e)
            }
            Err(e) => {
                error!(
                    user = %owner.username,
                    filename = %upload.filename,
                    error = %e,
                    "Unexpected fault while processing upload"
                );
                self.audit.record(
                    &owner.username,
                    "upload_failed",
                    &format!("{}: {e}", upload.filename),
                );
                Err(e)
            }
        }
    }

    fn process(
        &self,
        conn: &mut Connection,
        upload: &UploadedFile,
        size_bytes: u64,
        owner: &User,
    ) -> Result<Document, IngestError> {
        // Scoped temp file: removed when dropped, on every exit path.
        let mut temp = tempfile::Builder::new()
            .prefix("docvault-upload-")
            .suffix(".pdf")
            .tempfile()
            .map_err(|e| IngestError::Processing(format!("temp file: {e}")))?;
        temp.write_all(&upload.bytes)
            .and_then(|()| temp.flush())
            .map_err(|e| IngestError::Processing(format!("temp file: {e}")))?;

        info!(
            user = %owner.username,
            filename = %upload.filename,
            "Starting text extraction"
        );

        let started = Instant::now();
        let outcome = self.engine.extract(temp.path());
        let processing_seconds = round_seconds(started.elapsed().as_secs_f64());

        let method = match outcome.method {
            EngineMethod::NativeText => ExtractionMethod::Native,
            EngineMethod::Ocr => ExtractionMethod::Ocr,
        };

        let text = outcome.text.trim();
        let chars = text.chars().count();
        if chars < MIN_EXTRACTED_CHARS {
            return Err(IngestError::InsufficientText { chars });
        }

        let now = Utc::now();
        let document = Document {
            id: Uuid::new_v4(),
            owner_id: owner.id,
            filename: upload.filename.clone(),
            size_bytes,
            extracted_text: text.to_string(),
            method,
            processing_seconds: Some(processing_seconds),
            created_at: now,
            updated_at: now,
            deleted: false,
            deleted_at: None,
        };

        // All-or-nothing: either the row is committed or nothing is visible.
        let tx = conn.transaction().map_err(db_fault)?;
        insert_document(&tx, &document).map_err(store_fault)?;
        tx.commit().map_err(db_fault)?;

        if let Err(e) = temp.close() {
            warn!(error = %e, "Failed to remove temporary upload file");
        }

        Ok(document)
    }
}

/// Round a duration to millisecond precision (3 decimals).
fn round_seconds(secs: f64) -> f64 {
    (secs * 1000.0).round() / 1000.0
}

fn db_fault(e: rusqlite::Error) -> IngestError {
    store_fault(DatabaseError::Sqlite(e))
}

/// Map persistence failures: schema/constraint violations become field-level
/// validation errors, everything else is an unexpected fault.
fn store_fault(e: DatabaseError) -> IngestError {
    match e {
        DatabaseError::Sqlite(rusqlite::Error::SqliteFailure(err, message))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            IngestError::Validation {
                field: "document".into(),
                message: message.unwrap_or_else(|| err.to_string()),
            }
        }
        other => IngestError::Processing(other.to_string()),
    }
}
