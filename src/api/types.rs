//! Shared types for the API layer.

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::Connection;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::audit::AuditSink;
use crate::config::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::db::open_database;
use crate::pipeline::extraction::TextExtractor;

/// Shared context for all API routes and middleware.
///
/// Connections are opened per request (SQLite handles the locking); the
/// extraction engine and audit sink are long-lived injected collaborators.
#[derive(Clone)]
pub struct ApiContext {
    pub db_path: PathBuf,
    pub engine: Arc<dyn TextExtractor>,
    pub audit: Arc<dyn AuditSink>,
}

impl ApiContext {
    pub fn new(
        db_path: PathBuf,
        engine: Arc<dyn TextExtractor>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            db_path,
            engine,
            audit,
        }
    }

    pub fn open_db(&self) -> Result<Connection, ApiError> {
        open_database(&self.db_path).map_err(|e| ApiError::Internal(e.to_string()))
    }
}

// ═══════════════════════════════════════════════════════════
// Bearer tokens
// ═══════════════════════════════════════════════════════════

/// Hash a bearer token for storage/lookup (hex-encoded SHA-256).
pub fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    use rand::RngCore;

    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

// ═══════════════════════════════════════════════════════════
// Pagination
// ═══════════════════════════════════════════════════════════

/// Normalized page parameters: 1-based page, size capped at 50.
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    pub page: u32,
    pub page_size: u32,
}

impl PageParams {
    pub fn from_query(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> u32 {
        (self.page - 1) * self.page_size
    }
}

/// Pagination metadata echoed in every list/search envelope.
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub next_page: Option<u32>,
    pub previous_page: Option<u32>,
    pub total_pages: u32,
    pub current_page: u32,
    pub total_count: u64,
    pub page_size: u32,
}

impl PaginationMeta {
    pub fn new(total_count: u64, params: &PageParams) -> Self {
        let total_pages = (total_count.div_ceil(params.page_size as u64)) as u32;
        let next_page = (params.page < total_pages).then(|| params.page + 1);
        let previous_page = (params.page > 1).then(|| params.page - 1);
        Self {
            next_page,
            previous_page,
            total_pages,
            current_page: params.page,
            total_count,
            page_size: params.page_size,
        }
    }
}
