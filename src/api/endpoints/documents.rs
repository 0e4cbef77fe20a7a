//! Document endpoints: upload, listing, detail, soft delete, statistics.

use std::str::FromStr;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, PageParams, PaginationMeta};
use crate::db::repository::{
    self, DocumentFilter, OrderBy, OrderField, OwnerStatistics,
};
use crate::models::{human_size, Document, ExtractionMethod, User};
use crate::pipeline::ingest::{IngestionWorkflow, UploadedFile};

/// Ordering fields accepted by the list endpoint.
const LIST_ORDER_FIELDS: &[OrderField] = &[
    OrderField::CreatedAt,
    OrderField::Filename,
    OrderField::SizeBytes,
];

#[derive(Serialize)]
pub struct OwnerInfo {
    pub id: Uuid,
    pub username: String,
}

// ═══════════════════════════════════════════════════════════
// Upload
// ═══════════════════════════════════════════════════════════

#[derive(Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: &'static str,
    pub document_id: Uuid,
    pub extracted_text: String,
    pub filename: String,
    pub size_bytes: u64,
    pub size_human: String,
    pub method: ExtractionMethod,
    pub processing_seconds: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// `POST /api/documents/upload` — process one PDF and store the result.
///
/// Takes the first file-carrying field of the multipart body; its absence is
/// the workflow's missing-file rejection.
pub async fn upload(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<User>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let mut uploaded: Option<UploadedFile> = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field.bytes().await.map_err(multipart_error)?;
        uploaded = Some(UploadedFile {
            filename,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let mut conn = ctx.open_db()?;
    let workflow = IngestionWorkflow::new(ctx.engine.as_ref(), ctx.audit.as_ref());
    let document = workflow.ingest(&mut conn, uploaded, &user)?;

    let response = UploadResponse {
        success: true,
        message: "Document processed and stored",
        document_id: document.id,
        size_human: document.human_size(),
        extracted_text: document.extracted_text,
        filename: document.filename,
        size_bytes: document.size_bytes,
        method: document.method,
        processing_seconds: document.processing_seconds,
        created_at: document.created_at,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::FileTooLarge(err.body_text())
    } else {
        ApiError::BadRequest(format!("Malformed multipart body: {err}"))
    }
}

// ═══════════════════════════════════════════════════════════
// Listing
// ═══════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub ordering: Option<String>,
    /// Filter on the stored extraction method (`native` / `ocr`).
    pub method: Option<String>,
    /// Case-insensitive substring filter on the filename.
    pub search: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct DocumentListItem {
    pub id: Uuid,
    pub filename: String,
    pub size_human: String,
    pub method: ExtractionMethod,
    pub created_at: DateTime<Utc>,
    pub summary: String,
}

impl From<&Document> for DocumentListItem {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            filename: doc.filename.clone(),
            size_human: doc.human_size(),
            method: doc.method,
            created_at: doc.created_at,
            summary: doc.summary(),
        }
    }
}

#[derive(Serialize)]
pub struct ListResponse {
    pub results: Vec<DocumentListItem>,
    pub pagination: PaginationMeta,
}

/// `GET /api/documents` — the requester's active documents.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<User>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiError> {
    let conn = ctx.open_db()?;

    let method = query
        .method
        .as_deref()
        .map(|raw| {
            ExtractionMethod::from_str(raw)
                .map_err(|_| ApiError::BadRequest(format!("Unknown extraction method: {raw}")))
        })
        .transpose()?;

    let filter = DocumentFilter {
        method,
        filename_contains: query.search.clone(),
        created_from: query.from,
        created_to: query.to,
    };
    let order = OrderBy::parse(query.ordering.as_deref(), LIST_ORDER_FIELDS);
    let params = PageParams::from_query(query.page, query.page_size);

    let total = repository::count_documents(&conn, &user.id, &filter)?;
    let documents = repository::list_documents(
        &conn,
        &user.id,
        &filter,
        &order,
        params.page_size,
        params.offset(),
    )?;

    Ok(Json(ListResponse {
        results: documents.iter().map(DocumentListItem::from).collect(),
        pagination: PaginationMeta::new(total, &params),
    }))
}

// ═══════════════════════════════════════════════════════════
// Detail
// ═══════════════════════════════════════════════════════════

#[derive(Serialize)]
pub struct DocumentDetailResponse {
    pub id: Uuid,
    pub filename: String,
    pub size_bytes: u64,
    pub size_human: String,
    pub extracted_text: String,
    pub summary: String,
    pub method: ExtractionMethod,
    pub processing_seconds: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub owner: OwnerInfo,
    pub deleted: bool,
}

fn detail_response(doc: Document, owner: OwnerInfo) -> DocumentDetailResponse {
    DocumentDetailResponse {
        id: doc.id,
        size_human: doc.human_size(),
        summary: doc.summary(),
        filename: doc.filename,
        size_bytes: doc.size_bytes,
        extracted_text: doc.extracted_text,
        method: doc.method,
        processing_seconds: doc.processing_seconds,
        created_at: doc.created_at,
        owner,
        deleted: doc.deleted,
    }
}

/// `GET /api/documents/:id` — detail of one of the requester's documents.
///
/// Another owner's document is reported as not-found, never as forbidden.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<DocumentDetailResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let document_id = parse_document_id(&id)?;

    let document = repository::get_active_document_for_owner(&conn, &document_id, &user.id)?
        .ok_or_else(|| ApiError::NotFound("Document not found".into()))?;

    tracing::info!(
        user = %user.username,
        document_id = %document.id,
        filename = %document.filename,
        "Document detail accessed"
    );

    let owner = OwnerInfo {
        id: user.id,
        username: user.username,
    };
    Ok(Json(detail_response(document, owner)))
}

/// `GET /api/documents/global/:id` — detail of any active document, used by
/// global search results.
pub async fn global_detail(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<DocumentDetailResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let document_id = parse_document_id(&id)?;

    let document = repository::get_active_document(&conn, &document_id)?
        .ok_or_else(|| ApiError::NotFound("Document not found".into()))?;

    let owner = repository::get_user(&conn, &document.owner_id)?
        .ok_or_else(|| ApiError::Internal("document owner missing".into()))?;

    tracing::info!(
        user = %user.username,
        document_id = %document.id,
        owner = %owner.username,
        "Document accessed through global detail"
    );

    let owner = OwnerInfo {
        id: owner.id,
        username: owner.username,
    };
    Ok(Json(detail_response(document, owner)))
}

fn parse_document_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|e| ApiError::BadRequest(format!("Invalid document ID: {e}")))
}

// ═══════════════════════════════════════════════════════════
// Soft delete
// ═══════════════════════════════════════════════════════════

#[derive(Serialize)]
pub struct DeletedInfo {
    pub id: Uuid,
    pub filename: String,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
    pub deleted: DeletedInfo,
}

/// `DELETE /api/documents/:id` — soft-delete one of the requester's
/// documents. The row is kept; only the flag and timestamp change.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let document_id = parse_document_id(&id)?;

    let document = repository::get_active_document_for_owner(&conn, &document_id, &user.id)?
        .ok_or_else(|| ApiError::NotFound("Document not found".into()))?;

    repository::soft_delete_document(&conn, &document.id)?;

    tracing::info!(
        user = %user.username,
        document_id = %document.id,
        filename = %document.filename,
        "Document soft-deleted"
    );
    ctx.audit.record(
        &user.username,
        "document_deleted",
        &format!("document:{} file:{}", document.id, document.filename),
    );

    Ok(Json(DeleteResponse {
        success: true,
        message: format!("Document \"{}\" deleted", document.filename),
        deleted: DeletedInfo {
            id: document.id,
            filename: document.filename,
        },
    }))
}

// ═══════════════════════════════════════════════════════════
// Statistics
// ═══════════════════════════════════════════════════════════

#[derive(Serialize)]
pub struct StatisticsTotals {
    pub total_documents: u64,
    pub total_size_bytes: u64,
    pub total_size_human: String,
    pub avg_processing_seconds: Option<f64>,
}

#[derive(Serialize)]
pub struct StatisticsResponse {
    pub statistics: StatisticsTotals,
    pub by_method: Vec<repository::MethodCount>,
    pub recent_documents_7_days: u64,
    pub username: String,
}

/// `GET /api/documents/statistics` — aggregates over the requester's
/// active documents.
pub async fn statistics(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<User>,
) -> Result<Json<StatisticsResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let OwnerStatistics {
        total_documents,
        total_size_bytes,
        avg_processing_seconds,
        by_method,
        recent_documents,
    } = repository::owner_statistics(&conn, &user.id)?;

    tracing::info!(user = %user.username, "Statistics requested");

    Ok(Json(StatisticsResponse {
        statistics: StatisticsTotals {
            total_documents,
            total_size_bytes,
            total_size_human: human_size(total_size_bytes),
            avg_processing_seconds,
        },
        by_method,
        recent_documents_7_days: recent_documents,
        username: user.username,
    }))
}
