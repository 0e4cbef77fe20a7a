//! Full-text search endpoint over extracted document text.

use axum::extract::{Query, State};
use axum::Extension;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, PageParams, PaginationMeta};
use crate::db::repository::{OrderBy, OrderField};
use crate::models::ExtractionMethod;
use crate::search::{self, SearchScope};

/// Ordering fields accepted by the search endpoint.
const SEARCH_ORDER_FIELDS: &[OrderField] = &[OrderField::CreatedAt, OrderField::Filename];

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    /// `true` searches across all owners; default is personal scope.
    #[serde(default)]
    pub global: bool,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub ordering: Option<String>,
}

#[derive(Serialize)]
pub struct SearchResultItem {
    pub id: Uuid,
    pub filename: String,
    pub size_human: String,
    pub method: ExtractionMethod,
    pub created_at: DateTime<Utc>,
    pub owner_username: String,
    pub fragment: String,
}

#[derive(Serialize)]
pub struct SearchEcho {
    pub term: String,
    pub global: bool,
    pub total_found: u64,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResultItem>,
    pub pagination: PaginationMeta,
    pub search: SearchEcho,
}

/// `GET /api/documents/search` — case-insensitive substring search.
pub async fn search(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<crate::models::User>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let conn = ctx.open_db()?;

    let term = query.q.unwrap_or_default();
    let scope = if query.global {
        SearchScope::Global
    } else {
        SearchScope::Personal
    };
    let order = OrderBy::parse(query.ordering.as_deref(), SEARCH_ORDER_FIELDS);
    let params = PageParams::from_query(query.page, query.page_size);

    let page = search::search(
        &conn,
        &user,
        &term,
        scope,
        &order,
        params.page_size,
        params.offset(),
    )?;

    let results = page
        .results
        .into_iter()
        .map(|result| SearchResultItem {
            id: result.document.id,
            size_human: result.document.human_size(),
            filename: result.document.filename,
            method: result.document.method,
            created_at: result.document.created_at,
            owner_username: result.owner_username,
            fragment: result.fragment,
        })
        .collect();

    Ok(Json(SearchResponse {
        results,
        pagination: PaginationMeta::new(page.total, &params),
        search: SearchEcho {
            term: term.trim().to_string(),
            global: query.global,
            total_found: page.total,
        },
    }))
}
