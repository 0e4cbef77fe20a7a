//! Bearer token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, resolves it to an account via
//! the stored token hash, and injects the [`User`] into request extensions
//! for downstream handlers. Token issuance itself lives outside the core.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{hash_token, ApiContext};
use crate::db::repository::find_user_by_token_hash;

/// Require a valid bearer token from a registered account.
///
/// Accesses `ApiContext` from request extensions (injected by the Extension
/// layer). On success the authenticated `User` is available as an extension.
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    let conn = ctx.open_db()?;
    let user = find_user_by_token_hash(&conn, &hash_token(&token))?
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
