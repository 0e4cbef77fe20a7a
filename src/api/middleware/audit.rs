//! Audit logging middleware.
//!
//! Records every API request with the acting account, method, path and
//! response status. Runs innermost, after auth has injected the `User`.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::ApiContext;
use crate::models::User;

/// Log API access through the injected audit sink.
pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    let ctx = req.extensions().get::<ApiContext>().cloned();
    let actor = req
        .extensions()
        .get::<User>()
        .map(|u| u.username.clone())
        .unwrap_or_else(|| "anonymous".to_string());

    let response = next.run(req).await;

    if let Some(ctx) = ctx {
        let status = response.status().as_u16();
        ctx.audit.record(
            &actor,
            &format!("{method} {path}"),
            &format!("status:{status}"),
        );
    }

    response
}
