//! API router.
//!
//! Returns a composable `Router` with all endpoints nested under `/api/`.
//! Middleware stack (outermost → innermost): auth validator → audit logger.

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::routing::post;
use axum::Router;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::config::MAX_UPLOAD_BYTES;

/// Build the API router.
///
/// All document endpoints require bearer token authentication; only the
/// health check is open. Middleware reads `ApiContext` from an Extension
/// layer (outermost), handlers from `State`.
pub fn api_router(ctx: ApiContext) -> Router {
    // The body limit sits above the 50 MiB contract so the workflow itself
    // reports oversized files with their actual size.
    let body_limit = DefaultBodyLimit::max((MAX_UPLOAD_BYTES + 1024 * 1024) as usize);

    let protected = Router::new()
        .route("/documents/upload", post(endpoints::documents::upload))
        .route("/documents", get(endpoints::documents::list))
        .route("/documents/search", get(endpoints::search::search))
        .route(
            "/documents/statistics",
            get(endpoints::documents::statistics),
        )
        .route(
            "/documents/:id",
            get(endpoints::documents::detail).delete(endpoints::documents::delete),
        )
        .route(
            "/documents/global/:id",
            get(endpoints::documents::global_detail),
        )
        .with_state(ctx.clone())
        // Innermost first, outermost last
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(body_limit)
        .layer(axum::Extension(ctx.clone()));

    let unprotected = Router::new()
        .route("/health", get(endpoints::health::check))
        .with_state(ctx);

    Router::new().nest("/api", protected).nest("/api", unprotected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt as _;
    use tower::ServiceExt;

    use crate::api::types::{generate_token, hash_token};
    use crate::audit::MemoryAudit;
    use crate::db::repository::create_user;
    use crate::db::open_database;
    use crate::models::User;
    use crate::pipeline::extraction::MockExtractor;

    struct TestHarness {
        _dir: tempfile::TempDir,
        router: Router,
        audit: Arc<MemoryAudit>,
        token: String,
        user: User,
    }

    fn harness_with_engine(engine: MockExtractor) -> TestHarness {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let conn = open_database(&db_path).unwrap();
        let token = generate_token();
        let user = create_user(&conn, "alice", &hash_token(&token)).unwrap();
        drop(conn);

        let audit = Arc::new(MemoryAudit::new());
        let ctx = crate::api::types::ApiContext::new(
            db_path,
            Arc::new(engine),
            audit.clone(),
        );
        TestHarness {
            _dir: dir,
            router: api_router(ctx),
            audit,
            token,
            user,
        }
    }

    fn harness() -> TestHarness {
        harness_with_engine(MockExtractor::native(
            "texto extraído del documento con suficiente contenido",
        ))
    }

    fn multipart_body(filename: &str, content: &[u8]) -> (String, Vec<u8>) {
        let boundary = "dv-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; \
                 filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        (
            format!("multipart/form-data; boundary={boundary}"),
            body,
        )
    }

    fn upload_request(harness: &TestHarness, filename: &str) -> Request<Body> {
        let (content_type, body) = multipart_body(filename, b"%PDF-1.4 body");
        Request::post("/api/documents/upload")
            .header(header::CONTENT_TYPE, content_type)
            .header(header::AUTHORIZATION, format!("Bearer {}", harness.token))
            .body(Body::from(body))
            .unwrap()
    }

    fn authed_get(harness: &TestHarness, uri: &str) -> Request<Body> {
        Request::get(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", harness.token))
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn requests_without_token_are_unauthorized() {
        let harness = harness();
        let response = harness
            .router
            .clone()
            .oneshot(
                Request::get("/api/documents")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "AUTH_REQUIRED");
    }

    #[tokio::test]
    async fn invalid_token_is_unauthorized() {
        let harness = harness();
        let response = harness
            .router
            .clone()
            .oneshot(
                Request::get("/api/documents")
                    .header(header::AUTHORIZATION, "Bearer wrong-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn health_needs_no_token() {
        let harness = harness();
        let response = harness
            .router
            .clone()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn upload_stores_and_returns_created() {
        let harness = harness();
        let response = harness
            .router
            .clone()
            .oneshot(upload_request(&harness, "informe.pdf"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let json = json_body(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["filename"], "informe.pdf");
        assert_eq!(json["method"], "native");
        assert!(json["extracted_text"]
            .as_str()
            .unwrap()
            .contains("texto extraído"));
        assert!(json["document_id"].as_str().is_some());
        assert!(json["size_human"].as_str().unwrap().ends_with("B"));

        // Audit captured the stored upload
        assert!(harness
            .audit
            .entries()
            .iter()
            .any(|e| e.action == "upload_stored" && e.actor == "alice"));
    }

    #[tokio::test]
    async fn upload_without_file_field_is_missing_file() {
        let harness = harness();
        let boundary = "dv-test-boundary";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhola\r\n--{boundary}--\r\n"
        );
        let response = harness
            .router
            .clone()
            .oneshot(
                Request::post("/api/documents/upload")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .header(header::AUTHORIZATION, format!("Bearer {}", harness.token))
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "MISSING_FILE");
    }

    #[tokio::test]
    async fn upload_of_txt_file_is_unsupported() {
        let harness = harness();
        let response = harness
            .router
            .clone()
            .oneshot(upload_request(&harness, "report.txt"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "UNSUPPORTED_FORMAT");
    }

    #[tokio::test]
    async fn upload_with_insufficient_text_is_unprocessable_and_stores_nothing() {
        let harness = harness_with_engine(MockExtractor::ocr("corto"));
        let response = harness
            .router
            .clone()
            .oneshot(upload_request(&harness, "escaneo.pdf"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "INSUFFICIENT_TEXT");

        // No document row was created
        let response = harness
            .router
            .clone()
            .oneshot(authed_get(&harness, "/api/documents"))
            .await
            .unwrap();
        let json = json_body(response).await;
        assert_eq!(json["pagination"]["total_count"], 0);
    }

    #[tokio::test]
    async fn list_returns_uploaded_documents_with_pagination() {
        let harness = harness();
        for _ in 0..3 {
            let response = harness
                .router
                .clone()
                .oneshot(upload_request(&harness, "informe.pdf"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = harness
            .router
            .clone()
            .oneshot(authed_get(&harness, "/api/documents?page_size=2"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["results"].as_array().unwrap().len(), 2);
        assert_eq!(json["pagination"]["total_count"], 3);
        assert_eq!(json["pagination"]["total_pages"], 2);
        assert_eq!(json["pagination"]["next_page"], 2);
    }

    #[tokio::test]
    async fn detail_of_another_owners_document_is_not_found() {
        let harness = harness();
        // Upload as alice
        let response = harness
            .router
            .clone()
            .oneshot(upload_request(&harness, "informe.pdf"))
            .await
            .unwrap();
        let json = json_body(response).await;
        let document_id = json["document_id"].as_str().unwrap().to_string();

        // Register bob with his own token
        let bob_token = generate_token();
        {
            let conn = open_database(
                &harness._dir.path().join("test.db"),
            )
            .unwrap();
            create_user(&conn, "bob", &hash_token(&bob_token)).unwrap();
        }

        let response = harness
            .router
            .clone()
            .oneshot(
                Request::get(format!("/api/documents/{document_id}"))
                    .header(header::AUTHORIZATION, format!("Bearer {bob_token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");

        // The global detail route still resolves it for bob
        let response = harness
            .router
            .clone()
            .oneshot(
                Request::get(format!("/api/documents/global/{document_id}"))
                    .header(header::AUTHORIZATION, format!("Bearer {bob_token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["owner"]["username"], "alice");
    }

    #[tokio::test]
    async fn delete_soft_deletes_and_hides_the_document() {
        let harness = harness();
        let response = harness
            .router
            .clone()
            .oneshot(upload_request(&harness, "informe.pdf"))
            .await
            .unwrap();
        let json = json_body(response).await;
        let document_id = json["document_id"].as_str().unwrap().to_string();

        let response = harness
            .router
            .clone()
            .oneshot(
                Request::delete(format!("/api/documents/{document_id}"))
                    .header(header::AUTHORIZATION, format!("Bearer {}", harness.token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["deleted"]["filename"], "informe.pdf");

        // Gone from detail and listings; a second delete is a 404
        for uri in [
            format!("/api/documents/{document_id}"),
            "/api/documents".to_string(),
        ] {
            let response = harness
                .router
                .clone()
                .oneshot(authed_get(&harness, &uri))
                .await
                .unwrap();
            if uri.ends_with("documents") {
                let json = json_body(response).await;
                assert_eq!(json["pagination"]["total_count"], 0);
            } else {
                assert_eq!(response.status(), StatusCode::NOT_FOUND);
            }
        }

        let response = harness
            .router
            .clone()
            .oneshot(
                Request::delete(format!("/api/documents/{document_id}"))
                    .header(header::AUTHORIZATION, format!("Bearer {}", harness.token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn search_requires_a_term() {
        let harness = harness();
        for uri in ["/api/documents/search", "/api/documents/search?q=%20%20"] {
            let response = harness
                .router
                .clone()
                .oneshot(authed_get(&harness, uri))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let json = json_body(response).await;
            assert_eq!(json["error"]["code"], "MISSING_QUERY");
        }
    }

    #[tokio::test]
    async fn search_echoes_term_and_scope() {
        let harness = harness();
        let response = harness
            .router
            .clone()
            .oneshot(upload_request(&harness, "informe.pdf"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = harness
            .router
            .clone()
            .oneshot(authed_get(
                &harness,
                "/api/documents/search?q=contenido&global=true",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["search"]["term"], "contenido");
        assert_eq!(json["search"]["global"], true);
        assert_eq!(json["search"]["total_found"], 1);
        let fragment = json["results"][0]["fragment"].as_str().unwrap();
        assert!(fragment.contains("contenido"));
        assert_eq!(json["results"][0]["owner_username"], "alice");
    }

    #[tokio::test]
    async fn statistics_sum_sizes_and_counts() {
        let harness = harness();
        for _ in 0..2 {
            let response = harness
                .router
                .clone()
                .oneshot(upload_request(&harness, "informe.pdf"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = harness
            .router
            .clone()
            .oneshot(authed_get(&harness, "/api/documents/statistics"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["statistics"]["total_documents"], 2);
        assert_eq!(json["username"], "alice");
        assert_eq!(json["recent_documents_7_days"], 2);
        assert_eq!(json["by_method"][0]["method"], "native");
        assert_eq!(json["by_method"][0]["count"], 2);
        // Two identical uploads: total size is double one upload's size
        let total = json["statistics"]["total_size_bytes"].as_u64().unwrap();
        assert!(total > 0 && total % 2 == 0);
    }

    #[tokio::test]
    async fn audit_middleware_records_every_request() {
        let harness = harness();
        let _ = harness
            .router
            .clone()
            .oneshot(authed_get(&harness, "/api/documents"))
            .await
            .unwrap();

        assert!(harness.audit.entries().iter().any(|e| {
            e.actor == harness.user.username
                && e.action == "GET /api/documents"
                && e.detail == "status:200"
        }));
    }
}
