//! HTTP server lifecycle: bind → serve the API router.

use std::net::SocketAddr;

use crate::api::router::api_router;
use crate::api::types::ApiContext;

/// Bind `addr` and serve the API until the process is stopped.
pub async fn serve(ctx: ApiContext, addr: SocketAddr) -> Result<(), std::io::Error> {
    let router = api_router(ctx);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "docvault API listening");
    axum::serve(listener, router).await
}
