//! HTTP front end for the profile pipeline.
//!
//! One endpoint, `POST /parse`, takes `{ "link": "..." }` and answers with
//! `{ "result": "<ResultDocument as a JSON string>" }`. Upstream trouble is
//! reported inside the document; only malformed bodies (400), wrong methods
//! (405) and a missing access token (500) produce error responses.
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use axum::routing::post;
use std::future::Future;
use tokio::net::TcpListener;

pub use error::ApiError;
pub use routes::{ParseRequest, ParseResponse};
pub use state::AppState;

/// Route table shared by the binary and the tests.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/parse",
            post(routes::parse_profile).fallback(routes::method_not_allowed),
        )
        .fallback(routes::not_found)
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(%addr, ready = state.is_ready(), "server.listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
