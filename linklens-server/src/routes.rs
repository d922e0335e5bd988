use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ParseRequest {
    pub link: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ParseResponse {
    /// JSON-encoded `ResultDocument`.
    pub result: String,
}

/// POST /parse
///
/// The body is decoded by hand so every malformed payload (bad JSON, wrong
/// content type, missing `link`) maps to 400 rather than axum's 415/422.
pub async fn parse_profile(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ParseResponse>, ApiError> {
    let req_id = uuid::Uuid::new_v4();

    let req: ParseRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::info!(%req_id, error = %e, "parse.bad_request");
        ApiError::BadRequest(e.to_string())
    })?;

    let pipeline = state.pipeline().map_err(|reason| {
        tracing::error!(%req_id, reason, "parse.unconfigured");
        ApiError::Config(reason.to_string())
    })?;

    tracing::info!(%req_id, link = %req.link, "parse.start");
    let doc = pipeline.run(&req.link).await;
    tracing::info!(
        %req_id,
        success = doc.success,
        posts = doc.posts.len(),
        subscriptions = doc.subscriptions.len(),
        "parse.done"
    );

    let result = doc
        .to_wire()
        .map_err(|e| ApiError::Internal(format!("encode result: {e}")))?;
    Ok(Json(ParseResponse { result }))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
