use crate::AppState;
use crate::api::models::content::ContentRequest;
use crate::collaborator::ContentRelayRequest;
use crate::errors::{Error, Result};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use metrics::counter;
use serde_json::Value;

#[utoipa::path(
    post,
    path = "/api/get-content",
    tag = "content",
    summary = "Get file content",
    description = "Relay a request for the full text or a summary of a stored file to the AI service. \
        The AI service's answer is returned unchanged. There is no fallback: if the AI service fails, so does this call.",
    request_body = ContentRequest,
    responses(
        (status = 200, description = "AI service payload, passed through"),
        (status = 400, description = "Malformed request body"),
        (status = 500, description = "Failed to process content with AI service")
    )
)]
pub async fn get_content(State(state): State<AppState>, payload: std::result::Result<Json<ContentRequest>, JsonRejection>) -> Result<Json<Value>> {
    let Json(request) = payload.map_err(|e| Error::BadRequest { message: e.body_text() })?;

    tracing::info!(content_type = ?request.content_type, file_path = %request.file_path, "Getting content");

    let file_path = std::path::absolute(&request.file_path).map_err(|e| Error::BadRequest {
        message: format!("Invalid filePath: {}", e),
    })?;

    let relay = ContentRelayRequest {
        file_path: file_path.to_string_lossy().into_owned(),
        content_type: request.content_type,
    };

    match state.collaborator.get_content(&relay).await {
        Ok(payload) => {
            tracing::info!("Content retrieved successfully");
            Ok(Json(payload))
        }
        Err(e) => {
            counter!("docrelay_relay_failures_total", "endpoint" => "get-content").increment(1);
            Err(Error::ContentRelayFailed(e))
        }
    }
}
