use crate::AppState;
use crate::api::models::audio::AudioRequest;
use crate::collaborator::AudioRelayRequest;
use crate::errors::{Error, Result};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use metrics::counter;
use serde_json::Value;

#[utoipa::path(
    post,
    path = "/api/generate-audio",
    tag = "audio",
    summary = "Generate audio",
    description = "Relay a speech synthesis request to the AI service and return its answer, which carries the audio URL.",
    request_body = AudioRequest,
    responses(
        (status = 200, description = "AI service payload, passed through"),
        (status = 400, description = "Malformed request body"),
        (status = 500, description = "Failed to generate audio with AI service")
    )
)]
pub async fn generate_audio(State(state): State<AppState>, payload: std::result::Result<Json<AudioRequest>, JsonRejection>) -> Result<Json<Value>> {
    let Json(request) = payload.map_err(|e| Error::BadRequest { message: e.body_text() })?;

    tracing::info!(text_length = request.text.len(), language = %request.language, "Generating audio");

    let relay = AudioRelayRequest {
        text: request.text,
        language: request.language,
    };

    state.collaborator.generate_audio(&relay).await.map(Json).map_err(|e| {
        counter!("docrelay_relay_failures_total", "endpoint" => "generate-audio").increment(1);
        Error::AudioRelayFailed(e)
    })
}
