use crate::AppState;
use crate::api::models::health::{HealthResponse, ServiceInfo};
use axum::{Json, extract::State};
use chrono::Utc;

/// Relay endpoints advertised by the banner.
const ADVERTISED_ENDPOINTS: &[&str] = &["/api/upload", "/api/get-content", "/api/generate-audio"];

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    summary = "Liveness probe",
    description = "Always succeeds while the server is running. Does not check the AI service.",
    responses((status = 200, description = "Server is up", body = HealthResponse))
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}

#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    summary = "Service banner",
    responses((status = 200, description = "Service name, version and relay endpoints", body = ServiceInfo))
)]
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "AI Document Reader API is running!".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: ADVERTISED_ENDPOINTS.iter().map(|e| e.to_string()).collect(),
    })
}
