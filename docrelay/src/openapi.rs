//! OpenAPI document for the gateway, rendered with Scalar at `/api/docs`.

use crate::api::handlers;
use crate::api::models::{audio::AudioRequest, content::ContentRequest, health::HealthResponse, health::ServiceInfo, upload::UploadResponse};
use crate::types::{ContentKind, FallbackAnalysis, RequestedContent, UploadedFile};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Document Reader Gateway",
        description = "Upload documents and source files, then relay content and audio requests to the AI service."
    ),
    paths(
        handlers::health::service_info,
        handlers::health::health,
        handlers::upload::upload_file,
        handlers::content::get_content,
        handlers::audio::generate_audio,
    ),
    components(schemas(
        UploadResponse,
        UploadedFile,
        FallbackAnalysis,
        ContentKind,
        ContentRequest,
        RequestedContent,
        AudioRequest,
        HealthResponse,
        ServiceInfo,
    )),
    tags(
        (name = "files", description = "File upload"),
        (name = "content", description = "Content relay"),
        (name = "audio", description = "Speech synthesis relay"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in ["/", "/api/health", "/api/upload", "/api/get-content", "/api/generate-audio"] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing from OpenAPI document");
        }
    }
}
