use crate::AppState;
use crate::api::models::upload::UploadResponse;
use crate::collaborator::ProcessFileRequest;
use crate::errors::{Error, Result};
use crate::storage::{IncomingFile, extension_of};
use crate::types::FallbackAnalysis;
use axum::{
    Json,
    extract::{Multipart, State},
};
use metrics::counter;

/// Multipart field carrying the document.
const FILE_FIELD: &str = "file";

#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "files",
    summary = "Upload file",
    description = "Store a document or source file and have the AI service analyse it. \
        When the AI service is unavailable the upload still succeeds with a locally built analysis.",
    request_body(
        content_type = "multipart/form-data",
        description = "A single `file` field"
    ),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "No file, or file type not supported"),
        (status = 500, description = "File processing failed")
    )
)]
pub async fn upload_file(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<UploadResponse>> {
    let mut incoming: Option<IncomingFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Failed to parse multipart data: {}", e),
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // A `file` field without a filename is a plain text field, not an upload
        let Some(original_name) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };

        // Fail before buffering the body
        state.store.check_name(&original_name)?;

        let mime_type = field.content_type().map(|s| s.to_string());
        let content = field.bytes().await.map_err(|e| Error::BadRequest {
            message: format!("Failed to read file: {}", e),
        })?;

        incoming = Some(IncomingFile {
            original_name,
            mime_type,
            content,
        });
        break;
    }

    let incoming = incoming.ok_or(Error::MissingFile)?;
    let file = state.store.store(incoming).await?;
    counter!("docrelay_uploads_total").increment(1);

    tracing::info!(
        original_name = %file.original_name,
        generated_name = %file.generated_name,
        size = file.size_bytes,
        "File uploaded"
    );

    let file_type = extension_of(&file.original_name);
    let absolute_path = std::path::absolute(&file.storage_path).map_err(Error::FileProcessing)?;
    let request = ProcessFileRequest {
        file_path: absolute_path.to_string_lossy().into_owned(),
        file_name: file.original_name.clone(),
        file_type: file_type.clone(),
    };

    let ai_data = match state.collaborator.process_file(&request).await {
        Ok(payload) => payload,
        Err(e) => {
            // Uploads stay available while the AI service is down
            tracing::warn!(error = %e, "AI service unavailable, answering with fallback analysis");
            counter!("docrelay_upload_fallbacks_total").increment(1);
            serde_json::to_value(FallbackAnalysis::for_upload(&file, &file_type)).map_err(anyhow::Error::from)?
        }
    };

    Ok(Json(UploadResponse {
        success: true,
        file,
        ai_data,
    }))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{create_test_config, create_test_server, unreachable_url};
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use serde_json::{Value, json};
    use std::future::IntoFuture;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn file_form(name: &str, content: &'static [u8]) -> MultipartForm {
        MultipartForm::new().add_part("file", Part::bytes(content).file_name(name))
    }

    fn stored_files(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir).map(|read| read.count()).unwrap_or(0)
    }

    #[test_log::test(tokio::test)]
    async fn test_upload_relays_analysis() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/process-file"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "contentType": "document",
                "fileType": ".txt",
                "contentLength": 11,
                "preview": "hello world"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let uploads = tempfile::tempdir().unwrap();
        let config = create_test_config(uploads.path(), mock_server.uri().parse().unwrap());
        let server = create_test_server(config);

        let response = server.post("/api/upload").multipart(file_form("notes.txt", b"hello world")).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["file"]["originalName"], "notes.txt");
        assert_eq!(body["file"]["size"], 11);
        assert_eq!(body["aiData"]["preview"], "hello world");
        assert_eq!(stored_files(uploads.path()), 1);

        // The AI service gets an absolute path to the stored copy
        let requests = mock_server.received_requests().await.unwrap();
        let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
        let sent_path = std::path::PathBuf::from(sent["filePath"].as_str().unwrap());
        assert!(sent_path.is_absolute());
        assert_eq!(std::fs::read(&sent_path).unwrap(), b"hello world");
        assert_eq!(sent["fileName"], "notes.txt");
        assert_eq!(sent["fileType"], ".txt");
    }

    #[tokio::test]
    async fn test_upload_falls_back_when_service_unreachable() {
        let uploads = tempfile::tempdir().unwrap();
        let config = create_test_config(uploads.path(), unreachable_url().await);
        let server = create_test_server(config);

        for (name, expected_kind) in [
            ("script.js", "code"),
            ("sort.py", "code"),
            ("Main.java", "document"),
            ("paper.pdf", "document"),
        ] {
            let response = server.post("/api/upload").multipart(file_form(name, b"0123456789")).await;

            response.assert_status_ok();
            let body: Value = response.json();
            assert_eq!(body["success"], true);
            assert_eq!(body["aiData"]["preview"], "File uploaded successfully");
            assert_eq!(body["aiData"]["contentType"], expected_kind, "{name}");
            assert_eq!(body["aiData"]["contentLength"], 10);
        }
    }

    #[tokio::test]
    async fn test_upload_falls_back_on_service_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/process-file"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "detail": "PDF parse error" })))
            .mount(&mock_server)
            .await;

        let uploads = tempfile::tempdir().unwrap();
        let config = create_test_config(uploads.path(), mock_server.uri().parse().unwrap());
        let server = create_test_server(config);

        let response = server.post("/api/upload").multipart(file_form("Broken.PDF", b"%PDF-1.4")).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["aiData"]["fileType"], ".pdf");
        assert_eq!(body["aiData"]["contentType"], "document");
    }

    #[tokio::test]
    async fn test_upload_without_file_field() {
        let uploads = tempfile::tempdir().unwrap();
        let config = create_test_config(uploads.path(), unreachable_url().await);
        let server = create_test_server(config);

        let form = MultipartForm::new().add_text("comment", "no attachment");
        let response = server.post("/api/upload").multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "No file uploaded" }));
        assert_eq!(stored_files(uploads.path()), 0);
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_type() {
        let uploads = tempfile::tempdir().unwrap();
        let config = create_test_config(uploads.path(), unreachable_url().await);
        let server = create_test_server(config);

        let response = server.post("/api/upload").multipart(file_form("installer.exe", b"MZ\x90\x00")).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "File type not supported" }));
        assert_eq!(stored_files(uploads.path()), 0);
    }

    #[tokio::test]
    async fn test_same_name_uploads_are_stored_separately() {
        let uploads = tempfile::tempdir().unwrap();
        let config = create_test_config(uploads.path(), unreachable_url().await);
        let server = create_test_server(config);

        let (first, second) = tokio::join!(
            server.post("/api/upload").multipart(file_form("sample.js", b"console.log(1)")).into_future(),
            server.post("/api/upload").multipart(file_form("sample.js", b"console.log(2)")).into_future(),
        );

        let first: Value = first.json();
        let second: Value = second.json();
        assert_ne!(first["file"]["filename"], second["file"]["filename"]);
        assert_eq!(stored_files(uploads.path()), 2);
    }

    #[tokio::test]
    async fn test_upload_above_default_body_limit() {
        let uploads = tempfile::tempdir().unwrap();
        let config = create_test_config(uploads.path(), unreachable_url().await);
        let server = create_test_server(config);

        // axum's default body limit is 2 MiB
        let content = vec![b'a'; 8 * 1024 * 1024];
        let form = MultipartForm::new().add_part("file", Part::bytes(content).file_name("large.txt"));
        let response = server.post("/api/upload").multipart(form).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["file"]["size"], 8 * 1024 * 1024);
        assert_eq!(body["aiData"]["contentLength"], 8 * 1024 * 1024);
        let stored = std::path::PathBuf::from(body["file"]["path"].as_str().unwrap());
        assert_eq!(std::fs::metadata(stored).unwrap().len(), 8 * 1024 * 1024);
    }
}
