//! # docrelay: upload-and-relay gateway for the document reader
//!
//! `docrelay` sits between the browser client of the document reader and the AI service that
//! extracts, summarizes and reads documents aloud. It stores uploaded documents and source files
//! on local disk and relays JSON requests to the AI service, passing its answers back unchanged.
//!
//! ## Request Flow
//!
//! - **Upload** (`POST /api/upload`): the file's extension is checked against an allow-list, the
//!   file is written to the uploads directory under a generated name, and the AI service is asked
//!   to analyse it. If the AI service cannot answer, the upload still succeeds with a small
//!   locally built analysis, so the reader stays usable at reduced functionality.
//! - **Content and audio** (`POST /api/get-content`, `POST /api/generate-audio`): the request is
//!   forwarded as-is. These fail with a 500 when the AI service fails; only uploads degrade.
//! - **Health** (`GET /api/health`): liveness only, never touches the AI service.
//!
//! In production mode the prebuilt client bundle is served as well, with unknown paths answered
//! by its `index.html`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use docrelay::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = docrelay::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     docrelay::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     Application::new(config)?
//!         .serve(async {
//!             tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!         })
//!         .await
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod collaborator;
pub mod config;
pub mod errors;
mod openapi;
pub mod storage;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;

use crate::api::handlers;
use crate::collaborator::Collaborator;
use crate::config::CorsOrigin;
use crate::openapi::ApiDoc;
use crate::storage::{FileStore, LocalFileStore};
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::{
    Router,
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .store(Arc::new(store))
///     .collaborator(collaborator)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn FileStore>,
    pub collaborator: Collaborator,
    /// Reference point for the uptime reported by the health endpoint
    #[builder(default = Instant::now())]
    pub started_at: Instant,
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.cors;

    let mut cors = if cors_config.allowed_origins.contains(&CorsOrigin::Wildcard) {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                // Browsers send the bare origin, without path or trailing slash
                origins.push(url.origin().ascii_serialization().parse::<HeaderValue>()?);
            }
        }
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(cors_config.allow_credentials)
    };

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the main application router with all endpoints and middleware.
///
/// Constructs:
/// - The relay API under `/api`
/// - Stored uploads under `/uploads`
/// - OpenAPI documentation at `/api/docs`
/// - The client bundle with `index.html` fallback (production), or the service banner at `/`
/// - Optional Prometheus metrics at `/internal/metrics`
/// - CORS and tracing middleware
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let config = &state.config;

    let mut router = Router::new()
        .route("/api/health", get(handlers::health::health))
        // No size limit on uploads
        .route(
            "/api/upload",
            post(handlers::upload::upload_file).layer(DefaultBodyLimit::disable()),
        )
        .route("/api/get-content", post(handlers::content::get_content))
        .route("/api/generate-audio", post(handlers::audio::generate_audio));

    // In production the bundle's index.html owns `/`
    if !config.production {
        router = router.route("/", get(handlers::health::service_info));
    }

    let mut router = router
        .with_state(state.clone())
        .nest_service("/uploads", handlers::static_assets::uploads_service(&config.uploads_dir))
        .merge(Scalar::with_url("/api/docs", ApiDoc::openapi()));

    if config.production {
        info!(dist_dir = %config.client_dist_dir.display(), "Serving client bundle");
        router = router.fallback_service(handlers::static_assets::client_bundle_service(&config.client_dist_dir));
    }

    let mut router = router.layer(create_cors_layer(config)?);

    if config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// The gateway: configuration, shared state and the router built from them.
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance from configuration
    pub fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting gateway with configuration: {:#?}", config);

        let store = LocalFileStore::new(config.uploads_dir.clone(), config.allowed_extensions.clone());
        let collaborator = Collaborator::new(config.collaborator.url.clone());

        let state = AppState::builder()
            .config(config.clone())
            .store(Arc::new(store))
            .collaborator(collaborator)
            .build();

        let router = build_router(&state)?;

        Ok(Self { router, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Gateway listening on http://{}, uploads at http://localhost:{}/uploads, relaying to {}",
            bind_addr, self.config.port, self.config.collaborator.url
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{create_test_config, create_test_server, install_crypto_provider, unreachable_url};
    use axum::http::{Method, StatusCode, header};
    use axum_test::multipart::{MultipartForm, Part};
    use serde_json::{Value, json};
    use url::Url;

    /// End-to-end: upload a source file while the AI service is down, then ask for its content.
    #[test_log::test(tokio::test)]
    async fn test_upload_then_get_content_with_service_down() {
        let uploads = tempfile::tempdir().unwrap();
        let server = create_test_server(create_test_config(uploads.path(), unreachable_url().await));

        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(b"function greet() { return 'hi'; }".as_slice())
                .file_name("sample.js")
                .mime_type("text/javascript"),
        );
        let upload = server.post("/api/upload").multipart(form).await;

        upload.assert_status_ok();
        let body: Value = upload.json();
        assert_eq!(body["file"]["originalName"], "sample.js");
        assert_eq!(body["file"]["mimetype"], "text/javascript");
        assert_eq!(body["aiData"]["fileType"], ".js");
        assert_eq!(body["aiData"]["contentType"], "code");

        let stored_path = body["file"]["path"].as_str().unwrap().to_string();
        let content = server
            .post("/api/get-content")
            .json(&json!({ "filePath": stored_path, "contentType": "summary" }))
            .await;

        content.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        content.assert_json(&json!({ "error": "Failed to process content with AI service" }));
    }

    #[tokio::test]
    async fn test_application_integration() {
        let uploads = tempfile::tempdir().unwrap();
        let config = create_test_config(uploads.path(), unreachable_url().await);

        let app = Application::new(config);
        assert!(app.is_ok(), "Application::new should succeed");
        let server = app.unwrap().into_test_server();

        let health = server.get("/api/health").await;
        health.assert_status_ok();

        let docs = server.get("/api/docs").await;
        docs.assert_status_ok();
        assert!(docs.text().contains("Document Reader Gateway"));
    }

    #[tokio::test]
    async fn test_cors_preflight_is_allowed_from_any_origin() {
        let uploads = tempfile::tempdir().unwrap();
        let server = create_test_server(create_test_config(uploads.path(), unreachable_url().await));

        let response = server
            .method(Method::OPTIONS, "/api/get-content")
            .add_header(header::ORIGIN, "http://localhost:5173")
            .add_header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .add_header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .await;

        assert_eq!(response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN), "*");
    }

    #[tokio::test]
    async fn test_cors_specific_origin() {
        let uploads = tempfile::tempdir().unwrap();
        let mut config = create_test_config(uploads.path(), unreachable_url().await);
        config.cors.allowed_origins = vec![CorsOrigin::Url(Url::parse("https://reader.example.com").unwrap())];
        config.cors.allow_credentials = true;
        let server = create_test_server(config);

        let allowed = server
            .get("/api/health")
            .add_header(header::ORIGIN, "https://reader.example.com")
            .await;
        assert_eq!(allowed.header(header::ACCESS_CONTROL_ALLOW_ORIGIN), "https://reader.example.com");

        let other = server.get("/api/health").add_header(header::ORIGIN, "https://evil.example.com").await;
        assert!(other.maybe_header(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn test_build_router_with_metrics_enabled() {
        install_crypto_provider();
        let uploads = tempfile::tempdir().unwrap();
        let mut config = create_test_config(uploads.path(), unreachable_url().await);
        config.enable_metrics = true;

        let state = AppState::builder()
            .store(Arc::new(LocalFileStore::new(
                config.uploads_dir.clone(),
                config.allowed_extensions.clone(),
            )))
            .collaborator(Collaborator::new(config.collaborator.url.clone()))
            .config(config)
            .build();
        let router = build_router(&state).expect("Failed to build router");
        let server = axum_test::TestServer::new(router).expect("Failed to create test server");

        server.get("/api/health").await.assert_status_ok();

        let metrics_response = server.get("/internal/metrics").await;
        metrics_response.assert_status_ok();
        let metrics_content = metrics_response.text();
        assert!(metrics_content.contains("# HELP") || metrics_content.contains("# TYPE"));
    }

    #[tokio::test]
    async fn test_build_router_with_metrics_disabled() {
        let uploads = tempfile::tempdir().unwrap();
        let server = create_test_server(create_test_config(uploads.path(), unreachable_url().await));

        let metrics_response = server.get("/internal/metrics").await;
        metrics_response.assert_status(StatusCode::NOT_FOUND);
    }
}
