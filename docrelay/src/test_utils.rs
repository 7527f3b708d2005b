//! Shared helpers for tests.

use crate::config::Config;
use axum_test::TestServer;
use std::path::Path;
use std::sync::Once;
use url::Url;

static CRYPTO_PROVIDER: Once = Once::new();

/// reqwest is built without a bundled rustls provider; `main` installs one, tests do it here.
pub fn install_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    });
}

/// A URL nothing is listening on, for exercising the AI-service-down paths.
pub async fn unreachable_url() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe listener");
    let addr = listener.local_addr().expect("Failed to read probe address");
    drop(listener);
    Url::parse(&format!("http://{addr}")).expect("Failed to build unreachable URL")
}

pub fn create_test_config(uploads_dir: &Path, collaborator_url: Url) -> Config {
    install_crypto_provider();

    let mut config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        uploads_dir: uploads_dir.to_path_buf(),
        ..Default::default()
    };
    config.collaborator.url = collaborator_url;
    config
}

pub fn create_test_server(config: Config) -> TestServer {
    crate::Application::new(config)
        .expect("Failed to create application")
        .into_test_server()
}
