//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `DOCRELAY_CONFIG`
//! environment variable. A missing file is not an error: every field has a default.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `DOCRELAY_` override YAML values
//! 3. **PORT** - Special case: overrides `port` if set
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `DOCRELAY_COLLABORATOR__URL=http://ai:8001` sets the `collaborator.url` field.
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Listen on another port
//! PORT=8080
//!
//! # Point at a remote AI service
//! DOCRELAY_COLLABORATOR__URL="http://ai-service.internal:8001"
//!
//! # Serve the prebuilt client bundle
//! DOCRELAY_PRODUCTION=true
//! DOCRELAY_CLIENT_DIST_DIR=/srv/reader/dist
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error as ThisError;
use url::Url;

/// Extensions accepted by the upload store unless overridden.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".docx", ".doc", ".pptx", ".txt", ".js", ".py", ".java", ".cpp", ".c"];

/// A configuration that parsed but cannot be served.
#[derive(ThisError, Debug, PartialEq)]
#[error("Invalid configuration: {0}")]
pub struct InvalidConfig(String);

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "DOCRELAY_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Directory uploaded files are written to. Created on first upload if missing.
    pub uploads_dir: PathBuf,
    /// Lower-case file extensions, including the leading dot, that may be uploaded
    pub allowed_extensions: Vec<String>,
    /// The AI processing service uploads and relays are forwarded to
    pub collaborator: CollaboratorConfig,
    /// Serve the prebuilt client bundle from `client_dist_dir`, with an `index.html` fallback
    pub production: bool,
    /// Location of the prebuilt client bundle
    pub client_dist_dir: PathBuf,
    /// Cross-origin settings for the browser client
    pub cors: CorsConfig,
    /// Enable Prometheus metrics endpoint at `/internal/metrics`
    pub enable_metrics: bool,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

/// Where the AI processing service lives.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollaboratorConfig {
    /// Base URL; endpoint names are appended to it
    pub url: Url,
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<CorsOrigin>,
    /// Allow credentials (cookies) in CORS requests
    pub allow_credentials: bool,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

/// A single allowed CORS origin.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CorsOrigin {
    /// Allow all origins (`*`)
    #[serde(deserialize_with = "parse_wildcard")]
    Wildcard,
    /// Specific origin URL (e.g., `https://reader.example.com`)
    #[serde(deserialize_with = "parse_url")]
    Url(Url),
}

fn parse_wildcard<'de, D>(deserializer: D) -> Result<(), D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if s == "*" {
        Ok(())
    } else {
        Err(serde::de::Error::custom("Expected '*'"))
    }
}

fn parse_url<'de, D>(deserializer: D) -> Result<Url, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Url::parse(&s).map_err(serde::de::Error::custom)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5002,
            uploads_dir: PathBuf::from("uploads"),
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            collaborator: CollaboratorConfig::default(),
            production: false,
            client_dist_dir: PathBuf::from("frontend/dist"),
            cors: CorsConfig::default(),
            enable_metrics: false,
            enable_otel_export: false,
        }
    }
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        Self {
            url: Url::parse("http://localhost:8001").expect("static URL is valid"),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![CorsOrigin::Wildcard],
            allow_credentials: false,
            max_age: Some(3600), // Cache preflight for 1 hour
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            // DOCRELAY_CONFIG names the file itself and is read by `Args`
            .merge(Env::prefixed("DOCRELAY_").ignore(&["CONFIG"]).split("__"))
            // Plain PORT is what hosting platforms set
            .merge(Env::raw().only(&["PORT"]))
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if self.allowed_extensions.is_empty() {
            return Err(InvalidConfig("allowed_extensions must list at least one extension".to_string()));
        }

        for ext in &self.allowed_extensions {
            if ext.len() < 2 || !ext.starts_with('.') || ext[1..].contains('.') {
                return Err(InvalidConfig(format!("invalid extension '{ext}', expected a form like '.pdf'")));
            }
            if ext.to_lowercase() != *ext {
                return Err(InvalidConfig(format!("extension '{ext}' must be lower case")));
            }
        }

        if !matches!(self.collaborator.url.scheme(), "http" | "https") {
            return Err(InvalidConfig(format!(
                "collaborator.url must use http or https, got '{}'",
                self.collaborator.url.scheme()
            )));
        }

        if self.cors.allow_credentials && self.cors.allowed_origins.contains(&CorsOrigin::Wildcard) {
            return Err(InvalidConfig("CORS allow_credentials cannot be combined with a wildcard origin".to_string()));
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
