//! HTTP client for the external AI processing service.
//!
//! The service exposes three JSON endpoints (`process-file`, `get-content`, `generate-audio`).
//! Every call is a single attempt with the client's default timeouts; any transport failure,
//! non-success status or non-JSON body is reported as a [`CollaboratorError`] and it is up to the
//! caller to decide between a fallback and failing the request.

use crate::types::RequestedContent;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error as ThisError;
use tracing::{debug, instrument};
use url::Url;

#[derive(ThisError, Debug)]
pub enum CollaboratorError {
    /// Connection refused, DNS failure, reset, timeout...
    #[error("AI service unreachable at {endpoint}: {source}")]
    Unreachable {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("AI service returned HTTP {status} from {endpoint}")]
    Status { endpoint: &'static str, status: u16 },

    #[error("AI service returned an unreadable body from {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid AI service URL for {endpoint}: {source}")]
    Url {
        endpoint: &'static str,
        #[source]
        source: url::ParseError,
    },
}

impl CollaboratorError {
    pub fn endpoint(&self) -> &'static str {
        match self {
            CollaboratorError::Unreachable { endpoint, .. }
            | CollaboratorError::Status { endpoint, .. }
            | CollaboratorError::Decode { endpoint, .. }
            | CollaboratorError::Url { endpoint, .. } => endpoint,
        }
    }
}

pub type Result<T> = std::result::Result<T, CollaboratorError>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessFileRequest {
    /// Absolute path, so the service can read the file regardless of its working directory
    pub file_path: String,
    pub file_name: String,
    pub file_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRelayRequest {
    pub file_path: String,
    pub content_type: RequestedContent,
}

#[derive(Debug, Clone, Serialize)]
pub struct AudioRelayRequest {
    pub text: String,
    pub language: String,
}

/// Client for the AI processing service. Cheap to clone; clones share a connection pool.
#[derive(Debug, Clone)]
pub struct Collaborator {
    client: Client,
    base_url: Url,
}

impl Collaborator {
    pub fn new(base_url: Url) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, mut base_url: Url) -> Self {
        // Url::join replaces the last segment unless the base ends in a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Ask the service to analyse a freshly stored upload.
    pub async fn process_file(&self, request: &ProcessFileRequest) -> Result<Value> {
        self.post("process-file", request).await
    }

    /// Ask for the full text or a summary of a stored file.
    pub async fn get_content(&self, request: &ContentRelayRequest) -> Result<Value> {
        self.post("get-content", request).await
    }

    /// Ask for speech synthesis of `text`. The service answers with an audio URL.
    pub async fn generate_audio(&self, request: &AudioRelayRequest) -> Result<Value> {
        self.post("generate-audio", request).await
    }

    #[instrument(skip(self, body), fields(base_url = %self.base_url), err)]
    async fn post<B: Serialize + ?Sized>(&self, endpoint: &'static str, body: &B) -> Result<Value> {
        let url = self
            .base_url
            .join(endpoint)
            .map_err(|source| CollaboratorError::Url { endpoint, source })?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|source| CollaboratorError::Unreachable { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollaboratorError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let payload = response
            .json::<Value>()
            .await
            .map_err(|source| CollaboratorError::Decode { endpoint, source })?;

        debug!(endpoint, "AI service call succeeded");
        Ok(payload)
    }
}
