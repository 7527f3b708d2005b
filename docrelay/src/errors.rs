use crate::collaborator::CollaboratorError;
use crate::storage::StoreError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Upload request carried no `file` field
    #[error("No file uploaded")]
    MissingFile,

    /// Uploaded file's extension is not on the allow-list
    #[error("File type not supported: {extension:?}")]
    UnsupportedFileType { extension: String },

    /// Invalid request data
    #[error("{message}")]
    BadRequest { message: String },

    /// Writing the upload to disk failed
    #[error("Failed to store uploaded file")]
    FileProcessing(#[source] std::io::Error),

    /// The collaborator could not produce content for a stored file
    #[error("Content relay failed")]
    ContentRelayFailed(#[source] CollaboratorError),

    /// The collaborator could not synthesize audio
    #[error("Audio relay failed")]
    AudioRelayFailed(#[source] CollaboratorError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnsupportedFileType { extension } => Error::UnsupportedFileType { extension },
            StoreError::Io(e) => Error::FileProcessing(e),
        }
    }
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingFile | Error::UnsupportedFileType { .. } | Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::FileProcessing(_)
            | Error::ContentRelayFailed(_)
            | Error::AudioRelayFailed(_)
            | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::MissingFile => "No file uploaded".to_string(),
            Error::UnsupportedFileType { .. } => "File type not supported".to_string(),
            Error::BadRequest { message } => message.clone(),
            Error::FileProcessing(_) => "File processing failed".to_string(),
            Error::ContentRelayFailed(_) => "Failed to process content with AI service".to_string(),
            Error::AudioRelayFailed(_) => "Failed to generate audio with AI service".to_string(),
            Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Other(e) => {
                tracing::error!("Internal service error: {:#}", e);
            }
            Error::FileProcessing(e) => {
                tracing::error!(error = %e, "{}", self);
            }
            Error::ContentRelayFailed(e) | Error::AudioRelayFailed(e) => {
                tracing::error!(error = %e, "{}", self);
            }
            Error::MissingFile | Error::UnsupportedFileType { .. } | Error::BadRequest { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        (status, Json(json!({ "error": self.user_message() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
