//! Request-scoped domain types shared by the store, the collaborator client and the handlers.
//!
//! Wire names follow the browser client (`originalName`, `mimetype`, ...) so the existing
//! frontend keeps working against this gateway.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// A file persisted by the upload store. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UploadedFile {
    /// Name the file was stored under
    #[serde(rename = "filename")]
    pub generated_name: String,
    /// Name the client sent
    #[serde(rename = "originalName")]
    pub original_name: String,
    #[serde(rename = "size")]
    pub size_bytes: u64,
    #[serde(rename = "mimetype")]
    pub mime_type: String,
    /// Location on disk, relative to the working directory when the uploads dir is relative
    #[serde(rename = "path")]
    #[schema(value_type = String)]
    pub storage_path: PathBuf,
}

/// Which rendition of a stored file the client wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestedContent {
    Summary,
    Full,
}

/// Coarse classification reported in the upload fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Code,
    Document,
}

impl ContentKind {
    /// Only `.js` and `.py` count as code here; other source extensions are reported as
    /// documents, matching what clients already display.
    pub fn from_extension(extension: &str) -> Self {
        match extension {
            ".js" | ".py" => ContentKind::Code,
            _ => ContentKind::Document,
        }
    }
}

/// Placeholder preview used when the collaborator could not analyse an upload.
pub const FALLBACK_PREVIEW: &str = "File uploaded successfully";

/// Locally synthesized analysis returned when the collaborator is unavailable during upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FallbackAnalysis {
    pub content_type: ContentKind,
    pub file_type: String,
    pub content_length: u64,
    pub preview: String,
}

impl FallbackAnalysis {
    pub fn for_upload(file: &UploadedFile, file_type: &str) -> Self {
        Self {
            content_type: ContentKind::from_extension(file_type),
            file_type: file_type.to_string(),
            content_length: file.size_bytes,
            preview: FALLBACK_PREVIEW.to_string(),
        }
    }
}
