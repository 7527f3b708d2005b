use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::types::UploadedFile;

/// Result of `POST /api/upload`.
///
/// `ai_data` is either the AI service's analysis, passed through untouched, or a
/// [`crate::types::FallbackAnalysis`] when the service could not be reached.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub file: UploadedFile,
    #[schema(value_type = Object)]
    pub ai_data: Value,
}
