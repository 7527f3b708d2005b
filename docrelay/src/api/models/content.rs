use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::types::RequestedContent;

/// Body of `POST /api/get-content`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentRequest {
    /// The `path` returned by the upload endpoint
    pub file_path: String,
    pub content_type: RequestedContent,
}
