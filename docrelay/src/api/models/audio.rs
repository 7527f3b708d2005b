use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

fn default_language() -> String {
    "en".to_string()
}

/// Body of `POST /api/generate-audio`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AudioRequest {
    pub text: String,
    /// Language code understood by the speech engine
    #[serde(default = "default_language")]
    #[schema(default = "en")]
    pub language: String,
}
