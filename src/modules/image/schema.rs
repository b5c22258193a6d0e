use serde::{Deserialize, Serialize};

/// Image record as returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub code: String,
    pub image_url: String,
    pub uploaded_at: Option<chrono::DateTime<chrono::Utc>>,
}
