use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Error,
}

/// The one JSON shape every locally-produced response uses.
/// `data` is omitted entirely when there is nothing to carry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: ApiStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ApiResponse {
    pub fn success(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            status: ApiStatus::Success,
            message: message.into(),
            data,
        }
    }

    pub fn error(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            status: ApiStatus::Error,
            message: message.into(),
            data,
        }
    }
}
