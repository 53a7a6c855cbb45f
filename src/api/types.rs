//! Public API types (JSON bodies)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ErrorKind;

pub const MESSAGE_CREATED: &str = "Url Generated";
pub const MESSAGE_EXISTING: &str = "Url already exists";

/// `POST /api/short` request body
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShortRequest {
    #[serde(default)]
    pub original_url: String,
}

/// `POST /api/short` response body
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShortResponse {
    pub message: String,
    pub short_url: String,
    pub short_code: String,
    pub click_count: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub qr_code_img: Option<String>,
}

/// One entry of `GET /api/history`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub original_url: String,
    pub short_url: String,
    pub short_code: String,
    pub click_count: u64,
    pub created_at: DateTime<Utc>,
}

/// Body of every error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStorageCheck {
    pub status: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthEventsCheck {
    pub subscribers: usize,
    pub published: u64,
    pub closed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub uptime: u64,
    pub storage: HealthStorageCheck,
    pub events: HealthEventsCheck,
    pub response_time_ms: u32,
}
