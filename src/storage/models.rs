use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One short code ↔ original URL mapping with its click counter.
///
/// Records handed out by a registry are owned snapshots; the registry stays
/// the only writer of `click_count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub original_url: String,
    pub short_code: String,
    #[serde(default)]
    pub click_count: u64,
    pub created_at: DateTime<Utc>,
}

impl UrlRecord {
    /// A fresh record with a zero counter
    pub fn new(original_url: impl Into<String>, short_code: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            short_code: short_code.into(),
            click_count: 0,
            created_at: Utc::now(),
        }
    }
}
