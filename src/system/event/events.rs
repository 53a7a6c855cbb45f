use serde::{Deserialize, Serialize};

/// SSE event name carried by every click update
pub const CLICK_UPDATE_EVENT: &str = "clickUpdate";

/// 点击事件：短码及自增后的点击数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    pub short_code: String,
    pub click_count: u64,
}

impl ClickEvent {
    pub fn new(short_code: impl Into<String>, click_count: u64) -> Self {
        Self {
            short_code: short_code.into(),
            click_count,
        }
    }

    pub fn event_name(&self) -> &'static str {
        CLICK_UPDATE_EVENT
    }
}
