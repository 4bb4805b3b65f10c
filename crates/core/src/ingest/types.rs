use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One page of the upstream feed. An empty `next_page` marks the last page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPage {
    #[serde(default)]
    pub items: Vec<RawItem>,
    #[serde(default)]
    pub next_page: String,
}

impl FeedPage {
    /// The cursor is opaque and passed back untouched.
    pub fn next_cursor(&self) -> Option<&str> {
        (!self.next_page.is_empty()).then_some(self.next_page.as_str())
    }
}

/// Feed item as received; target prices are currency strings such as `"$33.00"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawItem {
    pub ticker: String,
    pub company: String,
    pub brokerage: String,
    pub action: String,
    #[serde(default)]
    pub rating_from: String,
    #[serde(default)]
    pub rating_to: String,
    #[serde(default)]
    pub target_from: String,
    #[serde(default)]
    pub target_to: String,
    pub time: DateTime<Utc>,
}
