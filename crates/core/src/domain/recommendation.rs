use crate::domain::rating_event::RatingEvent;
use serde::{Deserialize, Serialize};

/// Derived on every request from stored events; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "stock")]
    pub event: RatingEvent,
    pub score: f64,
    pub reason: String,
}
