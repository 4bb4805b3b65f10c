pub mod scoring;

use crate::domain::recommendation::Recommendation;
use crate::error::StonksError;
use crate::storage::EventStore;
use std::collections::HashSet;

pub use scoring::{score_event, EventScore};

/// Number of most recent events considered per request.
pub const RECENT_WINDOW: i64 = 200;
pub const MAX_RECOMMENDATIONS: usize = 5;

/// Ranks the latest event of each recently active ticker.
///
/// Only the newest event per ticker is scored; candidates with a score of zero
/// or less are dropped. The sort is stable, so equal scores keep their
/// newest-first order.
pub async fn recommend(store: &dyn EventStore) -> Result<Vec<Recommendation>, StonksError> {
    let events = store.list_recent(RECENT_WINDOW).await?;

    let mut seen = HashSet::<String>::new();
    let mut candidates: Vec<Recommendation> = Vec::new();
    for event in events {
        if !seen.insert(event.ticker.clone()) {
            continue;
        }

        let EventScore { score, reason } = score_event(&event);
        if score > 0.0 {
            candidates.push(Recommendation {
                event,
                score,
                reason,
            });
        }
    }

    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates.truncate(MAX_RECOMMENDATIONS);

    tracing::debug!(
        tickers = seen.len(),
        returned = candidates.len(),
        "computed recommendations"
    );
    Ok(candidates)
}
