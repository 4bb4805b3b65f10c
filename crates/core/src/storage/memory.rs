use crate::domain::rating_event::{EventPage, PageRequest, RatingEvent};
use crate::error::StonksError;
use crate::storage::EventStore;
use chrono::Utc;
use std::cmp::Ordering;

/// In-process store with the same contract as [`super::PgEventStore`].
///
/// Batches are applied to a copy of the rows and swapped in only when every
/// event succeeded.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    rows: tokio::sync::Mutex<Vec<RatingEvent>>,
    failing_ticker: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("injected write failure for ticker {0}")]
pub struct InjectedFailure(pub String);

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Any batch containing `ticker` fails when that event is reached.
    pub fn with_failing_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.failing_ticker = Some(ticker.into());
        self
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }

    async fn sorted(&self) -> Vec<RatingEvent> {
        let mut rows = self.rows.lock().await.clone();
        rows.sort_by(newest_first);
        rows
    }
}

fn newest_first(a: &RatingEvent, b: &RatingEvent) -> Ordering {
    b.time.cmp(&a.time).then_with(|| a.ticker.cmp(&b.ticker))
}

#[async_trait::async_trait]
impl EventStore for MemoryEventStore {
    async fn upsert_batch(&self, events: &[RatingEvent]) -> Result<(), StonksError> {
        if events.is_empty() {
            return Ok(());
        }

        let mut rows = self.rows.lock().await;
        let mut staged = rows.clone();

        for event in events {
            if self.failing_ticker.as_deref() == Some(event.ticker.as_str()) {
                return Err(StonksError::persistence(
                    "failed to save rating event batch",
                    InjectedFailure(event.ticker.clone()),
                ));
            }

            match staged.iter_mut().find(|row| row.same_key(event)) {
                Some(row) => row.apply_update(event, Utc::now()),
                None => staged.push(event.clone()),
            }
        }

        *rows = staged;
        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<RatingEvent>, StonksError> {
        let mut rows = self.sorted().await;
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn list_by_ticker(&self, ticker: &str) -> Result<Vec<RatingEvent>, StonksError> {
        let mut rows = self.sorted().await;
        rows.retain(|row| row.ticker == ticker);
        Ok(rows)
    }

    async fn list_page(&self, request: PageRequest) -> Result<EventPage, StonksError> {
        let rows = self.sorted().await;
        let total_count = rows.len() as i64;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let page_size = usize::try_from(request.page_size).unwrap_or(usize::MAX);

        let events = rows.into_iter().skip(offset).take(page_size).collect();
        Ok(EventPage::new(events, total_count, request))
    }
}
