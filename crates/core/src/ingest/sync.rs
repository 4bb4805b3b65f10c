use crate::config::Settings;
use crate::domain::rating_event::RatingEvent;
use crate::error::{StonksError, SyncError};
use crate::ingest::feed::RatingFeed;
use crate::ingest::normalize::normalize_items;
use crate::storage::EventStore;
use chrono::Utc;

pub const DEFAULT_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Events per store transaction. The final batch may be smaller.
    pub batch_size: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl SyncOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            batch_size: settings.sync_batch_size,
        }
    }
}

/// Pulls every feed page and writes the events to `store` in fixed-size
/// batches, in fetch order.
///
/// Pages are fetched one at a time and a batch is only written once it is
/// full (or the feed is exhausted). On any failure the loop stops and the
/// error carries the number of events from batches that already committed.
pub async fn sync(
    feed: &dyn RatingFeed,
    store: &dyn EventStore,
    opts: &SyncOptions,
) -> Result<u64, SyncError> {
    let fail = |committed: u64, source: StonksError| SyncError { committed, source };

    if feed.endpoint().trim().is_empty() {
        return Err(fail(
            0,
            StonksError::Configuration("rating feed endpoint is not configured".into()),
        ));
    }
    if opts.batch_size < 1 {
        return Err(fail(
            0,
            StonksError::Configuration("sync batch size must be >= 1".into()),
        ));
    }

    let batch_size = opts.batch_size;
    let mut pending: Vec<RatingEvent> = Vec::with_capacity(batch_size * 2);
    let mut cursor: Option<String> = None;
    let mut committed: u64 = 0;
    let mut pages: u64 = 0;
    let mut malformed_prices: u64 = 0;

    tracing::info!(endpoint = feed.endpoint(), batch_size, "starting rating feed sync");

    loop {
        let page = feed
            .fetch_page(cursor.as_deref())
            .await
            .map_err(|e| fail(committed, e))?;
        pages += 1;

        let next = page.next_cursor().map(str::to_string);
        let normalized = normalize_items(page.items, Utc::now());
        malformed_prices += normalized.malformed_prices;
        pending.extend(normalized.events);

        while pending.len() >= batch_size {
            let batch: Vec<RatingEvent> = pending.drain(..batch_size).collect();
            write_batch(store, &batch, committed)
                .await
                .map_err(|e| fail(committed, e))?;
            committed += batch.len() as u64;
        }

        match next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    if !pending.is_empty() {
        write_batch(store, &pending, committed)
            .await
            .map_err(|e| fail(committed, e))?;
        committed += pending.len() as u64;
    }

    tracing::info!(
        committed,
        pages,
        malformed_prices,
        "rating feed sync complete"
    );
    Ok(committed)
}

async fn write_batch(
    store: &dyn EventStore,
    batch: &[RatingEvent],
    committed: u64,
) -> Result<(), StonksError> {
    tracing::debug!(batch_size = batch.len(), committed, "saving rating event batch");
    store.upsert_batch(batch).await
}
