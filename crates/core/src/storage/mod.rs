pub mod lock;
pub mod memory;
pub mod postgres;

use crate::domain::rating_event::{EventPage, PageRequest, RatingEvent};
use crate::error::StonksError;
use anyhow::Context;

pub use memory::MemoryEventStore;
pub use postgres::PgEventStore;

/// Storage capability used by the sync loop and the read paths.
///
/// `upsert_batch` is all-or-nothing: either every event of the batch is
/// inserted/updated, or none is visible afterwards. Listings are ordered by
/// `time` descending, ties broken by ticker ascending.
#[async_trait::async_trait]
pub trait EventStore: Send + Sync {
    async fn upsert_batch(&self, events: &[RatingEvent]) -> Result<(), StonksError>;

    async fn list_recent(&self, limit: i64) -> Result<Vec<RatingEvent>, StonksError>;

    async fn list_by_ticker(&self, ticker: &str) -> Result<Vec<RatingEvent>, StonksError>;

    async fn list_page(&self, request: PageRequest) -> Result<EventPage, StonksError>;
}

pub async fn migrate(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("sqlx migrations failed")?;
    Ok(())
}
