use crate::domain::rating_event::{EventPage, PageRequest, RatingEvent};
use crate::error::StonksError;
use crate::storage::EventStore;
use chrono::{DateTime, Utc};

const SELECT_EVENTS: &str = "SELECT ticker, company, brokerage, action, rating_from, rating_to, \
     target_from, target_to, time, updated_at \
     FROM rating_events";

type EventRow = (
    String,
    String,
    String,
    String,
    String,
    String,
    f64,
    f64,
    DateTime<Utc>,
    DateTime<Utc>,
);

fn row_to_event(row: EventRow) -> RatingEvent {
    let (
        ticker,
        company,
        brokerage,
        action,
        rating_from,
        rating_to,
        target_from,
        target_to,
        time,
        updated_at,
    ) = row;
    RatingEvent {
        ticker,
        company,
        brokerage,
        action,
        rating_from,
        rating_to,
        target_from,
        target_to,
        time,
        updated_at,
    }
}

#[derive(Debug, Clone)]
pub struct PgEventStore {
    pool: sqlx::PgPool,
}

impl PgEventStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &sqlx::PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl EventStore for PgEventStore {
    async fn upsert_batch(&self, events: &[RatingEvent]) -> Result<(), StonksError> {
        if events.is_empty() {
            return Ok(());
        }

        let t0 = std::time::Instant::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StonksError::persistence("begin transaction failed", e))?;

        let mut inserted: usize = 0;
        let mut updated: usize = 0;
        for event in events {
            if upsert_one(&mut tx, event).await? {
                inserted += 1;
            } else {
                updated += 1;
            }
        }

        tx.commit()
            .await
            .map_err(|e| StonksError::persistence("commit transaction failed", e))?;

        tracing::debug!(
            batch_size = events.len(),
            inserted,
            updated,
            elapsed_ms = t0.elapsed().as_millis(),
            "rating_events batch upsert"
        );
        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<RatingEvent>, StonksError> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "{SELECT_EVENTS} ORDER BY time DESC, ticker ASC LIMIT $1"
        ))
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StonksError::persistence("failed to retrieve recent rating events", e))?;

        Ok(rows.into_iter().map(row_to_event).collect())
    }

    async fn list_by_ticker(&self, ticker: &str) -> Result<Vec<RatingEvent>, StonksError> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "{SELECT_EVENTS} WHERE ticker = $1 ORDER BY time DESC"
        ))
        .bind(ticker)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            StonksError::persistence(format!("failed to retrieve rating events for {ticker}"), e)
        })?;

        Ok(rows.into_iter().map(row_to_event).collect())
    }

    async fn list_page(&self, request: PageRequest) -> Result<EventPage, StonksError> {
        let total_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rating_events")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StonksError::persistence("failed to count rating events", e))?;

        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "{SELECT_EVENTS} ORDER BY time DESC, ticker ASC LIMIT $1 OFFSET $2"
        ))
        .bind(request.page_size)
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StonksError::persistence("failed to retrieve rating events page", e))?;

        Ok(EventPage::new(
            rows.into_iter().map(row_to_event).collect(),
            total_count,
            request,
        ))
    }
}

/// Returns `true` when the event was inserted, `false` when an existing row
/// with the same `(ticker, time)` was updated.
async fn upsert_one(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    event: &RatingEvent,
) -> Result<bool, StonksError> {
    let existing: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM rating_events WHERE ticker = $1 AND time = $2")
            .bind(&event.ticker)
            .bind(event.time)
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| {
                StonksError::persistence(
                    format!("existence check failed for {} @ {}", event.ticker, event.time),
                    e,
                )
            })?;

    if existing == 0 {
        sqlx::query(
            "INSERT INTO rating_events (ticker, company, brokerage, action, rating_from, rating_to, \
             target_from, target_to, time, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(&event.ticker)
        .bind(&event.company)
        .bind(&event.brokerage)
        .bind(&event.action)
        .bind(&event.rating_from)
        .bind(&event.rating_to)
        .bind(event.target_from)
        .bind(event.target_to)
        .bind(event.time)
        .bind(event.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            StonksError::persistence(
                format!("insert rating_events failed for {} @ {}", event.ticker, event.time),
                e,
            )
        })?;
        return Ok(true);
    }

    sqlx::query(
        "UPDATE rating_events \
         SET company = $3, brokerage = $4, action = $5, rating_from = $6, rating_to = $7, \
             target_from = $8, target_to = $9, updated_at = $10 \
         WHERE ticker = $1 AND time = $2",
    )
    .bind(&event.ticker)
    .bind(event.time)
    .bind(&event.company)
    .bind(&event.brokerage)
    .bind(&event.action)
    .bind(&event.rating_from)
    .bind(&event.rating_to)
    .bind(event.target_from)
    .bind(event.target_to)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await
    .map_err(|e| {
        StonksError::persistence(
            format!("update rating_events failed for {} @ {}", event.ticker, event.time),
            e,
        )
    })?;

    Ok(false)
}
