use anyhow::Context;
use sqlx::pool::PoolConnection;
use sqlx::Postgres;

// Advisory locks are scoped to the Postgres session, so the guard pins the connection that
// took the lock. Keeps two sync runs from interleaving their batches; reads are not blocked.
const SYNC_LOCK_KEY: i64 = 0x5354_4F4E_4B53; // "STONKS"

#[derive(Debug)]
pub struct SyncLock {
    conn: PoolConnection<Postgres>,
}

/// `None` when another session already holds the sync lock.
pub async fn try_acquire_sync_lock(pool: &sqlx::PgPool) -> anyhow::Result<Option<SyncLock>> {
    let mut conn = pool
        .acquire()
        .await
        .context("failed to acquire connection for sync lock")?;

    let acquired: (bool,) = sqlx::query_as("SELECT pg_try_advisory_lock($1)")
        .persistent(false)
        .bind(SYNC_LOCK_KEY)
        .fetch_one(&mut *conn)
        .await
        .with_context(|| format!("failed to acquire sync advisory lock (key={SYNC_LOCK_KEY})"))?;

    Ok(acquired.0.then_some(SyncLock { conn }))
}

impl SyncLock {
    pub async fn release(mut self) -> anyhow::Result<()> {
        sqlx::query("SELECT pg_advisory_unlock($1)")
            .persistent(false)
            .bind(SYNC_LOCK_KEY)
            .execute(&mut *self.conn)
            .await
            .with_context(|| {
                format!("failed to release sync advisory lock (key={SYNC_LOCK_KEY})")
            })?;
        Ok(())
    }
}
