use anyhow::Context;
use clap::{Parser, Subcommand};
use stonks_core::config::Settings;
use stonks_core::domain::rating_event::PageRequest;
use stonks_core::ingest::feed::HttpRatingFeed;
use stonks_core::ingest::sync::SyncOptions;
use stonks_core::storage::{EventStore, PgEventStore};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Page sizes above this fall back to the default, as the listing endpoint always did.
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Parser)]
#[command(name = "stonks_worker")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Pull every page of the rating feed and upsert it into the database.
    Sync,

    /// Print the current top recommendations.
    Recommend,

    /// Print one page of stored events, newest first.
    List {
        #[arg(long, default_value_t = 1)]
        page: i64,

        #[arg(long, default_value_t = 20)]
        page_size: i64,
    },

    /// Print every stored event for a ticker, newest first.
    Ticker { ticker: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let result = run(args.command, &settings).await;
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %format!("{err:#}"), "command failed");
    }
    result
}

async fn run(command: Command, settings: &Settings) -> anyhow::Result<()> {
    let db_url = settings.require_database_url()?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .context("connect DATABASE_URL failed")?;

    stonks_core::storage::migrate(&pool).await?;

    let store = PgEventStore::new(pool);

    match command {
        Command::Sync => run_sync(settings, &store).await,
        Command::Recommend => {
            let recs = stonks_core::recommend::recommend(&store).await?;
            if recs.is_empty() {
                print_json(&serde_json::json!({
                    "message": "No recommendations available at this time"
                }))
            } else {
                print_json(&recs)
            }
        }
        Command::List { page, page_size } => {
            let page = store.list_page(list_request(page, page_size)).await?;
            print_json(&page)
        }
        Command::Ticker { ticker } => {
            let ticker = ticker.trim();
            anyhow::ensure!(!ticker.is_empty(), "ticker must be non-empty");

            let events = store.list_by_ticker(ticker).await?;
            anyhow::ensure!(!events.is_empty(), "no rating events found for ticker {ticker}");
            print_json(&events)
        }
    }
}

async fn run_sync(settings: &Settings, store: &PgEventStore) -> anyhow::Result<()> {
    let feed = HttpRatingFeed::from_settings(settings)?;
    let opts = SyncOptions::from_settings(settings);

    let Some(lock) = stonks_core::storage::lock::try_acquire_sync_lock(store.pool()).await? else {
        tracing::warn!("sync lock not acquired; another sync is in progress");
        return Ok(());
    };

    let result = stonks_core::ingest::sync::sync(&feed, store, &opts).await;

    if let Err(e) = lock.release().await {
        tracing::warn!(error = %e, "failed to release sync lock");
    }

    match result {
        Ok(count) => print_json(&serde_json::json!({
            "message": "Successfully synced stocks",
            "count": count,
        })),
        Err(err) => {
            tracing::error!(committed = err.committed, error = %err.source, "sync stopped early");
            Err(anyhow::Error::new(err).context("failed to sync stocks"))
        }
    }
}

fn list_request(page: i64, page_size: i64) -> PageRequest {
    let page_size = if page_size > MAX_PAGE_SIZE { 0 } else { page_size };
    PageRequest::new(page, page_size)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{out}");
    Ok(())
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
