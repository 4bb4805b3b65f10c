pub mod domain;
pub mod error;
pub mod ingest;
pub mod recommend;
pub mod storage;

pub use error::{StonksError, SyncError};

pub mod config {
    use crate::error::StonksError;
    use crate::ingest::sync::DEFAULT_BATCH_SIZE;

    const DEFAULT_FEED_TIMEOUT_SECS: u64 = 10;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub sentry_dsn: Option<String>,
        pub feed_url: Option<String>,
        pub feed_auth_header: Option<String>,
        pub feed_auth_token: Option<String>,
        pub feed_timeout_secs: u64,
        pub sync_batch_size: usize,
    }

    impl Settings {
        pub fn from_env() -> Result<Self, StonksError> {
            let feed_timeout_secs = match non_empty_var("FEED_TIMEOUT_SECS") {
                Some(s) => s.parse::<u64>().map_err(|_| {
                    StonksError::Configuration(format!(
                        "FEED_TIMEOUT_SECS must be a non-negative integer (got {s:?})"
                    ))
                })?,
                None => DEFAULT_FEED_TIMEOUT_SECS,
            };

            let sync_batch_size = match non_empty_var("SYNC_BATCH_SIZE") {
                Some(s) => match s.parse::<usize>() {
                    Ok(n) if n >= 1 => n,
                    _ => {
                        return Err(StonksError::Configuration(format!(
                            "SYNC_BATCH_SIZE must be >= 1 (got {s:?})"
                        )))
                    }
                },
                None => DEFAULT_BATCH_SIZE,
            };

            Ok(Self {
                database_url: non_empty_var("DATABASE_URL"),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
                feed_url: non_empty_var("FEED_URL"),
                feed_auth_header: non_empty_var("FEED_AUTH_HEADER"),
                feed_auth_token: non_empty_var("FEED_AUTH_TOKEN"),
                feed_timeout_secs,
                sync_batch_size,
            })
        }

        pub fn require_database_url(&self) -> Result<&str, StonksError> {
            self.database_url
                .as_deref()
                .ok_or_else(|| StonksError::Configuration("DATABASE_URL is required".into()))
        }

        pub fn require_feed_url(&self) -> Result<&str, StonksError> {
            self.feed_url
                .as_deref()
                .ok_or_else(|| StonksError::Configuration("FEED_URL is required".into()))
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}
