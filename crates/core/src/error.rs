use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure kinds surfaced by the ingestion pipeline, the store and the
/// recommendation engine.
#[derive(Debug, Error)]
pub enum StonksError {
    /// A required setting is missing or invalid. Not retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The feed could not be reached (connect, TLS, timeout, body read).
    #[error("rating feed unavailable: {0}")]
    FeedUnavailable(#[source] reqwest::Error),

    /// The feed answered with a non-success status or an undecodable body.
    #[error("rating feed protocol error: {0}")]
    FeedProtocol(String),

    /// The store failed; a failed batch has been rolled back as a whole.
    #[error("persistence error: {context}: {source}")]
    Persistence {
        context: String,
        #[source]
        source: BoxError,
    },
}

impl StonksError {
    pub fn persistence(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Persistence {
            context: context.into(),
            source: source.into(),
        }
    }
}

/// A sync run that stopped early. `committed` counts the events of every
/// batch that was durably written before the failure.
#[derive(Debug, Error)]
#[error("sync stopped after {committed} committed events: {source}")]
pub struct SyncError {
    pub committed: u64,
    #[source]
    pub source: StonksError,
}
