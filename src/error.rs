use thiserror::Error;

/// Failure talking to the remote chunk source.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network, HTTP or JSON-RPC level failure.
    #[error("transport error: {0:#}")]
    Transport(#[source] anyhow::Error),
    /// The node answered, but the payload did not have the expected shape.
    #[error("malformed response: {0}")]
    Shape(String),
}

impl FetchError {
    pub fn shape(msg: impl Into<String>) -> Self {
        FetchError::Shape(msg.into())
    }
}

impl From<anyhow::Error> for FetchError {
    fn from(err: anyhow::Error) -> Self {
        FetchError::Transport(err)
    }
}

/// Errors surfaced by cursor construction and navigation.
///
/// Stale anchors are not errors: navigation silently returns the current
/// cursor instead.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("transaction {hash} not found")]
    NotFound { hash: String },
}
