use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The server answered with a non-success status. `message` is the
    /// server-provided `error` field, or a generic fallback.
    #[error("{message}")]
    Request { status: u16, message: String },

    #[error("network error: {0}")]
    Transport(String),

    #[error("invalid JSON response: {0}")]
    Decode(String),

    #[error("request timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("request cancelled")]
    Cancelled,

    #[error("{0}")]
    InvalidInput(String),

    #[error("no TMDB result is being shown")]
    NoActiveCandidate,

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
