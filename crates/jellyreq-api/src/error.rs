use thiserror::Error;

/// Errors from the HTTP transport. Status codes are not errors here: the
/// client inspects them itself.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}
