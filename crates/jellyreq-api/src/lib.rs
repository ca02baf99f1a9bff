//! HTTP transport for the jellyreq client, built on `reqwest`.
//!
//! On native targets requests go through hyper and timeouts sleep on tokio;
//! in the browser reqwest uses `fetch` and timeouts use `gloo-timers`.

pub mod error;
pub mod transport;

pub use error::ApiError;
pub use transport::HttpTransport;
