//! Client-side logic for the jellyreq request pages.
//!
//! Everything here is independent of the browser: DOM access, dialogs and
//! HTTP go through the traits in [`traits`], so the same flows run under
//! `jellyreq-wasm` in the page and under in-memory fakes in tests.

pub mod action;
pub mod app;
pub mod bootstrap;
pub mod config;
pub mod csrf;
pub mod error;
pub mod http;
pub mod report;
pub mod runtime;
pub mod tmdb;
pub mod toggles;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use action::{ActionOutcome, DownloadAction, TargetState};
pub use app::App;
pub use bootstrap::{confirm_message, Binding};
pub use config::{ClientConfig, DialogStyle};
pub use error::{Error, Result};
pub use http::{CancelToken, HttpRequest, HttpResponse, Method};
pub use report::Report;
pub use runtime::Runtime;
pub use tmdb::{Candidate, FlowState, MediaType, SearchOutcome, SearchQuery, SearchSession};
pub use traits::{Dialogs, Page, Timer, Transport};
