//! Seams between the client logic and its host.
//!
//! The browser build implements these with `web-sys` and `reqwest`; tests
//! implement them with recording fakes. Nothing here requires `Send`: the
//! page runs on a single UI thread.

use std::future::Future;
use std::time::Duration;

use crate::http::{HttpRequest, HttpResponse};

/// Sends one HTTP request and yields the raw status and body.
pub trait Transport {
    type Error: std::error::Error + 'static;

    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, Self::Error>>;
}

/// Source of delays for request timeouts.
pub trait Timer {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

/// Synchronous access to the rendered page.
///
/// Every method tolerates a missing element and reports it through the
/// return value.
pub trait Page {
    /// `content` of `<meta name="{name}">`.
    fn meta_content(&self, name: &str) -> Option<String>;

    /// Text content of the element with the given id.
    fn text(&self, id: &str) -> Option<String>;

    /// Replace the text content of an element. Returns `false` if absent.
    fn set_text(&self, id: &str, text: &str) -> bool;

    /// Detach an element from the document. Returns `false` if absent.
    fn remove(&self, id: &str) -> bool;

    /// Show (`display: block`) or hide (`display: none`) an element.
    fn set_display(&self, id: &str, visible: bool) -> bool;

    /// Toggle a class on `<body>`, returning whether it is now present.
    fn toggle_body_class(&self, class: &str) -> bool;

    /// Toggle a class on the first element matching `selector`.
    ///
    /// `None` when nothing matches, otherwise whether the class is now present.
    fn toggle_class(&self, selector: &str, class: &str) -> Option<bool>;

    fn exists(&self, selector: &str) -> bool;
}

/// User-facing dialogs. Each call resolves once the user has answered.
pub trait Dialogs {
    fn alert(&self, message: &str) -> impl Future<Output = ()>;

    fn confirm(&self, message: &str) -> impl Future<Output = bool>;

    /// `None` when the user dismissed the dialog.
    fn prompt(&self, message: &str) -> impl Future<Output = Option<String>>;
}
