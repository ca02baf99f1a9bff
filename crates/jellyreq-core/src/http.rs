use std::fmt;
use std::future::Future;
use std::pin::{pin, Pin};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::{self, Either};
use futures::task::AtomicWaker;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::app::App;
use crate::error::{Error, Result};
use crate::traits::{Dialogs, Page, Timer, Transport};

/// Fallback message when a failed response carries no `error` field.
const REQUEST_FAILED: &str = "Request failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request as handed to a [`Transport`]. `url` may be relative to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Cloneable handle that aborts the request it is attached to.
///
/// Once cancelled a token stays cancelled; start a new one for new work.
/// Only the most recent waiter is woken, which matches how the client uses
/// it: one request in flight per token.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    waker: AtomicWaker,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.waker.wake();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub fn cancelled(&self) -> Cancelled<'_> {
        Cancelled { token: self }
    }
}

pub struct Cancelled<'a> {
    token: &'a CancelToken,
}

impl Future for Cancelled<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.token.is_cancelled() {
            return Poll::Ready(());
        }
        self.token.inner.waker.register(cx.waker());
        // Re-check: cancel() may have run between the load and the register.
        if self.token.is_cancelled() {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

/// Log a failed operation at the level its error deserves.
pub(crate) fn log_failure(context: &str, err: &Error) {
    match err {
        Error::Cancelled => tracing::debug!(context, "cancelled"),
        err => tracing::error!(context, error = %err, "failed"),
    }
}

impl<T, P, D> App<T, P, D>
where
    T: Transport + Timer,
    P: Page,
    D: Dialogs,
{
    /// JSON request carrying the page's CSRF token.
    ///
    /// `body` defaults to `{}` (GET requests carry none). Any failure is
    /// logged, alerted once as `An error occurred: ...` and returned, so
    /// callers only log. Cancellation is returned without an alert.
    pub async fn fetch_with_csrf(
        &self,
        url: &str,
        method: Method,
        body: Option<Value>,
    ) -> Result<Value> {
        self.fetch_json(url, method, body, None).await
    }

    /// [`fetch_with_csrf`](Self::fetch_with_csrf) with a typed response and
    /// an optional cancellation token.
    pub async fn fetch_json<R: DeserializeOwned>(
        &self,
        url: &str,
        method: Method,
        body: Option<Value>,
        cancel: Option<&CancelToken>,
    ) -> Result<R> {
        let result = async {
            let data = self.request_json(url, method, body, cancel).await?;
            serde_json::from_value(data).map_err(|e| Error::Decode(e.to_string()))
        }
        .await;

        match result {
            Ok(data) => Ok(data),
            Err(Error::Cancelled) => {
                tracing::debug!(url, "request cancelled");
                Err(Error::Cancelled)
            }
            Err(err) => {
                tracing::error!(url, %method, error = %err, "fetch error");
                self.dialogs
                    .alert(&format!("An error occurred: {err}"))
                    .await;
                Err(err)
            }
        }
    }

    async fn request_json(
        &self,
        url: &str,
        method: Method,
        body: Option<Value>,
        cancel: Option<&CancelToken>,
    ) -> Result<Value> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(token) = self.csrf_token() {
            headers.push((self.config.csrf.header.clone(), token));
        }
        let body = match method {
            Method::Get => None,
            _ => Some(body.unwrap_or_else(|| Value::Object(Default::default())).to_string()),
        };
        let request = HttpRequest {
            method,
            url: url.to_string(),
            headers,
            body,
        };

        let response = self.send_guarded(request, cancel).await?;

        // The body is parsed before the status check: error responses carry
        // their message as JSON too.
        let data: Value =
            serde_json::from_str(&response.body).map_err(|e| Error::Decode(e.to_string()))?;

        if !response.is_success() {
            let message = data
                .get("error")
                .and_then(Value::as_str)
                .filter(|message| !message.is_empty())
                .unwrap_or(REQUEST_FAILED)
                .to_string();
            tracing::warn!(status = response.status, url, "request rejected");
            return Err(Error::Request {
                status: response.status,
                message,
            });
        }

        Ok(data)
    }

    /// Race the transport against the configured timeout and the token.
    async fn send_guarded(
        &self,
        request: HttpRequest,
        cancel: Option<&CancelToken>,
    ) -> Result<HttpResponse> {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(Error::Cancelled);
        }

        let timeout = self.config.request_timeout();
        let send = async {
            self.transport
                .send(request)
                .await
                .map_err(|e| Error::Transport(e.to_string()))
        };
        let deadline = async move {
            match timeout {
                Some(duration) => {
                    self.transport.sleep(duration).await;
                    Error::TimedOut(duration)
                }
                None => future::pending().await,
            }
        };
        let cancelled = async {
            match cancel {
                Some(token) => {
                    token.cancelled().await;
                    Error::Cancelled
                }
                None => future::pending().await,
            }
        };
        let guard = async {
            match future::select(pin!(deadline), pin!(cancelled)).await {
                Either::Left((err, _)) | Either::Right((err, _)) => err,
            }
        };

        match future::select(pin!(send), pin!(guard)).await {
            Either::Left((result, _)) => result,
            Either::Right((err, _)) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::testing::{app_with, FakeDialogs, FakePage, FakeTransport};

    fn page() -> FakePage {
        FakePage::new().with_meta("csrf-token", "tok-1")
    }

    #[tokio::test]
    async fn test_success_resolves_without_alert() {
        let app = app_with(
            FakeTransport::new().respond(200, r#"{"ok": true, "message": "done"}"#),
            page(),
            FakeDialogs::new(),
        );

        let data = app
            .fetch_with_csrf("/media_routes/search-tmdb", Method::Post, None)
            .await
            .unwrap();

        assert_eq!(data, json!({"ok": true, "message": "done"}));
        assert!(app.dialogs.alerts().is_empty());
    }

    #[tokio::test]
    async fn test_request_carries_headers_and_default_body() {
        let app = app_with(
            FakeTransport::new().respond(200, "{}"),
            page(),
            FakeDialogs::new(),
        );

        app.fetch_with_csrf("/pause-download/abc", Method::Post, None)
            .await
            .unwrap();

        let sent = app.transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::Post);
        assert_eq!(sent[0].url, "/pause-download/abc");
        assert_eq!(sent[0].header("content-type"), Some("application/json"));
        assert_eq!(sent[0].header("X-CSRFToken"), Some("tok-1"));
        assert_eq!(sent[0].body.as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_get_sends_no_body() {
        let app = app_with(
            FakeTransport::new().respond(200, "{}"),
            page(),
            FakeDialogs::new(),
        );

        app.fetch_with_csrf("/check-library", Method::Get, Some(json!({"x": 1})))
            .await
            .unwrap();

        assert_eq!(app.transport.requests()[0].body, None);
    }

    #[tokio::test]
    async fn test_missing_token_still_sends() {
        let app = app_with(
            FakeTransport::new().respond(200, "{}"),
            FakePage::new(),
            FakeDialogs::new(),
        );

        app.fetch_with_csrf("/x", Method::Post, None).await.unwrap();

        let sent = app.transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].header("X-CSRFToken"), None);
    }

    #[tokio::test]
    async fn test_error_status_alerts_server_message_once() {
        let app = app_with(
            FakeTransport::new().respond(400, r#"{"error": "bad"}"#),
            page(),
            FakeDialogs::new(),
        );

        let err = app
            .fetch_with_csrf("/x", Method::Post, None)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Request { status: 400, ref message } if message == "bad"));
        let alerts = app.dialogs.alerts();
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].contains("bad"));
        assert_eq!(alerts[0], "An error occurred: bad");
    }

    #[tokio::test]
    async fn test_error_status_without_message_uses_fallback() {
        let app = app_with(
            FakeTransport::new().respond(500, "{}"),
            page(),
            FakeDialogs::new(),
        );

        let err = app.fetch_with_csrf("/x", Method::Post, None).await.unwrap_err();

        assert_eq!(err.to_string(), "Request failed");
        assert_eq!(app.dialogs.alerts(), vec!["An error occurred: Request failed"]);
    }

    #[tokio::test]
    async fn test_malformed_json_is_alerted() {
        let app = app_with(
            FakeTransport::new().respond(200, "<html>oops</html>"),
            page(),
            FakeDialogs::new(),
        );

        let err = app.fetch_with_csrf("/x", Method::Post, None).await.unwrap_err();

        assert!(matches!(err, Error::Decode(_)));
        assert_eq!(app.dialogs.alerts().len(), 1);
    }

    #[tokio::test]
    async fn test_network_failure_is_alerted() {
        let app = app_with(
            FakeTransport::new().fail("connection refused"),
            page(),
            FakeDialogs::new(),
        );

        let err = app.fetch_with_csrf("/x", Method::Post, None).await.unwrap_err();

        assert!(matches!(err, Error::Transport(ref m) if m.contains("connection refused")));
        assert_eq!(app.dialogs.alerts().len(), 1);
    }

    #[tokio::test]
    async fn test_hung_request_times_out() {
        let app = app_with(
            FakeTransport::new().hang().with_timer_firing(),
            page(),
            FakeDialogs::new(),
        );

        let err = app.fetch_with_csrf("/x", Method::Post, None).await.unwrap_err();

        assert!(matches!(err, Error::TimedOut(d) if d == Duration::from_secs(30)));
        assert_eq!(app.dialogs.alerts(), vec!["An error occurred: request timed out after 30s"]);
    }

    #[tokio::test]
    async fn test_cancelled_request_is_not_alerted() {
        let app = app_with(FakeTransport::new().hang(), page(), FakeDialogs::new());
        let token = CancelToken::new();
        let canceller = token.clone();

        let (result, ()) = tokio::join!(
            app.fetch_json::<Value>("/x", Method::Post, None, Some(&token)),
            async move {
                tokio::task::yield_now().await;
                canceller.cancel();
            }
        );

        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(app.dialogs.alerts().is_empty());
    }

    #[tokio::test]
    async fn test_already_cancelled_token_sends_nothing() {
        let app = app_with(FakeTransport::new().respond(200, "{}"), page(), FakeDialogs::new());
        let token = CancelToken::new();
        token.cancel();

        let result = app
            .fetch_json::<Value>("/x", Method::Post, None, Some(&token))
            .await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(app.transport.requests().is_empty());
    }

    #[test]
    fn test_method_names() {
        assert_eq!(Method::Post.to_string(), "POST");
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }
}
