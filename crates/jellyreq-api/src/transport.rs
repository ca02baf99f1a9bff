use std::time::Duration;

use jellyreq_core::{HttpRequest, HttpResponse, Method, Timer, Transport};
use reqwest::Client;
use url::Url;

use crate::error::ApiError;

/// `reqwest` client that resolves page-relative endpoints against `base`.
pub struct HttpTransport {
    http: Client,
    base: Url,
}

impl HttpTransport {
    /// `base` is usually the page origin, e.g. `https://requests.example.org/`.
    pub fn new(base: &str) -> Result<Self, ApiError> {
        Ok(Self::with_client(Client::new(), Url::parse(base)?))
    }

    pub fn with_client(http: Client, base: Url) -> Self {
        Self { http, base }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolve `url` against the base. Absolute URLs pass through.
    pub fn resolve(&self, url: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(url)?)
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

impl Transport for HttpTransport {
    type Error = ApiError;

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = self.resolve(&request.url)?;
        tracing::debug!(method = %request.method, %url, "sending request");

        let mut builder = self.http.request(to_reqwest(request.method), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        if !(200..300).contains(&status) {
            tracing::warn!(status, "server returned an error status");
        }
        Ok(HttpResponse { status, body })
    }
}

impl Timer for HttpTransport {
    async fn sleep(&self, duration: Duration) {
        #[cfg(not(target_arch = "wasm32"))]
        tokio::time::sleep(duration).await;
        #[cfg(target_arch = "wasm32")]
        gloo_timers::future::sleep(duration).await;
    }
}
