use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub endpoints: EndpointsConfig,
    pub csrf: CsrfConfig,
    pub request: RequestConfig,
    pub search: SearchConfig,
    pub dom: DomConfig,
    pub dialogs: DialogsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointsConfig {
    pub search_tmdb: String,
    pub confirm_tmdb: String,
    /// URL template with `{action}` and `{hash}` placeholders.
    pub download_action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrfConfig {
    /// `name` attribute of the `<meta>` tag carrying the token.
    pub meta_name: String,
    /// Header the token is echoed in.
    pub header: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestConfig {
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Ask for title and media type again after a rejection instead of
    /// replaying the previous query.
    pub reprompt_on_reject: bool,
}

/// Element ids, selectors and class names of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomConfig {
    pub modal: String,
    pub modal_title: String,
    pub modal_overview: String,
    pub modal_release_date: String,
    pub close_modal_button: String,
    pub dark_mode_toggle: String,
    pub dark_mode_class: String,
    pub menu_toggle: String,
    pub nav_menu: String,
    pub menu_open_class: String,
    pub confirm_button: String,
    pub download_prefix: String,
    pub status_prefix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogStyle {
    /// In-page dialog components resolved through futures.
    Inline,
    /// `window.alert` / `confirm` / `prompt`.
    Native,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogsConfig {
    pub style: DialogStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `jellyreq_core=debug`.
    pub level: String,
}

impl ClientConfig {
    /// Parse a complete configuration document.
    pub fn from_toml(source: &str) -> Result<Self, Error> {
        toml::from_str(source).map_err(|e| Error::Config(e.to_string()))
    }

    /// Overlay a partial TOML document on the built-in defaults.
    ///
    /// Tables merge key by key, so `[dom]\nmodal = "x"` only replaces the
    /// modal id and keeps every other default.
    pub fn merge_toml(overlay: &str) -> Result<Self, Error> {
        let mut base: toml::Table =
            toml::from_str(DEFAULT_CONFIG).map_err(|e| Error::Config(e.to_string()))?;
        let overlay: toml::Table =
            toml::from_str(overlay).map_err(|e| Error::Config(e.to_string()))?;
        merge_tables(&mut base, overlay);
        toml::Value::Table(base)
            .try_into()
            .map_err(|e: toml::de::Error| Error::Config(e.to_string()))
    }

    /// Per-request timeout, `None` when disabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        match self.request.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

impl EndpointsConfig {
    pub fn download_url(&self, action: &str, hash: &str) -> String {
        self.download_action
            .replace("{action}", action)
            .replace("{hash}", hash)
    }
}

impl DomConfig {
    /// Id of the row removed when a download goes away.
    pub fn download_id(&self, hash: &str) -> String {
        format!("{}{hash}", self.download_prefix)
    }

    /// Id of the element holding a download's status label.
    pub fn status_id(&self, hash: &str) -> String {
        format!("{}{hash}", self.status_prefix)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        if let (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) =
            (base.get_mut(&key), &value)
        {
            merge_tables(existing, incoming.clone());
            continue;
        }
        base.insert(key, value);
    }
}
