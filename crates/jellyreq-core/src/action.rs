use serde::Deserialize;

use crate::app::App;
use crate::error::Result;
use crate::http::{log_failure, Method};
use crate::traits::{Dialogs, Page, Timer, Transport};

const ACTION_PROMPT: &str = "Are you sure you want to perform this action?";

/// Label that removes the download row instead of relabelling it.
pub const REMOVED: &str = "Removed";

/// What the page should show for an item once its action succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetState {
    Removed,
    Status(String),
}

impl TargetState {
    pub fn parse(label: &str) -> Self {
        if label == REMOVED {
            Self::Removed
        } else {
            Self::Status(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Removed => REMOVED,
            Self::Status(label) => label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The user declined the confirmation; nothing was sent.
    Declined,
    /// The server answered without a message; the page was left alone.
    NoMessage,
    Applied(TargetState),
}

/// Torrent controls exposed by the server as `/{action}-download/{hash}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadAction {
    Pause,
    Resume,
    Remove,
}

impl DownloadAction {
    pub fn slug(self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Remove => "remove",
        }
    }

    /// Status label the row takes after the action.
    pub fn target_label(self) -> &'static str {
        match self {
            Self::Pause => "Paused",
            Self::Resume => "Downloading",
            Self::Remove => REMOVED,
        }
    }
}

impl std::str::FromStr for DownloadAction {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            "remove" => Ok(Self::Remove),
            other => Err(crate::error::Error::InvalidInput(format!(
                "unknown download action: {other}"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ActionResponse {
    message: Option<String>,
}

impl<T, P, D> App<T, P, D>
where
    T: Transport + Timer,
    P: Page,
    D: Dialogs,
{
    /// Confirm, POST to `url`, then patch the row of item `hash`.
    ///
    /// With `new_state == "Removed"` the `download-{hash}` element is removed,
    /// otherwise `status-{hash}` gets `new_state` as its text. The page is only
    /// touched when the response carries a message. Request failures were
    /// already alerted by the fetch wrapper and are only logged here.
    pub async fn handle_action(
        &self,
        url: &str,
        hash: &str,
        new_state: &str,
    ) -> Result<ActionOutcome> {
        if !self.confirm_action(Some(ACTION_PROMPT)).await {
            tracing::debug!(url, hash, "action declined");
            return Ok(ActionOutcome::Declined);
        }

        let response: ActionResponse = self
            .fetch_json(url, Method::Post, None, None)
            .await
            .inspect_err(|err| log_failure("action handling", err))?;

        let Some(message) = response.message.filter(|message| !message.is_empty()) else {
            return Ok(ActionOutcome::NoMessage);
        };
        self.dialogs.alert(&message).await;

        let target = TargetState::parse(new_state);
        match &target {
            TargetState::Removed => {
                let id = self.config.dom.download_id(hash);
                if !self.page.remove(&id) {
                    tracing::warn!(%id, "download row not found");
                }
            }
            TargetState::Status(label) => {
                let id = self.config.dom.status_id(hash);
                if !self.page.set_text(&id, label) {
                    tracing::warn!(%id, "status element not found");
                }
            }
        }
        tracing::info!(hash, state = target.label(), "action applied");
        Ok(ActionOutcome::Applied(target))
    }

    pub async fn download_action(
        &self,
        action: DownloadAction,
        hash: &str,
    ) -> Result<ActionOutcome> {
        let url = self.config.endpoints.download_url(action.slug(), hash);
        self.handle_action(&url, hash, action.target_label()).await
    }
}
