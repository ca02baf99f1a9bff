//! TMDB match confirmation: search, show the candidate in the modal, then
//! confirm it or reject it and search again without it.
//!
//! The flow's state lives in a [`SearchSession`] owned by the caller. A new
//! session starts with each user-initiated search; rejecting reuses it so the
//! excluded ids accumulate; confirming or closing the modal ends it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::app::App;
use crate::error::{Error, Result};
use crate::http::{log_failure, CancelToken, Method};
use crate::traits::{Dialogs, Page, Timer, Transport};

const TITLE_PROMPT: &str = "Enter the title to search on TMDB:";
const MEDIA_TYPE_PROMPT: &str = "Enter media type (movie or tv):";
const INVALID_QUERY: &str = "Valid title and media type are required.";
const NO_RESULTS: &str = "No results found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl FromStr for MediaType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "movie" => Ok(Self::Movie),
            "tv" => Ok(Self::Tv),
            _ => Err(Error::InvalidInput(INVALID_QUERY.to_string())),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Tv => write!(f, "tv"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub title: String,
    pub media_type: MediaType,
}

impl SearchQuery {
    /// Validate raw prompt answers. A dismissed prompt counts as empty.
    pub fn parse(title: Option<&str>, media_type: Option<&str>) -> Result<Self> {
        let title = title.unwrap_or_default().trim();
        let media_type = media_type.unwrap_or_default().parse::<MediaType>()?;
        if title.is_empty() {
            return Err(Error::InvalidInput(INVALID_QUERY.to_string()));
        }
        Ok(Self {
            title: title.to_string(),
            media_type,
        })
    }
}

/// The match currently offered in the modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: u64,
    pub title: String,
    pub overview: String,
    pub release_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FlowState {
    #[default]
    Idle,
    Searching,
    Showing(Candidate),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A candidate is in the modal awaiting confirm or reject.
    Shown(Candidate),
    /// The server returned no candidate; its message was alerted.
    NoResults(String),
}

#[derive(Debug, Default)]
pub struct SearchSession {
    query: Option<SearchQuery>,
    excluded_ids: Vec<u64>,
    state: FlowState,
    cancel: CancelToken,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids rejected so far, oldest first.
    pub fn excluded_ids(&self) -> &[u64] {
        &self.excluded_ids
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn query(&self) -> Option<&SearchQuery> {
        self.query.as_ref()
    }

    pub fn current(&self) -> Option<&Candidate> {
        match &self.state {
            FlowState::Showing(candidate) => Some(candidate),
            _ => None,
        }
    }

    /// Handle for aborting this session's in-flight request.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }
}

/// Search endpoint reply. The server names the fields either way, and may
/// send both id keys at once.
#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    tmdb_id: Option<u64>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, alias = "description")]
    overview: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConfirmResponse {
    #[serde(default)]
    message: Option<String>,
}

impl<T, P, D> App<T, P, D>
where
    T: Transport + Timer,
    P: Page,
    D: Dialogs,
{
    /// Ask for title and media type, then search.
    ///
    /// Invalid input is alerted here (no request is made) and returned as
    /// [`Error::InvalidInput`].
    pub async fn search_tmdb(&self, session: &mut SearchSession) -> Result<SearchOutcome> {
        let query = self.prompt_query().await?;
        self.run_search(session, query).await
    }

    async fn prompt_query(&self) -> Result<SearchQuery> {
        let title = self.dialogs.prompt(TITLE_PROMPT).await;
        let media_type = self.dialogs.prompt(MEDIA_TYPE_PROMPT).await;
        match SearchQuery::parse(title.as_deref(), media_type.as_deref()) {
            Ok(query) => Ok(query),
            Err(err) => {
                tracing::debug!(?title, ?media_type, "rejected search input");
                self.dialogs.alert(INVALID_QUERY).await;
                Err(err)
            }
        }
    }

    /// Search for `query`, skipping the session's excluded ids, and open the
    /// modal on a hit.
    pub async fn run_search(
        &self,
        session: &mut SearchSession,
        query: SearchQuery,
    ) -> Result<SearchOutcome> {
        session.state = FlowState::Searching;
        let body = json!({
            "title": query.title,
            "media_type": query.media_type,
            "excluded_ids": session.excluded_ids,
        });
        tracing::info!(
            title = %query.title,
            media_type = %query.media_type,
            excluded = session.excluded_ids.len(),
            "searching TMDB"
        );
        session.query = Some(query);

        let cancel = session.cancel.clone();
        let response: SearchResponse = match self
            .fetch_json(
                &self.config.endpoints.search_tmdb,
                Method::Post,
                Some(body),
                Some(&cancel),
            )
            .await
        {
            Ok(response) => response,
            Err(err) => {
                session.state = FlowState::Idle;
                log_failure("TMDB search", &err);
                return Err(err);
            }
        };

        // Id 0 is never a real TMDB entry.
        let Some(id) = response.id.or(response.tmdb_id).filter(|id| *id != 0) else {
            let message = response
                .message
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| NO_RESULTS.to_string());
            self.dialogs.alert(&message).await;
            session.state = FlowState::Idle;
            return Ok(SearchOutcome::NoResults(message));
        };

        let candidate = Candidate {
            id,
            title: response.title.unwrap_or_default(),
            overview: response.overview.unwrap_or_default(),
            release_date: response.release_date.unwrap_or_default(),
        };
        self.update_modal_content(&candidate);
        self.open_modal();
        session.state = FlowState::Showing(candidate.clone());
        Ok(SearchOutcome::Shown(candidate))
    }

    /// Accept the candidate in the modal. The modal closes whatever the
    /// outcome and the session returns to idle.
    ///
    /// Returns the server's message, if any.
    pub async fn confirm_tmdb(&self, session: &mut SearchSession) -> Result<Option<String>> {
        let Some(candidate) = session.current() else {
            tracing::warn!(state = ?session.state, "confirm without a shown result");
            return Err(Error::NoActiveCandidate);
        };

        // The modal's text is what the user saw and agreed to.
        let title = self
            .page
            .text(&self.config.dom.modal_title)
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| candidate.title.clone());
        let body = json!({
            "title": title,
            "tmdb_id": candidate.id,
            "media_type": session.query.as_ref().map(|query| query.media_type),
        });

        let cancel = session.cancel.clone();
        let result: Result<ConfirmResponse> = self
            .fetch_json(
                &self.config.endpoints.confirm_tmdb,
                Method::Post,
                Some(body),
                Some(&cancel),
            )
            .await;

        let result = match result {
            Ok(response) => {
                if let Some(message) = &response.message {
                    self.dialogs.alert(message).await;
                }
                Ok(response.message)
            }
            Err(err) => {
                log_failure("TMDB confirmation", &err);
                Err(err)
            }
        };
        self.close_modal();
        session.state = FlowState::Idle;
        result
    }

    /// Exclude the shown candidate, close the modal and search again.
    ///
    /// The previous query is replayed unless `search.reprompt_on_reject` asks
    /// for fresh input.
    pub async fn reject_tmdb(&self, session: &mut SearchSession) -> Result<SearchOutcome> {
        let Some(candidate) = session.current() else {
            tracing::warn!(state = ?session.state, "reject without a shown result");
            return Err(Error::NoActiveCandidate);
        };
        let id = candidate.id;
        session.excluded_ids.push(id);
        tracing::debug!(id, excluded = ?session.excluded_ids, "rejected TMDB match");

        self.close_modal();
        session.state = FlowState::Idle;

        match session.query.clone() {
            Some(query) if !self.config.search.reprompt_on_reject => {
                self.run_search(session, query).await
            }
            _ => self.search_tmdb(session).await,
        }
    }

    pub fn update_modal_content(&self, candidate: &Candidate) {
        let dom = &self.config.dom;
        for (id, text) in [
            (&dom.modal_title, &candidate.title),
            (&dom.modal_overview, &candidate.overview),
            (&dom.modal_release_date, &candidate.release_date),
        ] {
            if !self.page.set_text(id, text) {
                tracing::warn!(%id, "modal field not found");
            }
        }
    }

    pub fn open_modal(&self) {
        if !self.page.set_display(&self.config.dom.modal, true) {
            tracing::debug!(id = %self.config.dom.modal, "modal not found");
        }
    }

    pub fn close_modal(&self) {
        if !self.page.set_display(&self.config.dom.modal, false) {
            tracing::debug!(id = %self.config.dom.modal, "modal not found");
        }
    }
}
