//! Page-wide state shared between event handlers.
//!
//! A page has one [`Runtime`]. It owns the search session, so handlers only
//! pass events in, and it enforces that one search step and one action run
//! at a time.

use std::cell::{Cell, RefCell};

use futures::lock::Mutex;

use crate::action::DownloadAction;
use crate::app::App;
use crate::error::{Error, Result};
use crate::http::CancelToken;
use crate::report::Report;
use crate::tmdb::{FlowState, SearchOutcome, SearchSession};
use crate::traits::{Dialogs, Page, Timer, Transport};

/// Resets the flag when the guarded call ends, however it ends.
struct BusyGuard<'a>(&'a Cell<bool>);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

pub struct Runtime<T, P, D> {
    app: App<T, P, D>,
    /// Locked for the whole of a search, confirm or reject.
    session: Mutex<Option<SearchSession>>,
    /// Token of the current session, reachable while `session` is locked.
    active: RefCell<Option<CancelToken>>,
    action_busy: Cell<bool>,
}

impl<T, P, D> Runtime<T, P, D> {
    pub fn new(app: App<T, P, D>) -> Self {
        Self {
            app,
            session: Mutex::new(None),
            active: RefCell::new(None),
            action_busy: Cell::new(false),
        }
    }

    pub fn app(&self) -> &App<T, P, D> {
        &self.app
    }

    /// State of the current session. `None` when there is none, or while a
    /// search step holds it.
    pub fn session_state(&self) -> Option<FlowState> {
        let guard = self.session.try_lock()?;
        guard.as_ref().map(|session| session.state().clone())
    }

    /// Keep the session only while a candidate is on screen.
    fn settle(&self, session: &mut Option<SearchSession>, result: &Result<SearchOutcome>) {
        if !matches!(result, Ok(SearchOutcome::Shown(_))) {
            *session = None;
            self.active.borrow_mut().take();
        }
    }
}

impl<T, P, D> Runtime<T, P, D>
where
    T: Transport + Timer,
    P: Page,
    D: Dialogs,
{
    pub async fn handle_action(&self, url: &str, hash: &str, new_state: &str) -> Report {
        let Some(_busy) = BusyGuard::acquire(&self.action_busy) else {
            tracing::debug!(url, "action already running");
            return Report::Busy;
        };
        self.app.handle_action(url, hash, new_state).await.into()
    }

    pub async fn download_action(&self, action: DownloadAction, hash: &str) -> Report {
        let Some(_busy) = BusyGuard::acquire(&self.action_busy) else {
            tracing::debug!(action = action.slug(), "action already running");
            return Report::Busy;
        };
        self.app.download_action(action, hash).await.into()
    }

    /// Start a fresh search. Ignored while another search step is running.
    pub async fn search(&self) -> Report {
        let Some(mut guard) = self.session.try_lock() else {
            tracing::debug!("search already running");
            return Report::Busy;
        };
        let session = guard.insert(SearchSession::new());
        *self.active.borrow_mut() = Some(session.cancel_token());

        let result = self.app.search_tmdb(session).await;
        self.settle(&mut guard, &result);
        result.into()
    }

    pub async fn confirm(&self) -> Report {
        let Some(mut guard) = self.session.try_lock() else {
            return Report::Busy;
        };
        let result = match guard.as_mut() {
            Some(session) => self.app.confirm_tmdb(session).await,
            None => Err(Error::NoActiveCandidate),
        };
        *guard = None;
        self.active.borrow_mut().take();
        match result {
            Ok(message) => Report::Confirmed { message },
            Err(err) => err.into(),
        }
    }

    pub async fn reject(&self) -> Report {
        let Some(mut guard) = self.session.try_lock() else {
            return Report::Busy;
        };
        let Some(session) = guard.as_mut() else {
            return Error::NoActiveCandidate.into();
        };
        let result = self.app.reject_tmdb(session).await;
        self.settle(&mut guard, &result);
        result.into()
    }

    /// Hide the modal and end the search, aborting any request it has in
    /// flight.
    pub fn close_modal(&self) {
        if let Some(token) = self.active.borrow_mut().take() {
            token.cancel();
        }
        self.app.close_modal();
        // A running step sees the cancellation and clears the session itself.
        if let Some(mut guard) = self.session.try_lock() {
            *guard = None;
        }
    }
}
