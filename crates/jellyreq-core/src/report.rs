use serde::Serialize;

use crate::action::{ActionOutcome, TargetState};
use crate::error::{Error, Result};
use crate::tmdb::{Candidate, SearchOutcome};

/// Result of a page-level call, serialized for the page's scripts. Failures
/// were already shown to the user, so they are outcomes here, not errors.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Report {
    Declined,
    NoMessage,
    Applied {
        state: String,
        removed: bool,
    },
    Shown {
        id: u64,
        title: String,
        overview: String,
        release_date: String,
    },
    NoResults {
        message: String,
    },
    Confirmed {
        message: Option<String>,
    },
    InvalidInput {
        message: String,
    },
    Cancelled,
    /// Another call of the same kind is still running.
    Busy,
    Failed {
        message: String,
    },
}

impl From<ActionOutcome> for Report {
    fn from(outcome: ActionOutcome) -> Self {
        match outcome {
            ActionOutcome::Declined => Self::Declined,
            ActionOutcome::NoMessage => Self::NoMessage,
            ActionOutcome::Applied(target) => Self::Applied {
                state: target.label().to_string(),
                removed: target == TargetState::Removed,
            },
        }
    }
}

impl From<SearchOutcome> for Report {
    fn from(outcome: SearchOutcome) -> Self {
        match outcome {
            SearchOutcome::Shown(Candidate {
                id,
                title,
                overview,
                release_date,
            }) => Self::Shown {
                id,
                title,
                overview,
                release_date,
            },
            SearchOutcome::NoResults(message) => Self::NoResults { message },
        }
    }
}

impl From<Error> for Report {
    fn from(err: Error) -> Self {
        match err {
            Error::Cancelled => Self::Cancelled,
            Error::InvalidInput(message) => Self::InvalidInput { message },
            other => Self::Failed {
                message: other.to_string(),
            },
        }
    }
}

impl<T: Into<Report>> From<Result<T>> for Report {
    fn from(result: Result<T>) -> Self {
        result.map_or_else(Report::from, Into::into)
    }
}
