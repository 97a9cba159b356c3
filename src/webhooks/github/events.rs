use std::{convert::Infallible, fmt::Display, str::FromStr};

use serde::Deserialize;

use crate::{
    github::{PullRequestRef, RepositoryRef},
    utils::shorten_content,
};

mod ping;
mod pull_request;
mod pull_request_review;

pub use ping::*;
pub use pull_request::*;
pub use pull_request_review::*;

/// Value of the `X-GitHub-Event` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitHubEventType {
    Ping,
    PullRequest,
    PullRequestReview,
    /// Anything the app isn't subscribed to
    Other(String),
}

impl FromStr for GitHubEventType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ping" => Self::Ping,
            "pull_request" => Self::PullRequest,
            "pull_request_review" => Self::PullRequestReview,
            other => Self::Other(other.to_owned()),
        })
    }
}

impl GitHubEventType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ping => "ping",
            Self::PullRequest => "pull_request",
            Self::PullRequestReview => "pull_request_review",
            Self::Other(other) => other,
        }
    }
}

#[derive(Debug)]
pub enum GitHubEvent {
    Ping(PingEvent),
    PullRequest(PullRequestEvent),
    PullRequestReview(PullRequestReviewEvent),
}

impl GitHubEvent {
    /// Parses a payload according to its event type. Returns `None` for event types the app
    /// doesn't handle.
    pub fn from_payload(
        event_type: &GitHubEventType,
        payload: &str,
    ) -> serde_json::Result<Option<Self>> {
        let event = match event_type {
            GitHubEventType::Ping => Self::Ping(serde_json::from_str(payload)?),
            GitHubEventType::PullRequest => Self::PullRequest(serde_json::from_str(payload)?),
            GitHubEventType::PullRequestReview => {
                Self::PullRequestReview(serde_json::from_str(payload)?)
            }
            GitHubEventType::Other(_) => return Ok(None),
        };

        Ok(Some(event))
    }

    /// The dispatch key for this event, `None` for events that never trigger a policy.
    pub fn kind(&self) -> Option<EventKind> {
        match self {
            Self::Ping(_) => None,
            Self::PullRequest(event) => Some(EventKind::PullRequest(event.action.clone())),
            Self::PullRequestReview(event) => {
                Some(EventKind::PullRequestReview(event.action.clone()))
            }
        }
    }

    pub fn installation_id(&self) -> Option<u64> {
        let installation = match self {
            Self::Ping(event) => event.installation.as_ref(),
            Self::PullRequest(event) => event.installation.as_ref(),
            Self::PullRequestReview(event) => event.installation.as_ref(),
        };
        installation.map(|i| i.id)
    }
}

/// Event category and action, e.g. `pull_request.opened`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    PullRequest(PullRequestAction),
    PullRequestReview(ReviewAction),
}

impl Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PullRequest(action) => write!(f, "pull_request.{}", action.as_str()),
            Self::PullRequestReview(action) => {
                write!(f, "pull_request_review.{}", action.as_str())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct Repository {
    pub name: String,
    pub owner: GitHubUser,
}

impl Repository {
    pub fn reference(&self) -> RepositoryRef {
        RepositoryRef::new(&self.owner.login, &self.name)
    }
}

#[derive(Debug, Deserialize)]
pub struct Installation {
    pub id: u64,
}

#[derive(Debug, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub user: GitHubUser,
}

impl Display for PullRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PR #{}: {} by {}",
            self.number,
            shorten_content(&self.title),
            self.user.login
        )
    }
}

/// Builds the reference used for API calls from the payload's repository and pull request.
pub(crate) fn pull_request_ref(
    repository: &Repository,
    pull_request: &PullRequest,
) -> PullRequestRef {
    PullRequestRef {
        repository: repository.reference(),
        number: pull_request.number,
    }
}
