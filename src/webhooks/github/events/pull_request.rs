use serde::Deserialize;

use crate::{
    github::PullRequestRef,
    webhooks::github::events::{pull_request_ref, Installation, PullRequest, Repository},
};

#[derive(Debug, Deserialize)]
pub struct PullRequestEvent {
    pub repository: Repository,
    pub pull_request: PullRequest,
    pub installation: Option<Installation>,
    pub action: PullRequestAction,
}

impl PullRequestEvent {
    pub fn pull_request_ref(&self) -> PullRequestRef {
        pull_request_ref(&self.repository, &self.pull_request)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum PullRequestAction {
    Opened,
    Reopened,
    ReadyForReview,
    Synchronize,
    Edited,
    Other(String),
}

impl From<String> for PullRequestAction {
    fn from(action: String) -> Self {
        match action.as_str() {
            "opened" => Self::Opened,
            "reopened" => Self::Reopened,
            "ready_for_review" => Self::ReadyForReview,
            "synchronize" => Self::Synchronize,
            "edited" => Self::Edited,
            _ => Self::Other(action),
        }
    }
}

impl PullRequestAction {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Opened => "opened",
            Self::Reopened => "reopened",
            Self::ReadyForReview => "ready_for_review",
            Self::Synchronize => "synchronize",
            Self::Edited => "edited",
            Self::Other(action) => action,
        }
    }
}
