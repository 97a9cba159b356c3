use serde::Deserialize;

use crate::{
    github::PullRequestRef,
    webhooks::github::events::{
        pull_request_ref, GitHubUser, Installation, PullRequest, Repository,
    },
};

#[derive(Debug, Deserialize)]
pub struct PullRequestReviewEvent {
    pub repository: Repository,
    pub pull_request: PullRequest,
    pub review: Review,
    pub installation: Option<Installation>,
    pub action: ReviewAction,
}

impl PullRequestReviewEvent {
    pub fn pull_request_ref(&self) -> PullRequestRef {
        pull_request_ref(&self.repository, &self.pull_request)
    }
}

#[derive(Debug, Deserialize)]
pub struct Review {
    pub state: String,
    pub user: GitHubUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum ReviewAction {
    Submitted,
    Edited,
    Dismissed,
    Other(String),
}

impl From<String> for ReviewAction {
    fn from(action: String) -> Self {
        match action.as_str() {
            "submitted" => Self::Submitted,
            "edited" => Self::Edited,
            "dismissed" => Self::Dismissed,
            _ => Self::Other(action),
        }
    }
}

impl ReviewAction {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Submitted => "submitted",
            Self::Edited => "edited",
            Self::Dismissed => "dismissed",
            Self::Other(action) => action,
        }
    }
}
