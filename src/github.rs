use std::fmt::Display;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod auth;
mod client;
pub use client::{GitHubApp, InstallationClient};

#[cfg(test)]
pub(crate) mod testing;

#[derive(Debug, Error)]
pub enum ApiError {
    /// GitHub answered, but not with a success status
    #[error("status {status}: {message}")]
    Response { status: u16, message: String },
    #[error("HTTP error")]
    Http(#[from] reqwest::Error),
    #[error("couldn't sign app JWT")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl Display for RepositoryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub repository: RepositoryRef,
    pub number: u64,
}

impl Display for PullRequestRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.repository, self.number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum WorkflowState {
    Active,
    Deleted,
    DisabledFork,
    DisabledInactivity,
    DisabledManually,
    Other(String),
}

impl From<String> for WorkflowState {
    fn from(state: String) -> Self {
        match state.as_str() {
            "active" => Self::Active,
            "deleted" => Self::Deleted,
            "disabled_fork" => Self::DisabledFork,
            "disabled_inactivity" => Self::DisabledInactivity,
            "disabled_manually" => Self::DisabledManually,
            _ => Self::Other(state),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Workflow {
    pub id: u64,
    pub name: String,
    pub state: WorkflowState,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub commit: CommitDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitDetails {
    pub message: String,
}

impl Commit {
    pub fn title(&self) -> &str {
        self.commit.message.lines().next().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    Closed,
}

/// The subset of the GitHub REST API the warden needs, scoped to one installation.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    async fn list_repo_workflows(&self, repo: &RepositoryRef) -> Result<Vec<Workflow>>;

    async fn enable_workflow(&self, repo: &RepositoryRef, workflow_id: u64) -> Result<()>;

    /// Comments on a pull request. Returns the id of the new comment.
    async fn create_comment(&self, pr: &PullRequestRef, body: &str) -> Result<u64>;

    async fn list_pull_commits(&self, pr: &PullRequestRef) -> Result<Vec<Commit>>;

    async fn update_pull_request_state(
        &self,
        pr: &PullRequestRef,
        state: PullRequestState,
    ) -> Result<()>;
}
