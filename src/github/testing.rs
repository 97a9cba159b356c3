use std::sync::Mutex;

use async_trait::async_trait;

use crate::github::{
    ApiError, Commit, GitHubApi, PullRequestRef, PullRequestState, RepositoryRef, Result,
    Workflow, WorkflowState,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    ListWorkflows(RepositoryRef),
    EnableWorkflow(RepositoryRef, u64),
    CreateComment(PullRequestRef, String),
    ListCommits(PullRequestRef),
    UpdateState(PullRequestRef, PullRequestState),
}

/// In-memory API recording every call it receives.
#[derive(Default)]
pub(crate) struct FakeGitHub {
    pub workflows: Vec<Workflow>,
    pub commits: Vec<Commit>,
    /// When set, listing workflows fails with this status
    pub workflows_status: Option<u16>,
    /// When set, enabling a workflow fails with this status
    pub enable_status: Option<u16>,
    pub calls: Mutex<Vec<Call>>,
}

impl FakeGitHub {
    pub fn with_workflows(workflows: Vec<Workflow>) -> Self {
        Self {
            workflows,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

pub(crate) fn workflow(id: u64, name: &str, state: WorkflowState) -> Workflow {
    Workflow {
        id,
        name: name.to_owned(),
        state,
    }
}

fn failure(status: u16) -> ApiError {
    ApiError::Response {
        status,
        message: "Not Found".to_owned(),
    }
}

#[async_trait]
impl GitHubApi for FakeGitHub {
    async fn list_repo_workflows(&self, repo: &RepositoryRef) -> Result<Vec<Workflow>> {
        self.record(Call::ListWorkflows(repo.clone()));
        match self.workflows_status {
            Some(status) => Err(failure(status)),
            None => Ok(self.workflows.clone()),
        }
    }

    async fn enable_workflow(&self, repo: &RepositoryRef, workflow_id: u64) -> Result<()> {
        self.record(Call::EnableWorkflow(repo.clone(), workflow_id));
        match self.enable_status {
            Some(status) => Err(failure(status)),
            None => Ok(()),
        }
    }

    async fn create_comment(&self, pr: &PullRequestRef, body: &str) -> Result<u64> {
        self.record(Call::CreateComment(pr.clone(), body.to_owned()));
        Ok(1)
    }

    async fn list_pull_commits(&self, pr: &PullRequestRef) -> Result<Vec<Commit>> {
        self.record(Call::ListCommits(pr.clone()));
        Ok(self.commits.clone())
    }

    async fn update_pull_request_state(
        &self,
        pr: &PullRequestRef,
        state: PullRequestState,
    ) -> Result<()> {
        self.record(Call::UpdateState(pr.clone(), state));
        Ok(())
    }
}
