use tracing::{debug, info};

use crate::{
    github::{GitHubApi, PullRequestState, Result},
    warden::manually_disabled,
    webhooks::github::PullRequestReviewEvent,
};

const CLOSED_COMMENT: &str = "This Pull Request was closed because a review was submitted while \
                              the Approval Check(s) were disabled -> Re-open the PR";

/// Closes the pull request when a review comes in while a workflow is manually disabled.
///
/// Unlike workflow reinstatement, only the first disabled workflow matters: the pull request is
/// commented on and closed once at most.
pub(crate) async fn review_gate(
    api: &dyn GitHubApi,
    event: &PullRequestReviewEvent,
) -> Result<()> {
    info!(
        "Received a pull request review event for #{} ({} by {})",
        event.pull_request.number, event.review.state, event.review.user.login
    );

    let pr = event.pull_request_ref();
    let workflows = api.list_repo_workflows(&pr.repository).await?;

    if let Some(workflow) = manually_disabled(&workflows).next() {
        debug!(
            "workflow {} is disabled during review of {}",
            workflow.name, pr
        );
        api.create_comment(&pr, CLOSED_COMMENT).await?;
        api.update_pull_request_state(&pr, PullRequestState::Closed)
            .await?;
        info!("Closed {} because {} was disabled", pr, workflow.name);
    }

    Ok(())
}
