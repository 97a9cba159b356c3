use tracing::{debug, info, trace};

use crate::{
    github::{GitHubApi, Result},
    webhooks::github::PullRequestEvent,
};

/// Fetches the commits of the pull request so they can be checked. No rule is enforced on them
/// for now: commits are only logged.
pub(crate) async fn validate_commits(
    api: &dyn GitHubApi,
    event: &PullRequestEvent,
) -> Result<()> {
    info!(
        "Received a pull request event for #{}",
        event.pull_request.number
    );

    let pr = event.pull_request_ref();
    let commits = api.list_pull_commits(&pr).await?;
    debug!("fetched {} commit(s) for {}", commits.len(), pr);

    for commit in &commits {
        trace!("{}: {}", commit.sha, commit.title());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        github::{
            testing::{Call, FakeGitHub},
            PullRequestRef, RepositoryRef,
        },
        webhooks::github::{fixtures, GitHubEvent, GitHubEventType},
    };

    #[tokio::test]
    async fn test_only_lists_commits() {
        let payload =
            fixtures::pull_request_payload("synchronize", "acme", "widgets", 42).to_string();
        let Ok(Some(GitHubEvent::PullRequest(event))) =
            GitHubEvent::from_payload(&GitHubEventType::PullRequest, &payload)
        else {
            panic!("expected a pull request event");
        };
        let api = FakeGitHub {
            commits: serde_json::from_value(serde_json::json!([
                { "sha": "6dcb09b5", "commit": { "message": "Fix tests", "author": null } },
            ]))
            .unwrap(),
            ..Default::default()
        };

        validate_commits(&api, &event).await.unwrap();

        assert_eq!(
            api.calls(),
            vec![Call::ListCommits(PullRequestRef {
                repository: RepositoryRef::new("acme", "widgets"),
                number: 42,
            })]
        );
    }
}
