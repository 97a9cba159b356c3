use tracing::info;

use crate::{
    github::{GitHubApi, Result},
    warden::manually_disabled,
    webhooks::github::PullRequestEvent,
};

fn reenabled_comment(workflow_name: &str) -> String {
    format!(
        "Disabled workflow {} was enabled, workflows must stay enabled while pull requests are open.",
        workflow_name
    )
}

/// Re-enables every manually disabled workflow of the repository, leaving a comment on the pull
/// request for each of them.
pub(crate) async fn reinstate_workflows(
    api: &dyn GitHubApi,
    event: &PullRequestEvent,
) -> Result<()> {
    info!("Received a pull request event for {}", event.pull_request);

    let repo = event.repository.reference();
    let pr = event.pull_request_ref();
    let workflows = api.list_repo_workflows(&repo).await?;

    for workflow in manually_disabled(&workflows) {
        api.enable_workflow(&repo, workflow.id).await?;
        api.create_comment(&pr, &reenabled_comment(&workflow.name)).await?;
        info!("Disabled workflow {} was enabled", workflow.name);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        github::{
            testing::{workflow, Call, FakeGitHub},
            ApiError, PullRequestRef, RepositoryRef, WorkflowState,
        },
        webhooks::github::{fixtures, GitHubEvent, GitHubEventType},
    };

    fn opened(owner: &str, name: &str, number: u64) -> PullRequestEvent {
        let payload = fixtures::pull_request_payload("opened", owner, name, number).to_string();
        match GitHubEvent::from_payload(&GitHubEventType::PullRequest, &payload) {
            Ok(Some(GitHubEvent::PullRequest(event))) => event,
            other => panic!("unexpected event {:?}", other),
        }
    }

    fn widgets() -> RepositoryRef {
        RepositoryRef::new("acme", "widgets")
    }

    fn pr(number: u64) -> PullRequestRef {
        PullRequestRef {
            repository: widgets(),
            number,
        }
    }

    #[tokio::test]
    async fn test_reenables_disabled_workflow() {
        let api = FakeGitHub::with_workflows(vec![
            workflow(1, "Lint", WorkflowState::Active),
            workflow(2, "CI", WorkflowState::DisabledManually),
        ]);

        reinstate_workflows(&api, &opened("acme", "widgets", 42))
            .await
            .unwrap();

        assert_eq!(
            api.calls(),
            vec![
                Call::ListWorkflows(widgets()),
                Call::EnableWorkflow(widgets(), 2),
                Call::CreateComment(pr(42), reenabled_comment("CI")),
            ]
        );
        assert!(reenabled_comment("CI").contains("CI"));
    }

    #[tokio::test]
    async fn test_nothing_disabled() {
        let api = FakeGitHub::with_workflows(vec![
            workflow(1, "Lint", WorkflowState::Active),
            workflow(2, "CI", WorkflowState::Active),
            workflow(3, "Nightly", WorkflowState::DisabledInactivity),
        ]);

        reinstate_workflows(&api, &opened("acme", "widgets", 42))
            .await
            .unwrap();

        assert_eq!(api.calls(), vec![Call::ListWorkflows(widgets())]);
    }

    #[tokio::test]
    async fn test_no_workflows() {
        let api = FakeGitHub::default();

        reinstate_workflows(&api, &opened("acme", "widgets", 42))
            .await
            .unwrap();

        assert_eq!(api.calls(), vec![Call::ListWorkflows(widgets())]);
    }

    #[tokio::test]
    async fn test_every_disabled_workflow_gets_a_pair_of_calls() {
        for k in 0..5u64 {
            let mut workflows = vec![workflow(100, "Docs", WorkflowState::Active)];
            workflows.extend((1..=k).map(|id| {
                workflow(id, &format!("Job{}", id), WorkflowState::DisabledManually)
            }));
            let api = FakeGitHub::with_workflows(workflows);

            reinstate_workflows(&api, &opened("acme", "widgets", 42))
                .await
                .unwrap();

            let calls = api.calls();
            let enabled: Vec<_> = calls
                .iter()
                .filter_map(|call| match call {
                    Call::EnableWorkflow(_, id) => Some(*id),
                    _ => None,
                })
                .collect();
            let comments = calls
                .iter()
                .filter(|call| matches!(call, Call::CreateComment(..)))
                .count();

            assert_eq!(enabled, (1..=k).collect::<Vec<_>>());
            assert_eq!(comments as u64, k);
        }
    }

    #[tokio::test]
    async fn test_listing_fails() {
        let api = FakeGitHub {
            workflows_status: Some(404),
            ..Default::default()
        };

        let res = reinstate_workflows(&api, &opened("acme", "widgets", 42)).await;

        assert!(matches!(res, Err(ApiError::Response { status: 404, .. })));
        assert_eq!(api.calls(), vec![Call::ListWorkflows(widgets())]);
    }

    #[tokio::test]
    async fn test_enabling_fails_before_commenting() {
        let api = FakeGitHub {
            enable_status: Some(403),
            ..FakeGitHub::with_workflows(vec![
                workflow(1, "CI", WorkflowState::DisabledManually),
                workflow(2, "Lint", WorkflowState::DisabledManually),
            ])
        };

        let res = reinstate_workflows(&api, &opened("acme", "widgets", 42)).await;

        assert!(matches!(res, Err(ApiError::Response { status: 403, .. })));
        assert_eq!(
            api.calls(),
            vec![
                Call::ListWorkflows(widgets()),
                Call::EnableWorkflow(widgets(), 1),
            ]
        );
    }
}
