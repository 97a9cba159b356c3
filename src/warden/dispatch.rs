use std::collections::HashMap;

use tracing::{debug, warn};

use crate::{
    errors::{report_handler_error, DeliveryError},
    github::{GitHubApi, Result},
    warden::{
        commits::validate_commits, reinstate::reinstate_workflows, review_gate::review_gate,
    },
    webhooks::{
        github::{EventKind, PullRequestAction, ReviewAction},
        GitHubDelivery, GitHubEvent,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    ReinstateWorkflows,
    ValidateCommits,
    ReviewGate,
}

impl Handler {
    async fn run(self, api: &dyn GitHubApi, event: &GitHubEvent) -> Result<()> {
        match (self, event) {
            (Self::ReinstateWorkflows, GitHubEvent::PullRequest(event)) => {
                reinstate_workflows(api, event).await
            }
            (Self::ValidateCommits, GitHubEvent::PullRequest(event)) => {
                validate_commits(api, event).await
            }
            (Self::ReviewGate, GitHubEvent::PullRequestReview(event)) => {
                review_gate(api, event).await
            }
            (handler, event) => {
                warn!("handler {:?} can't handle {:?}", handler, event.kind());
                Ok(())
            }
        }
    }
}

/// Maps every subscribed event kind to the handlers reacting to it, in the order they run.
#[derive(Debug)]
pub struct Dispatcher {
    table: HashMap<EventKind, Vec<Handler>>,
}

impl Dispatcher {
    pub fn new(reinstate_on_update: bool) -> Self {
        let mut dispatcher = Self {
            table: HashMap::new(),
        };

        let mut reinstate_on = vec![
            PullRequestAction::Opened,
            PullRequestAction::Reopened,
            PullRequestAction::ReadyForReview,
        ];
        if reinstate_on_update {
            reinstate_on.extend([PullRequestAction::Synchronize, PullRequestAction::Edited]);
        }
        for action in reinstate_on {
            dispatcher.register(EventKind::PullRequest(action), Handler::ReinstateWorkflows);
        }

        for action in [
            PullRequestAction::Opened,
            PullRequestAction::Synchronize,
            PullRequestAction::Edited,
            PullRequestAction::Reopened,
            PullRequestAction::ReadyForReview,
        ] {
            dispatcher.register(EventKind::PullRequest(action), Handler::ValidateCommits);
        }

        for action in [
            ReviewAction::Edited,
            ReviewAction::Dismissed,
            ReviewAction::Submitted,
        ] {
            dispatcher.register(EventKind::PullRequestReview(action), Handler::ReviewGate);
        }

        dispatcher
    }

    fn register(&mut self, kind: EventKind, handler: Handler) {
        self.table.entry(kind).or_default().push(handler);
    }

    pub fn handlers_for(&self, kind: &EventKind) -> &[Handler] {
        self.table.get(kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// Runs every handler registered for the delivery's event. A failing handler doesn't prevent
    /// the next ones from running; failures are reported together once all handlers are done.
    pub async fn dispatch(
        &self,
        api: &dyn GitHubApi,
        delivery: &GitHubDelivery,
    ) -> Result<(), DeliveryError> {
        let kind = match delivery.event.kind() {
            Some(kind) => kind,
            None => return Ok(()),
        };

        let handlers = self.handlers_for(&kind);
        if handlers.is_empty() {
            debug!("no handler for {}, ignoring delivery {}", kind, delivery.id);
            return Ok(());
        }

        let mut errors = Vec::new();
        for handler in handlers {
            debug!("running {:?} for {}", handler, kind);
            if let Err(e) = handler.run(api, &delivery.event).await {
                report_handler_error(&e);
                errors.push(DeliveryError::from(e));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DeliveryError::Aggregate {
                event: format!("{} (delivery {})", kind, delivery.id),
                errors,
            })
        }
    }
}
