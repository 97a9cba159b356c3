use std::sync::Arc;

use anyhow::{anyhow, Context};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use crate::{
    config::WardenConfig,
    errors::{report_delivery_error, DeliveryError},
    github::{GitHubApp, Workflow, WorkflowState},
    webhooks::{Event, GitHubDelivery},
};

mod commits;
mod dispatch;
mod reinstate;
mod review_gate;

pub use dispatch::{Dispatcher, Handler};

pub struct Warden {
    app: Arc<GitHubApp>,
    dispatcher: Arc<Dispatcher>,
}

impl Warden {
    /// Creates a new [`Warden`] and builds the [`GitHubApp`] client and the dispatch table from
    /// the provided [`WardenConfig`].
    pub fn new(config: &WardenConfig) -> anyhow::Result<Self> {
        let app = GitHubApp::new(config).context("couldn't build GitHub App client")?;
        let dispatcher = Dispatcher::new(config.reinstate_on_update);

        Ok(Self {
            app: Arc::new(app),
            dispatcher: Arc::new(dispatcher),
        })
    }

    /// Checks the app credentials against GitHub.
    pub async fn init(&self) -> anyhow::Result<()> {
        let name = self
            .app
            .authenticated_app()
            .await
            .context("couldn't authenticate as GitHub App")?;
        info!("Authenticated as '{}'", name);

        Ok(())
    }

    /// Handles deliveries until every sender is dropped. Each delivery gets its own task, so a
    /// slow API call only stalls the delivery that issued it.
    pub async fn run(&self, mut events: UnboundedReceiver<Event>) {
        debug!("running...");

        loop {
            let event = match events.recv().await {
                Some(event) => event,
                None => {
                    info!("all channel senders were dropped, exiting receive loop");
                    break;
                }
            };
            debug!("received event: {:?}", event);

            let app = Arc::clone(&self.app);
            let dispatcher = Arc::clone(&self.dispatcher);
            tokio::spawn(async move {
                if let Err(e) = Self::handle_event(event, &app, &dispatcher).await {
                    report_delivery_error(&e);
                }
            });
        }
    }

    async fn handle_event(
        event: Event,
        app: &GitHubApp,
        dispatcher: &Dispatcher,
    ) -> Result<(), DeliveryError> {
        let Event::GitHub(delivery) = event;

        let installation_id = match installation_to_serve(&delivery, dispatcher)? {
            Some(id) => id,
            None => return Ok(()),
        };
        let client = app.installation_client(installation_id).await?;

        dispatcher.dispatch(&client, &delivery).await
    }
}

/// The installation to request a token for, or `None` when no handler reacts to the delivery.
fn installation_to_serve(
    delivery: &GitHubDelivery,
    dispatcher: &Dispatcher,
) -> Result<Option<u64>, DeliveryError> {
    let kind = match delivery.event.kind() {
        Some(kind) => kind,
        None => return Ok(None),
    };
    if dispatcher.handlers_for(&kind).is_empty() {
        debug!("no handler for {}, ignoring delivery {}", kind, delivery.id);
        return Ok(None);
    }

    installation_id(delivery).map(Some)
}

fn installation_id(delivery: &GitHubDelivery) -> Result<u64, DeliveryError> {
    delivery.event.installation_id().ok_or_else(|| {
        anyhow!("delivery {} doesn't come from an app installation", delivery.id).into()
    })
}

/// Workflows a human turned off, in the order GitHub listed them.
pub(crate) fn manually_disabled(workflows: &[Workflow]) -> impl Iterator<Item = &Workflow> {
    workflows
        .iter()
        .filter(|workflow| workflow.state == WorkflowState::DisabledManually)
}
