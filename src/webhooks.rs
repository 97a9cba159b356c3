use rocket::{routes, Build, Rocket};
use tokio::sync::mpsc::UnboundedSender;

use crate::config::WardenConfig;

pub mod github;
pub use github::{github_webhook, GitHubDelivery, GitHubEvent, GitHubSecret};

pub struct EventSender(pub UnboundedSender<Event>);

#[derive(Debug)]
pub enum Event {
    GitHub(GitHubDelivery),
}

/// Builds the web server receiving webhook deliveries on the configured path. Verified
/// deliveries are forwarded through `sender`.
pub fn build_rocket(config: &WardenConfig, sender: EventSender) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("port", config.port))
        .merge(("address", "0.0.0.0"));

    rocket::custom(figment)
        .mount(config.webhook_path.as_str(), routes![github_webhook])
        .manage(sender)
        .manage(GitHubSecret(config.webhook_secret.clone()))
}
