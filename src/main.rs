use anyhow::Context;
use clap::Parser;
use rocket::fairing::AdHoc;
use tokio::sync::mpsc::unbounded_channel;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
use config::{Opts, WardenConfig};

mod errors;
mod github;
mod utils;

mod warden;
use warden::Warden;

mod webhooks;
use webhooks::{build_rocket, EventSender};

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    // a missing .env file is fine, the environment may already be set up
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let opts = Opts::parse();
    let config = WardenConfig::from_opts(opts).context("invalid configuration")?;

    let warden = Warden::new(&config).context("failed to create warden")?;
    warden.init().await.context("failed to init warden")?;

    let (sender, receiver) = unbounded_channel();
    tokio::spawn(async move { warden.run(receiver).await });

    let local_webhook_url = config.local_webhook_url();
    let rocket = build_rocket(&config, EventSender(sender)).attach(AdHoc::on_liftoff(
        "announce",
        move |_| {
            Box::pin(async move {
                info!("Server is listening for events at: {}", local_webhook_url);
                info!("Press Ctrl + C to quit.");
            })
        },
    ));
    rocket.launch().await.map_err(|err| anyhow::anyhow!(err))?;

    Ok(())
}
