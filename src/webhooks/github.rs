use anyhow::anyhow;
use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    Request, State,
};
use tracing::{debug, info, trace, warn};

mod signing;
use signing::SignedGitHubPayload;

mod events;
pub use events::*;
#[cfg(test)]
pub(crate) use events::fixtures;

use crate::webhooks::{Event, EventSender};

const X_GITHUB_EVENT: &str = "X-GitHub-Event";
const X_GITHUB_DELIVERY: &str = "X-GitHub-Delivery";

pub struct GitHubSecret(pub String);

/// One verified webhook delivery, ready to be dispatched.
#[derive(Debug)]
pub struct GitHubDelivery {
    pub id: String,
    pub event: GitHubEvent,
}

#[rocket::post("/", data = "<payload>")]
pub fn github_webhook(
    event_type: GitHubEventType,
    delivery: DeliveryId,
    payload: SignedGitHubPayload,
    sender: &State<EventSender>,
) -> Result<&'static str, Status> {
    debug!("received {} delivery {}", event_type.as_str(), delivery.0);
    trace!("payload: {}", payload.0);

    let event = match GitHubEvent::from_payload(&event_type, &payload.0) {
        Ok(Some(event)) => event,
        Ok(None) => {
            debug!("ignoring unsubscribed event `{}`", event_type.as_str());
            return Ok("OK");
        }
        Err(e) => {
            warn!(
                "couldn't parse {} payload of delivery {}: {}",
                event_type.as_str(),
                delivery.0,
                e
            );
            return Err(Status::BadRequest);
        }
    };

    if let GitHubEvent::Ping(ping) = &event {
        info!("received ping for hook {}: {}", ping.hook_id, ping.zen);
        return Ok("OK");
    }

    sender
        .0
        .send(Event::GitHub(GitHubDelivery {
            id: delivery.0,
            event,
        }))
        .map_err(|_| {
            warn!("event channel was closed, dropping delivery");
            Status::ServiceUnavailable
        })?;

    Ok("OK")
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for GitHubEventType {
    type Error = anyhow::Error;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let event_types = request.headers().get(X_GITHUB_EVENT).collect::<Vec<_>>();
        if event_types.len() != 1 {
            return Outcome::Error((
                Status::BadRequest,
                anyhow!("request header needs exactly one event type"),
            ));
        }

        match event_types[0].parse() {
            Ok(ev_type) => Outcome::Success(ev_type),
            Err(e) => match e {},
        }
    }
}

/// Value of the `X-GitHub-Delivery` header, `unknown` when GitHub didn't send one.
pub struct DeliveryId(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for DeliveryId {
    type Error = std::convert::Infallible;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let id = request
            .headers()
            .get_one(X_GITHUB_DELIVERY)
            .unwrap_or("unknown");
        Outcome::Success(DeliveryId(id.to_owned()))
    }
}
