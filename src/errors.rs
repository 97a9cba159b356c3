use thiserror::Error;
use tracing::{error, warn};

use crate::github::ApiError;

/// Everything that can go wrong while processing a single webhook delivery.
///
/// None of these are fatal: the HTTP response has already been sent when they are reported, and
/// GitHub decides on its own whether to redeliver.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("couldn't verify webhook signature")]
    SignatureInvalid,
    #[error("GitHub API responded with status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("{} handler(s) failed for {event}", .errors.len())]
    Aggregate {
        event: String,
        errors: Vec<DeliveryError>,
    },
    #[error(transparent)]
    Unknown(#[from] anyhow::Error),
}

impl From<ApiError> for DeliveryError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Response { status, message } => Self::Api { status, message },
            other => Self::Unknown(other.into()),
        }
    }
}

/// Logs a failed delivery. This is the only place delivery errors end up, nothing is retried.
pub fn report_delivery_error(error: &DeliveryError) {
    match error {
        DeliveryError::Aggregate { event, errors } => {
            warn!("Error processing request: {}", event);
            for e in errors {
                warn!("  caused by: {}", e);
            }
        }
        DeliveryError::SignatureInvalid
        | DeliveryError::Api { .. }
        | DeliveryError::Unknown(_) => error!("{:?}", error),
    }
}

/// Logs a single handler failure, with status and message when GitHub gave us a response.
pub fn report_handler_error(error: &ApiError) {
    match error {
        ApiError::Response { status, message } => {
            error!("Error! Status: {}. Message: {}", status, message)
        }
        other => error!("{:?}", other),
    }
}
