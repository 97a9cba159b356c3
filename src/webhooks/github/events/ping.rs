use serde::Deserialize;

use crate::webhooks::github::events::Installation;

#[derive(Debug, Deserialize)]
pub struct PingEvent {
    pub zen: String,
    pub hook_id: u64,
    pub installation: Option<Installation>,
}
