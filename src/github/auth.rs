use jsonwebtoken::{encode, get_current_timestamp, Algorithm, EncodingKey, Header};
use serde::Serialize;

use crate::github::Result;

/// GitHub rejects app tokens valid for more than 10 minutes.
const JWT_LIFETIME_SECS: u64 = 9 * 60;
/// Issue tokens slightly in the past to allow for clock drift with GitHub.
const CLOCK_DRIFT_SECS: u64 = 60;

#[derive(Debug, Serialize)]
pub(crate) struct Claims<'a> {
    pub iat: u64,
    pub exp: u64,
    pub iss: &'a str,
}

impl<'a> Claims<'a> {
    pub fn new(app_id: &'a str, now: u64) -> Self {
        Self {
            iat: now.saturating_sub(CLOCK_DRIFT_SECS),
            exp: now + JWT_LIFETIME_SECS,
            iss: app_id,
        }
    }
}

pub(crate) fn parse_private_key(pem: &str) -> Result<EncodingKey> {
    Ok(EncodingKey::from_rsa_pem(pem.as_bytes())?)
}

/// Creates the RS256 token authenticating as the app itself.
pub(crate) fn create_app_jwt(key: &EncodingKey, app_id: &str) -> Result<String> {
    let claims = Claims::new(app_id, get_current_timestamp());
    Ok(encode(&Header::new(Algorithm::RS256), &claims, key)?)
}
