//! Earthdata Login token resolution

use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::client::{GldasConfig, GldasError};

/// Earthdata Login endpoint returning an existing token or minting one
const FIND_OR_CREATE_TOKEN_PATH: &str = "/api/users/find_or_create_token";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expiration_date: Option<String>,
}

/// Resolve the bearer token for archive requests
///
/// A configured token wins; otherwise username and password are exchanged for
/// a token once. Without any credentials requests go out anonymously.
#[instrument(skip_all)]
pub(crate) async fn resolve_token(
    client: &Client,
    config: &GldasConfig,
) -> Result<Option<SecretString>, GldasError> {
    if let Some(token) = config.token() {
        return Ok(Some(SecretString::from(token.to_owned())));
    }

    let (Some(username), Some(password)) = (config.username(), config.password()) else {
        warn!("No Earthdata credentials configured; archive requests will be anonymous");
        return Ok(None);
    };

    let url = format!(
        "{}{FIND_OR_CREATE_TOKEN_PATH}",
        config.urs_base_url.trim_end_matches('/')
    );
    let response = client
        .post(&url)
        .basic_auth(username, Some(password))
        .send()
        .await
        .map_err(|e| GldasError::ConnectionFailed(e.to_string()))?;

    let status = response.status();
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return Err(GldasError::Unauthorized(
            "Earthdata Login rejected the credentials".to_string(),
        ));
    }
    if !status.is_success() {
        return Err(GldasError::RequestFailed(format!(
            "Earthdata Login returned HTTP {status}"
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| GldasError::ParseError(e.to_string()))?;

    info!(expires = ?token.expiration_date, "Obtained Earthdata Login token");
    Ok(Some(SecretString::from(token.access_token)))
}

/// Borrow the token for a request header
pub(crate) fn bearer(token: Option<&SecretString>) -> Option<&str> {
    token.map(ExposeSecret::expose_secret)
}
