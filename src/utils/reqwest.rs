use std::fmt::{Display, Formatter};
use std::time::Duration;
use reqwest::{header, Client};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use crate::errors::DaichoError::{AuthError, RemoteServiceError};
use crate::errors::DaichoResult;

#[derive(Debug, Clone, Copy)]
pub(crate) enum AuthType {
    Bearer,
}

impl Display for AuthType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer => write!(f, "Bearer"),
        }
    }
}

/// Build a [`Client`] whose every request carries the session token and
/// aborts after `timeout`.
pub(crate) fn get_client_with_token(token: &str, auth_type: AuthType, timeout: Duration) -> DaichoResult<Client> {
    let mut header_value = HeaderValue::from_str(&format!("{} {}", auth_type, token))
        .map_err(|e| AuthError(format!("Access token is not a valid header value: {:#?}", e)))?;
    header_value.set_sensitive(true);
    let mut headers = header::HeaderMap::new();
    headers.insert(AUTHORIZATION, header_value);

    let client = Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|e| RemoteServiceError(format!("Failed to build client: {:#?}", e)))?;

    Ok(client)
}
