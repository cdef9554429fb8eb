mod web_server;
pub mod services;
mod stores;
mod url_parser;

use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;
use log::{debug, error, info, warn};
use oauth2::{AuthUrl, ClientId, ClientSecret, RedirectUrl, RefreshToken, TokenResponse, TokenUrl};
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use crate::errors::DaichoError::AuthError;
use crate::errors::DaichoResult;
use crate::utils::oauth2::stores::{load_token, save_token};
use crate::utils::oauth2::url_parser::extract_protocol_hostname;
use crate::utils::oauth2::web_server::spawn_webserver;

/// Application client secret data registered with the OAuth2 provider.
pub struct SecretData {
    client_id: String,
    client_secret: String,
    auth_uri: String,
    token_uri: String,
    protocol: String,
    redirect_hostname: String,
    port: u16,
}

/// Persisted token record generated from [`SecretData`].
///
/// Carries the granted scopes next to the access and refresh tokens so a
/// scope change forces re-authentication instead of silently reusing a
/// narrower grant.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Token {
    scopes: Vec<String>,
    access_token: String,
    refresh_token: Option<String>,
    expires_at: OffsetDateTime,
}

impl Token {
    pub(crate) fn get_access_token(&self) -> &str {
        &self.access_token
    }

    pub(crate) fn get_expires_at(&self) -> OffsetDateTime {
        self.expires_at
    }

    fn is_live(&self) -> bool {
        self.expires_at > OffsetDateTime::now_utc()
    }

    fn covers_scopes(&self, scopes: &[&str]) -> bool {
        self.scopes == scopes
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token\nscope: [{}]\naccess_token: *****\nrefresh_token: *****\nexpires_at: '{}'",
               self.scopes.join(", "), self.expires_at.unix_timestamp())
    }
}

impl SecretData {
    pub fn new(client_id: &str,
               client_secret: &str,
               auth_uri: &str,
               token_uri: &str,
               server_base_uri: Option<&str>,
               port: u16) -> Self {
        let (protocol, hostname) = extract_protocol_hostname(server_base_uri.unwrap_or("http://localhost"))
            .unwrap_or_else(|e| {
                error!("Failed to extract server base uri: {}", e);
                warn!("Using default server base uri: localhost");
                ("http".to_string(), "localhost".to_string())
            });

        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            auth_uri: auth_uri.to_string(),
            token_uri: token_uri.to_string(),
            protocol,
            redirect_hostname: hostname,
            port,
        }
    }

    /// Produce a token valid for `scopes`, consulting the store at
    /// `token_dir` first.
    ///
    /// The resolution order is a single refresh-or-login branch: a live
    /// stored token is returned as is, an expired one with a refresh token
    /// gets one refresh attempt, and everything else falls through to the
    /// interactive browser flow. Newly obtained tokens are persisted to the
    /// store as a side effect.
    pub(crate) async fn get_token(&self, scopes: &[&str], token_dir: &Path) -> DaichoResult<Token> {
        let stored = match load_token(&self.client_id, token_dir) {
            Some(token) => {
                if token.is_live() && token.covers_scopes(scopes) {
                    debug!("Stored token found: {}", token);
                    return Ok(token);
                }
                if !token.covers_scopes(scopes) {
                    warn!("Stored token scopes mismatch. Re-authentication required.");
                    None
                } else {
                    warn!("Stored token was expired. Try to refresh token");
                    Some(token)
                }
            }
            None => None,
        };

        let client = self.oauth_client()?;

        if let Some(Some(refresh_token)) = stored.map(|token| token.refresh_token) {
            debug!("Refresh token is found");
            if let Some(new_token) = token_refresh(&client, &refresh_token, scopes).await {
                info!("Refreshed the access token:\n{}", new_token);
                if let Err(e) = save_token(&self.client_id, &new_token, token_dir) {
                    error!("Failed to save token. This token isn't stored. (error: {:?})", e);
                }
                return Ok(new_token);
            }
        }

        let (sender, mut receiver) = tokio::sync::mpsc::channel::<Token>(1);
        spawn_webserver(
            &client,
            scopes,
            self.protocol.as_str(),
            self.redirect_hostname.as_str(),
            self.port,
            sender).await;

        match receiver.recv().await {
            Some(token) => {
                debug!("Get token:\n{}", token);
                if let Err(e) = save_token(&self.client_id, &token, token_dir) {
                    error!("Failed to save token. This token isn't stored. (error: {:?})", e);
                }
                Ok(token)
            }
            None => Err(AuthError("Interactive login did not produce a token".to_string())),
        }
    }

    fn oauth_client(&self) -> DaichoResult<BasicClient> {
        let redirect_uri =
            format!("{}://{}:{}/auth/callback", self.protocol, self.redirect_hostname, self.port);

        let auth_url = AuthUrl::new(self.auth_uri.clone())
            .map_err(|e| AuthError(format!("Invalid auth uri in client config: {:?}", e)))?;
        let token_url = TokenUrl::new(self.token_uri.clone())
            .map_err(|e| AuthError(format!("Invalid token uri in client config: {:?}", e)))?;
        let redirect_url = RedirectUrl::new(redirect_uri)
            .map_err(|e| AuthError(format!("Invalid redirect uri in client config: {:?}", e)))?;

        let client = BasicClient::new(
            ClientId::new(self.client_id.clone()),
            Some(ClientSecret::new(self.client_secret.clone())),
            auth_url,
            Some(token_url),
        )
            .set_redirect_uri(redirect_url);

        Ok(client)
    }
}

/// Token refresh using the refresh token of an expired stored token.
async fn token_refresh(client: &BasicClient,
                       refresh_token: &str,
                       scopes: &[&str]) -> Option<Token> {
    let oauth2_refresh_token = RefreshToken::new(refresh_token.to_string());
    let token = client
        .exchange_refresh_token(&oauth2_refresh_token)
        .request_async(async_http_client)
        .await;

    match token {
        Ok(token) => {
            let expires_in = token.expires_in().unwrap_or(Duration::from_secs(3600));
            let expires_at = OffsetDateTime::now_utc() + expires_in;

            let token_result = Token {
                scopes: scopes.iter().map(|scope| scope.to_string()).collect(),
                access_token: token.access_token().secret().to_owned(),
                refresh_token: Some(refresh_token.to_string()),
                expires_at,
            };
            Some(token_result)
        },
        Err(e) => {
            error!("Token refresh failed: {:?}", e);
            None
        }
    }
}
