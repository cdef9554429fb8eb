use std::time::Duration;
use log::error;
use reqwest::Client;
use url::Url;
use crate::errors::DaichoError::{AuthError, RemoteServiceError};
use crate::errors::DaichoResult;
use crate::utils::credential::Session;
use crate::utils::reqwest::{get_client_with_token, AuthType};

pub mod authenticator;
pub mod csv_file;
pub mod google_drive;
pub mod tracker;

/// Shared request plumbing for one remote endpoint and one session.
#[derive(Clone)]
pub(crate) struct Api {
    client: Client,
    session: Session,
    api_base_uri: String,
}

impl Api {
    pub(crate) fn new(session: Session, api_base_uri: &str, timeout: Duration) -> DaichoResult<Self> {
        let api_base_uri = match api_base_uri.strip_suffix('/') {
            Some(base_uri) => base_uri.to_string(),
            None => api_base_uri.to_string(),
        };
        let client = get_client_with_token(session.get_access_token(), AuthType::Bearer, timeout)?;

        Ok(Self {
            client,
            session,
            api_base_uri,
        })
    }

    /// Reject the call before any network traffic when the session expired.
    pub(crate) fn ensure_live_session(&self) -> DaichoResult<()> {
        if self.session.is_expired() {
            error!("Session expired at {}. Re-authentication required.", self.session.expires_at());
            return Err(AuthError("Session is expired. Re-authentication required.".to_string()));
        }

        Ok(())
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    pub(crate) fn generate_endpoint(&self, endpoint: &str) -> String {
        let endpoint = if endpoint.starts_with('/') {
            endpoint.to_string()
        } else {
            format!("/{}", endpoint)
        };

        format!("{}{}", self.api_base_uri, endpoint)
    }

    pub(crate) fn get_request_url(&self, endpoint: &str) -> DaichoResult<Url> {
        let api_endpoint = self.generate_endpoint(endpoint);
        match Url::parse(&api_endpoint) {
            Ok(uri) => Ok(uri),
            Err(e) => {
                error!("Failed to parse endpoint {}: {:?}", api_endpoint, e);
                Err(RemoteServiceError(format!("Failed to parse endpoint: {}", api_endpoint)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration as TimeDuration, OffsetDateTime};
    use super::*;

    fn api(base_uri: &str) -> Api {
        let session = Session::new("token", OffsetDateTime::now_utc() + TimeDuration::hours(1));
        Api::new(session, base_uri, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_generate_endpoint() {
        let api = api("https://www.googleapis.com");
        assert_eq!(api.generate_endpoint("/drive/v3/files"), "https://www.googleapis.com/drive/v3/files");
        assert_eq!(api.generate_endpoint("drive/v3/files"), "https://www.googleapis.com/drive/v3/files");
    }

    #[test]
    fn test_generate_endpoint_trims_trailing_slash() {
        let api = api("https://www.googleapis.com/");
        assert_eq!(api.generate_endpoint("/drive/v3/files"), "https://www.googleapis.com/drive/v3/files");
    }

    #[test]
    fn test_expired_session_is_rejected() {
        let session = Session::new("token", OffsetDateTime::now_utc() - TimeDuration::seconds(1));
        let api = Api::new(session, "https://www.googleapis.com", Duration::from_secs(5)).unwrap();
        assert!(api.ensure_live_session().is_err());
    }
}
