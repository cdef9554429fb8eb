use time::OffsetDateTime;
use crate::utils::oauth2::Token;

/// Authenticated, time-bounded credential state for Google Drive calls.
///
/// Produced by [`crate::services::authenticator::Authenticator::authenticate`]
/// and consumed read-only by the Drive client. The access token itself never
/// leaves the crate.
#[derive(Debug, Clone)]
pub struct Session {
    access_token: String,
    expires_at: OffsetDateTime,
}

impl Session {
    pub fn new(access_token: &str, expires_at: OffsetDateTime) -> Self {
        Self {
            access_token: access_token.to_string(),
            expires_at,
        }
    }

    pub(crate) fn get_access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_at(&self) -> OffsetDateTime {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= OffsetDateTime::now_utc()
    }
}

impl From<&Token> for Session {
    fn from(token: &Token) -> Self {
        Self {
            access_token: token.get_access_token().to_string(),
            expires_at: token.get_expires_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use time::Duration;
    use super::*;

    #[test]
    fn test_session_expiry() {
        let live = Session::new("token", OffsetDateTime::now_utc() + Duration::hours(1));
        assert!(!live.is_expired());

        let stale = Session::new("token", OffsetDateTime::now_utc() - Duration::seconds(1));
        assert!(stale.is_expired());
    }
}
