use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use log::debug;
use time::OffsetDateTime;
use crate::utils::oauth2::Token;

const TOKEN_FILE_NAME: &str = "tokens.json";

/// Persist `token` under the application's client id, dropping stale
/// entries of other registrations on the way.
pub(crate) fn save_token(client_id: &str, token: &Token, token_dir: &Path) -> std::io::Result<()> {
    let (path, mut saved_tokens) = read_store(token_dir);
    if !saved_tokens.is_empty() {
        debug!("Found token file. Add the new token in it");
    }
    saved_tokens.retain(|stored_client_id, stored| {
        stored_client_id.as_str() != client_id &&
            (stored.expires_at > OffsetDateTime::now_utc() || stored.refresh_token.is_some())
    });
    saved_tokens.insert(client_id.to_string(), token.clone());
    let token_json = serde_json::to_string(&saved_tokens)?;

    if let Some(dir) = path.as_path().parent() {
        if !dir.exists() {
            debug!("Creating directory {}", dir.display());
            fs::create_dir_all(dir)?;
        }
    }

    fs::write(path, token_json)
}

pub(crate) fn load_token(client_id: &str, token_dir: &Path) -> Option<Token> {
    let (_, tokens) = read_store(token_dir);
    debug!("Loaded token number: {}", tokens.len());
    tokens.get(client_id).cloned()
}

fn read_store(token_dir: &Path) -> (PathBuf, HashMap<String, Token>) {
    let mut token_path = token_dir.to_path_buf();
    token_path.push(TOKEN_FILE_NAME);
    if token_path.exists() {
        debug!("Token file found at {:?}", token_path);
        match fs::read_to_string(&token_path) {
            Ok(token) => (token_path, serde_json::from_str(&token).unwrap_or_default()),
            Err(_) => (token_path, HashMap::new()),
        }
    } else {
        (token_path, HashMap::new())
    }
}

#[cfg(test)]
mod tests {
    use time::Duration;
    use super::*;

    fn token(access: &str, refresh: Option<&str>, expires_at: OffsetDateTime) -> Token {
        Token {
            scopes: vec!["https://www.googleapis.com/auth/drive".to_string()],
            access_token: access.to_string(),
            refresh_token: refresh.map(str::to_string),
            expires_at,
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let stored = token("access-1", Some("refresh-1"), OffsetDateTime::now_utc() + Duration::hours(1));

        save_token("client-a", &stored, dir.path()).unwrap();
        let loaded = load_token("client-a", dir.path()).unwrap();

        assert_eq!(loaded.access_token, "access-1");
        assert_eq!(loaded.refresh_token.as_deref(), Some("refresh-1"));
    }

    #[test]
    fn test_load_unknown_client_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let stored = token("access-1", None, OffsetDateTime::now_utc() + Duration::hours(1));

        save_token("client-a", &stored, dir.path()).unwrap();
        assert!(load_token("client-b", dir.path()).is_none());
    }

    #[test]
    fn test_save_drops_expired_entries_without_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let dead = token("old-access", None, OffsetDateTime::now_utc() - Duration::hours(1));
        save_token("client-old", &dead, dir.path()).unwrap();

        let fresh = token("new-access", None, OffsetDateTime::now_utc() + Duration::hours(1));
        save_token("client-new", &fresh, dir.path()).unwrap();

        assert!(load_token("client-old", dir.path()).is_none());
        assert!(load_token("client-new", dir.path()).is_some());
    }
}
