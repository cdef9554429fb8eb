use std::fs::File;
use std::path::Path;
use log::{error, warn};
use serde::Deserialize;
use crate::errors::DaichoError::AuthError;
use crate::errors::DaichoResult;
use crate::utils::oauth2::SecretData;
use crate::utils::oauth2::url_parser::parse_redirect_uri;

const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

#[derive(Deserialize)]
pub(crate) struct GoogleClientSecrets {
    installed: Option<GoogleClientSecret>,
    web: Option<GoogleClientSecret>,
}

#[derive(Deserialize)]
pub(crate) struct GoogleClientSecret {
    client_id: String,
    client_secret: String,
    auth_uri: String,
    token_uri: String,
    redirect_uris: Vec<String>,
}

/// Loads the application registration from a Google `client_secrets.json`
/// file (either the `installed` or the `web` section).
///
/// # Arguments
///
/// * `secret_json_path` - A path to the JSON file containing the client secret data.
///
/// # Returns
///
/// A `DaichoResult` which is either:
///
/// - `Ok(SecretData)` containing the loaded secret data.
/// - `Err(DaichoError::AuthError)` when the file cannot be opened or parsed.
pub fn load_google_client_secrets<SP: AsRef<Path>>(secret_json_path: SP) -> DaichoResult<SecretData> {
    let secret_data = match File::open(&secret_json_path) {
        Ok(file) => match serde_json::from_reader::<_, GoogleClientSecrets>(&file) {
            Ok(data) => data,
            Err(e) => {
                error!("Failed to parse secret file: {:?}", e);
                return Err(AuthError(
                    format!("Invalid secret format in: {}",
                            secret_json_path.as_ref().to_string_lossy())));
            }
        },
        Err(e) => {
            error!("Failed to open secret file: {:?}", e);
            return Err(AuthError(
                format!("Cannot open secret file: {}",
                        secret_json_path.as_ref().to_string_lossy())));
        }
    };

    let generate_secret_data = |secret: GoogleClientSecret| -> DaichoResult<SecretData> {
        if secret.redirect_uris.is_empty() {
            return Err(AuthError("'redirect_uris' needs at least one uri".to_string()));
        }
        if secret.redirect_uris.len() >= 2 {
            warn!("Found {} redirect uris. Using the first one.", secret.redirect_uris.len());
        }
        let redirect_uri = &secret.redirect_uris[0];
        let (redirect_base_url, port) = parse_redirect_uri(redirect_uri)?;
        Ok(SecretData::new(
            &secret.client_id,
            &secret.client_secret,
            &secret.auth_uri,
            &secret.token_uri,
            Some(redirect_base_url.as_str()),
            port,
        ))
    };

    let secret_data = if let Some(secret) = secret_data.installed {
        generate_secret_data(secret)?
    } else if let Some(secret) = secret_data.web {
        generate_secret_data(secret)?
    } else {
        return Err(AuthError("JSON format is invalid".to_string()));
    };

    Ok(secret_data)
}

/// Creates a `SecretData` for Google OAuth2 from bare client credentials,
/// for applications that do not ship a `client_secrets.json`.
pub fn get_google_oauth2_secret(client_id: &str, client_secret: &str, redirect_uri: Option<&str>) -> DaichoResult<SecretData> {
    let (redirect_base_uri, port) = match redirect_uri {
        Some(uri) => {
            let (base_uri, port) = parse_redirect_uri(uri)?;
            (Some(base_uri), port)
        },
        None => (None, 80),
    };

    let secret_data = SecretData::new(
        client_id,
        client_secret,
        GOOGLE_AUTH_URI,
        GOOGLE_TOKEN_URI,
        redirect_base_uri.as_deref(),
        port,
    );

    Ok(secret_data)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use super::*;

    #[test]
    fn test_load_installed_client_secrets() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{
            "installed": {{
                "client_id": "id-123",
                "client_secret": "secret-456",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token",
                "redirect_uris": ["http://localhost:8080/"]
            }}
        }}"#).unwrap();

        assert!(load_google_client_secrets(file.path()).is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_google_client_secrets("/nonexistent/client_secrets.json");
        assert!(matches!(result, Err(AuthError(_))));
    }

    #[test]
    fn test_load_rejects_empty_redirect_uris() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{
            "web": {{
                "client_id": "id-123",
                "client_secret": "secret-456",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token",
                "redirect_uris": []
            }}
        }}"#).unwrap();

        assert!(load_google_client_secrets(file.path()).is_err());
    }

    #[test]
    fn test_get_google_oauth2_secret() {
        assert!(get_google_oauth2_secret("id", "secret", Some("http://localhost:3030")).is_ok());
    }
}
