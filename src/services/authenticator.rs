use std::path::{Path, PathBuf};
use crate::errors::DaichoResult;
use crate::utils::credential::Session;
use crate::utils::oauth2::SecretData;
use crate::utils::oauth2::services::load_google_client_secrets;

pub(crate) const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// Establishes and persists a Drive session credential.
///
/// Construction loads the static application registration; every
/// [`Authenticator::authenticate`] call resolves a live token out of the
/// store at `token_dir`, refreshing or running the interactive login flow
/// when needed, and persists whatever it obtained.
pub struct Authenticator {
    secret: SecretData,
    token_dir: PathBuf,
}

impl Authenticator {
    pub fn new<TP: AsRef<Path>>(secret: SecretData, token_dir: TP) -> Self {
        Self {
            secret,
            token_dir: token_dir.as_ref().to_path_buf(),
        }
    }

    /// Load the application registration from a Google `client_secrets.json`
    /// file. Fails with `AuthError` when the file is absent or malformed.
    pub fn from_client_secrets<SP, TP>(secret_json_path: SP, token_dir: TP) -> DaichoResult<Self>
    where
        SP: AsRef<Path>,
        TP: AsRef<Path>,
    {
        let secret = load_google_client_secrets(secret_json_path)?;
        Ok(Self::new(secret, token_dir))
    }

    /// Produce a live [`Session`], writing any newly obtained token to the
    /// credential store as a side effect.
    pub async fn authenticate(&self) -> DaichoResult<Session> {
        let token = self.secret.get_token(&[DRIVE_SCOPE], &self.token_dir).await?;
        Ok(Session::from(&token))
    }
}
