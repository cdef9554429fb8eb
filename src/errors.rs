pub type DaichoResult<T> = Result<T, DaichoError>;

#[derive(thiserror::Error, Debug)]
pub enum DaichoError {
    #[error("Authentication failed: {0}")]
    AuthError(String),
    #[error("Remote file is not found: {0}")]
    NotFoundError(String),
    #[error("Google Drive request failed: {0}")]
    RemoteServiceError(String),
    #[error("Failed to parse tabular content: {0}")]
    ParseError(String),
    #[error("Operation requires a loaded dataset: {0}")]
    StateError(String),
    #[error("Get invalid argument error: {0}")]
    InvalidArgumentError(String),
}
