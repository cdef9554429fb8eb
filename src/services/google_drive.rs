use std::time::Duration;
use log::{debug, error};
use reqwest::header::CONTENT_TYPE;
use reqwest::Response;
use crate::errors::DaichoError::{AuthError, NotFoundError, RemoteServiceError};
use crate::errors::DaichoResult;
use crate::services::Api;
use crate::types::google_drive::{DriveFile, FileListResponse, FileMetadataResponse};
use crate::utils::credential::Session;

pub const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const CSV_MIME_TYPE: &str = "text/csv";
const UPLOAD_BOUNDARY: &str = "daicho_upload_boundary";

/// Thin client over the Google Drive v3 REST API.
///
/// Every method is a single-shot call: no pagination beyond what Drive
/// returns in one response, no retry, no backoff. Remote failures surface
/// verbatim in the error detail.
#[derive(Clone)]
pub struct GoogleDrive(Api);

impl GoogleDrive {
    pub fn new(session: Session) -> DaichoResult<Self> {
        Self::with_config(session, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT)
    }

    /// Construct against an explicit endpoint base and request timeout.
    pub fn with_config(session: Session, endpoint: &str, timeout: Duration) -> DaichoResult<Self> {
        let api = Api::new(session, endpoint, timeout)?;
        Ok(Self(api))
    }

    /// Query file objects by content type and, optionally, parent folder.
    ///
    /// Returns an empty vector (not an error) when nothing matches. Ordering
    /// is whatever Drive returns.
    pub async fn list_files(&self, mime_type: &str, parent_id: Option<&str>) -> DaichoResult<Vec<DriveFile>> {
        self.0.ensure_live_session()?;
        let url = self.0.get_request_url("/drive/v3/files")?;
        let query = file_query_builder(mime_type, parent_id);
        debug!("Listing drive files with query: {}", query);

        let response = self.0.client()
            .get(url)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id, name, parents)"),
            ])
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to Google Drive API: {:#?}", e);
                RemoteServiceError(format!("Failed to send list request: {:?}", e))
            })?;
        let response = check_status(response, "list files").await?;

        let listing = response
            .json::<FileListResponse>()
            .await
            .map_err(|e| RemoteServiceError(format!("Failed to parse list response: {:?}", e)))?;

        Ok(listing.files().iter().map(DriveFile::from_metadata).collect())
    }

    /// Fetch the full content of one file as text.
    pub async fn download_file(&self, file_id: &str) -> DaichoResult<String> {
        self.0.ensure_live_session()?;
        let url = self.0.get_request_url(&format!("/drive/v3/files/{}", file_id))?;

        let response = self.0.client()
            .get(url)
            .query(&[("alt", "media")])
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to Google Drive API: {:#?}", e);
                RemoteServiceError(format!("Failed to send download request: {:?}", e))
            })?;
        let response = check_status(response, file_id).await?;

        response.text()
            .await
            .map_err(|e| RemoteServiceError(format!("Failed to read content of {}: {:?}", file_id, e)))
    }

    /// Create a brand-new file object with the given content and title.
    ///
    /// Never overwrites by title collision; Drive itself allows duplicate
    /// titles and so does this call.
    pub async fn upload_file(&self, content: &str, title: &str, parent_id: Option<&str>) -> DaichoResult<DriveFile> {
        self.0.ensure_live_session()?;
        let url = self.0.get_request_url("/upload/drive/v3/files")?;
        let body = multipart_related_body(content, title, parent_id);

        let response = self.0.client()
            .post(url)
            .query(&[
                ("uploadType", "multipart"),
                ("fields", "id, name, parents"),
            ])
            .header(CONTENT_TYPE, format!("multipart/related; boundary={}", UPLOAD_BOUNDARY))
            .body(body)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to Google Drive API: {:#?}", e);
                RemoteServiceError(format!("Failed to send upload request: {:?}", e))
            })?;
        let response = check_status(response, title).await?;

        let metadata = response
            .json::<FileMetadataResponse>()
            .await
            .map_err(|e| RemoteServiceError(format!("Failed to parse upload response: {:?}", e)))?;

        Ok(DriveFile::from_metadata(&metadata))
    }

    /// Overwrite the content of an existing file object in place.
    pub async fn update_file(&self, file_id: &str, content: &str) -> DaichoResult<DriveFile> {
        self.0.ensure_live_session()?;
        let url = self.0.get_request_url(&format!("/upload/drive/v3/files/{}", file_id))?;

        let response = self.0.client()
            .patch(url)
            .query(&[
                ("uploadType", "media"),
                ("fields", "id, name, parents"),
            ])
            .header(CONTENT_TYPE, CSV_MIME_TYPE)
            .body(content.to_string())
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to Google Drive API: {:#?}", e);
                RemoteServiceError(format!("Failed to send update request: {:?}", e))
            })?;
        let response = check_status(response, file_id).await?;

        let metadata = response
            .json::<FileMetadataResponse>()
            .await
            .map_err(|e| RemoteServiceError(format!("Failed to parse update response: {:?}", e)))?;

        Ok(DriveFile::from_metadata(&metadata))
    }
}

/// Build a Drive `q` expression filtering by content type and parent folder.
fn file_query_builder(mime_type: &str, parent_id: Option<&str>) -> String {
    let query = format!("mimeType = '{}'", mime_type);
    match parent_id {
        Some(parent) => format!("{} and '{}' in parents", query, parent),
        None => query,
    }
}

/// Assemble a multipart/related upload body: one JSON metadata part, one
/// media part.
fn multipart_related_body(content: &str, title: &str, parent_id: Option<&str>) -> String {
    let mut metadata = serde_json::json!({
        "name": title,
        "mimeType": CSV_MIME_TYPE,
    });
    if let Some(parent) = parent_id {
        metadata["parents"] = serde_json::json!([parent]);
    }

    format!(
        "--{boundary}\r\n\
         Content-Type: application/json; charset=UTF-8\r\n\r\n\
         {metadata}\r\n\
         --{boundary}\r\n\
         Content-Type: {mime}\r\n\r\n\
         {content}\r\n\
         --{boundary}--",
        boundary = UPLOAD_BOUNDARY,
        metadata = metadata,
        mime = CSV_MIME_TYPE,
        content = content,
    )
}

/// Map a non-success response onto the error taxonomy, reading the body for
/// the detail message.
async fn check_status(response: Response, context: &str) -> DaichoResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let detail = response.text().await.unwrap_or_default();
    error!("Google Drive API returned {} for {}: {}", status, context, detail);
    match status.as_u16() {
        401 | 403 => Err(AuthError(format!("{} ({}): {}", context, status, detail))),
        404 => Err(NotFoundError(format!("{} ({}): {}", context, status, detail))),
        _ => Err(RemoteServiceError(format!("{} ({}): {}", context, status, detail))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_query_builder() {
        assert_eq!(file_query_builder("text/csv", None), "mimeType = 'text/csv'");
        assert_eq!(
            file_query_builder("text/csv", Some("folder-1")),
            "mimeType = 'text/csv' and 'folder-1' in parents");
    }

    #[test]
    fn test_multipart_related_body_contains_parts() {
        let body = multipart_related_body("a,b\n1,2", "x.csv", Some("folder-1"));
        assert!(body.contains(r#""name":"x.csv""#));
        assert!(body.contains(r#""parents":["folder-1"]"#));
        assert!(body.contains("a,b\n1,2"));
        assert!(body.ends_with(&format!("--{}--", UPLOAD_BOUNDARY)));
    }

    #[test]
    fn test_multipart_related_body_without_parent() {
        let body = multipart_related_body("a,b\n1,2", "x.csv", None);
        assert!(!body.contains("parents"));
    }
}
