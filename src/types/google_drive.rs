use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub(crate) struct FileMetadataResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    parents: Option<Vec<String>>,
}

impl FileMetadataResponse {
    pub(crate) fn first_parent(&self) -> Option<&str> {
        self.parents
            .as_ref()
            .and_then(|parents| parents.first())
            .map(String::as_str)
    }
}

#[derive(Deserialize, Debug)]
pub(crate) struct FileListResponse {
    #[serde(default)]
    files: Vec<FileMetadataResponse>,
}

impl FileListResponse {
    pub(crate) fn files(&self) -> &[FileMetadataResponse] {
        &self.files
    }
}

/// One named, identified file object on Google Drive.
///
/// Decouples callers from the Drive API's response shapes: the identifier is
/// opaque, the title is the display name, and the parent id is the containing
/// folder when the file is not at the Drive root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveFile {
    id: String,
    title: String,
    parent_id: Option<String>,
}

impl DriveFile {
    pub fn new(id: &str, title: &str, parent_id: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            parent_id: parent_id.map(str::to_string),
        }
    }

    pub(crate) fn from_metadata(metadata: &FileMetadataResponse) -> Self {
        Self::new(&metadata.id, &metadata.name, metadata.first_parent())
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_title(&self) -> &str {
        &self.title
    }

    pub fn get_parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_response_deserialize() {
        let body = r#"{"files": [{"id": "abc", "name": "report.csv", "parents": ["folder-1"]}]}"#;
        let response = serde_json::from_str::<FileListResponse>(body).unwrap();

        let files = response.files();
        assert_eq!(files.len(), 1);

        let file = DriveFile::from_metadata(&files[0]);
        assert_eq!(file.get_id(), "abc");
        assert_eq!(file.get_title(), "report.csv");
        assert_eq!(file.get_parent_id(), Some("folder-1"));
    }

    #[test]
    fn test_list_response_missing_files_field() {
        let response = serde_json::from_str::<FileListResponse>("{}").unwrap();
        assert!(response.files().is_empty());
    }

    #[test]
    fn test_metadata_without_parents() {
        let body = r#"{"id": "abc", "name": "report.csv"}"#;
        let metadata = serde_json::from_str::<FileMetadataResponse>(body).unwrap();
        assert_eq!(metadata.first_parent(), None);
    }
}
