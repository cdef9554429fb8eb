use log::debug;
use crate::errors::DaichoError::StateError;
use crate::errors::DaichoResult;
use crate::services::google_drive::GoogleDrive;
use crate::types::dataset::Dataset;
use crate::types::google_drive::DriveFile;

/// Binds one Drive file id to zero-or-one in-memory [`Dataset`].
///
/// The dataset is loaded lazily and replaced wholesale on `load`/`reload`;
/// there are no partial merges. A handle has one logical owner at a time —
/// two handles on the same file id do not coordinate, and the last writer
/// wins at the remote store.
pub struct DriveCsv {
    drive: GoogleDrive,
    file_id: String,
    dataset: Option<Dataset>,
}

impl DriveCsv {
    pub fn new(drive: GoogleDrive, file_id: &str) -> Self {
        Self {
            drive,
            file_id: file_id.to_string(),
            dataset: None,
        }
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    /// Download and parse the bound file, replacing any held dataset.
    ///
    /// On failure the previously loaded dataset stays untouched.
    pub async fn load(&mut self) -> DaichoResult<()> {
        let content = self.drive.download_file(&self.file_id).await?;
        let dataset = Dataset::from_csv(&content)?;
        debug!("Loaded {} rows from drive file {}", dataset.row_count(), self.file_id);
        self.dataset = Some(dataset);

        Ok(())
    }

    /// The in-memory dataset, loading it first if none is held yet.
    pub async fn dataset(&mut self) -> DaichoResult<&Dataset> {
        if self.dataset.is_none() {
            self.load().await?;
        }

        self.dataset
            .as_ref()
            .ok_or_else(|| StateError("No dataset loaded".to_string()))
    }

    /// Replace the in-memory dataset and immediately sync it back to the
    /// bound file, overwriting its remote content in place.
    ///
    /// When the sync fails, neither the remote store nor the in-memory
    /// dataset changes.
    pub async fn update_dataset(&mut self, dataset: Dataset) -> DaichoResult<DriveFile> {
        let content = dataset.to_csv()?;
        let file = self.drive.update_file(&self.file_id, &content).await?;
        self.dataset = Some(dataset);

        Ok(file)
    }

    /// Unconditionally re-download and re-parse, discarding any unsynced
    /// local mutation.
    pub async fn reload(&mut self) -> DaichoResult<()> {
        self.load().await
    }

    /// Upload the current dataset as a brand-new file object.
    ///
    /// Fails with `StateError` before any network call when no dataset has
    /// been loaded yet.
    pub async fn save_as(&self, title: &str, parent_id: Option<&str>) -> DaichoResult<DriveFile> {
        let dataset = self.dataset
            .as_ref()
            .ok_or_else(|| StateError("No dataset loaded to save".to_string()))?;
        let content = dataset.to_csv()?;

        self.drive.upload_file(&content, title, parent_id).await
    }
}
