pub mod errors;
pub mod services;
pub mod types;
pub mod utils;

pub use errors::{DaichoError, DaichoResult};
pub use services::authenticator::Authenticator;
pub use services::csv_file::DriveCsv;
pub use services::google_drive::GoogleDrive;
pub use types::dataset::Dataset;
pub use types::google_drive::DriveFile;
pub use utils::credential::Session;
