pub mod dataset;
pub mod google_drive;
