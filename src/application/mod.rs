pub mod download_coordinator;
pub mod partial_file;

pub use download_coordinator::DownloadCoordinator;
