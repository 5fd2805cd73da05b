pub mod error;
pub mod model;

pub use error::{AppError, BoxError, DownloadError};
pub use model::{DownloadPlan, DownloadSummary, DownloadTarget, Progress};
