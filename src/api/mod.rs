pub mod client;
pub mod formats;
pub mod models;

pub use client::{ApiClient, ApiError};
pub use formats::resolve_formats;
pub use models::{ApiConfig, MediaFormat};
