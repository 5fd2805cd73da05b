use std::path::PathBuf;

/// The format the user picked, before a file name is chosen.
#[derive(Debug, Clone)]
pub struct DownloadPlan {
    pub title: String,
    pub download_url: String,
    pub extension: String,
}

/// Where one download attempt reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub source_url: String,
    pub destination: PathBuf,
}

impl DownloadTarget {
    pub fn new(source_url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source_url: source_url.into(),
            destination: destination.into(),
        }
    }
}

/// Progress after a chunk has been written.
///
/// A percentage is only reported when the response declared a non-zero
/// content-length; otherwise the running byte count is reported instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Percent(u8),
    Bytes(u64),
}

impl Progress {
    pub fn compute(downloaded: u64, total: Option<u64>) -> Self {
        match total {
            Some(total) if total > 0 => {
                let percent = (downloaded as u128 * 100 / total as u128).min(100);
                Progress::Percent(percent as u8)
            }
            _ => Progress::Bytes(downloaded),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    pub path: PathBuf,
    pub bytes: u64,
}
