use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Destination file of a download attempt that has not finished yet.
///
/// The file is removed unless [`PartialFile::commit`] succeeds, including when
/// the guard is simply dropped.
#[derive(Debug)]
pub struct PartialFile {
    file: Option<File>,
    path: PathBuf,
}

impl PartialFile {
    /// Open `path` for writing, truncating anything left by an earlier attempt.
    pub async fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = File::create(&path).await?;
        Ok(Self {
            file: Some(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.write_all(chunk).await,
            None => Err(io::Error::new(io::ErrorKind::Other, "file already closed")),
        }
    }

    /// Flush remaining data to disk and keep the file.
    ///
    /// On error the guard is dropped still armed, so the file is removed.
    pub async fn commit(mut self) -> io::Result<PathBuf> {
        if let Some(file) = self.file.as_mut() {
            file.flush().await?;
            file.sync_all().await?;
        }
        self.file = None;
        Ok(std::mem::take(&mut self.path))
    }

    /// Close the handle and delete the file.
    pub async fn discard(mut self) {
        if let Some(mut file) = self.file.take() {
            let _ = file.flush().await;
        }
        remove_quietly(&self.path).await;
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.file.take().is_some() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(path = %self.path.display(), error = %e, "failed to remove partial file");
                }
            }
        }
    }
}

async fn remove_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "removed partial file"),
        // Already gone, e.g. removed by an earlier cleanup
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove partial file")
        }
    }
}
