use std::path::PathBuf;

use bytes::Bytes;
use futures::{future::BoxFuture, stream::BoxStream, FutureExt, StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;

use super::partial_file::PartialFile;
use crate::{
    api::ApiClient,
    domain::{BoxError, DownloadError, DownloadSummary, DownloadTarget, Progress},
};

pub type ChunkStream = BoxStream<'static, Result<Bytes, BoxError>>;

/// Resolves to the declared content-length and the body once headers arrive.
pub type Connect = BoxFuture<'static, Result<(Option<u64>, ChunkStream), BoxError>>;

#[derive(Debug)]
pub enum DownloadEvent {
    /// Response headers received.
    Started { total_bytes: Option<u64> },
    Progress(Progress),
    Completed(DownloadSummary),
    Failed(DownloadError),
}

#[derive(Clone)]
pub struct DownloadCoordinator {
    api_client: ApiClient,
}

impl DownloadCoordinator {
    pub fn new(api_client: ApiClient) -> Self {
        Self { api_client }
    }

    /// Stream of events for one download attempt.
    ///
    /// The stream always ends with exactly one `Completed` or `Failed` event.
    pub fn download_stream(
        &self,
        target: DownloadTarget,
        cancel: CancellationToken,
    ) -> BoxStream<'static, DownloadEvent> {
        let client = self.api_client.clone();
        let url = target.source_url;
        let connect = async move {
            let (total, stream) = client.download_file_stream(&url).await?;
            let stream: ChunkStream = stream.map_err(BoxError::from).boxed();
            Ok::<_, BoxError>((total, stream))
        }
        .boxed();

        transfer(target.destination, connect, cancel)
    }

    /// Download `target`, forwarding progress to `on_progress`.
    pub async fn download<F>(
        &self,
        target: DownloadTarget,
        cancel: CancellationToken,
        on_progress: F,
    ) -> Result<DownloadSummary, DownloadError>
    where
        F: FnMut(Progress),
    {
        drive(self.download_stream(target, cancel), on_progress).await
    }
}

/// Consume an event stream until its terminal event.
pub async fn drive<F>(
    mut events: BoxStream<'static, DownloadEvent>,
    mut on_progress: F,
) -> Result<DownloadSummary, DownloadError>
where
    F: FnMut(Progress),
{
    while let Some(event) = events.next().await {
        match event {
            DownloadEvent::Started { total_bytes } => {
                tracing::debug!(?total_bytes, "response headers received");
            }
            DownloadEvent::Progress(progress) => on_progress(progress),
            DownloadEvent::Completed(summary) => return Ok(summary),
            DownloadEvent::Failed(e) => return Err(e),
        }
    }

    Err(DownloadError::Transport(
        "download stream ended without a result".into(),
    ))
}

/// Write the body produced by `connect` to `destination`.
pub fn transfer(
    destination: PathBuf,
    connect: Connect,
    cancel: CancellationToken,
) -> BoxStream<'static, DownloadEvent> {
    futures::stream::unfold(
        DownloadRuntimeState::Start {
            destination,
            connect,
            cancel,
        },
        |state| async move {
            match state {
                DownloadRuntimeState::Start {
                    destination,
                    connect,
                    cancel,
                } => {
                    if cancel.is_cancelled() {
                        return Some(finish(DownloadError::Cancelled));
                    }

                    let partial = match PartialFile::create(&destination).await {
                        Ok(partial) => partial,
                        Err(e) => {
                            return Some(finish(DownloadError::FilesystemUnavailable {
                                path: destination,
                                source: e,
                            }));
                        }
                    };

                    tracing::debug!(path = %destination.display(), "requesting media stream");

                    let connected = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => None,
                        connected = connect => Some(connected),
                    };

                    match connected {
                        None => Some(abort(partial, DownloadError::Cancelled).await),
                        Some(Ok((total, chunks))) => Some((
                            DownloadEvent::Started { total_bytes: total },
                            DownloadRuntimeState::Downloading {
                                partial,
                                chunks,
                                downloaded: 0,
                                total,
                                cancel,
                            },
                        )),
                        Some(Err(e)) => Some(abort(partial, DownloadError::Transport(e)).await),
                    }
                }
                DownloadRuntimeState::Downloading {
                    mut partial,
                    mut chunks,
                    mut downloaded,
                    total,
                    cancel,
                } => {
                    let next = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => None,
                        next = chunks.next() => Some(next),
                    };

                    let Some(next) = next else {
                        return Some(abort(partial, DownloadError::Cancelled).await);
                    };

                    match next {
                        Some(Ok(chunk)) => {
                            if let Err(e) = partial.write_chunk(&chunk).await {
                                let path = partial.path().to_path_buf();
                                return Some(
                                    abort(
                                        partial,
                                        DownloadError::FilesystemUnavailable { path, source: e },
                                    )
                                    .await,
                                );
                            }

                            downloaded += chunk.len() as u64;

                            Some((
                                DownloadEvent::Progress(Progress::compute(downloaded, total)),
                                DownloadRuntimeState::Downloading {
                                    partial,
                                    chunks,
                                    downloaded,
                                    total,
                                    cancel,
                                },
                            ))
                        }
                        Some(Err(e)) => Some(abort(partial, DownloadError::Transport(e)).await),
                        None => {
                            let path = partial.path().to_path_buf();
                            match partial.commit().await {
                                Ok(path) => {
                                    tracing::info!(path = %path.display(), bytes = downloaded, "download completed");
                                    Some((
                                        DownloadEvent::Completed(DownloadSummary {
                                            path,
                                            bytes: downloaded,
                                        }),
                                        DownloadRuntimeState::Finished,
                                    ))
                                }
                                // commit consumed the guard, which removed the file on drop
                                Err(e) => Some(finish(DownloadError::FilesystemUnavailable {
                                    path,
                                    source: e,
                                })),
                            }
                        }
                    }
                }
                DownloadRuntimeState::Finished => None,
            }
        },
    )
    .boxed()
}

async fn abort(
    partial: PartialFile,
    error: DownloadError,
) -> (DownloadEvent, DownloadRuntimeState) {
    partial.discard().await;
    finish(error)
}

fn finish(error: DownloadError) -> (DownloadEvent, DownloadRuntimeState) {
    if error.is_cancelled() {
        tracing::warn!("download cancelled");
    } else {
        tracing::warn!(error = %error, "download failed");
    }
    (DownloadEvent::Failed(error), DownloadRuntimeState::Finished)
}

enum DownloadRuntimeState {
    Start {
        destination: PathBuf,
        connect: Connect,
        cancel: CancellationToken,
    },
    Downloading {
        partial: PartialFile,
        chunks: ChunkStream,
        downloaded: u64,
        total: Option<u64>,
        cancel: CancellationToken,
    },
    Finished,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiConfig;
    use futures::stream;
    use std::io;

    fn connect_with(total: Option<u64>, chunks: Vec<Result<Bytes, BoxError>>) -> Connect {
        let chunks: ChunkStream = stream::iter(chunks).boxed();
        futures::future::ready(Ok((total, chunks))).boxed()
    }

    fn sized_chunks(sizes: &[usize]) -> Vec<Result<Bytes, BoxError>> {
        sizes
            .iter()
            .map(|&size| Ok(Bytes::from(vec![1u8; size])))
            .collect()
    }

    fn progress_of(events: &[DownloadEvent]) -> Vec<Progress> {
        events
            .iter()
            .filter_map(|event| match event {
                DownloadEvent::Progress(progress) => Some(*progress),
                _ => None,
            })
            .collect()
    }

    fn failures(events: &[DownloadEvent]) -> Vec<&DownloadError> {
        events
            .iter()
            .filter_map(|event| match event {
                DownloadEvent::Failed(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_four_equal_chunks_report_quarters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video.mp4");

        let events: Vec<_> = transfer(
            path.clone(),
            connect_with(Some(1000), sized_chunks(&[250, 250, 250, 250])),
            CancellationToken::new(),
        )
        .collect()
        .await;

        assert!(matches!(
            events[0],
            DownloadEvent::Started {
                total_bytes: Some(1000)
            }
        ));
        assert_eq!(
            progress_of(&events),
            vec![
                Progress::Percent(25),
                Progress::Percent(50),
                Progress::Percent(75),
                Progress::Percent(100)
            ]
        );
        match events.last() {
            Some(DownloadEvent::Completed(summary)) => {
                assert_eq!(summary.bytes, 1000);
                assert_eq!(summary.path, path);
            }
            other => panic!("unexpected terminal event: {:?}", other),
        }
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 1000);
    }

    #[tokio::test]
    async fn test_uneven_chunks_end_at_hundred() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video.mp4");

        let events: Vec<_> = transfer(
            path.clone(),
            connect_with(Some(997), sized_chunks(&[1, 333, 7, 600, 56])),
            CancellationToken::new(),
        )
        .collect()
        .await;

        let progress = progress_of(&events);
        assert_eq!(progress.last(), Some(&Progress::Percent(100)));
        assert!(progress
            .iter()
            .all(|p| matches!(p, Progress::Percent(n) if *n <= 100)));
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 997);
    }

    #[tokio::test]
    async fn test_understated_content_length_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video.mp4");

        let events: Vec<_> = transfer(
            path.clone(),
            connect_with(Some(100), sized_chunks(&[80, 80])),
            CancellationToken::new(),
        )
        .collect()
        .await;

        assert_eq!(
            progress_of(&events),
            vec![Progress::Percent(80), Progress::Percent(100)]
        );
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 160);
    }

    #[tokio::test]
    async fn test_unknown_length_reports_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audio.webm");

        let events: Vec<_> = transfer(
            path.clone(),
            connect_with(None, sized_chunks(&[10, 0, 5, 20])),
            CancellationToken::new(),
        )
        .collect()
        .await;

        assert_eq!(
            progress_of(&events),
            vec![
                Progress::Bytes(10),
                Progress::Bytes(10),
                Progress::Bytes(15),
                Progress::Bytes(35)
            ]
        );
        assert!(matches!(events.last(), Some(DownloadEvent::Completed(_))));
    }

    #[tokio::test]
    async fn test_transport_error_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video.mp4");

        let mut chunks = sized_chunks(&[100, 100]);
        chunks.push(Err(BoxError::from(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "connection reset",
        ))));
        chunks.extend(sized_chunks(&[100]));

        let events: Vec<_> = transfer(
            path.clone(),
            connect_with(Some(400), chunks),
            CancellationToken::new(),
        )
        .collect()
        .await;

        let failed = failures(&events);
        assert_eq!(failed.len(), 1);
        assert!(matches!(failed[0], DownloadError::Transport(_)));
        assert!(matches!(events.last(), Some(DownloadEvent::Failed(_))));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_connect_error_removes_created_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video.mp4");

        let connect: Connect =
            futures::future::ready(Err(BoxError::from("connection refused"))).boxed();
        let result = drive(transfer(path.clone(), connect, CancellationToken::new()), |_| {}).await;

        assert!(matches!(result, Err(DownloadError::Transport(_))));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_cancel_mid_stream_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video.mp4");
        let cancel = CancellationToken::new();

        // the body stalls after the first chunk
        let chunks: ChunkStream = stream::iter(sized_chunks(&[300]))
            .chain(stream::pending())
            .boxed();
        let connect: Connect = futures::future::ready(Ok((Some(1000), chunks))).boxed();

        let mut events = transfer(path.clone(), connect, cancel.clone());
        assert!(matches!(
            events.next().await,
            Some(DownloadEvent::Started { .. })
        ));
        assert!(matches!(
            events.next().await,
            Some(DownloadEvent::Progress(Progress::Percent(30)))
        ));
        assert!(path.exists());

        cancel.cancel();
        // a repeated interrupt must not change the outcome
        cancel.cancel();

        let rest: Vec<_> = events.collect().await;
        assert_eq!(rest.len(), 1);
        assert!(matches!(
            rest[0],
            DownloadEvent::Failed(DownloadError::Cancelled)
        ));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_cancel_takes_priority_over_ready_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video.mp4");
        let cancel = CancellationToken::new();

        let mut events = transfer(
            path.clone(),
            connect_with(Some(200), sized_chunks(&[100, 100])),
            cancel.clone(),
        );
        assert!(matches!(
            events.next().await,
            Some(DownloadEvent::Started { .. })
        ));

        cancel.cancel();
        let rest: Vec<_> = events.collect().await;

        assert!(progress_of(&rest).is_empty());
        assert_eq!(failures(&rest).len(), 1);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_cancel_while_connecting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video.mp4");
        let cancel = CancellationToken::new();

        let connect: Connect = futures::future::pending().boxed();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = drive(transfer(path.clone(), connect, cancel), |_| {}).await;

        assert!(matches!(result, Err(DownloadError::Cancelled)));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_already_cancelled_does_not_touch_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video.mp4");
        std::fs::write(&path, b"keep me").unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = drive(
            transfer(path.clone(), connect_with(Some(3), sized_chunks(&[3])), cancel),
            |_| {},
        )
        .await;

        assert!(matches!(result, Err(DownloadError::Cancelled)));
        assert_eq!(std::fs::read(&path).unwrap(), b"keep me");
    }

    #[tokio::test]
    async fn test_unwritable_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("video.mp4");

        let result = drive(
            transfer(path.clone(), connect_with(Some(3), sized_chunks(&[3])), CancellationToken::new()),
            |_| {},
        )
        .await;

        match result {
            Err(DownloadError::FilesystemUnavailable { path: failed, .. }) => {
                assert_eq!(failed, path)
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_fresh_attempt_replaces_failed_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video.mp4");

        let mut chunks = sized_chunks(&[500]);
        chunks.push(Err(BoxError::from("reset")));
        let first = drive(
            transfer(path.clone(), connect_with(Some(1000), chunks), CancellationToken::new()),
            |_| {},
        )
        .await;
        assert!(first.is_err());

        let second: ChunkStream =
            stream::iter(vec![Ok::<_, BoxError>(Bytes::from_static(b"fresh"))]).boxed();
        let connect: Connect = futures::future::ready(Ok((Some(5), second))).boxed();
        let summary = drive(transfer(path.clone(), connect, CancellationToken::new()), |_| {})
            .await
            .unwrap();

        assert_eq!(summary.bytes, 5);
        assert_eq!(std::fs::read(&path).unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn test_download_over_http() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/videoplayback")
            .with_status(200)
            .with_body(vec![9u8; 1000])
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video.mp4");
        let coordinator = DownloadCoordinator::new(ApiClient::new(ApiConfig::default()).unwrap());
        let target = DownloadTarget::new(format!("{}/videoplayback", server.url()), path.clone());

        let mut reported = Vec::new();
        let summary = coordinator
            .download(target, CancellationToken::new(), |p| reported.push(p))
            .await
            .unwrap();

        assert_eq!(summary.bytes, 1000);
        assert_eq!(std::fs::read(&path).unwrap(), vec![9u8; 1000]);
        assert!(matches!(
            reported.last(),
            Some(Progress::Percent(100)) | Some(Progress::Bytes(1000))
        ));
    }

    #[tokio::test]
    async fn test_http_error_status_leaves_no_file() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/videoplayback")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video.mp4");
        let coordinator = DownloadCoordinator::new(ApiClient::new(ApiConfig::default()).unwrap());
        let target = DownloadTarget::new(format!("{}/videoplayback", server.url()), path.clone());

        let result = coordinator
            .download(target, CancellationToken::new(), |_| {})
            .await;

        assert!(matches!(result, Err(DownloadError::Transport(_))));
        assert!(!path.exists());
    }
}
