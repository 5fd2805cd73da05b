use std::fmt::Display;

use rusty_ytdl::Video;

use super::client::{ApiError, Result};
use super::models::MediaFormat;

/// Resolve the downloadable formats of a video that carry an audio track.
///
/// Signature deciphering and player parsing are left to `rusty_ytdl`; this
/// only flattens its format list into [`MediaFormat`] records.
pub async fn resolve_formats(video_id: &str) -> Result<Vec<MediaFormat>> {
    let video = Video::new(video_id).map_err(|e| ApiError::Metadata(e.to_string()))?;
    let info = video
        .get_info()
        .await
        .map_err(|e| ApiError::Metadata(e.to_string()))?;

    let title = info.video_details.title.clone();
    let formats: Vec<MediaFormat> = info
        .formats
        .iter()
        .filter(|format| format.has_audio && !format.url.is_empty())
        .map(|format| MediaFormat {
            url: format.url.clone(),
            mime_type: mime_label(&format.mime_type.mime, &format.mime_type.codecs),
            audio_bitrate: format.audio_bitrate,
            quality_label: format.quality_label.clone(),
            container: format.mime_type.container.clone(),
            title: title.clone(),
        })
        .collect();

    tracing::debug!(video_id, count = formats.len(), "resolved formats");
    Ok(formats)
}

fn mime_label(mime: &impl Display, codecs: &[String]) -> String {
    if codecs.is_empty() {
        mime.to_string()
    } else {
        format!("{}; codecs=\"{}\"", mime, codecs.join(", "))
    }
}
