use serde::{Deserialize, Serialize};

/// One entry of a search results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub name: String,
    pub url: String,
    pub id: String,
    /// Label shown in the selection list, `"{name} ({id})"`.
    pub title: String,
}

/// A downloadable stream of a video, as reported by the metadata resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFormat {
    pub url: String,
    pub mime_type: String,
    pub audio_bitrate: Option<u64>,
    pub quality_label: Option<String>,
    pub container: String,
    pub title: String,
}

impl MediaFormat {
    /// Human readable tag, e.g. `audio/webm; codecs="opus" 160bps`.
    pub fn tag(&self) -> String {
        let bitrate = self.audio_bitrate.map(|b| format!("{}bps", b));
        [Some(self.mime_type.clone()), bitrate, self.quality_label.clone()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// `videoRenderer` object embedded in a results page.
#[derive(Debug, Deserialize)]
pub(crate) struct VideoRenderer {
    #[serde(rename = "videoId")]
    pub video_id: String,
    #[serde(default)]
    pub title: TextRuns,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TextRuns {
    #[serde(default)]
    pub runs: Vec<TextRun>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TextRun {
    pub text: String,
}

impl TextRuns {
    pub fn joined(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.youtube.com".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(audio_bitrate: Option<u64>, quality_label: Option<&str>) -> MediaFormat {
        MediaFormat {
            url: "https://example.com/stream".to_string(),
            mime_type: "video/mp4; codecs=\"avc1.42001E, mp4a.40.2\"".to_string(),
            audio_bitrate,
            quality_label: quality_label.map(str::to_string),
            container: "mp4".to_string(),
            title: "Song".to_string(),
        }
    }

    #[test]
    fn test_tag_with_all_parts() {
        assert_eq!(
            format(Some(96), Some("360p")).tag(),
            "video/mp4; codecs=\"avc1.42001E, mp4a.40.2\" 96bps 360p"
        );
    }

    #[test]
    fn test_tag_skips_missing_parts() {
        assert_eq!(
            format(None, None).tag(),
            "video/mp4; codecs=\"avc1.42001E, mp4a.40.2\""
        );
        assert_eq!(
            format(Some(128), Some("")).tag(),
            "video/mp4; codecs=\"avc1.42001E, mp4a.40.2\" 128bps"
        );
    }
}
