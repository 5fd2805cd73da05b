pub mod logging;

use std::path::{Path, PathBuf};

use regex::Regex;
use url::Url;

const MAX_FILENAME_CHARS: usize = 240;

/// Sanitize filename to remove invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .trim()
        .chars()
        .filter(|c| !matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .take(MAX_FILENAME_CHARS)
        .collect()
}

/// Build the destination path `dir/{sanitized name}.{extension}`.
pub fn destination_path(dir: &Path, file_name: &str, extension: &str) -> PathBuf {
    let mut name = sanitize_filename(file_name);
    if name.trim().is_empty() {
        name = "video".to_string();
    }
    dir.join(format!("{}.{}", name, extension))
}

fn is_video_id(candidate: &str) -> bool {
    Regex::new(r"^[A-Za-z0-9_-]{11}$")
        .map(|re| re.is_match(candidate))
        .unwrap_or(false)
}

/// Extract the video ID from a bare ID or a YouTube URL.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if is_video_id(input) {
        return Some(input.to_string());
    }

    let url = Url::parse(input).ok()?;
    let host = url.host_str()?.trim_start_matches("www.").trim_start_matches("m.");

    let candidate = match host {
        "youtu.be" => url.path_segments()?.next().map(str::to_string),
        "youtube.com" | "music.youtube.com" => {
            let mut segments = url.path_segments()?;
            match segments.next() {
                Some("watch") => url
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned()),
                Some("shorts") | Some("embed") | Some("live") => {
                    segments.next().map(str::to_string)
                }
                _ => None,
            }
        }
        _ => None,
    }?;

    is_video_id(&candidate).then_some(candidate)
}
