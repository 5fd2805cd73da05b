use std::collections::HashSet;

use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use super::models::{ApiConfig, SearchResult, VideoRenderer};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Server returned error: {0}")]
    HttpStatus(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to extract search results from page")]
    NoSearchData,

    #[error("Failed to get video formats: {0}")]
    Metadata(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = Client::builder().user_agent(&config.user_agent).build()?;
        Ok(Self { config, http })
    }

    fn extract_json_from_html(&self, html: &str) -> Option<Value> {
        // Matches the `ytInitialData` assignment inside the script tag
        let re = Regex::new(
            r#"(?s)(?:var ytInitialData|window\["ytInitialData"\])\s*=\s*(\{.*?\});\s*</script>"#,
        )
        .ok()?;
        let caps = re.captures(html)?;
        serde_json::from_str(&caps[1]).ok()
    }

    fn collect_video_renderers(value: &Value, out: &mut Vec<VideoRenderer>) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    if key == "videoRenderer" {
                        if let Ok(renderer) = serde_json::from_value(child.clone()) {
                            out.push(renderer);
                            continue;
                        }
                    }
                    Self::collect_video_renderers(child, out);
                }
            }
            Value::Array(items) => {
                for item in items {
                    Self::collect_video_renderers(item, out);
                }
            }
            _ => {}
        }
    }

    fn watch_url(&self, video_id: &str) -> String {
        format!(
            "{}/watch?v={}",
            self.config.base_url.trim_end_matches('/'),
            video_id
        )
    }

    fn results_from_page(&self, html: &str) -> Result<Vec<SearchResult>> {
        let json = self
            .extract_json_from_html(html)
            .ok_or(ApiError::NoSearchData)?;

        let mut renderers = Vec::new();
        Self::collect_video_renderers(&json, &mut renderers);

        let mut seen = HashSet::new();
        let results = renderers
            .into_iter()
            .filter(|renderer| seen.insert(renderer.video_id.clone()))
            .map(|renderer| {
                let name = renderer.title.joined();
                let title = format!("{} ({})", name, renderer.video_id);
                SearchResult {
                    url: self.watch_url(&renderer.video_id),
                    id: renderer.video_id,
                    name,
                    title,
                }
            })
            .collect();

        Ok(results)
    }

    /// Fetch the results page for `query` and scrape the listed videos.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let mut url = Url::parse(&self.config.base_url)?.join("results")?;
        let words = query.split_whitespace().collect::<Vec<_>>().join(" ");
        url.query_pairs_mut().append_pair("search_query", &words);

        tracing::debug!(%url, "fetching search results");

        let html = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ApiError::HttpStatus(format!("Search request failed: {}", e)))?
            .text()
            .await?;

        let results = self.results_from_page(&html)?;
        tracing::debug!(count = results.len(), "scraped search results");
        Ok(results)
    }

    /// Start a streamed GET of `download_url`.
    /// Returns (content_length, stream)
    pub async fn download_file_stream(
        &self,
        download_url: &str,
    ) -> Result<(Option<u64>, BoxStream<'static, Result<bytes::Bytes>>)> {
        let response = self
            .http
            .get(download_url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ApiError::HttpStatus(format!("Download request failed: {}", e)))?;

        let total_size = response.content_length();
        let stream = response
            .bytes_stream()
            .map_err(ApiError::RequestError)
            .boxed();

        Ok((total_size, stream))
    }
}
