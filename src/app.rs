use std::path::PathBuf;

use console::Term;
use tokio_util::sync::CancellationToken;

use crate::api::{resolve_formats, ApiClient, ApiConfig, MediaFormat};
use crate::application::DownloadCoordinator;
use crate::domain::{AppError, DownloadPlan, DownloadSummary, DownloadTarget};
use crate::ui::{self, progress_message, Direction, Prompts, Spinner};
use crate::utils::{destination_path, extract_video_id};

const DEFAULT_SEARCH: &str = "Never Gonna Give You Up";
const DEFAULT_VIDEO_ID: &str = "dQw4w9WgXcQ";

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub output_dir: PathBuf,
    /// Type text out character by character.
    pub animate: bool,
}

/// One interactive session: pick a video, pick a format, download it.
pub struct DownloadApp {
    config: SessionConfig,
    api_client: ApiClient,
    coordinator: DownloadCoordinator,
    prompts: Prompts,
    term: Term,
}

impl DownloadApp {
    pub fn new(config: SessionConfig, api_config: ApiConfig) -> Result<Self, AppError> {
        let api_client = ApiClient::new(api_config)?;
        let coordinator = DownloadCoordinator::new(api_client.clone());

        Ok(Self {
            config,
            api_client,
            coordinator,
            prompts: Prompts::default(),
            term: Term::stdout(),
        })
    }

    pub async fn run(&self) -> Result<DownloadSummary, AppError> {
        self.term.clear_screen()?;
        self.say("Welcome to the YouTube CLI!").await?;
        self.say("Here you can search and download YouTube videos!").await?;

        let video_id = match self.prompts.direction()? {
            Direction::SearchAndDownload => self.search_section().await?,
            Direction::JustDownload => self.video_id_section().await?,
        };

        let plan = self.format_section(&video_id).await?;
        self.download_section(plan).await
    }

    async fn say(&self, text: &str) -> Result<(), AppError> {
        ui::type_gradient(text, self.config.animate).await?;
        Ok(())
    }

    async fn video_id_section(&self) -> Result<String, AppError> {
        self.term.clear_screen()?;
        self.say("First, you need to insert the video ID.").await?;

        let input = self.prompts.text("What is the video ID?", DEFAULT_VIDEO_ID)?;
        extract_video_id(&input).ok_or(AppError::InvalidInput(input))
    }

    async fn search_section(&self) -> Result<String, AppError> {
        self.term.clear_screen()?;
        self.say("First, you need to search the video!").await?;

        let query = self.prompts.text("What do you want to search?", DEFAULT_SEARCH)?;

        let spinner = Spinner::start("Searching YouTube...");
        let results = match self.api_client.search(&query).await {
            Ok(results) => results,
            Err(e) => {
                spinner.fail("Error!");
                return Err(e.into());
            }
        };
        spinner.succeed("Scraped the data!");
        tracing::info!(query = %query, count = results.len(), "search finished");

        if results.is_empty() {
            return Err(AppError::NoResults(query));
        }

        self.term.clear_screen()?;
        self.say("Now, you need to select a video to download.").await?;

        let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
        let index = self
            .prompts
            .choose("What video do you want to download?", &titles)?;
        Ok(results[index].id.clone())
    }

    async fn format_section(&self, video_id: &str) -> Result<DownloadPlan, AppError> {
        self.term.clear_screen()?;
        self.say("Now, we are going to get the video formats.").await?;

        let spinner = Spinner::start("Getting video formats...");
        let formats = match resolve_formats(video_id).await {
            Ok(formats) => formats,
            Err(e) => {
                spinner.fail("Error!");
                return Err(e.into());
            }
        };
        spinner.succeed("Got video formats!");

        if formats.is_empty() {
            return Err(AppError::NoFormats(video_id.to_string()));
        }

        let tags: Vec<String> = formats.iter().map(MediaFormat::tag).collect();
        let index = self
            .prompts
            .choose("What format is better for you?", &tags)?;
        Ok(plan_for(&formats[index]))
    }

    async fn download_section(&self, plan: DownloadPlan) -> Result<DownloadSummary, AppError> {
        let file_name = self
            .prompts
            .text("What do you want to call your file?", &plan.title)?;
        let destination = destination_path(&self.config.output_dir, &file_name, &plan.extension);
        let target = DownloadTarget::new(plan.download_url, destination);

        tracing::info!(path = %target.destination.display(), "starting download");

        let cancel = cancel_on_interrupt();
        let spinner = Spinner::start("Downloading video... Progress: 0%");
        let result = self
            .coordinator
            .download(target, cancel, |progress| {
                spinner.set_message(progress_message(progress))
            })
            .await;

        match result {
            Ok(summary) => {
                spinner.succeed("Downloaded video!");
                println!("Saved: {}", summary.path.display());
                Ok(summary)
            }
            Err(e) if e.is_cancelled() => {
                spinner.fail("Cancelled!");
                Err(e.into())
            }
            Err(e) => {
                spinner.fail("Error!");
                Err(e.into())
            }
        }
    }
}

fn plan_for(format: &MediaFormat) -> DownloadPlan {
    DownloadPlan {
        title: format.title.clone(),
        download_url: format.url.clone(),
        extension: format.container.clone(),
    }
}

/// Token cancelled by the first Ctrl-C.
///
/// Installing the handler replaces the default interrupt behavior for the rest
/// of the process, so later interrupts are absorbed while cleanup runs.
fn cancel_on_interrupt() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("interrupt received");
            trigger.cancel();
        }
    });
    token
}
