mod api;
mod app;
mod application;
mod domain;
mod ui;
mod utils;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use api::ApiConfig;
use app::{DownloadApp, SessionConfig};
use domain::{AppError, DownloadSummary};

/// Exit status after the user interrupted a download.
const EXIT_CANCELLED: u8 = 130;

#[derive(Parser, Debug)]
#[command(name = "youtube-cli", version, about = "Search YouTube and download a video to disk", long_about = None)]
struct Args {
    /// Directory the downloaded file is written to (must exist)
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Print messages at once instead of typing them out
    #[arg(long)]
    no_animation: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Origin used for search requests
    #[arg(long, default_value = "https://www.youtube.com", hide = true)]
    base_url: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    utils::logging::init_tracing(args.verbose);

    match run(args).await {
        Ok(_) => ExitCode::SUCCESS,
        // the spinner already reported the cancellation
        Err(e) if e.is_cancelled() => ExitCode::from(EXIT_CANCELLED),
        Err(e) => {
            ui::print_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<DownloadSummary, AppError> {
    let api_config = ApiConfig {
        base_url: args.base_url,
        ..ApiConfig::default()
    };
    let config = SessionConfig {
        output_dir: args.output_dir,
        animate: !args.no_animation,
    };

    DownloadApp::new(config, api_config)?.run().await
}
