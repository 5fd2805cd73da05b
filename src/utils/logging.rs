use tracing_subscriber::EnvFilter;

/// Default filter for a given `-v` count; `RUST_LOG` takes precedence.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "youtube_cli=warn",
        1 => "youtube_cli=info",
        _ => "youtube_cli=debug,reqwest=debug",
    }
}

/// Logs go to stderr so they do not interleave with prompts on stdout.
pub fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
