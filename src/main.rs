//! console-sources - API Console source staging
//!
//! CLI entry point: parses flags, validates options, runs the resolver.

use clap::Parser;
use console::style;
use console_sources::cli::Cli;
use console_sources::error::SourcesResult;
use console_sources::options::SourceOptions;
use console_sources::release::GithubReleaseSource;
use console_sources::resolver::SourcesResolver;
use console_sources::transport::HttpTransport;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let console_sources::SourcesError::InvalidOptions { ref errors } = e {
                for message in errors {
                    eprintln!("  {}", message);
                }
            }
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> SourcesResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("console_sources=warn"),
        1 => EnvFilter::new("console_sources=info"),
        _ => EnvFilter::new("console_sources=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let opts = SourceOptions::from_value(&cli.to_raw_options());
    let releases = GithubReleaseSource::from_slug(&cli.repo)?;
    let resolver =
        SourcesResolver::new(opts, Arc::new(releases), Arc::new(HttpTransport::new()))?;

    debug!("Staging console sources into {}", cli.destination.display());
    resolver.sources_to(&cli.destination).await?;

    println!(
        "Console sources staged in {}",
        style(cli.destination.display()).green()
    );
    Ok(())
}
