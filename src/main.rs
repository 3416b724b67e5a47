//! lang-pulse main entry point
//!
//! This is the command-line interface for the lang-pulse scraper.

use clap::{Parser, Subcommand};
use lang_pulse::config::{compute_config_hash, load_config_or_default, Config};
use lang_pulse::output::{LanguageReport, TagReport};
use lang_pulse::scrape::Scraper;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Number of tags printed by the interest report
const TOP_TAGS: usize = 20;

/// lang-pulse: programming language popularity signals
///
/// Scrapes the top 20 ranked languages and their public repository counts,
/// or the tags most used by recently updated repositories of a topic.
#[derive(Parser, Debug)]
#[command(name = "lang-pulse")]
#[command(version = "1.0.0")]
#[command(about = "Programming language popularity scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (created with defaults if missing)
    #[arg(short, long, value_name = "CONFIG", default_value = "lang-pulse.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank languages by public repository count
    Languages,

    /// Count the tags of recently updated repositories of the configured topic
    Interest,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_or_default(&cli.config) {
        Ok(cfg) => {
            let hash = compute_config_hash(&cli.config)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let start = Instant::now();
    let outcome = match cli.command {
        Command::Languages => handle_languages(&config).await,
        Command::Interest => handle_interest(&config).await,
    };

    match outcome {
        Ok(()) => {
            tracing::info!("Completed in {:?}", start.elapsed());
            Ok(())
        }
        Err(e) => {
            tracing::error!("Error running application: {}", e);
            Err(e)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("lang_pulse=info,warn"),
            1 => EnvFilter::new("lang_pulse=debug,info"),
            2 => EnvFilter::new("lang_pulse=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Ranking (or fixed list) -> repository counts -> report
async fn handle_languages(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let scraper = Scraper::new(config)?;

    let languages = if config.languages.use_fixed_list {
        tracing::info!("Using fixed list of {} languages", config.languages.list.len());
        config.languages.list.clone()
    } else {
        tracing::info!("Scraping ranking from {}", config.sources.ranking_url);
        scraper.scrape_ranking().await?
    };

    let counts = scraper
        .scrape_counts(&languages)
        .await
        .into_result("languages")?;

    let mut report = LanguageReport::from_counts(&counts);

    let result_path = Path::new(&config.output.result_path);
    report.save_counts(result_path)?;
    tracing::info!("Saved results to {}", result_path.display());

    report.sort_by_score();
    print!("{}", report);

    Ok(())
}

/// Listing pages -> tag counts -> report
async fn handle_interest(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let scraper = Scraper::new(config)?;

    tracing::info!(
        "Scraping {} pages of topic {}",
        config.scraper.max_pages,
        config.scraper.interest
    );
    let tags = scraper.scrape_interest().await.into_result("interest")?;

    let report = TagReport::from_counts(&tags);
    if report.is_empty() {
        println!("No recently updated repositories found");
        return Ok(());
    }

    for record in report.top(TOP_TAGS) {
        println!("{}", record);
    }

    Ok(())
}
