//! joblist CLI
//!
//! Local driver for the listing core. Builds requests from flags, runs them
//! against the configured CSV file and prints the JSON response.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use joblist::{
    error::Result,
    models::{
        Config, DetailOutcome, DetailResponse, ListQuery, MessageResponse, parse_listing_id,
    },
    services::ListingService,
};
use serde::Serialize;

/// joblist - job listing data core
#[derive(Parser, Debug)]
#[command(name = "joblist", version, about = "Query job listings from a CSV export")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List listings with optional filters
    List {
        /// Match title, company, location or keywords
        #[arg(long)]
        keyword: Option<String>,

        /// Source filter: rndjob, military or all
        #[arg(long)]
        source: Option<String>,

        /// Location substring
        #[arg(long)]
        location: Option<String>,

        /// recent, deadline or company
        #[arg(long)]
        sort_by: Option<String>,

        #[arg(long)]
        page: Option<String>,

        #[arg(long)]
        limit: Option<String>,
    },

    /// Show a single listing by id
    Show { id: String },

    /// Show aggregated listing counts
    Overview,

    /// Inspect or manage the record cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Validate the configuration file
    Validate,
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Print cache statistics
    Stats,
    /// Remove expired entries
    Cleanup,
    /// Remove every entry, including the loaded rows
    Clear,
    /// Remove one key (`csv-data` drops the loaded rows)
    Delete { key: String },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Load the file strictly and validate it, without falling back to defaults.
fn validate_config(path: &Path) -> Result<()> {
    log::info!("Validating configuration...");
    let config = Config::load(path).inspect_err(|e| {
        log::error!("Config load failed from {}: {}", path.display(), e);
    })?;
    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }
    log::info!("✓ Config OK (source: {})", config.data.source_path().display());
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Command::Validate = cli.command {
        return validate_config(&cli.config);
    }

    let config = Config::load_or_default(&cli.config);
    log::debug!("Loaded configuration from {}", cli.config.display());

    let service = ListingService::from_config(Arc::new(config));

    match cli.command {
        Command::List {
            keyword,
            source,
            location,
            sort_by,
            page,
            limit,
        } => {
            let params: HashMap<String, String> = [
                ("keyword", keyword),
                ("source", source),
                ("location", location),
                ("sortBy", sort_by),
                ("page", page),
                ("limit", limit),
            ]
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k.to_string(), v)))
            .collect();

            let query = ListQuery::from_params(&params, &service.config().query)?;
            print_json(&service.list(&query).await?)?;
        }

        Command::Show { id } => {
            let id = parse_listing_id(&id, &service.config().query)?;
            match service.detail(id).await? {
                DetailOutcome::Found(job) => print_json(&DetailResponse { job: *job })?,
                other => {
                    if let Some(body) = other.message(&service.config().locale) {
                        log::warn!("Listing {}: {}", id, body.message);
                        print_json(&body)?;
                    }
                }
            }
        }

        Command::Overview => match service.overview().await? {
            Some(overview) => print_json(&overview)?,
            None => print_json(&MessageResponse::new(
                &service.config().locale.data_unavailable,
            ))?,
        },

        Command::Cache { action } => match action {
            CacheAction::Stats => print_json(&service.cache_stats())?,
            CacheAction::Cleanup => print_json(&service.cache_cleanup())?,
            CacheAction::Clear => print_json(&service.cache_clear().await)?,
            CacheAction::Delete { key } => print_json(&service.cache_delete(&key).await?)?,
        },

        // Handled before the service is built
        Command::Validate => {}
    }

    Ok(())
}
