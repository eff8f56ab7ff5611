//! Dossier main entry point
//!
//! Command-line interface for company research: one-shot queries with a
//! terminal report, or the HTTP service.

use anyhow::Context;
use clap::Parser;
use dossier::config::load_config_or_default;
use dossier::crawler::research;
use dossier::output::{format_report, write_json};
use dossier::seed;
use dossier::server::serve;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Dossier: company research by bounded web crawling
///
/// Dossier turns a company query into candidate URLs, crawls each site
/// within page and depth bounds, extracts structured content and contact
/// identifiers, and downloads the documents the pages link to.
#[derive(Parser, Debug)]
#[command(name = "dossier")]
#[command(version = "1.0.0")]
#[command(about = "Company research by bounded web crawling", long_about = None)]
struct Cli {
    /// Free-text company query, e.g. "Acme Robotics acme.io"
    #[arg(value_name = "QUERY", required_unless_present_any = ["seed_url", "serve"])]
    query: Option<String>,

    /// Research exactly this URL instead of generating seeds (repeatable)
    #[arg(long = "seed-url", value_name = "URL", conflicts_with = "query")]
    seed_url: Vec<Url>,

    /// Path to TOML configuration file (defaults apply when absent)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Additionally write full results as pretty JSON to this path
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Run the HTTP service instead of a one-shot query
    #[arg(long, conflicts_with_all = ["query", "seed_url", "output"])]
    serve: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-warning output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config =
        load_config_or_default(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(path) = &cli.config {
        tracing::info!("Loaded configuration from {}", path.display());
    }

    if cli.serve {
        serve(config).await.context("service terminated")?;
        return Ok(());
    }

    let seeds = if cli.seed_url.is_empty() {
        let query = cli.query.as_deref().unwrap_or_default();
        seed::generate(query, config.seeds.max_urls)
    } else {
        cli.seed_url.clone()
    };

    let results = research(&seeds, config).await.context("research failed")?;

    print!("{}", format_report(&results));

    if let Some(path) = &cli.output {
        write_json(&results, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Results written to {}", path.display());
    }

    Ok(())
}

/// Sets up the tracing subscriber from verbosity flags; RUST_LOG overrides
fn setup_logging(verbose: u8, quiet: bool) {
    let default = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "dossier=info,warn",
            1 => "dossier=debug,info",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
