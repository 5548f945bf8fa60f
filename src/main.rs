mod error;
mod gsc;
mod pipeline;
mod record;
mod settings;
mod table;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use pipeline::Session;
use settings::{Overrides, Settings};

#[derive(Parser)]
#[command(
    name = "gsc_opportunity_finder",
    about = "Find long-tail search queries that have no buy page yet"
)]
struct Cli {
    /// Optional YAML settings file
    #[arg(short, long, global = true, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter a query export against the buy page list and write the opportunity report
    Analyze {
        /// Query table CSV (query, url, clicks, impressions, ctr, position)
        #[arg(short, long)]
        queries: PathBuf,
        /// Buy page list CSV (url)
        #[arg(short, long)]
        pages: PathBuf,
        /// Report destination
        #[arg(short, long, default_value = "opportunity_report.csv")]
        output: PathBuf,
        /// Min words for a long-tail query
        #[arg(long)]
        min_words: Option<usize>,
        /// Drop queries ranking below this average position
        #[arg(long)]
        position_threshold: Option<f64>,
        /// Skip the clustering stage
        #[arg(long)]
        no_clustering: bool,
    },
    /// Pull query x page rows from Search Console into a query table CSV
    Fetch {
        /// Property, e.g. "sc-domain:example.com" or "https://www.example.com/"
        #[arg(short, long)]
        site: String,
        /// Days back from the end date
        #[arg(long, default_value_t = gsc::DEFAULT_DAYS)]
        days: i64,
        /// Last day of the range (default: today)
        #[arg(long)]
        end_date: Option<NaiveDate>,
        /// Max rows to fetch
        #[arg(short = 'n', long, default_value_t = gsc::DEFAULT_ROW_LIMIT)]
        row_limit: usize,
        #[arg(short, long, default_value = "gsc_queries.csv")]
        output: PathBuf,
    },
    /// List Search Console properties visible to the access token
    Sites,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            queries,
            pages,
            output,
            min_words,
            position_threshold,
            no_clustering,
        } => {
            let overrides = Overrides {
                min_word_count: min_words,
                position_threshold,
                disable_clustering: no_clustering,
            };
            let settings = Settings::load(&cli.config, &overrides)?;
            let session = load_session(settings, &queries, &pages)?;

            let report = pipeline::run(&session);

            // Serialize fully before touching the destination file.
            let mut buf = Vec::new();
            table::write_report(&mut buf, &report).context("Failed to serialize report")?;
            std::fs::write(&output, buf)
                .with_context(|| format!("Failed to write {}", output.display()))?;

            report.print();
            println!("Report written to {}", output.display());
            Ok(())
        }
        Commands::Fetch {
            site,
            days,
            end_date,
            row_limit,
            output,
        } => {
            let settings = Settings::load(&cli.config, &Overrides::default())?;
            let client = gsc_client(&settings)?;
            let end = end_date.unwrap_or_else(|| Local::now().date_naive());
            let req = gsc::FetchRequest::last_days(end, days, row_limit);

            let rows = client.fetch_queries(&site, &req).await?;
            if rows.is_empty() {
                println!("No search analytics rows for {} in that range.", site);
                return Ok(());
            }

            let mut buf = Vec::new();
            table::write_queries(&mut buf, &rows).context("Failed to serialize query table")?;
            std::fs::write(&output, buf)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Saved {} rows to {}", rows.len(), output.display());
            Ok(())
        }
        Commands::Sites => {
            let settings = Settings::load(&cli.config, &Overrides::default())?;
            let client = gsc_client(&settings)?;
            let sites = client.list_sites().await?;
            if sites.is_empty() {
                println!("No Search Console properties for this token.");
                return Ok(());
            }
            for (i, s) in sites.iter().enumerate() {
                println!("{:>3} | {}", i + 1, s);
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Both tables are validated before any pipeline stage runs.
fn load_session(settings: Settings, queries: &Path, pages: &Path) -> anyhow::Result<Session> {
    let queries = table::read_queries_path(queries)
        .with_context(|| format!("Invalid query table {}", queries.display()))?;
    let pages = table::read_pages_path(pages)
        .with_context(|| format!("Invalid page table {}", pages.display()))?;
    info!("Loaded {} queries and {} buy pages", queries.len(), pages.len());
    if pages.is_empty() {
        warn!("Buy page list is empty; every long-tail query will be reported");
    }
    Ok(Session {
        settings,
        queries,
        pages,
    })
}

fn gsc_client(settings: &Settings) -> anyhow::Result<gsc::GscClient> {
    let token = settings
        .access_token
        .as_deref()
        .context("No Search Console access token: set GSC_ACCESS_TOKEN or access_token in the config file")?;
    Ok(gsc::GscClient::new(token))
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
