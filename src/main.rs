mod concat;
mod convert;
mod error;
mod extract;
mod fetcher;
mod links;
mod output;
mod pipeline;
mod settings;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::convert::HeadingStyle;
use crate::fetcher::{HttpFetcher, PageSource};
use crate::pipeline::FetchJob;
use crate::settings::{Overrides, Settings, CONFIG_FILE};

#[derive(Parser)]
#[command(name = "ocaml-api-docs", about = "Scrape OCaml API pages into Markdown and merge them")]
struct Cli {
    /// URL list, one per line
    #[arg(long, global = true)]
    links: Option<PathBuf>,
    /// Directory for the per-page Markdown files and the merge
    #[arg(long, global = true)]
    out_dir: Option<PathBuf>,
    /// Settings file (optional)
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every page, then merge the output directory (default)
    Run {
        #[command(flatten)]
        fetch: FetchArgs,
        #[command(flatten)]
        concat: ConcatArgs,
    },
    /// Fetch, extract and convert each listed page
    Fetch(FetchArgs),
    /// Merge every file in the output directory
    Concat(ConcatArgs),
}

#[derive(Args, Default)]
struct FetchArgs {
    /// CSS selector of the element whose following siblings are kept
    #[arg(long)]
    marker: Option<String>,
    #[arg(long, value_enum)]
    heading_style: Option<HeadingStyle>,
    /// Log and skip network errors instead of stopping
    #[arg(long)]
    keep_going: bool,
}

#[derive(Args, Default)]
struct ConcatArgs {
    /// Name of the merged file inside the output directory
    #[arg(long)]
    merged_name: Option<String>,
    /// Leave a previous merged file out of the new merge
    #[arg(long)]
    exclude_merged: bool,
}

/// Which stages a command runs, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stages {
    FetchThenConcat,
    FetchOnly,
    ConcatOnly,
}

impl Stages {
    fn of(command: Option<&Commands>) -> Self {
        match command {
            None | Some(Commands::Run { .. }) => Stages::FetchThenConcat,
            Some(Commands::Fetch(_)) => Stages::FetchOnly,
            Some(Commands::Concat(_)) => Stages::ConcatOnly,
        }
    }
}

impl Cli {
    fn overrides(&self, fetch: Option<&FetchArgs>, concat: Option<&ConcatArgs>) -> Overrides {
        Overrides {
            links: self.links.clone(),
            out_dir: self.out_dir.clone(),
            marker: fetch.and_then(|f| f.marker.clone()),
            heading_style: fetch.and_then(|f| f.heading_style),
            merged_name: concat.and_then(|c| c.merged_name.clone()),
            keep_going: fetch.and_then(|f| f.keep_going.then_some(true)),
            exclude_merged: concat.and_then(|c| c.exclude_merged.then_some(true)),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let command = cli.command.as_ref();

    let overrides = match command {
        None => cli.overrides(None, None),
        Some(Commands::Run { fetch, concat }) => cli.overrides(Some(fetch), Some(concat)),
        Some(Commands::Fetch(fetch)) => cli.overrides(Some(fetch), None),
        Some(Commands::Concat(concat)) => cli.overrides(None, Some(concat)),
    };
    let settings = Settings::load(&cli.config, &overrides)
        .with_context(|| format!("Failed to load settings ({})", cli.config.display()))?;
    info!(settings = ?settings, "Starting ocaml-api-docs");

    run_stages(&HttpFetcher::new(), &settings, Stages::of(command)).await?;

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        info!("Done in {}", format_duration(elapsed));
    }
    Ok(())
}

/// Concat only starts once the fetch stage has finished without error.
async fn run_stages<S: PageSource>(
    source: &S,
    settings: &Settings,
    stages: Stages,
) -> anyhow::Result<()> {
    match stages {
        Stages::FetchThenConcat => {
            fetch_stage(source, settings).await?;
            concat_stage(settings)
        }
        Stages::FetchOnly => fetch_stage(source, settings).await,
        Stages::ConcatOnly => concat_stage(settings),
    }
}

async fn fetch_stage<S: PageSource>(source: &S, settings: &Settings) -> anyhow::Result<()> {
    let urls = links::read_links(&settings.links)?;
    let job = FetchJob::from_settings(settings)?;
    let report = pipeline::fetch_all(source, urls, &job).await?;
    if report.transport_errors > 0 || report.unnamed > 0 {
        info!(
            transport_errors = report.transport_errors,
            unnamed = report.unnamed,
            "Some urls were skipped"
        );
    }
    Ok(())
}

fn concat_stage(settings: &Settings) -> anyhow::Result<()> {
    let dir: &Path = &settings.out_dir;
    let report = concat::concat_dir(dir, &settings.merged_name, settings.exclude_merged)
        .with_context(|| format!("Failed to merge {}", dir.display()))?;
    info!(
        "Merged {} files ({} bytes) into {}",
        report.entries,
        report.bytes,
        report.path.display()
    );
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
