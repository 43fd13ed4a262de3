use std::fs;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::convert::{self, HeadingStyle};
use crate::error::DocsError;
use crate::extract::Extractor;
use crate::fetcher::{Fetched, PageSource};
use crate::output;
use crate::settings::Settings;

/// What the fetch stage needs beyond the URLs themselves.
pub struct FetchJob {
    pub extractor: Extractor,
    pub heading_style: HeadingStyle,
    pub out_dir: PathBuf,
    pub keep_going: bool,
}

impl FetchJob {
    pub fn from_settings(settings: &Settings) -> Result<Self, DocsError> {
        Ok(Self {
            extractor: Extractor::new(&settings.marker)?,
            heading_style: settings.heading_style,
            out_dir: settings.out_dir.clone(),
            keep_going: settings.keep_going,
        })
    }
}

/// Counters for one pass over the link list.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub processed: usize,
    pub written: usize,
    /// Non-200 responses.
    pub failed: usize,
    pub no_marker: usize,
    pub unnamed: usize,
    pub transport_errors: usize,
}

/// Fetch, extract, convert and write each URL in turn.
///
/// Non-200 responses and pages without a marker are skipped. A transport
/// error ends the stage unless `keep_going` is set.
pub async fn fetch_all<S, I>(source: &S, urls: I, job: &FetchJob) -> Result<FetchReport, DocsError>
where
    S: PageSource,
    I: IntoIterator<Item = Result<String, DocsError>>,
{
    fs::create_dir_all(&job.out_dir).map_err(|source| DocsError::Write {
        path: job.out_dir.clone(),
        source,
    })?;

    let mut report = FetchReport::default();

    for url in urls {
        let url = url?;
        println!("Processing {url}");
        report.processed += 1;

        let html = match source.fetch(&url).await {
            Ok(Fetched::Page(html)) => html,
            Ok(Fetched::Miss(status)) => {
                println!("Failed to fetch {url}");
                debug!(url = %url, %status, "skipped");
                report.failed += 1;
                continue;
            }
            Err(e) if job.keep_going => {
                warn!("Skipping {}: {:#}", url, anyhow::Error::from(e));
                report.transport_errors += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        let Some(fragment) = job.extractor.extract(&html) else {
            debug!(url = %url, "no header marker");
            report.no_marker += 1;
            continue;
        };

        let Some(basename) = output::basename_from_url(&url) else {
            warn!("No file name in {}, skipping", url);
            report.unnamed += 1;
            continue;
        };

        let markdown = convert::to_markdown(&fragment, job.heading_style);
        let path = output::write_markdown(&job.out_dir, basename, &markdown)?;
        println!("Writing {}", path.display());
        report.written += 1;
    }

    info!(
        "Fetched {} urls ({} written, {} failed, {} without marker)",
        report.processed, report.written, report.failed, report.no_marker
    );
    Ok(report)
}
