//! Sequential fetch pipeline: validate, probe, skip-or-stream to the cache.
//!
//! Per date the pipeline is a small state machine ending in `Skipped`,
//! `Downloaded`, or a [`FetchError`]. Re-running a fetch for an unchanged
//! remote resource costs only the metadata probe: the cache path embeds the
//! remote modification timestamp, and its presence is the sole
//! already-fetched signal.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use super::resolver::{self, ARCHIVE_CONTENT_TYPE};
use super::transport::{FetchError, HttpTransport, ResourceMeta};
use crate::calendar;
use crate::config::Config;
use crate::dates::DateGranularity;

const CHUNK_SIZE: usize = 8192;

/// Terminal success states of a single-date fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Body downloaded and materialized at the path.
    Downloaded(PathBuf),
    /// The resolved cache file already existed; no body transfer happened.
    Skipped(PathBuf),
}

impl FetchOutcome {
    pub fn path(&self) -> &Path {
        match self {
            FetchOutcome::Downloaded(path) | FetchOutcome::Skipped(path) => path,
        }
    }
}

/// Progress callbacks for batch fetches.
pub trait FetchProgress {
    fn on_start(&self, date: &DateGranularity, index: usize, total: usize);

    fn on_complete(
        &self,
        date: &DateGranularity,
        index: usize,
        total: usize,
        result: &Result<FetchOutcome, FetchError>,
    );

    fn on_batch_complete(&self, summary: &FetchSummary);
}

/// Progress reporter that prints to stdout.
pub struct StdoutProgress;

impl FetchProgress for StdoutProgress {
    fn on_start(&self, date: &DateGranularity, index: usize, total: usize) {
        println!("[{}/{}] Fetching {date}...", index + 1, total);
    }

    fn on_complete(
        &self,
        date: &DateGranularity,
        _index: usize,
        _total: usize,
        result: &Result<FetchOutcome, FetchError>,
    ) {
        match result {
            Ok(FetchOutcome::Downloaded(path)) => println!("  OK: {}", path.display()),
            Ok(FetchOutcome::Skipped(path)) => {
                println!("  SKIP (already fetched): {}", path.display())
            }
            Err(e) => eprintln!("  FAIL: {date}: {e}"),
        }
    }

    fn on_batch_complete(&self, summary: &FetchSummary) {
        println!(
            "\nFetch complete: {} downloaded, {} skipped, {} failed of {}",
            summary.downloaded, summary.skipped, summary.failed, summary.total
        );
    }
}

/// Silent progress reporter.
pub struct NullProgress;

impl FetchProgress for NullProgress {
    fn on_start(&self, _: &DateGranularity, _: usize, _: usize) {}
    fn on_complete(
        &self,
        _: &DateGranularity,
        _: usize,
        _: usize,
        _: &Result<FetchOutcome, FetchError>,
    ) {
    }
    fn on_batch_complete(&self, _: &FetchSummary) {}
}

/// Summary of a batch fetch.
#[derive(Debug)]
pub struct FetchSummary {
    pub total: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub errors: Vec<(DateGranularity, FetchError)>,
}

impl FetchSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// The fetch pipeline over an injected transport.
pub struct Fetcher<T: HttpTransport> {
    transport: T,
    config: Config,
}

impl<T: HttpTransport> Fetcher<T> {
    pub fn new(transport: T, config: Config) -> Self {
        Self { transport, config }
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Fetches one date: validate, probe, resolve destination, materialize.
    ///
    /// A `Daily` value that is not a valid trading session is rejected before
    /// any network traffic. A probe answered with a non-success status or a
    /// non-archive content type aborts without creating any local artifact.
    pub fn fetch_one(&self, date: DateGranularity) -> Result<FetchOutcome, FetchError> {
        if let DateGranularity::Daily(day) = date {
            if !calendar::is_valid_session_day(day) {
                return Err(FetchError::InvalidDate(date));
            }
        }

        let url = resolver::resource_url(&self.config.base_url, date);
        let meta = self.probe_archive(&url)?;

        let dest = resolver::cache_path(&self.config.data_dir, date, meta.modified);
        if dest.exists() {
            return Ok(FetchOutcome::Skipped(dest));
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        self.download_to(&url, &dest)?;
        Ok(FetchOutcome::Downloaded(dest))
    }

    /// Fetches every date in order, one at a time, over the shared transport.
    ///
    /// Each date's failure is recorded and reported through `progress`;
    /// it never prevents subsequent dates from being attempted. Nothing is
    /// retried.
    pub fn fetch_all(
        &self,
        dates: &[DateGranularity],
        progress: &dyn FetchProgress,
    ) -> FetchSummary {
        let total = dates.len();
        let mut summary = FetchSummary {
            total,
            downloaded: 0,
            skipped: 0,
            failed: 0,
            errors: Vec::new(),
        };

        for (i, &date) in dates.iter().enumerate() {
            progress.on_start(&date, i, total);
            let result = self.fetch_one(date);
            progress.on_complete(&date, i, total, &result);

            match result {
                Ok(FetchOutcome::Downloaded(_)) => summary.downloaded += 1,
                Ok(FetchOutcome::Skipped(_)) => summary.skipped += 1,
                Err(e) => {
                    summary.failed += 1;
                    summary.errors.push((date, e));
                }
            }
        }

        progress.on_batch_complete(&summary);
        summary
    }

    fn probe_archive(&self, url: &str) -> Result<ResourceMeta, FetchError> {
        let meta = self.transport.probe(url)?;

        if !(200..300).contains(&meta.status) {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: meta.status,
            });
        }

        match meta.content_type.as_deref() {
            Some(ARCHIVE_CONTENT_TYPE) => Ok(meta),
            other => Err(FetchError::UnexpectedContentType {
                url: url.to_string(),
                content_type: other.unwrap_or("").to_string(),
            }),
        }
    }

    /// Streams the body to `<dest>.part`, then renames into place. The final
    /// path either does not exist or is complete; a failed write removes the
    /// partial file.
    fn download_to(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        let mut body = self.transport.get(url)?;
        let tmp = dest.with_extension("zip.part");

        match stream_to_file(body.as_mut(), &tmp) {
            Ok(()) => {
                fs::rename(&tmp, dest)?;
                Ok(())
            }
            Err(e) => {
                let _ = fs::remove_file(&tmp);
                Err(e)
            }
        }
    }
}

fn stream_to_file(body: &mut dyn Read, path: &Path) -> Result<(), FetchError> {
    let mut file = fs::File::create(path)?;
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = body.read(&mut buf)?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])?;
    }
    file.flush()?;
    Ok(())
}
