//! Remote URL and local cache-path resolution.
//!
//! Both are pure functions of the granularity value (plus the remote
//! modification timestamp for the cache path); nothing here touches the
//! network or the filesystem.

use crate::dates::DateGranularity;
use chrono::{Datelike, NaiveDateTime};
use std::path::{Path, PathBuf};

/// Media type the exchange serves the archives with.
pub const ARCHIVE_CONTENT_TYPE: &str = "application/x-zip-compressed";

const DATASET_NAME: &str = "cotacaohistorica";

/// Remote identifier: base URL + one-letter granularity code + zero-padded
/// date digits + `.zip`.
///
/// Daily files encode day-month-year, monthly files month-year, annual files
/// the year alone.
pub fn resource_url(base_url: &str, g: DateGranularity) -> String {
    match g {
        DateGranularity::Annual(year) => format!("{base_url}A{year}.zip"),
        DateGranularity::Monthly { year, month } => {
            format!("{base_url}M{month:02}{year}.zip")
        }
        DateGranularity::Daily(date) => format!(
            "{base_url}D{:02}{:02}{}.zip",
            date.day(),
            date.month(),
            date.year()
        ),
    }
}

/// Cache file name: `cotacaohistorica_<date-digits>[_<modified-to-the-minute>].zip`.
///
/// The modification suffix is the versioning mechanism — the same date
/// fetched under two different remote timestamps lands in two distinct
/// files. It is absent only when the remote supplied no Last-Modified.
pub fn cache_filename(g: DateGranularity, modified: Option<NaiveDateTime>) -> String {
    let digits = g.date_digits();
    match modified {
        Some(ts) => format!("{DATASET_NAME}_{digits}_{}.zip", ts.format("%Y%m%d%H%M")),
        None => format!("{DATASET_NAME}_{digits}.zip"),
    }
}

/// Destination path: `root/<year>/<cache_filename>`.
pub fn cache_path(root: &Path, g: DateGranularity, modified: Option<NaiveDateTime>) -> PathBuf {
    root.join(g.year().to_string())
        .join(cache_filename(g, modified))
}
