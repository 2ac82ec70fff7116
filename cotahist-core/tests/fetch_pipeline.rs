//! Integration tests for the full fetch-then-decode pipeline, driven through
//! the public API with a canned transport.

use std::cell::Cell;
use std::io::{Read, Write};

use chrono::{NaiveDate, NaiveDateTime};
use cotahist_core::config::Config;
use cotahist_core::data::{
    read_archive, FetchError, FetchOutcome, Fetcher, FieldValue, HttpTransport, NullProgress,
    RecordLayout, ResourceMeta,
};
use cotahist_core::dates::{expand, DateGranularity};

const ARCHIVE_CONTENT_TYPE: &str = "application/x-zip-compressed";

fn modified_ts() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 4, 6)
        .unwrap()
        .and_hms_opt(18, 32, 0)
        .unwrap()
}

/// Serves the same zipped three-line COTAHIST file for every URL.
struct CannedTransport {
    archive: Vec<u8>,
    gets: Cell<usize>,
}

impl CannedTransport {
    fn new() -> Self {
        Self {
            archive: build_archive(),
            gets: Cell::new(0),
        }
    }
}

// Implemented on the reference so tests can keep the transport and inspect
// its counters after handing it to a Fetcher.
impl HttpTransport for &CannedTransport {
    fn probe(&self, _url: &str) -> Result<ResourceMeta, FetchError> {
        Ok(ResourceMeta {
            status: 200,
            content_type: Some(ARCHIVE_CONTENT_TYPE.to_string()),
            content_length: Some(self.archive.len() as u64),
            modified: Some(modified_ts()),
        })
    }

    fn get(&self, _url: &str) -> Result<Box<dyn Read>, FetchError> {
        self.gets.set(self.gets.get() + 1);
        Ok(Box::new(std::io::Cursor::new(self.archive.clone())))
    }
}

/// A minimal but layout-correct file: header, one PETR4 record, trailer.
fn build_archive() -> Vec<u8> {
    let layout = RecordLayout::quote();
    let mut record = vec![b' '; layout.width()];

    let mut put = |first: usize, value: &str| {
        for (i, b) in value.bytes().enumerate() {
            record[first - 1 + i] = b;
        }
    };
    put(1, "01");
    put(3, "20210405");
    put(11, "02");
    put(13, "PETR4");
    put(25, "010");
    put(57, "0000000002151"); // preco_abertura, implicit two decimals

    let mut content = Vec::new();
    content.extend_from_slice(format!("{:<245}\n", "00COTAHIST.2021BOVESPA").as_bytes());
    content.extend_from_slice(&record);
    content.push(b'\n');
    content.extend_from_slice(format!("{:<245}", "99COTAHIST.2021BOVESPA").as_bytes());

    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    writer
        .start_file(
            "COTAHIST_D05042021.TXT",
            zip::write::SimpleFileOptions::default(),
        )
        .unwrap();
    writer.write_all(&content).unwrap();
    writer.finish().unwrap().into_inner()
}

fn fetcher_in<'a>(
    transport: &'a CannedTransport,
    dir: &std::path::Path,
) -> Fetcher<&'a CannedTransport> {
    let config = Config {
        data_dir: dir.to_path_buf(),
        ..Config::default()
    };
    Fetcher::new(transport, config)
}

#[test]
fn expand_fetch_decode_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let transport = CannedTransport::new();
    let fetcher = fetcher_in(&transport, dir.path());

    // One week with a holiday (2021-04-02, Good Friday, is not in the fixed
    // table, so only the weekend is dropped here).
    let dates = expand("2021-04-05:2021-04-09").unwrap();
    assert_eq!(dates.len(), 5);

    let summary = fetcher.fetch_all(&dates, &NullProgress);
    assert!(summary.all_succeeded());
    assert_eq!(summary.downloaded, 5);

    // Every file landed under the year directory with its versioned name.
    let archive = dir
        .path()
        .join("2021")
        .join("cotacaohistorica_20210405_202104061832.zip");
    assert!(archive.exists());

    let rows = read_archive(&archive, RecordLayout::quote()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("simbolo"), Some(&FieldValue::Text("PETR4".into())));
    assert_eq!(
        rows[0].get("preco_abertura"),
        Some(&FieldValue::Price(Some(21.51)))
    );
}

#[test]
fn second_run_transfers_no_bodies() {
    let dir = tempfile::tempdir().unwrap();
    let transport = CannedTransport::new();
    let fetcher = fetcher_in(&transport, dir.path());
    let dates = expand("2020:2021").unwrap();

    let first = fetcher.fetch_all(&dates, &NullProgress);
    assert_eq!(first.downloaded, 2);

    let second = fetcher.fetch_all(&dates, &NullProgress);
    assert_eq!(second.downloaded, 0);
    assert_eq!(second.skipped, 2);

    // Two bodies total across both runs: the second run probed only.
    assert_eq!(transport.gets.get(), 2);
}

#[test]
fn one_bad_date_does_not_abort_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let transport = CannedTransport::new();
    let fetcher = fetcher_in(&transport, dir.path());

    let holiday = DateGranularity::Daily(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
    let good = DateGranularity::Annual(2021);
    let summary = fetcher.fetch_all(&[holiday, good], &NullProgress);

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.downloaded, 1);
    assert!(matches!(summary.errors[0].1, FetchError::InvalidDate(_)));
    assert!(matches!(
        fetcher.fetch_one(good).unwrap(),
        FetchOutcome::Skipped(_)
    ));
}
