//! Fixed-width record decoding.
//!
//! Decoding is a pure function of (lines, layout): no network, no
//! filesystem. [`read_archive`] is the thin bridge that pulls the lines out
//! of a cached `.zip` before delegating here.

use std::fs;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;

use super::layout::{FieldKind, RecordLayout};

/// One decoded field value. Malformed numeric and date content degrades to
/// the `None` sentinel, never to an error: one corrupt cell must not discard
/// an otherwise-valid row.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(Option<i64>),
    Price(Option<f64>),
    Date(Option<NaiveDate>),
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Integer(Some(v)) => write!(f, "{v}"),
            FieldValue::Price(Some(v)) => write!(f, "{v:.2}"),
            FieldValue::Date(Some(d)) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Integer(None) | FieldValue::Price(None) => write!(f, "NaN"),
            FieldValue::Date(None) => write!(f, "-"),
        }
    }
}

/// One data record: field name to typed value, in layout order.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRow {
    values: Vec<(&'static str, FieldValue)>,
}

impl DecodedRow {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.values.iter().map(|(name, value)| (*name, value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Decodes fixed-width lines into typed rows.
///
/// The first line (file header record) and last line (file trailer record)
/// are metadata, not data, and are skipped unconditionally. Lines shorter
/// than a field's range yield empty slices, which decode to sentinels.
pub fn decode_lines<I>(lines: I, layout: &RecordLayout) -> Vec<DecodedRow>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let lines: Vec<_> = lines.into_iter().collect();
    if lines.len() < 3 {
        return Vec::new();
    }

    lines[1..lines.len() - 1]
        .iter()
        .map(|line| decode_line(line.as_ref(), layout))
        .collect()
}

fn decode_line(line: &str, layout: &RecordLayout) -> DecodedRow {
    let chars: Vec<char> = line.chars().collect();
    let values = layout
        .fields()
        .iter()
        .map(|field| {
            let first = (field.first - 1).min(chars.len());
            let last = field.last.min(chars.len());
            let raw: String = chars[first..last].iter().collect();
            (field.name, decode_field(&raw, field.kind))
        })
        .collect();
    DecodedRow { values }
}

fn decode_field(raw: &str, kind: FieldKind) -> FieldValue {
    match kind {
        FieldKind::Text => FieldValue::Text(normalize_text(raw)),
        FieldKind::Integer => FieldValue::Integer(parse_integer(raw)),
        FieldKind::Price { decimals } => {
            FieldValue::Price(parse_integer(raw).map(|v| v as f64 / 10f64.powi(decimals as i32)))
        }
        FieldKind::Date => FieldValue::Date(parse_yyyymmdd(raw)),
    }
}

/// Right padding trimmed; any interior run of two or more spaces collapsed
/// to one.
fn normalize_text(raw: &str) -> String {
    let trimmed = raw.trim_end();
    let mut out = String::with_capacity(trimmed.len());
    let mut last_was_space = false;
    for c in trimmed.chars() {
        if c == ' ' {
            if !last_was_space {
                out.push(c);
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    out
}

fn parse_integer(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// `YYYYMMDD`; the exchange writes `00000000` for "no date".
fn parse_yyyymmdd(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.chars().all(|c| c == '0') {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y%m%d").ok()
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("expected a single file in the archive, found {0}")]
    UnexpectedArchiveLayout(usize),
}

/// Opens a cached archive, decodes the single fixed-width file inside it.
///
/// COTAHIST files are Latin-1: one byte per column, mapped 1:1 to chars.
pub fn read_archive(path: &Path, layout: &RecordLayout) -> Result<Vec<DecodedRow>, DecodeError> {
    let file = fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    if archive.len() != 1 {
        return Err(DecodeError::UnexpectedArchiveLayout(archive.len()));
    }

    let mut inner = archive.by_index(0)?;
    let mut bytes = Vec::new();
    inner.read_to_end(&mut bytes)?;

    let text: String = bytes.iter().map(|&b| b as char).collect();
    Ok(decode_lines(text.lines(), layout))
}
