//! Date-granularity values and the date-expression grammar.
//!
//! A date expression names the file(s) to fetch: a bare `YYYY`, `YYYY-MM` or
//! `YYYY-MM-DD`, the keywords `today`/`yesterday`, or a `start:end` range at
//! one of the three granularities. Ranges at daily granularity are filtered
//! through the trading calendar; closed days are silently skipped.

use crate::calendar;
use chrono::{Datelike, Duration, FixedOffset, NaiveDate, Utc};
use std::fmt;
use thiserror::Error;

/// One resolvable COTAHIST file: a whole year, a month, or a single session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DateGranularity {
    Annual(i32),
    Monthly { year: i32, month: u32 },
    Daily(NaiveDate),
}

impl DateGranularity {
    /// Year component, whichever the shape.
    pub fn year(&self) -> i32 {
        match *self {
            DateGranularity::Annual(year) => year,
            DateGranularity::Monthly { year, .. } => year,
            DateGranularity::Daily(date) => date.year(),
        }
    }

    /// Zero-padded digits used in cache file names: `2021`, `202101`,
    /// `20210104`.
    pub fn date_digits(&self) -> String {
        match *self {
            DateGranularity::Annual(year) => format!("{year}"),
            DateGranularity::Monthly { year, month } => format!("{year}{month:02}"),
            DateGranularity::Daily(date) => date.format("%Y%m%d").to_string(),
        }
    }
}

impl fmt::Display for DateGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            DateGranularity::Annual(year) => write!(f, "{year}"),
            DateGranularity::Monthly { year, month } => write!(f, "{year}-{month:02}"),
            DateGranularity::Daily(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateExprError {
    #[error("unrecognized date expression '{0}'")]
    Unrecognized(String),

    #[error("range endpoints have different granularities in '{0}'")]
    MixedRange(String),

    #[error("'{0}' is not a valid calendar date")]
    InvalidDate(String),
}

/// The exchange's local timezone (UTC-3), used to resolve `today` and
/// `yesterday`.
fn exchange_today() -> NaiveDate {
    let offset = FixedOffset::west_opt(3 * 3600).unwrap();
    Utc::now().with_timezone(&offset).date_naive()
}

/// Expands a date expression into an ordered sequence of granularity values.
///
/// Unrecognized expressions and mixed-granularity ranges are errors rather
/// than an empty result; only daily *ranges* are filtered by the trading
/// calendar — a bare `YYYY-MM-DD` is returned as written.
pub fn expand(expr: &str) -> Result<Vec<DateGranularity>, DateExprError> {
    match expr {
        "today" => return Ok(vec![DateGranularity::Daily(exchange_today())]),
        "yesterday" => {
            return Ok(vec![DateGranularity::Daily(
                exchange_today() - Duration::days(1),
            )]);
        }
        _ => {}
    }

    if expr.contains(':') {
        return expand_range(expr);
    }

    parse_single(expr).map(|g| vec![g])
}

fn expand_range(expr: &str) -> Result<Vec<DateGranularity>, DateExprError> {
    let (a, b) = expr
        .split_once(':')
        .ok_or_else(|| DateExprError::Unrecognized(expr.to_string()))?;
    if a.is_empty() || b.is_empty() || b.contains(':') {
        return Err(DateExprError::Unrecognized(expr.to_string()));
    }

    // Lexicographic sort; for same-width digit strings this is chronological.
    let (start, end) = if a <= b { (a, b) } else { (b, a) };

    match (parse_single(start)?, parse_single(end)?) {
        (DateGranularity::Annual(sy), DateGranularity::Annual(ey)) => {
            Ok((sy..=ey).map(DateGranularity::Annual).collect())
        }
        (
            DateGranularity::Monthly {
                year: sy,
                month: sm,
            },
            DateGranularity::Monthly {
                year: ey,
                month: em,
            },
        ) => Ok(month_range(sy, sm, ey, em)),
        (DateGranularity::Daily(start), DateGranularity::Daily(end)) => {
            Ok(session_range(start, end))
        }
        _ => Err(DateExprError::MixedRange(expr.to_string())),
    }
}

fn month_range(start_year: i32, start_month: u32, end_year: i32, end_month: u32) -> Vec<DateGranularity> {
    let mut out = Vec::new();
    for year in start_year..=end_year {
        for month in 1..=12 {
            if year == start_year && month < start_month {
                continue;
            }
            if year == end_year && month > end_month {
                continue;
            }
            out.push(DateGranularity::Monthly { year, month });
        }
    }
    out
}

/// Every valid trading session in `[start, end]`, ascending. Weekends and
/// fixed holidays are skipped, not reported.
fn session_range(start: NaiveDate, end: NaiveDate) -> Vec<DateGranularity> {
    let mut out = Vec::new();
    let mut date = start;
    while date <= end {
        if calendar::is_valid_session_day(date) {
            out.push(DateGranularity::Daily(date));
        }
        date += Duration::days(1);
    }
    out
}

/// Parses a bare `YYYY`, `YYYY-MM`, or `YYYY-MM-DD`.
fn parse_single(s: &str) -> Result<DateGranularity, DateExprError> {
    let unrecognized = || DateExprError::Unrecognized(s.to_string());

    match s.len() {
        4 => {
            let year = parse_digits(s).ok_or_else(unrecognized)?;
            Ok(DateGranularity::Annual(year))
        }
        7 => {
            let (y, m) = s.split_once('-').ok_or_else(unrecognized)?;
            let year = parse_digits4(y).ok_or_else(unrecognized)?;
            let month = parse_digits2(m).ok_or_else(unrecognized)?;
            if !(1..=12).contains(&month) {
                return Err(DateExprError::InvalidDate(s.to_string()));
            }
            Ok(DateGranularity::Monthly { year, month })
        }
        10 => {
            let mut parts = s.split('-');
            let year = parts.next().and_then(parse_digits4).ok_or_else(unrecognized)?;
            let month = parts.next().and_then(parse_digits2).ok_or_else(unrecognized)?;
            let day = parts.next().and_then(parse_digits2).ok_or_else(unrecognized)?;
            if parts.next().is_some() {
                return Err(unrecognized());
            }
            let date = NaiveDate::from_ymd_opt(year, month, day)
                .ok_or_else(|| DateExprError::InvalidDate(s.to_string()))?;
            Ok(DateGranularity::Daily(date))
        }
        _ => Err(unrecognized()),
    }
}

fn parse_digits(s: &str) -> Option<i32> {
    if s.chars().all(|c| c.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

fn parse_digits4(s: &str) -> Option<i32> {
    if s.len() == 4 {
        parse_digits(s)
    } else {
        None
    }
}

fn parse_digits2(s: &str) -> Option<u32> {
    if s.len() == 2 && s.chars().all(|c| c.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn single_year_month_day() {
        assert_eq!(expand("2021").unwrap(), vec![DateGranularity::Annual(2021)]);
        assert_eq!(
            expand("2021-03").unwrap(),
            vec![DateGranularity::Monthly { year: 2021, month: 3 }]
        );
        assert_eq!(
            expand("2021-03-15").unwrap(),
            vec![DateGranularity::Daily(ymd(2021, 3, 15))]
        );
    }

    #[test]
    fn single_daily_is_not_calendar_filtered() {
        // 2021-01-01 is a holiday, but only ranges filter.
        assert_eq!(
            expand("2021-01-01").unwrap(),
            vec![DateGranularity::Daily(ymd(2021, 1, 1))]
        );
    }

    #[test]
    fn yearly_range() {
        assert_eq!(
            expand("2020:2021").unwrap(),
            vec![DateGranularity::Annual(2020), DateGranularity::Annual(2021)]
        );
    }

    #[test]
    fn monthly_range() {
        assert_eq!(
            expand("2020-01:2020-03").unwrap(),
            vec![
                DateGranularity::Monthly { year: 2020, month: 1 },
                DateGranularity::Monthly { year: 2020, month: 2 },
                DateGranularity::Monthly { year: 2020, month: 3 },
            ]
        );
    }

    #[test]
    fn monthly_range_across_years() {
        assert_eq!(
            expand("2020-11:2021-02").unwrap(),
            vec![
                DateGranularity::Monthly { year: 2020, month: 11 },
                DateGranularity::Monthly { year: 2020, month: 12 },
                DateGranularity::Monthly { year: 2021, month: 1 },
                DateGranularity::Monthly { year: 2021, month: 2 },
            ]
        );
    }

    #[test]
    fn daily_range_skips_weekends_and_holidays() {
        // 2021-01-01 is a Friday holiday; Jan 2/3 and 9/10 are weekends.
        let expanded = expand("2021-01-01:2021-01-10").unwrap();
        let expected: Vec<_> = [4, 5, 6, 7, 8]
            .into_iter()
            .map(|d| DateGranularity::Daily(ymd(2021, 1, d)))
            .collect();
        assert_eq!(expanded, expected);
    }

    #[test]
    fn range_endpoints_are_sorted() {
        assert_eq!(
            expand("2021:2020").unwrap(),
            vec![DateGranularity::Annual(2020), DateGranularity::Annual(2021)]
        );
    }

    #[test]
    fn mixed_granularity_range_is_an_error() {
        assert!(matches!(
            expand("2020:2020-03"),
            Err(DateExprError::MixedRange(_))
        ));
    }

    #[test]
    fn unrecognized_expressions_are_errors() {
        for expr in ["", "garbage", "20-01", "2021-1", "2021/01/01", "2020::2021"] {
            assert!(matches!(
                expand(expr),
                Err(DateExprError::Unrecognized(_))
            ), "expected Unrecognized for {expr:?}");
        }
    }

    #[test]
    fn impossible_dates_are_errors() {
        assert!(matches!(
            expand("2021-02-30"),
            Err(DateExprError::InvalidDate(_))
        ));
        assert!(matches!(
            expand("2021-13"),
            Err(DateExprError::InvalidDate(_))
        ));
    }

    #[test]
    fn today_and_yesterday_resolve_to_single_days() {
        let today = expand("today").unwrap();
        let yesterday = expand("yesterday").unwrap();
        assert_eq!(today.len(), 1);
        assert_eq!(yesterday.len(), 1);

        // Real calendar subtraction: the pair is always one day apart, even
        // across month and year boundaries.
        match (&today[0], &yesterday[0]) {
            (DateGranularity::Daily(t), DateGranularity::Daily(y)) => {
                assert_eq!(*t - *y, Duration::days(1));
            }
            other => panic!("expected daily values, got {other:?}"),
        }
    }

    #[test]
    fn date_digits_shapes() {
        assert_eq!(DateGranularity::Annual(2021).date_digits(), "2021");
        assert_eq!(
            DateGranularity::Monthly { year: 2021, month: 4 }.date_digits(),
            "202104"
        );
        assert_eq!(
            DateGranularity::Daily(ymd(2021, 4, 5)).date_digits(),
            "20210405"
        );
    }
}
