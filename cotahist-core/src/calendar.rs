//! Trading-session calendar for the B3 exchange.
//!
//! Pure date logic: the fixed national-holiday table, the Gauss-type
//! Easter/Carnival computation, and the session-validity predicate used when
//! expanding daily date ranges. No IO, no network.

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

/// COTAHIST files exist from 1986 onward.
pub const FIRST_YEAR: i32 = 1986;

/// Computes the Carnival Tuesday and Easter Sunday for a year.
///
/// Gauss-type closed form with the (x=24, y=5) Gregorian constants used by
/// the exchange's era; Carnival is exactly 47 days before Easter.
pub fn easter_and_carnival(year: i32) -> (NaiveDate, NaiveDate) {
    let a = year % 19;
    let b = year % 4;
    let c = year % 7;
    let d = (19 * a + 24) % 30;
    let e = (2 * b + 4 * c + 6 * d + 5) % 7;

    let (month, day) = if d + e > 9 {
        (4, d + e - 9)
    } else {
        (3, d + e + 22)
    };

    // The formula always lands in March 22..=31 or April 1..=25.
    let easter = NaiveDate::from_ymd_opt(year, month, day as u32).unwrap();
    let carnival = easter - Duration::days(47);
    (carnival, easter)
}

/// The eight fixed-date Brazilian national holidays for a year.
///
/// Memoized per year for the lifetime of the process: range expansion checks
/// every candidate day of a scan against this set.
///
/// The moving closures (Carnival, Good Friday) are deliberately not part of
/// this set; see [`easter_and_carnival`] for computing them.
pub fn year_holidays(year: i32) -> [NaiveDate; 8] {
    static CACHE: OnceLock<Mutex<HashMap<i32, [NaiveDate; 8]>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut map = cache.lock().expect("holiday cache lock poisoned");
    *map.entry(year).or_insert_with(|| compute_year_holidays(year))
}

fn compute_year_holidays(year: i32) -> [NaiveDate; 8] {
    let d = |month, day| NaiveDate::from_ymd_opt(year, month, day).unwrap();
    [
        d(1, 1),   // Ano Novo
        d(4, 21),  // Tiradentes
        d(5, 1),   // Dia do Trabalhador
        d(9, 7),   // Independência
        d(10, 12), // Nossa Senhora Aparecida
        d(11, 2),  // Finados
        d(11, 15), // Proclamação da República
        d(12, 25), // Natal
    ]
}

/// True iff COTAHIST files can exist for the year: after 1985, not in the
/// future.
pub fn is_valid_year(year: i32) -> bool {
    year >= FIRST_YEAR && year <= Local::now().date_naive().year()
}

/// True iff `date` is a trading session: a weekday that is not a fixed
/// national holiday.
pub fn is_valid_session_day(date: NaiveDate) -> bool {
    match date.weekday() {
        Weekday::Sat | Weekday::Sun => return false,
        _ => {}
    }
    !year_holidays(date.year()).contains(&date)
}
