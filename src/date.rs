//! Release date parsing for catalog entries.

use once_cell::sync::Lazy;
use regex::Regex;

/// "<day> <MonthName>, <year>", e.g. "05 January, 1999".
pub static RELEASE_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,2})\s+([a-z]+)\.?,?\s+(\d{4})\s*$").unwrap()
});

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Month number (1-12) for a full or three-letter English month name.
fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == name || (name.len() == 3 && m.starts_with(&name)))
        .map(|i| i as u32 + 1)
}

/// Convert catalog release date text to `YYYY-MM-DD`.
/// Returns None when the text doesn't look like a day-month-year date;
/// many catalog entries simply have no usable date.
pub fn parse_release_date(text: &str) -> Option<String> {
    let caps = RELEASE_DATE.captures(text)?;
    let day: u32 = caps[1].parse().ok()?;
    let month = month_number(&caps[2])?;
    let year = &caps[3];

    if !(1..=31).contains(&day) {
        return None;
    }

    Some(format!("{}-{:02}-{:02}", year, month, day))
}
