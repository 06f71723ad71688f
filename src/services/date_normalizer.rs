use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::models::register::RawCell;

const SPREADSHEET_EPOCH: (i32, u32, u32) = (1899, 12, 30);
/// Serial of 9999-12-31 in the 1899-12-30 epoch.
const MAX_SPREADSHEET_SERIAL: f64 = 2_958_465.0;
const MIN_TEXT_YEAR: i32 = 1900;
const MAX_TEXT_YEAR: i32 = 2200;
const TWO_DIGIT_YEAR_PIVOT: i32 = 69;

const DEFAULT_SENTINELS: [&str; 11] = [
    "", "0-jan-00", "00-jan-00", "nan", "nat", "none", "null", "n/a", "na", "-", "--",
];

/// Explicit layouts, tried in this order. Slash dates try day-first before
/// month-first. Dash-separated numeric dates have only the month-first
/// `%m-%d-%Y` layout.
pub const EXPLICIT_FORMATS: [&str; 15] = [
    "%d-%b-%y",
    "%d-%B-%y",
    "%d-%b-%Y",
    "%d-%B-%Y",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d.%m.%Y",
    "%Y%m%d",
    "%m-%d-%Y",
    "%d %b %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const MONTH_NAMES: [&str; 12] = [
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

static HASH_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#+$").expect("static regex"));
static SHORT_MONTH_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}-[A-Za-z]{3}-\d{2}$").expect("static regex"));
static NUMERIC_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d+(\.\d+)?$").expect("static regex"));
static DATE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z]+|\d+").expect("static regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOutcome {
    Parsed(NaiveDate),
    /// Blank, sentinel placeholder or spreadsheet zero date.
    Missing,
    /// Looked like a value but no rule could read it.
    Unparseable,
}

impl DateOutcome {
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            DateOutcome::Parsed(date) => Some(date),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DateOutcome::Parsed(_) => "parsed",
            DateOutcome::Missing => "missing",
            DateOutcome::Unparseable => "unparseable",
        }
    }
}

/// Converts heterogeneous spreadsheet cells into canonical dates.
///
/// One instance must serve every date field of a run so actual and expected
/// dates are read by the same rules.
#[derive(Debug, Clone)]
pub struct DateNormalizer {
    sentinels: Vec<String>,
    epoch: NaiveDate,
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl DateNormalizer {
    pub fn new(extra_sentinels: &[String]) -> Self {
        let mut sentinels: Vec<String> =
            DEFAULT_SENTINELS.iter().map(|value| value.to_string()).collect();
        for extra in extra_sentinels {
            let normalized = extra.trim().to_lowercase();
            if !sentinels.contains(&normalized) {
                sentinels.push(normalized);
            }
        }

        let (year, month, day) = SPREADSHEET_EPOCH;
        Self {
            sentinels,
            epoch: NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default(),
        }
    }

    pub fn normalize(&self, raw: &RawCell) -> Option<NaiveDate> {
        self.classify(raw).date()
    }

    pub fn normalize_all(&self, cells: &[RawCell]) -> Vec<Option<NaiveDate>> {
        cells.iter().map(|cell| self.normalize(cell)).collect()
    }

    pub fn classify(&self, raw: &RawCell) -> DateOutcome {
        match raw {
            RawCell::Missing => DateOutcome::Missing,
            RawCell::Bool(_) => DateOutcome::Unparseable,
            RawCell::Number(serial) => self.from_serial(*serial),
            RawCell::Date(date) => DateOutcome::Parsed(*date),
            RawCell::DateTime(value) => DateOutcome::Parsed(value.date()),
            RawCell::Text(text) => self.classify_text(text),
        }
    }

    pub fn is_sentinel(&self, raw: &str) -> bool {
        let trimmed = raw.trim();
        if HASH_RUN.is_match(trimmed) {
            return true;
        }
        let lowered = trimmed.to_lowercase();
        self.sentinels.iter().any(|sentinel| *sentinel == lowered)
    }

    pub fn classify_text(&self, raw: &str) -> DateOutcome {
        let trimmed = raw.trim();
        if self.is_sentinel(trimmed) {
            return DateOutcome::Missing;
        }

        let canonical = normalize_case(trimmed);

        if SHORT_MONTH_DATE.is_match(&canonical) {
            if let Some(date) = parse_plausible(&canonical, "%d-%b-%y") {
                return DateOutcome::Parsed(date);
            }
        }

        for format in EXPLICIT_FORMATS {
            if let Some(date) = parse_plausible(&canonical, format) {
                return DateOutcome::Parsed(date);
            }
        }

        if let Some(date) = parse_datetime_text(&canonical) {
            return DateOutcome::Parsed(date);
        }

        if let Some(date) = parse_tokens(&canonical) {
            return DateOutcome::Parsed(date);
        }

        if NUMERIC_TEXT.is_match(&canonical) {
            if let Ok(serial) = canonical.parse::<f64>() {
                return self.from_serial(serial);
            }
        }

        debug!(target: "app::dates", raw = %trimmed, "date value could not be parsed");
        DateOutcome::Unparseable
    }

    fn from_serial(&self, serial: f64) -> DateOutcome {
        if !serial.is_finite() || serial <= 0.0 {
            return DateOutcome::Missing;
        }
        if serial > MAX_SPREADSHEET_SERIAL {
            return DateOutcome::Unparseable;
        }

        Duration::try_days(serial.floor() as i64)
            .and_then(|offset| self.epoch.checked_add_signed(offset))
            .map(DateOutcome::Parsed)
            .unwrap_or(DateOutcome::Unparseable)
    }
}

/// Title-cases alphabetic runs so month names compare in a single case.
fn normalize_case(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len());
    let mut previous_alphabetic = false;
    for ch in raw.chars() {
        if ch.is_alphabetic() {
            if previous_alphabetic {
                normalized.extend(ch.to_lowercase());
            } else {
                normalized.extend(ch.to_uppercase());
            }
            previous_alphabetic = true;
        } else {
            normalized.push(ch);
            previous_alphabetic = false;
        }
    }
    normalized
}

/// Year window applied to text input and to derived planned dates.
pub fn plausible_year(date: &NaiveDate) -> bool {
    (MIN_TEXT_YEAR..=MAX_TEXT_YEAR).contains(&date.year())
}

fn parse_plausible(text: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, format)
        .ok()
        .filter(plausible_year)
}

fn parse_datetime_text(text: &str) -> Option<NaiveDate> {
    if let Ok(value) = DateTime::parse_from_rfc3339(text) {
        return Some(value.date_naive()).filter(plausible_year);
    }

    DATETIME_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(text, format)
            .ok()
            .map(|value| value.date())
            .filter(plausible_year)
    })
}

/// Heuristic reading of three date tokens.
///
/// A four-digit first token means year-first; otherwise the order is
/// day-month-year, swapped to month-day only when the day-first reading
/// cannot be a date.
fn parse_tokens(text: &str) -> Option<NaiveDate> {
    let tokens: Vec<&str> = DATE_TOKEN.find_iter(text).map(|m| m.as_str()).collect();
    if tokens.len() != 3 {
        return None;
    }

    let alphabetic: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| token.chars().all(|ch| ch.is_ascii_alphabetic()))
        .map(|(index, _)| index)
        .collect();

    match alphabetic.as_slice() {
        [] => {
            if tokens[0].len() == 4 {
                let year = expand_year(tokens[0])?;
                let month = tokens[1].parse().ok()?;
                let day = tokens[2].parse().ok()?;
                checked_date(year, month, day)
            } else {
                let day: u32 = tokens[0].parse().ok()?;
                let month: u32 = tokens[1].parse().ok()?;
                let year = expand_year(tokens[2])?;
                checked_date(year, month, day).or_else(|| {
                    if month > 12 && day <= 12 {
                        checked_date(year, day, month)
                    } else {
                        None
                    }
                })
            }
        }
        [month_index] => {
            let month = month_from_name(tokens[*month_index])?;
            let numbers: Vec<&str> = tokens
                .iter()
                .enumerate()
                .filter(|(index, _)| index != month_index)
                .map(|(_, token)| *token)
                .collect();
            let (day_token, year_token) = if numbers[0].len() == 4 {
                (numbers[1], numbers[0])
            } else {
                (numbers[0], numbers[1])
            };
            let day: u32 = day_token.parse().ok()?;
            let year = expand_year(year_token)?;
            checked_date(year, month, day)
        }
        _ => None,
    }
}

fn expand_year(token: &str) -> Option<i32> {
    let value: i32 = token.parse().ok()?;
    match token.len() {
        4 => Some(value),
        1 | 2 if value < TWO_DIGIT_YEAR_PIVOT => Some(2000 + value),
        1 | 2 => Some(1900 + value),
        _ => None,
    }
}

fn month_from_name(token: &str) -> Option<u32> {
    let lowered = token.to_lowercase();
    if lowered.len() < 3 {
        return None;
    }
    if lowered == "sept" {
        return Some(9);
    }
    MONTH_NAMES
        .iter()
        .position(|name| name.starts_with(&lowered))
        .map(|index| index as u32 + 1)
}

fn checked_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).filter(plausible_year)
}
