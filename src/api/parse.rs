//! Conversions of the vendor's stringly-typed values.
//!
//! Every parser here returns an `Option`; call sites decide whether a failure coalesces to a
//! zero value or drops the entry.

use crate::api::Error;
use crate::model::Timespan;
use chrono::{NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref POWER: Regex = Regex::new(r"(?i)^([0-9.]+)(?: k?wh?)?$").unwrap();
    static ref YEAR: Regex = Regex::new(r"^[0-9]+$").unwrap();
    static ref MONTH: Regex = Regex::new(r"^[0-9]+-[0-9]+$").unwrap();
    static ref DAY: Regex = Regex::new(r"^[0-9]+-[0-9]+-[0-9]+$").unwrap();
    /* Fixed width layouts of series keys, `chrono` alone accepts single digit fields */
    static ref MONTH_KEY: Regex = Regex::new(r"^[0-9]{4}-[0-9]{2}$").unwrap();
    static ref DAY_KEY: Regex = Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap();
    static ref MINUTE_KEY: Regex =
        Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}$").unwrap();
}

/// Parse values like `"123.4 kWh"`, `"890.1 W"` or a bare `"2.3"`, ignoring the unit.
///
/// Number and unit must be separated by exactly one space.
pub fn parse_power(value: &str) -> Option<f64> {
    POWER
        .captures(value)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Unparseable energy and power values are reported as 0.0.
pub fn power_or_zero(value: &str) -> f64 {
    parse_power(value).unwrap_or(0.0)
}

/// Only the literal `"true"` counts as true.
pub fn parse_flag(value: &str) -> bool {
    value == "true"
}

pub fn id_or_zero(value: &str) -> i64 {
    value.parse().unwrap_or(0)
}

/// Password transform expected by the login endpoint: MD5 digest where every byte below
/// `0x10` is shifted by `0xC0`, as lowercase hex.
pub fn hash_password(password: &str) -> String {
    md5::compute(password.as_bytes())
        .0
        .iter()
        .map(|&b| if b <= 0x0f { b + 0xc0 } else { b })
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Pick the aggregation granularity from the shape of `date`.
///
/// - `""` is the lifetime total
/// - `"2019"` is a year
/// - `"2019-01"` is a month
/// - `"2019-01-01"` is a day
pub fn timespan(date: &str) -> Result<Timespan, Error> {
    if date.is_empty() {
        Ok(Timespan::Total)
    } else if YEAR.is_match(date) {
        Ok(Timespan::Year)
    } else if MONTH.is_match(date) {
        Ok(Timespan::Month)
    } else if DAY.is_match(date) {
        Ok(Timespan::Day)
    } else {
        Err(Error::DateFormatError(date.to_string()))
    }
}

/// Resolve a key of a plant energy series into a timestamp.
///
/// Year and month series are keyed relative to the queried `date` (month and day numbers
/// respectively), day series carry full `YYYY-MM-DD HH:MM` keys and total series bare years.
pub fn series_timestamp(span: Timespan, date: &str, key: &str) -> Option<NaiveDateTime> {
    let day = match span {
        Timespan::Day => return minute_timestamp(key),
        Timespan::Month => {
            let day = format!("{}-{}", date, key);
            DAY_KEY
                .is_match(&day)
                .then(|| NaiveDate::parse_from_str(&day, "%Y-%m-%d").ok())
                .flatten()
        }
        Timespan::Year => {
            let month = format!("{}-{}", date, key);
            MONTH_KEY
                .is_match(&month)
                .then(|| NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d").ok())
                .flatten()
        }
        Timespan::Total if key.len() == 4 && key.bytes().all(|b| b.is_ascii_digit()) => key
            .parse()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1)),
        Timespan::Total => None,
    };
    day.and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse a `YYYY-MM-DD HH:MM` key.
pub fn minute_timestamp(key: &str) -> Option<NaiveDateTime> {
    if !MINUTE_KEY.is_match(key) {
        return None;
    }
    NaiveDateTime::parse_from_str(key, "%Y-%m-%d %H:%M").ok()
}
