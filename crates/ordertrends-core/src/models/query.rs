//! Trend query parameters
//!
//! `TrendParams` is what arrives from the outside world (query string or CLI
//! flags): every field is an optional string. `TrendQuery` is the validated,
//! strongly typed form the engine works with.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Prefix for trend cache keys
pub const TREND_CACHE_PREFIX: &str = "ordertrends:metrics:";

/// Raw, unvalidated trend query parameters
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TrendParams {
    /// Restaurant id
    pub restaurant_id: Option<String>,
    /// First day, `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// Last day, `YYYY-MM-DD`
    pub end_date: Option<String>,
    /// Minimum order amount
    pub amount_min: Option<String>,
    /// Maximum order amount
    pub amount_max: Option<String>,
    /// First hour of day (0-23)
    pub hour_min: Option<String>,
    /// Last hour of day (0-23)
    pub hour_max: Option<String>,
}

/// Validated trend query; `None` means no constraint on that dimension
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendQuery {
    /// Only orders for this restaurant
    pub restaurant_id: Option<i64>,
    /// First calendar day (inclusive)
    pub start_date: Option<NaiveDate>,
    /// Last calendar day (inclusive)
    pub end_date: Option<NaiveDate>,
    /// Minimum order amount (inclusive)
    pub amount_min: Option<f64>,
    /// Maximum order amount (inclusive)
    pub amount_max: Option<f64>,
    /// First hour of day (inclusive)
    pub hour_min: Option<u32>,
    /// Last hour of day (inclusive)
    pub hour_max: Option<u32>,
}

impl TrendQuery {
    /// Parse and validate raw parameters
    pub fn parse(params: &TrendParams) -> Result<Self> {
        Ok(Self {
            restaurant_id: parse_field(params.restaurant_id.as_deref(), "restaurant_id")?,
            start_date: parse_date(params.start_date.as_deref(), "start_date")?,
            end_date: parse_date(params.end_date.as_deref(), "end_date")?,
            amount_min: parse_amount(params.amount_min.as_deref(), "amount_min")?,
            amount_max: parse_amount(params.amount_max.as_deref(), "amount_max")?,
            hour_min: parse_hour(params.hour_min.as_deref(), "hour_min")?,
            hour_max: parse_hour(params.hour_max.as_deref(), "hour_max")?,
        })
    }

    /// Canonical text form of every parameter, in a fixed order
    pub fn signature(&self) -> String {
        fn opt<T: ToString>(value: Option<T>) -> String {
            value.map(|v| v.to_string()).unwrap_or_default()
        }

        format!(
            "restaurant_id={}&start_date={}&end_date={}&amount_min={}&amount_max={}&hour_min={}&hour_max={}",
            opt(self.restaurant_id),
            opt(self.start_date.map(|d| d.format("%Y-%m-%d"))),
            opt(self.end_date.map(|d| d.format("%Y-%m-%d"))),
            opt(self.amount_min),
            opt(self.amount_max),
            opt(self.hour_min),
            opt(self.hour_max),
        )
    }

    /// Cache key derived from the query signature
    ///
    /// `scope` names whatever else the result depends on (time zone, dataset).
    pub fn cache_key(&self, scope: &str) -> String {
        let digest = Sha256::digest(format!("{scope}|{}", self.signature()).as_bytes());
        format!("{TREND_CACHE_PREFIX}{}", hex::encode(digest))
    }
}

/// Empty or whitespace-only values are treated as absent
pub(crate) fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

pub(crate) fn parse_field<T: FromStr>(raw: Option<&str>, name: &str) -> Result<Option<T>> {
    present(raw)
        .map(|s| {
            s.parse::<T>()
                .map_err(|_| Error::validation(format!("{name} must be an integer, got '{s}'")))
        })
        .transpose()
}

fn parse_date(raw: Option<&str>, name: &str) -> Result<Option<NaiveDate>> {
    present(raw)
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| Error::validation(format!("{name} must be a YYYY-MM-DD date, got '{s}'")))
        })
        .transpose()
}

fn parse_amount(raw: Option<&str>, name: &str) -> Result<Option<f64>> {
    present(raw)
        .map(|s| match s.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(Error::validation(format!("{name} must be a number, got '{s}'"))),
        })
        .transpose()
}

fn parse_hour(raw: Option<&str>, name: &str) -> Result<Option<u32>> {
    match parse_field::<u32>(raw, name)? {
        Some(hour) if hour > 23 => Err(Error::validation(format!(
            "{name} must be between 0 and 23, got {hour}"
        ))),
        other => Ok(other),
    }
}
