//! Trend result models

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Significant digits kept before rounding, enough to drop binary noise
const SIGNIFICANT_DIGITS: usize = 15;

/// Aggregated orders for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRow {
    /// Calendar day (YYYY-MM-DD)
    pub date: String,

    /// Number of matching orders
    pub orders: u64,

    /// Total revenue, rounded to cents
    pub revenue: f64,

    /// Revenue divided by orders, rounded to cents
    pub avg_order_value: f64,

    /// Hour of day with the most orders
    pub peak_order_hour: Option<u32>,
}

/// Total revenue for one restaurant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRestaurant {
    /// Restaurant identifier
    pub restaurant_id: i64,

    /// Total revenue, rounded to cents
    pub revenue: f64,
}

/// Response body of a trend query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    /// Daily rows, ascending by date
    pub daily: Vec<DailyRow>,

    /// Up to three restaurants, descending by revenue
    pub top3: Vec<RankedRestaurant>,
}

/// Round to two fractional digits, half away from zero
///
/// The value is first cut to 15 significant digits so that amounts such as
/// `1.005`, stored as `1.00499999...`, round as written.
pub fn round_cents(value: f64) -> f64 {
    let text = format!("{value:.prec$e}", prec = SIGNIFICANT_DIGITS - 1);
    Decimal::from_scientific(&text)
        .ok()
        .and_then(|d| {
            d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                .to_f64()
        })
        .unwrap_or_else(|| (value * 100.0).round() / 100.0)
}
