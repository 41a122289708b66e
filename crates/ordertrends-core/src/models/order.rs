//! Dataset records

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A restaurant from the directory dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    /// Restaurant identifier
    pub id: i64,

    /// Display name
    pub name: String,

    /// Cuisine (e.g., "Italian")
    pub cuisine: String,

    /// City or neighbourhood
    pub location: String,
}

/// A raw order as stored in the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Restaurant that received the order
    pub restaurant_id: i64,

    /// Order total
    pub order_amount: f64,

    /// When the order was placed, in any supported timestamp format
    pub order_time: String,
}

/// An order whose timestamp has been normalized
///
/// Day and hour are derived once at load time in the engine's time zone, so
/// filtering, grouping and peak-hour extraction all agree on them.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedOrder {
    /// The source record
    pub order: Order,

    /// Normalized instant
    pub instant: DateTime<Utc>,

    /// Calendar day in the configured zone
    pub day: NaiveDate,

    /// Hour of day (0-23) in the configured zone
    pub hour: u32,
}

impl TimedOrder {
    /// Restaurant that received the order
    pub fn restaurant_id(&self) -> i64 {
        self.order.restaurant_id
    }

    /// Order total
    pub fn amount(&self) -> f64 {
        self.order.order_amount
    }
}
