//! Immutable dataset snapshot
//!
//! Restaurants and orders are loaded once, every order timestamp is
//! normalized up front, and the result is shared read-only between requests.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::config::DataConfig;
use crate::engine::TimeNormalizer;
use crate::error::{Error, Result};
use crate::models::{Order, Restaurant, TimedOrder};

/// Restaurants plus normalized orders
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    restaurants: Vec<Restaurant>,
    orders: Vec<TimedOrder>,
    span: Option<(DateTime<Utc>, DateTime<Utc>)>,
    fingerprint: String,
}

impl Dataset {
    /// Build a snapshot, normalizing every order timestamp
    ///
    /// An unparseable `order_time` aborts the whole load: the dataset is a
    /// trusted source, so a bad record means a bad file.
    pub fn new(
        restaurants: Vec<Restaurant>,
        orders: Vec<Order>,
        normalizer: &TimeNormalizer,
    ) -> Result<Self> {
        let orders = orders
            .into_iter()
            .enumerate()
            .map(|(index, order)| {
                let instant = normalizer
                    .parse_instant(&order.order_time)
                    .map_err(|e| match e {
                        Error::Parse { input, reason } => {
                            Error::parse(input, format!("order #{index}: {reason}"))
                        }
                        other => other,
                    })?;
                Ok(TimedOrder {
                    day: normalizer.calendar_day(instant),
                    hour: normalizer.hour_of_day(instant),
                    instant,
                    order,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let earliest = orders.iter().map(|o| o.instant).min();
        let latest = orders.iter().map(|o| o.instant).max();

        Ok(Self {
            fingerprint: fingerprint(&orders),
            restaurants,
            orders,
            span: earliest.zip(latest),
        })
    }

    /// Load both collections from the configured JSON files
    pub fn load(config: &DataConfig, normalizer: &TimeNormalizer) -> Result<Self> {
        let restaurants: Vec<Restaurant> = read_json(&config.restaurants_path)?;
        let orders: Vec<Order> = read_json(&config.orders_path)?;

        let dataset = Self::new(restaurants, orders, normalizer).map_err(|e| match e {
            Error::Parse { .. } => Error::dataset(&config.orders_path, e.to_string()),
            other => other,
        })?;

        info!(
            restaurants = dataset.restaurants.len(),
            orders = dataset.orders.len(),
            timezone = normalizer.timezone().name(),
            "Dataset loaded"
        );

        Ok(dataset)
    }

    /// All restaurants, in file order
    pub fn restaurants(&self) -> &[Restaurant] {
        &self.restaurants
    }

    /// All orders, in file order
    pub fn orders(&self) -> &[TimedOrder] {
        &self.orders
    }

    /// Look up a restaurant by id
    pub fn restaurant(&self, id: i64) -> Option<&Restaurant> {
        self.restaurants.iter().find(|r| r.id == id)
    }

    /// Earliest and latest order instants, if there are any orders
    pub fn time_span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.span
    }

    /// Short digest of the order log
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

fn fingerprint(orders: &[TimedOrder]) -> String {
    let mut hasher = Sha256::new();
    for timed in orders {
        hasher.update(timed.restaurant_id().to_le_bytes());
        hasher.update(timed.amount().to_bits().to_le_bytes());
        hasher.update(timed.instant.timestamp_micros().to_le_bytes());
    }
    hex::encode(&hasher.finalize()[..8])
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).map_err(|e| Error::dataset(path, e.to_string()))?;
    serde_json::from_str(&raw).map_err(|e| Error::dataset(path, e.to_string()))
}
