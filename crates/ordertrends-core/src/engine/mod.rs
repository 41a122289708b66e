//! Order-trend engine
//!
//! Turns the order log plus a `TrendQuery` into daily trend rows and the
//! top restaurants by revenue. Everything here is synchronous and pure: the
//! engine only reads its dataset snapshot, so one instance can serve any
//! number of concurrent requests.

mod daily;
mod filter;
mod ranking;
mod time;

pub use daily::aggregate_daily;
pub use filter::OrderFilter;
pub use ranking::rank_by_revenue;
pub use time::TimeNormalizer;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::models::{TrendQuery, TrendResult};

/// Number of restaurants returned in `top3`
pub const TOP_RESTAURANTS: usize = 3;

/// Computes trends over an injected dataset snapshot
#[derive(Debug, Clone)]
pub struct TrendEngine {
    dataset: Arc<Dataset>,
    normalizer: TimeNormalizer,
}

impl TrendEngine {
    /// Create an engine over a dataset snapshot
    pub fn new(dataset: Arc<Dataset>, normalizer: TimeNormalizer) -> Self {
        Self {
            dataset,
            normalizer,
        }
    }

    /// The dataset this engine reads
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The time normalizer shared with the dataset
    pub fn normalizer(&self) -> &TimeNormalizer {
        &self.normalizer
    }

    /// Compute daily trends and top restaurants for a query
    pub fn compute(&self, query: &TrendQuery) -> Result<TrendResult> {
        compute_trends(&self.dataset, query, &self.normalizer)
    }

    /// Identifies everything besides the query that shapes a result
    ///
    /// Engines over different data or time zones never share cache entries.
    pub fn cache_scope(&self) -> String {
        format!(
            "{}:{}",
            self.normalizer.timezone().name(),
            self.dataset.fingerprint()
        )
    }
}

/// Compute trends over a dataset snapshot
///
/// A missing `start_date` or `end_date` defaults to the first or last calendar
/// day of the whole order log, regardless of the other filters. With no
/// orders there is nothing to infer from, which is an error.
pub fn compute_trends(
    dataset: &Dataset,
    query: &TrendQuery,
    normalizer: &TimeNormalizer,
) -> Result<TrendResult> {
    let orders = dataset.orders();
    let query = with_default_range(query, dataset.time_span(), normalizer)?;

    let filtered = OrderFilter::new(&query, normalizer).apply(orders);
    let daily = aggregate_daily(filtered.iter().copied());
    let mut top3 = rank_by_revenue(filtered.iter().copied());
    top3.truncate(TOP_RESTAURANTS);

    debug!(
        matched = filtered.len(),
        total = orders.len(),
        days = daily.len(),
        "Computed trends"
    );

    Ok(TrendResult { daily, top3 })
}

fn with_default_range(
    query: &TrendQuery,
    span: Option<(DateTime<Utc>, DateTime<Utc>)>,
    normalizer: &TimeNormalizer,
) -> Result<TrendQuery> {
    let mut resolved = query.clone();
    if resolved.start_date.is_some() && resolved.end_date.is_some() {
        return Ok(resolved);
    }

    let (earliest, latest) = span.ok_or(Error::NoData)?;

    resolved
        .start_date
        .get_or_insert_with(|| normalizer.calendar_day(earliest));
    resolved
        .end_date
        .get_or_insert_with(|| normalizer.calendar_day(latest));
    Ok(resolved)
}
