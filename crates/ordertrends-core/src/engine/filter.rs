//! Order filtering
//!
//! All predicates are optional and AND-combined. Inverted ranges
//! (`min > max`) select nothing; there is no wraparound.

use chrono::{DateTime, Utc};

use crate::models::{TimedOrder, TrendQuery};

use super::time::TimeNormalizer;

/// A trend query with its date bounds resolved to instants
#[derive(Debug, Clone, PartialEq)]
pub struct OrderFilter {
    restaurant_id: Option<i64>,
    from: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
    amount_min: Option<f64>,
    amount_max: Option<f64>,
    hour_min: Option<u32>,
    hour_max: Option<u32>,
    empty: bool,
}

impl OrderFilter {
    /// Build a filter from a query
    pub fn new(query: &TrendQuery, normalizer: &TimeNormalizer) -> Self {
        let inverted = matches!((query.start_date, query.end_date), (Some(s), Some(e)) if s > e)
            || matches!((query.amount_min, query.amount_max), (Some(lo), Some(hi)) if lo > hi)
            || matches!((query.hour_min, query.hour_max), (Some(lo), Some(hi)) if lo > hi);

        Self {
            restaurant_id: query.restaurant_id,
            from: query.start_date.map(|d| normalizer.day_start(d)),
            until: query.end_date.map(|d| normalizer.day_end(d)),
            amount_min: query.amount_min,
            amount_max: query.amount_max,
            hour_min: query.hour_min,
            hour_max: query.hour_max,
            empty: inverted,
        }
    }

    /// Whether the filter can never match anything
    pub fn is_empty_range(&self) -> bool {
        self.empty
    }

    /// Check a single order against every predicate
    pub fn matches(&self, order: &TimedOrder) -> bool {
        if self.empty {
            return false;
        }
        if self.from.is_some_and(|from| order.instant < from) {
            return false;
        }
        if self.until.is_some_and(|until| order.instant > until) {
            return false;
        }
        if self.restaurant_id.is_some_and(|id| order.restaurant_id() != id) {
            return false;
        }
        if self.amount_min.is_some_and(|min| order.amount() < min) {
            return false;
        }
        if self.amount_max.is_some_and(|max| order.amount() > max) {
            return false;
        }
        if self.hour_min.is_some_and(|min| order.hour < min) {
            return false;
        }
        if self.hour_max.is_some_and(|max| order.hour > max) {
            return false;
        }
        true
    }

    /// Select matching orders, preserving input order
    pub fn apply<'a>(&self, orders: &'a [TimedOrder]) -> Vec<&'a TimedOrder> {
        if self.empty {
            return Vec::new();
        }
        orders.iter().filter(|o| self.matches(o)).collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::Order;
    use chrono::NaiveDate;
    use rstest::rstest;

    pub(crate) fn timed(normalizer: &TimeNormalizer, rid: i64, amount: f64, time: &str) -> TimedOrder {
        let instant = normalizer.parse_instant(time).unwrap();
        TimedOrder {
            order: Order {
                restaurant_id: rid,
                order_amount: amount,
                order_time: time.to_string(),
            },
            instant,
            day: normalizer.calendar_day(instant),
            hour: normalizer.hour_of_day(instant),
        }
    }

    fn sample() -> Vec<TimedOrder> {
        let n = TimeNormalizer::default();
        vec![
            timed(&n, 1, 100.0, "2025-06-21T23:59:59"),
            timed(&n, 1, 50.0, "2025-06-22T00:00:00"),
            timed(&n, 2, 200.0, "2025-06-22T14:00:00"),
            timed(&n, 3, 75.5, "2025-06-23T09:15:00"),
            timed(&n, 2, 20.0, "2025-06-24T00:00:00"),
        ]
    }

    fn date(s: &str) -> Option<NaiveDate> {
        Some(NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap())
    }

    fn amounts(orders: &[&TimedOrder]) -> Vec<f64> {
        orders.iter().map(|o| o.amount()).collect()
    }

    #[test]
    fn test_no_constraints_keeps_everything_in_order() {
        let orders = sample();
        let filter = OrderFilter::new(&TrendQuery::default(), &TimeNormalizer::default());
        assert_eq!(amounts(&filter.apply(&orders)), vec![100.0, 50.0, 200.0, 75.5, 20.0]);
    }

    #[test]
    fn test_date_bounds_are_inclusive_whole_days() {
        let orders = sample();
        let query = TrendQuery {
            start_date: date("2025-06-22"),
            end_date: date("2025-06-23"),
            ..Default::default()
        };
        let filter = OrderFilter::new(&query, &TimeNormalizer::default());
        assert_eq!(amounts(&filter.apply(&orders)), vec![50.0, 200.0, 75.5]);
    }

    #[test]
    fn test_single_day_range() {
        let orders = sample();
        let query = TrendQuery {
            start_date: date("2025-06-22"),
            end_date: date("2025-06-22"),
            ..Default::default()
        };
        let filter = OrderFilter::new(&query, &TimeNormalizer::default());
        let selected = filter.apply(&orders);
        assert_eq!(amounts(&selected), vec![50.0, 200.0]);
        assert!(selected.iter().all(|o| o.day == date("2025-06-22").unwrap()));
    }

    #[test]
    fn test_restaurant_and_amount() {
        let orders = sample();
        let query = TrendQuery {
            restaurant_id: Some(2),
            amount_min: Some(20.0),
            amount_max: Some(199.99),
            ..Default::default()
        };
        let filter = OrderFilter::new(&query, &TimeNormalizer::default());
        assert_eq!(amounts(&filter.apply(&orders)), vec![20.0]);
    }

    #[test]
    fn test_hour_range() {
        let orders = sample();
        let query = TrendQuery {
            hour_min: Some(9),
            hour_max: Some(14),
            ..Default::default()
        };
        let filter = OrderFilter::new(&query, &TimeNormalizer::default());
        assert_eq!(amounts(&filter.apply(&orders)), vec![200.0, 75.5]);
    }

    #[test]
    fn test_full_hour_range_is_no_filter() {
        let orders = sample();
        let n = TimeNormalizer::default();
        let all = OrderFilter::new(&TrendQuery::default(), &n).apply(&orders);
        let full = OrderFilter::new(
            &TrendQuery {
                hour_min: Some(0),
                hour_max: Some(23),
                ..Default::default()
            },
            &n,
        )
        .apply(&orders);
        assert_eq!(all, full);
    }

    #[rstest]
    #[case(TrendQuery { hour_min: Some(15), hour_max: Some(3), ..Default::default() })]
    #[case(TrendQuery { start_date: date("2025-06-24"), end_date: date("2025-06-21"), ..Default::default() })]
    #[case(TrendQuery { amount_min: Some(100.0), amount_max: Some(10.0), ..Default::default() })]
    fn test_inverted_ranges_select_nothing(#[case] query: TrendQuery) {
        let orders = sample();
        let filter = OrderFilter::new(&query, &TimeNormalizer::default());
        assert!(filter.is_empty_range());
        assert!(filter.apply(&orders).is_empty());
    }

    #[test]
    fn test_date_bounds_follow_configured_zone() {
        let berlin = TimeNormalizer::from_name("Europe/Berlin").unwrap();
        // 22:30 UTC on the 21st is already the 22nd in Berlin
        let orders = vec![timed(&berlin, 1, 10.0, "2025-06-21T22:30:00Z")];
        let query = TrendQuery {
            start_date: date("2025-06-22"),
            end_date: date("2025-06-22"),
            ..Default::default()
        };
        assert_eq!(OrderFilter::new(&query, &berlin).apply(&orders).len(), 1);
        assert!(OrderFilter::new(&query, &TimeNormalizer::default())
            .apply(&orders)
            .is_empty());
    }
}
