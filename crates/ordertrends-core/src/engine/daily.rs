//! Per-day aggregation

use std::collections::BTreeMap;

use crate::models::{round_cents, DailyRow, TimedOrder};

#[derive(Default)]
struct DayAccumulator {
    orders: u64,
    revenue: f64,
    hour_counts: [u64; 24],
}

impl DayAccumulator {
    fn add(&mut self, order: &TimedOrder) {
        self.orders += 1;
        self.revenue += order.amount();
        self.hour_counts[order.hour as usize] += 1;
    }

    /// Hour with the most orders; the earliest hour wins a tie
    fn peak_hour(&self) -> Option<u32> {
        let mut peak: Option<(u32, u64)> = None;
        for (hour, &count) in (0u32..).zip(self.hour_counts.iter()) {
            if count > 0 && peak.map_or(true, |(_, best)| count > best) {
                peak = Some((hour, count));
            }
        }
        peak.map(|(hour, _)| hour)
    }

    fn into_row(self, date: String) -> DailyRow {
        let avg = if self.orders == 0 {
            0.0
        } else {
            self.revenue / self.orders as f64
        };

        DailyRow {
            date,
            orders: self.orders,
            revenue: round_cents(self.revenue),
            avg_order_value: round_cents(avg),
            peak_order_hour: self.peak_hour(),
        }
    }
}

/// Group orders by calendar day
///
/// Rows only exist for days with at least one order and come back sorted by
/// their `YYYY-MM-DD` key. Sums are rounded once, after the average has been
/// taken from the unrounded total.
pub fn aggregate_daily<'a, I>(orders: I) -> Vec<DailyRow>
where
    I: IntoIterator<Item = &'a TimedOrder>,
{
    let mut by_day: BTreeMap<String, DayAccumulator> = BTreeMap::new();

    for order in orders {
        by_day
            .entry(order.day.format("%Y-%m-%d").to_string())
            .or_default()
            .add(order);
    }

    by_day
        .into_iter()
        .map(|(date, acc)| acc.into_row(date))
        .collect()
}
