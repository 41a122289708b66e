//! Revenue ranking by restaurant

use std::collections::HashMap;

use crate::models::{round_cents, RankedRestaurant, TimedOrder};

/// Total revenue per restaurant, highest first
///
/// Equal rounded revenues are ordered by ascending restaurant id.
pub fn rank_by_revenue<'a, I>(orders: I) -> Vec<RankedRestaurant>
where
    I: IntoIterator<Item = &'a TimedOrder>,
{
    let mut totals: HashMap<i64, f64> = HashMap::new();
    for order in orders {
        *totals.entry(order.restaurant_id()).or_insert(0.0) += order.amount();
    }

    let mut ranked: Vec<RankedRestaurant> = totals
        .into_iter()
        .map(|(restaurant_id, revenue)| RankedRestaurant {
            restaurant_id,
            revenue: round_cents(revenue),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.restaurant_id.cmp(&b.restaurant_id))
    });
    ranked
}
