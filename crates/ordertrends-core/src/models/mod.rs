//! Data models for OrderTrends

mod order;
mod query;
mod trends;

pub use order::*;
pub use query::*;
pub use trends::*;

pub(crate) use query::{parse_field, present};
