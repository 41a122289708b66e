//! # OrderTrends
//!
//! Restaurant order-trend analytics backend.
//!
//! OrderTrends serves restaurant listings and order trends computed from static
//! JSON datasets, with filtering, per-day aggregation, revenue rankings and a
//! short-TTL response cache.
//!
//! ## Architecture
//!
//! - **Dataset**: immutable snapshot of restaurants and normalized orders
//! - **Engine**: order filter, daily aggregator and revenue ranker
//! - **Cache**: TTL response cache (in-memory or Redis)
//! - **API**: REST API for the directory and trend queries
//!
//! ## Quick Start
//!
//! ```bash
//! # Serve the API
//! ordertrends serve
//!
//! # Compute trends once from the command line
//! ordertrends trends --hour-min 10 --hour-max 23
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod api;
pub mod cache;
pub mod config;
pub mod dataset;
pub mod directory;
pub mod engine;
pub mod error;
pub mod models;

pub use config::Config;
pub use error::{Error, Result};

/// Re-exports for convenience
pub mod prelude {
    pub use crate::cache::ResponseCache;
    pub use crate::config::Config;
    pub use crate::dataset::Dataset;
    pub use crate::engine::{TimeNormalizer, TrendEngine};
    pub use crate::error::{Error, Result};
    pub use crate::models::*;
}
