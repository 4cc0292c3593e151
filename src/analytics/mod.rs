//! Aggregation engine: summary statistics and product classification.

pub mod products;
pub mod reporter;
