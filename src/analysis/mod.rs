//! Analysis module - aggregation and growth computation

pub mod aggregate;
pub mod growth;

pub use aggregate::{aggregate, AggregateRow, TimeBucket, TimeKey};
pub use growth::{compute_growth, GrowthRow};
