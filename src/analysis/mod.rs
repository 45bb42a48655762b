//! Analysis modules.
//!
//! Aggregation over decoded page records.

pub mod aggregator;

pub use aggregator::*;
