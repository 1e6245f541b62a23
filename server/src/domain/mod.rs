//! Domain logic
//!
//! - `series` - Pure aggregation of price observations into bucketed averages
//! - `scoring` - Client for the external ML scoring service

pub mod scoring;
pub mod series;
