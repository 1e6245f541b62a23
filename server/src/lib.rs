//! PricePulse server library
//!
//! Pricing intelligence dashboard backend: product catalog, price history
//! aggregation, dashboard feed, recommendations, and the ML scoring
//! passthrough.

pub mod api;
pub mod app;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
