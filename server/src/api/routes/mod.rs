//! API route modules

pub mod dashboard;
pub mod health;
pub mod organizations;
pub mod price_history;
pub mod products;
pub mod recommendations;
pub mod scoring;
pub mod users;
