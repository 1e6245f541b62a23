//! Per-entity repository modules
//!
//! Each module exposes free async functions over a `SqlitePool`. The
//! trait-object wiring for backend independence lives in `repository_impl`.

pub mod organization;
pub mod price_event;
pub mod price_history;
pub mod product;
pub mod recommendation;
pub mod user;
