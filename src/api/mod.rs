//! JSON API over the IPO feed.
//!
//! Provides:
//! - `GET /` service description
//! - `GET /api/ipos` current and upcoming listings
//! - `GET /api/ipos/current`, `GET /api/ipos/upcoming`
//!
//! Any origin may call the API; the consumer is a mobile app.

pub mod handlers;
mod server;
pub mod types;

pub use server::{ApiState, router, serve};
