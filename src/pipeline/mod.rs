//! Pipeline entry points for feed operations.
//!
//! - `Aggregator`: runs the per-category fallback chain across sources

pub mod aggregate;

pub use aggregate::{Aggregator, FeedOutcome, SourceFailure};
