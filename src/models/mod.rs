// src/models/mod.rs

//! Domain models for the IPO feed.
//!
//! Listing records and the configuration that drives each source.

mod config;
mod ipo;

// Re-export all public types
pub use config::{
    ClassifierStrategy, ColumnLayout, Config, ExtractionConfig, HeaderProfile, KeywordConfig,
    LoggingConfig, MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS, ServerConfig, SourceConfig,
};
pub use ipo::{Category, IpoRecord, IpoStatus, TBA};
