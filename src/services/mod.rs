//! Service layer for the IPO feed.
//!
//! This module contains the extraction pipeline:
//! - Text normalization (`normalize`)
//! - Table classification (`TableClassifier`)
//! - Row extraction (`RowExtractor`)
//! - Per-site fetching (`SourceAdapter`)

pub mod classifier;
pub mod extractor;
pub mod normalize;
mod source;

pub use classifier::{CandidateTable, KeywordRule, TableClassifier};
pub use extractor::{RecordTags, RowExtractor, RowRejection};
pub use normalize::{parse_lot_size, parse_price_range};
pub use source::{HttpFetcher, IpoSource, PageFetcher, SourceAdapter};
