//! JSON response envelopes.
//!
//! Field names match what the mobile client decodes.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::models::IpoRecord;
use crate::pipeline::FeedOutcome;

/// Response-generation instant in RFC 3339.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeResponse {
    pub status: String,
    pub message: String,
    pub endpoints: BTreeMap<String, String>,
}

impl Default for HomeResponse {
    fn default() -> Self {
        let endpoints = [
            ("/api/ipos", "Get all IPOs (current + upcoming)"),
            ("/api/ipos/current", "Get only current/open IPOs"),
            ("/api/ipos/upcoming", "Get only upcoming IPOs"),
        ]
        .into_iter()
        .map(|(path, description)| (path.to_string(), description.to_string()))
        .collect();

        Self {
            status: "running".to_string(),
            message: "IPO Feed API".to_string(),
            endpoints,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllIposData {
    pub current: Vec<IpoRecord>,
    pub upcoming: Vec<IpoRecord>,
    pub total: usize,
}

/// Body of `GET /api/ipos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllIposResponse {
    pub success: bool,
    pub timestamp: String,
    pub data: AllIposData,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl AllIposResponse {
    pub fn from_outcomes(current: FeedOutcome, upcoming: FeedOutcome) -> Self {
        let warnings = [current.warning(), upcoming.warning()]
            .into_iter()
            .flatten()
            .collect();
        let total = current.records.len() + upcoming.records.len();

        Self {
            success: true,
            timestamp: timestamp(),
            data: AllIposData {
                current: current.records,
                upcoming: upcoming.records,
                total,
            },
            warnings,
        }
    }
}

/// Body of `GET /api/ipos/current` and `GET /api/ipos/upcoming`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub success: bool,
    pub timestamp: String,
    pub data: Vec<IpoRecord>,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl CategoryResponse {
    pub fn from_outcome(outcome: FeedOutcome) -> Self {
        let warnings = outcome.warning().into_iter().collect();
        Self {
            success: true,
            timestamp: timestamp(),
            count: outcome.records.len(),
            data: outcome.records,
            warnings,
        }
    }
}

/// Body of every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
