// src/testing.rs

//! Stubs shared by unit tests.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::diagnostics::DiagnosticSink;
use crate::error::{AppError, Result};
use crate::models::{Category, IpoRecord};
use crate::services::{IpoSource, PageFetcher};

/// Serves fixed markup for one URL, or refuses the connection.
pub(crate) struct StaticFetcher {
    url: String,
    page: Option<String>,
}

impl StaticFetcher {
    pub(crate) fn page(url: &str, page: &str) -> Self {
        Self {
            url: url.to_string(),
            page: Some(page.to_string()),
        }
    }

    pub(crate) fn failing(url: &str) -> Self {
        Self {
            url: url.to_string(),
            page: None,
        }
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        if url != self.url {
            return Err(AppError::validation(format!("unexpected url {url}")));
        }
        self.page.clone().ok_or_else(|| {
            AppError::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))
        })
    }
}

/// Canned reply of a stub source for one category.
#[derive(Clone)]
pub(crate) enum Reply {
    Records(Vec<IpoRecord>),
    Fail(&'static str),
}

/// Source with canned replies that counts how often it was asked.
pub(crate) struct StubSource {
    id: String,
    current: Reply,
    upcoming: Reply,
    calls: Arc<AtomicUsize>,
}

impl StubSource {
    pub(crate) fn new(id: &str, current: Reply, upcoming: Reply) -> Self {
        Self {
            id: id.to_string(),
            current,
            upcoming,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared call counter, readable after the source is boxed.
    pub(crate) fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl IpoSource for StubSource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn fetch(&self, category: Category, _sink: &dyn DiagnosticSink) -> Result<Vec<IpoRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = match category {
            Category::Current => &self.current,
            Category::Upcoming => &self.upcoming,
        };
        match reply {
            Reply::Records(records) => Ok(records.clone()),
            Reply::Fail(message) => Err(AppError::fetch(&self.id, message)),
        }
    }
}

/// A minimal valid record for `category`.
pub(crate) fn record(company: &str, category: Category) -> IpoRecord {
    IpoRecord {
        company: company.to_string(),
        price_low: 100,
        price_high: 110,
        open_date: "01 Mar".to_string(),
        close_date: "05 Mar".to_string(),
        lot_size: match category {
            Category::Current => 50,
            Category::Upcoming => 0,
        },
        status: category.status(),
        exchange: "NSE+BSE".to_string(),
        ipo_type: "Mainboard".to_string(),
    }
}
