// src/pipeline/aggregate.rs

//! Fallback orchestration across sources.

use crate::diagnostics::DiagnosticSink;
use crate::error::{AppError, Result};
use crate::models::{Category, Config, IpoRecord};
use crate::services::{IpoSource, SourceAdapter};

/// A source that failed or returned nothing during a fallback run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: String,
    pub reason: String,
}

/// Result of one fallback run for a category.
#[derive(Debug, Clone)]
pub struct FeedOutcome {
    pub category: Category,
    pub records: Vec<IpoRecord>,
    /// Source that supplied `records`, `None` when every source came up empty
    pub source: Option<String>,
    pub failures: Vec<SourceFailure>,
}

impl FeedOutcome {
    /// Warning for clients when no source produced records.
    pub fn warning(&self) -> Option<String> {
        if self.source.is_some() {
            return None;
        }
        let reasons: Vec<String> = self
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.source, f.reason))
            .collect();
        Some(format!(
            "No {} IPOs available from any source ({})",
            self.category,
            reasons.join("; ")
        ))
    }
}

/// Tries sources in priority order until one yields records.
pub struct Aggregator {
    sources: Vec<Box<dyn IpoSource>>,
}

impl Aggregator {
    pub fn new(sources: Vec<Box<dyn IpoSource>>) -> Self {
        Self { sources }
    }

    /// Build HTTP-backed adapters for every configured source, in order.
    pub fn from_config(config: &Config) -> Result<Self> {
        let sources = config
            .sources
            .iter()
            .map(|source| {
                SourceAdapter::from_config(source).map(|a| Box::new(a) as Box<dyn IpoSource>)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(sources))
    }

    pub fn source_ids(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.id()).collect()
    }

    /// Run the fallback chain for one category.
    ///
    /// Source failures and empty results are reported to `sink` and the next
    /// source is tried. Exhausting the chain is not an error; only an empty
    /// source list is.
    pub async fn collect(&self, category: Category, sink: &dyn DiagnosticSink) -> Result<FeedOutcome> {
        if self.sources.is_empty() {
            return Err(AppError::config("No sources configured"));
        }

        let mut failures = Vec::new();
        for source in &self.sources {
            let reason = match source.fetch(category, sink).await {
                Ok(records) if !records.is_empty() => {
                    sink.info(&format!(
                        "Serving {} {} IPOs from {}",
                        records.len(),
                        category,
                        source.id()
                    ));
                    return Ok(FeedOutcome {
                        category,
                        records,
                        source: Some(source.id().to_string()),
                        failures,
                    });
                }
                Ok(_) => "no records found".to_string(),
                Err(e) => e.to_string(),
            };

            sink.warn(&format!(
                "Source {} gave no {} IPOs: {}",
                source.id(),
                category,
                reason
            ));
            failures.push(SourceFailure {
                source: source.id().to_string(),
                reason,
            });
        }

        sink.warn(&format!("All sources exhausted for {category} IPOs"));
        Ok(FeedOutcome {
            category,
            records: Vec::new(),
            source: None,
            failures,
        })
    }

    pub async fn current(&self, sink: &dyn DiagnosticSink) -> Result<FeedOutcome> {
        self.collect(Category::Current, sink).await
    }

    pub async fn upcoming(&self, sink: &dyn DiagnosticSink) -> Result<FeedOutcome> {
        self.collect(Category::Upcoming, sink).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::diagnostics::MemorySink;
    use crate::models::SourceConfig;
    use crate::testing::{Reply, StaticFetcher, StubSource, record};

    fn boxed(source: StubSource) -> Box<dyn IpoSource> {
        Box::new(source)
    }

    #[tokio::test]
    async fn falls_back_to_next_source_on_transport_error() {
        let a = StubSource::new(
            "a",
            Reply::Fail("connection reset"),
            Reply::Records(vec![]),
        );
        let b = StubSource::new(
            "b",
            Reply::Records(vec![record("Acme Corp", Category::Current)]),
            Reply::Records(vec![]),
        );
        let aggregator = Aggregator::new(vec![boxed(a), boxed(b)]);
        let sink = MemorySink::new();

        let outcome = aggregator.current(&sink).await.unwrap();
        assert_eq!(outcome.source.as_deref(), Some("b"));
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].company, "Acme Corp");
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].source, "a");
        assert!(outcome.warning().is_none());
        assert!(sink.contains("connection reset"));
    }

    #[tokio::test]
    async fn first_non_empty_source_wins() {
        let a = StubSource::new(
            "a",
            Reply::Records(vec![record("First", Category::Current)]),
            Reply::Records(vec![]),
        );
        let b = StubSource::new(
            "b",
            Reply::Records(vec![record("Second", Category::Current)]),
            Reply::Records(vec![]),
        );
        let b_calls = b.calls();
        let aggregator = Aggregator::new(vec![boxed(a), boxed(b)]);

        let outcome = aggregator.current(&MemorySink::new()).await.unwrap();
        assert_eq!(outcome.records[0].company, "First");
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn exhausted_chain_is_empty_not_error() {
        let a = StubSource::new("a", Reply::Records(vec![]), Reply::Fail("timed out"));
        let b = StubSource::new("b", Reply::Records(vec![]), Reply::Records(vec![]));
        let aggregator = Aggregator::new(vec![boxed(a), boxed(b)]);
        let sink = MemorySink::new();

        let outcome = aggregator.upcoming(&sink).await.unwrap();
        assert!(outcome.records.is_empty());
        assert!(outcome.source.is_none());
        assert_eq!(outcome.failures.len(), 2);

        let warning = outcome.warning().unwrap();
        assert!(warning.contains("upcoming"));
        assert!(warning.contains("a: Fetch error for a: timed out"));
        assert!(warning.contains("b: no records found"));
        assert!(sink.contains("All sources exhausted"));
    }

    #[tokio::test]
    async fn no_sources_is_a_configuration_error() {
        let aggregator = Aggregator::new(Vec::new());
        let result = aggregator.current(&MemorySink::new()).await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn adapter_chain_end_to_end() {
        let page = r#"
            <h2>Current IPOs</h2>
            <table>
              <tr><th>Company</th><th>Price</th><th>Open</th><th>Close</th><th>Lot</th></tr>
              <tr><td>Acme Corp</td><td>100-120</td><td>01 Mar</td><td>05 Mar</td><td>50</td></tr>
            </table>"#;
        let down = SourceAdapter::with_fetcher(
            &SourceConfig::new("down", "https://down.example.com/"),
            StaticFetcher::failing("https://down.example.com/"),
        )
        .unwrap();
        let up = SourceAdapter::with_fetcher(
            &SourceConfig::new("up", "https://up.example.com/"),
            StaticFetcher::page("https://up.example.com/", page),
        )
        .unwrap();
        let aggregator = Aggregator::new(vec![
            Box::new(down) as Box<dyn IpoSource>,
            Box::new(up) as Box<dyn IpoSource>,
        ]);
        assert_eq!(aggregator.source_ids(), vec!["down", "up"]);

        let sink = MemorySink::new();
        let current = aggregator.current(&sink).await.unwrap();
        assert_eq!(current.source.as_deref(), Some("up"));
        assert_eq!(current.records.len(), 1);
        assert_eq!(current.records[0].lot_size, 50);

        let upcoming = aggregator.upcoming(&sink).await.unwrap();
        assert!(upcoming.records.is_empty());
        assert_eq!(upcoming.failures.len(), 2);
    }

    #[test]
    fn builds_from_default_config() {
        let aggregator = Aggregator::from_config(&Config::default()).unwrap();
        assert_eq!(aggregator.source_ids(), vec!["chittorgarh", "ipowatch"]);
    }
}
