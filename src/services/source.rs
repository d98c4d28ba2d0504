// src/services/source.rs

//! Source adapters.
//!
//! One [`SourceAdapter`] wraps one upstream site: it fetches the page,
//! classifies its tables and extracts records for the requested category.
//! Sites differ only in configuration (URL, headers, strategy, layouts).

use async_trait::async_trait;
use scraper::Html;

use crate::diagnostics::DiagnosticSink;
use crate::error::{AppError, Result};
use crate::models::{Category, IpoRecord, SourceConfig};
use crate::services::classifier::TableClassifier;
use crate::services::extractor::{RecordTags, RowExtractor};
use crate::utils::http::{create_async_client, fetch_text_async};

/// Retrieves raw page markup.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetches pages over HTTP with a source's header profile and timeout.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(&config.headers, config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        fetch_text_async(&self.client, url).await
    }
}

/// Anything that can produce current and upcoming IPO lists.
#[async_trait]
pub trait IpoSource: Send + Sync {
    /// Identifier used in logs and failure reports.
    fn id(&self) -> &str;

    /// Fetch records for one category.
    async fn fetch(&self, category: Category, sink: &dyn DiagnosticSink)
    -> Result<Vec<IpoRecord>>;

    async fn fetch_current(&self, sink: &dyn DiagnosticSink) -> Result<Vec<IpoRecord>> {
        self.fetch(Category::Current, sink).await
    }

    async fn fetch_upcoming(&self, sink: &dyn DiagnosticSink) -> Result<Vec<IpoRecord>> {
        self.fetch(Category::Upcoming, sink).await
    }
}

/// Configurable adapter for one IPO listing site.
pub struct SourceAdapter {
    id: String,
    url: String,
    fetcher: Box<dyn PageFetcher>,
    classifier: TableClassifier,
    current: RowExtractor,
    upcoming: RowExtractor,
}

impl SourceAdapter {
    /// Create an adapter that fetches over HTTP.
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        Self::with_fetcher(config, HttpFetcher::new(config)?)
    }

    /// Create an adapter with a custom page fetcher.
    pub fn with_fetcher(config: &SourceConfig, fetcher: impl PageFetcher + 'static) -> Result<Self> {
        let tags = RecordTags {
            exchange: config.exchange.clone(),
            ipo_type: config.ipo_type.clone(),
        };
        let header_tokens = &config.keywords.header_tokens;

        Ok(Self {
            id: config.id.clone(),
            url: config.url.clone(),
            fetcher: Box::new(fetcher),
            classifier: TableClassifier::from_source(config)?,
            current: RowExtractor::new(
                Category::Current,
                &config.current,
                header_tokens,
                tags.clone(),
            )?,
            upcoming: RowExtractor::new(Category::Upcoming, &config.upcoming, header_tokens, tags)?,
        })
    }

    fn extractor(&self, category: Category) -> &RowExtractor {
        match category {
            Category::Current => &self.current,
            Category::Upcoming => &self.upcoming,
        }
    }

    /// Extract records of one category from page markup.
    ///
    /// Records from every matching table are concatenated in document order.
    pub fn extract(&self, html: &str, category: Category, sink: &dyn DiagnosticSink) -> Vec<IpoRecord> {
        let document = Html::parse_document(html);
        let candidates = self.classifier.classify_document(&document);
        let extractor = self.extractor(category);

        let matching: Vec<_> = candidates
            .iter()
            .filter(|c| c.category == Some(category))
            .collect();

        sink.debug(&format!(
            "[{}] {} tables found, {} classified as {}",
            self.id,
            candidates.len(),
            matching.len(),
            category
        ));

        let records: Vec<IpoRecord> = matching
            .iter()
            .flat_map(|c| extractor.extract_table(c.table, sink))
            .collect();

        sink.info(&format!(
            "[{}] extracted {} {} IPOs",
            self.id,
            records.len(),
            category
        ));
        records
    }
}

#[async_trait]
impl IpoSource for SourceAdapter {
    fn id(&self) -> &str {
        &self.id
    }

    async fn fetch(
        &self,
        category: Category,
        sink: &dyn DiagnosticSink,
    ) -> Result<Vec<IpoRecord>> {
        sink.debug(&format!("[{}] fetching {}", self.id, self.url));
        let body = self
            .fetcher
            .fetch(&self.url)
            .await
            .map_err(|e| AppError::fetch(&self.id, e))?;
        Ok(self.extract(&body, category, sink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use crate::models::{ClassifierStrategy, IpoStatus};
    use crate::testing::StaticFetcher;

    const URL: &str = "https://ipo.example.com/calendar";

    const CALENDAR_PAGE: &str = r#"
        <html><body>
          <h2>Current IPOs</h2>
          <table class="table">
            <tr><th>Company</th><th>Price</th><th>Open</th><th>Close</th><th>Lot</th></tr>
            <tr><td>Acme Corp</td><td>100-120</td><td>01 Mar</td><td>05 Mar</td><td>50</td></tr>
          </table>
          <h2>Upcoming IPOs</h2>
          <table class="table">
            <tr><th>Company</th><th>Price</th><th>Open</th><th>Close</th></tr>
            <tr><td>Beta Ltd</td><td>₹90 - ₹95</td><td>10 Apr</td><td>14 Apr</td></tr>
            <tr><td>Gamma Ltd</td><td>TBA</td><td>TBA</td><td></td></tr>
          </table>
          <h2>Recently Listed</h2>
          <table class="table">
            <tr><th>Company</th><th>Listing</th><th>Gain</th><th>Date</th><th>Lot</th></tr>
            <tr><td>Old Co</td><td>200</td><td>10%</td><td>01 Jan</td><td>20</td></tr>
          </table>
        </body></html>
    "#;

    fn adapter(page: &str) -> SourceAdapter {
        let mut config = SourceConfig::new("fixture", URL);
        config.table_selector = "table.table".into();
        config.strategy = ClassifierStrategy::Heading;
        SourceAdapter::with_fetcher(&config, StaticFetcher::page(URL, page)).unwrap()
    }

    #[tokio::test]
    async fn fetch_current_returns_the_open_listing() {
        let sink = MemorySink::new();
        let records = adapter(CALENDAR_PAGE).fetch_current(&sink).await.unwrap();

        assert_eq!(records.len(), 1);
        let acme = &records[0];
        assert_eq!(acme.company, "Acme Corp");
        assert_eq!((acme.price_low, acme.price_high), (100, 120));
        assert_eq!(acme.open_date, "01 Mar");
        assert_eq!(acme.close_date, "05 Mar");
        assert_eq!(acme.lot_size, 50);
        assert_eq!(acme.status, IpoStatus::Open);
    }

    #[tokio::test]
    async fn fetch_upcoming_reads_only_upcoming_tables() {
        let sink = MemorySink::new();
        let records = adapter(CALENDAR_PAGE).fetch_upcoming(&sink).await.unwrap();

        let names: Vec<_> = records.iter().map(|r| r.company.as_str()).collect();
        assert_eq!(names, vec!["Beta Ltd", "Gamma Ltd"]);
        assert!(records.iter().all(|r| r.lot_size == 0));
        assert!(records.iter().all(|r| r.status == IpoStatus::Upcoming));
        assert_eq!(records[1].close_date, "TBA");
        assert_eq!((records[1].price_low, records[1].price_high), (0, 0));
        assert!(sink.contains("3 tables found, 1 classified as upcoming"));
    }

    #[tokio::test]
    async fn matching_tables_are_concatenated() {
        let page = r#"
            <h3>Open IPOs (Mainboard)</h3>
            <table class="table">
              <tr><th>Company</th></tr>
              <tr><td>First Co</td><td>10</td><td>d</td><td>d</td><td>1</td></tr>
            </table>
            <h3>Open IPOs (SME)</h3>
            <table class="table">
              <tr><th>Company</th></tr>
              <tr><td>Second Co</td><td>20</td><td>d</td><td>d</td><td>2</td></tr>
              <tr><td>First Co</td><td>10</td><td>d</td><td>d</td><td>1</td></tr>
            </table>"#;
        let sink = MemorySink::new();
        let records = adapter(page).fetch_current(&sink).await.unwrap();

        let names: Vec<_> = records.iter().map(|r| r.company.as_str()).collect();
        assert_eq!(names, vec!["First Co", "Second Co", "First Co"]);
    }

    #[tokio::test]
    async fn transport_failure_becomes_fetch_error() {
        let mut config = SourceConfig::new("broken", URL);
        config.table_selector = "table.table".into();
        let adapter = SourceAdapter::with_fetcher(&config, StaticFetcher::failing(URL)).unwrap();

        let err = adapter.fetch_current(&MemorySink::new()).await.unwrap_err();
        match err {
            AppError::Fetch { source_id, .. } => assert_eq!(source_id, "broken"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn page_without_tables_is_empty_not_error() {
        let sink = MemorySink::new();
        let records = adapter("<p>Maintenance</p>").fetch_current(&sink).await.unwrap();
        assert!(records.is_empty());
        assert!(sink.contains("0 tables found"));
    }
}
