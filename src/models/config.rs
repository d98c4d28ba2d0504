//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use scraper::Selector;
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Bounds for a single source fetch, in seconds.
pub const MIN_TIMEOUT_SECS: u64 = 15;
pub const MAX_TIMEOUT_SECS: u64 = 30;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Sources in fallback priority order
    #[serde(default = "defaults::sources")]
    pub sources: Vec<SourceConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(AppError::validation("server.host is empty"));
        }
        if self.sources.is_empty() {
            return Err(AppError::validation("No sources defined"));
        }

        let mut seen = HashSet::new();
        for source in &self.sources {
            if !seen.insert(source.id.as_str()) {
                return Err(AppError::validation(format!(
                    "Duplicate source id '{}'",
                    source.id
                )));
            }
            source.validate()?;
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            sources: defaults::sources(),
        }
    }
}

/// API server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "defaults::host")]
    pub host: String,

    #[serde(default = "defaults::port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            port: defaults::port(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

/// How a source decides which tables hold current or upcoming listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierStrategy {
    /// Nearest preceding heading (or the table caption)
    #[default]
    Heading,
    /// Keywords inside the table itself
    Content,
    /// Heading first, table content when the heading is missing or unmatched
    HeadingThenContent,
}

/// One upstream IPO listing site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Short identifier used in logs and errors
    pub id: String,

    /// Page to fetch
    pub url: String,

    /// Selector for candidate tables
    #[serde(default = "defaults::table_selector")]
    pub table_selector: String,

    /// Selector for heading elements that label tables
    #[serde(default = "defaults::heading_selector")]
    pub heading_selector: String,

    #[serde(default)]
    pub strategy: ClassifierStrategy,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Exchange tag stamped on every record
    #[serde(default = "defaults::exchange")]
    pub exchange: String,

    /// Issue type tag stamped on every record
    #[serde(default = "defaults::ipo_type")]
    pub ipo_type: String,

    #[serde(default)]
    pub headers: HeaderProfile,

    #[serde(default)]
    pub keywords: KeywordConfig,

    /// Extraction settings for the current table(s).
    /// Fields left out of a partial table keep the current defaults.
    #[serde(
        default = "defaults::current_extraction",
        deserialize_with = "ExtractionOverrides::current"
    )]
    pub current: ExtractionConfig,

    /// Extraction settings for the upcoming table(s)
    #[serde(
        default = "defaults::upcoming_extraction",
        deserialize_with = "ExtractionOverrides::upcoming"
    )]
    pub upcoming: ExtractionConfig,
}

impl SourceConfig {
    /// Create a source with default selectors, headers and layouts.
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            table_selector: defaults::table_selector(),
            heading_selector: defaults::heading_selector(),
            strategy: ClassifierStrategy::default(),
            timeout_secs: defaults::timeout(),
            exchange: defaults::exchange(),
            ipo_type: defaults::ipo_type(),
            headers: HeaderProfile::default(),
            keywords: KeywordConfig::default(),
            current: defaults::current_extraction(),
            upcoming: defaults::upcoming_extraction(),
        }
    }

    /// Validate a single source definition.
    pub fn validate(&self) -> Result<()> {
        let ctx = |msg: &str| AppError::validation(format!("source '{}': {}", self.id, msg));

        if self.id.trim().is_empty() {
            return Err(AppError::validation("source id is empty"));
        }
        let url = Url::parse(&self.url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ctx("url must be http or https"));
        }
        if self.headers.user_agent.trim().is_empty() {
            return Err(ctx("headers.user_agent is empty"));
        }
        if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&self.timeout_secs) {
            return Err(ctx(&format!(
                "timeout_secs must be between {MIN_TIMEOUT_SECS} and {MAX_TIMEOUT_SECS}"
            )));
        }
        for selector in [&self.table_selector, &self.heading_selector] {
            Selector::parse(selector).map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
        }
        if self.keywords.current.is_empty() || self.keywords.upcoming.is_empty() {
            return Err(ctx("keyword lists must not be empty"));
        }
        self.current.validate().map_err(|e| ctx(&format!("current: {e}")))?;
        self.upcoming.validate().map_err(|e| ctx(&format!("upcoming: {e}")))?;
        Ok(())
    }
}

/// Request headers sent to a source. Some sites reject default client identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderProfile {
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    #[serde(default = "defaults::accept")]
    pub accept: String,

    #[serde(default = "defaults::accept_language")]
    pub accept_language: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
}

impl Default for HeaderProfile {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            accept: defaults::accept(),
            accept_language: defaults::accept_language(),
            referer: None,
        }
    }
}

/// Keyword sets used by the table classifier and row filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordConfig {
    #[serde(default = "defaults::current_keywords")]
    pub current: Vec<String>,

    #[serde(default = "defaults::upcoming_keywords")]
    pub upcoming: Vec<String>,

    /// At least one must appear for content-based classification
    #[serde(default = "defaults::relevance_keywords")]
    pub relevance: Vec<String>,

    /// Company cells equal to one of these are header rows
    #[serde(default = "defaults::header_tokens")]
    pub header_tokens: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            current: defaults::current_keywords(),
            upcoming: defaults::upcoming_keywords(),
            relevance: defaults::relevance_keywords(),
            header_tokens: defaults::header_tokens(),
        }
    }
}

/// Row limits and column positions for one category.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionConfig {
    /// Maximum data rows read per table
    pub max_rows: usize,

    /// Rows with fewer cells are rejected
    pub min_columns: usize,

    pub columns: ColumnLayout,
}

/// A possibly partial `[sources.current]` / `[sources.upcoming]` table.
/// Missing fields are taken from that category's defaults.
#[derive(Debug, Deserialize)]
struct ExtractionOverrides {
    max_rows: Option<usize>,
    min_columns: Option<usize>,
    columns: Option<ColumnLayout>,
}

impl ExtractionOverrides {
    fn apply(self, base: ExtractionConfig) -> ExtractionConfig {
        ExtractionConfig {
            max_rows: self.max_rows.unwrap_or(base.max_rows),
            min_columns: self.min_columns.unwrap_or(base.min_columns),
            columns: self.columns.unwrap_or(base.columns),
        }
    }

    fn current<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<ExtractionConfig, D::Error> {
        Self::deserialize(deserializer).map(|o| o.apply(defaults::current_extraction()))
    }

    fn upcoming<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<ExtractionConfig, D::Error> {
        Self::deserialize(deserializer).map(|o| o.apply(defaults::upcoming_extraction()))
    }
}

impl ExtractionConfig {
    fn validate(&self) -> Result<()> {
        if self.max_rows == 0 {
            return Err(AppError::validation("max_rows must be > 0"));
        }
        let required = self.columns.required_len();
        if self.min_columns < required {
            return Err(AppError::validation(format!(
                "min_columns ({}) must cover company, price and open date columns ({})",
                self.min_columns, required
            )));
        }
        Ok(())
    }
}

/// Zero-based cell positions within a data row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub company: usize,
    pub price: usize,
    pub open_date: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_date: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lot_size: Option<usize>,
}

impl ColumnLayout {
    /// Number of cells needed to reach every mandatory column.
    pub fn required_len(&self) -> usize {
        self.company.max(self.price).max(self.open_date) + 1
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            company: 0,
            price: 1,
            open_date: 2,
            close_date: Some(3),
            lot_size: None,
        }
    }
}

mod defaults {
    use super::{ClassifierStrategy, ColumnLayout, ExtractionConfig, SourceConfig};

    // Server defaults
    pub fn host() -> String {
        "0.0.0.0".into()
    }
    pub fn port() -> u16 {
        5000
    }
    pub fn log_level() -> String {
        "info".into()
    }

    // Source defaults
    pub fn table_selector() -> String {
        "table".into()
    }
    pub fn heading_selector() -> String {
        "h2, h3, h4".into()
    }
    pub fn timeout() -> u64 {
        20
    }
    pub fn exchange() -> String {
        "NSE+BSE".into()
    }
    pub fn ipo_type() -> String {
        "Mainboard".into()
    }

    // Header defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            .into()
    }
    pub fn accept() -> String {
        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".into()
    }
    pub fn accept_language() -> String {
        "en-IN,en;q=0.9".into()
    }

    // Keyword defaults
    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }
    pub fn current_keywords() -> Vec<String> {
        words(&["current", "open", "active", "live", "ongoing"])
    }
    pub fn upcoming_keywords() -> Vec<String> {
        words(&["upcoming", "forthcoming", "next", "scheduled"])
    }
    pub fn relevance_keywords() -> Vec<String> {
        words(&["ipo", "company", "price", "date"])
    }
    pub fn header_tokens() -> Vec<String> {
        words(&["company", "name", "symbol"])
    }

    // Extraction defaults
    pub fn current_extraction() -> ExtractionConfig {
        ExtractionConfig {
            max_rows: 10,
            min_columns: 5,
            columns: ColumnLayout {
                lot_size: Some(4),
                ..ColumnLayout::default()
            },
        }
    }
    pub fn upcoming_extraction() -> ExtractionConfig {
        ExtractionConfig {
            max_rows: 15,
            min_columns: 4,
            columns: ColumnLayout::default(),
        }
    }

    pub fn sources() -> Vec<SourceConfig> {
        let chittorgarh = SourceConfig {
            table_selector: "table.table".into(),
            ..SourceConfig::new(
                "chittorgarh",
                "https://www.chittorgarh.com/ipo/ipo_calendar.asp",
            )
        };

        let mut ipowatch = SourceConfig::new(
            "ipowatch",
            "https://ipowatch.in/upcoming-ipo-calendar-ipo-list/",
        );
        ipowatch.strategy = ClassifierStrategy::HeadingThenContent;
        ipowatch.headers.referer = Some("https://ipowatch.in/".into());
        ipowatch.current.columns = ColumnLayout {
            company: 0,
            open_date: 1,
            close_date: Some(2),
            price: 3,
            lot_size: Some(4),
        };
        ipowatch.upcoming.columns = ColumnLayout {
            company: 0,
            open_date: 1,
            close_date: Some(2),
            price: 3,
            lot_size: None,
        };

        vec![chittorgarh, ipowatch]
    }
}
