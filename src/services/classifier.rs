// src/services/classifier.rs

//! Table classifier.
//!
//! Decides for every candidate table on a page whether it lists current
//! IPOs, upcoming IPOs, or neither. Classification is an ordered list of
//! keyword rules: the first rule with a keyword contained in the
//! lower-cased text wins, so `current` beats `upcoming` when both match.

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{Category, ClassifierStrategy, KeywordConfig, SourceConfig};

/// A keyword set mapped to a category.
#[derive(Debug, Clone)]
pub struct KeywordRule {
    pub category: Category,
    pub keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new(category: Category, keywords: &[String]) -> Self {
        Self {
            category,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    fn matches(&self, text_lower: &str) -> bool {
        self.keywords.iter().any(|k| text_lower.contains(k.as_str()))
    }
}

/// A table together with its decided category (`None` means neither).
#[derive(Debug, Clone, Copy)]
pub struct CandidateTable<'a> {
    pub table: ElementRef<'a>,
    pub category: Option<Category>,
}

/// Classifies the tables of a parsed page.
#[derive(Debug, Clone)]
pub struct TableClassifier {
    strategy: ClassifierStrategy,
    table_selector: Selector,
    heading_selector: Selector,
    row_selector: Selector,
    rules: Vec<KeywordRule>,
    relevance: Vec<String>,
}

impl TableClassifier {
    /// Build a classifier from selector strings and keyword sets.
    pub fn new(
        strategy: ClassifierStrategy,
        table_selector: &str,
        heading_selector: &str,
        keywords: &KeywordConfig,
    ) -> Result<Self> {
        Ok(Self {
            strategy,
            table_selector: parse_selector(table_selector)?,
            heading_selector: parse_selector(heading_selector)?,
            row_selector: parse_selector("tr")?,
            rules: vec![
                KeywordRule::new(Category::Current, &keywords.current),
                KeywordRule::new(Category::Upcoming, &keywords.upcoming),
            ],
            relevance: keywords.relevance.iter().map(|k| k.to_lowercase()).collect(),
        })
    }

    /// Build the classifier configured for a source.
    pub fn from_source(source: &SourceConfig) -> Result<Self> {
        Self::new(
            source.strategy,
            &source.table_selector,
            &source.heading_selector,
            &source.keywords,
        )
    }

    /// Classify every matching table in document order.
    pub fn classify_document<'a>(&self, document: &'a Html) -> Vec<CandidateTable<'a>> {
        let mut last_heading: Option<ElementRef<'a>> = None;
        let mut candidates = Vec::new();

        for node in document.root_element().descendants() {
            let Some(element) = ElementRef::wrap(node) else {
                continue;
            };
            if self.heading_selector.matches(&element) {
                last_heading = Some(element);
            }
            if self.table_selector.matches(&element) {
                let heading = caption_of(element).or(last_heading);
                candidates.push(CandidateTable {
                    table: element,
                    category: self.classify_table(element, heading),
                });
            }
        }

        candidates
    }

    fn classify_table(&self, table: ElementRef<'_>, heading: Option<ElementRef<'_>>) -> Option<Category> {
        let by_heading = || heading.and_then(|h| self.classify_heading(&element_text(h)));
        match self.strategy {
            ClassifierStrategy::Heading => by_heading(),
            ClassifierStrategy::Content => self.classify_content(table),
            ClassifierStrategy::HeadingThenContent => {
                by_heading().or_else(|| self.classify_content(table))
            }
        }
    }

    /// Classify heading text against the rule list.
    pub fn classify_heading(&self, heading: &str) -> Option<Category> {
        self.match_rules(&heading.to_lowercase())
    }

    /// Classify a table by its own text content.
    ///
    /// Tables with fewer than two rows, or without any relevance keyword,
    /// are never classified.
    pub fn classify_content(&self, table: ElementRef<'_>) -> Option<Category> {
        if table.select(&self.row_selector).take(2).count() < 2 {
            return None;
        }
        let text = element_text(table).to_lowercase();
        if !self.relevance.iter().any(|k| text.contains(k.as_str())) {
            return None;
        }
        self.match_rules(&text)
    }

    fn match_rules(&self, text_lower: &str) -> Option<Category> {
        self.rules
            .iter()
            .find(|rule| rule.matches(text_lower))
            .map(|rule| rule.category)
    }
}

/// The table's own `<caption>`, which labels it more closely than any heading.
fn caption_of(table: ElementRef<'_>) -> Option<ElementRef<'_>> {
    table
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == "caption")
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ")
}

pub(crate) fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
