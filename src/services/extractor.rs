// src/services/extractor.rs

//! Row extractor.
//!
//! Walks the data rows of a classified table and turns positional cells
//! into [`IpoRecord`]s. Bad rows are rejected with a reason and reported
//! to the diagnostic sink; they never abort the rest of the table.

use std::fmt;

use scraper::{ElementRef, Selector};

use crate::diagnostics::DiagnosticSink;
use crate::error::Result;
use crate::models::{Category, ColumnLayout, ExtractionConfig, IpoRecord};
use crate::services::classifier::parse_selector;
use crate::services::normalize::{
    clean_cell, close_date_or_tba, parse_lot_size, parse_price_range,
};

/// Minimum length of a plausible company name, in characters.
const MIN_COMPANY_CHARS: usize = 2;

/// Why a row produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRejection {
    TooFewCells { found: usize, required: usize },
    EmptyCompany,
    CompanyTooShort(String),
    HeaderRow(String),
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewCells { found, required } => {
                write!(f, "{found} cells, need at least {required}")
            }
            Self::EmptyCompany => write!(f, "empty company cell"),
            Self::CompanyTooShort(name) => write!(f, "company name '{name}' too short"),
            Self::HeaderRow(name) => write!(f, "header token '{name}' in company cell"),
        }
    }
}

/// Descriptive tags stamped onto every record from a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTags {
    pub exchange: String,
    pub ipo_type: String,
}

/// Extracts records of one category from tables.
#[derive(Debug, Clone)]
pub struct RowExtractor {
    category: Category,
    max_rows: usize,
    min_columns: usize,
    columns: ColumnLayout,
    header_tokens: Vec<String>,
    tags: RecordTags,
    row_selector: Selector,
    cell_selector: Selector,
}

impl RowExtractor {
    pub fn new(
        category: Category,
        config: &ExtractionConfig,
        header_tokens: &[String],
        tags: RecordTags,
    ) -> Result<Self> {
        Ok(Self {
            category,
            max_rows: config.max_rows,
            min_columns: config.min_columns,
            columns: config.columns.clone(),
            header_tokens: header_tokens.iter().map(|t| t.to_lowercase()).collect(),
            tags,
            row_selector: parse_selector("tr")?,
            cell_selector: parse_selector("td")?,
        })
    }

    /// Extract records from one table, skipping the header row.
    ///
    /// Rows past `max_rows` are ignored. Rejected rows are reported to
    /// `sink` at debug level.
    pub fn extract_table(&self, table: ElementRef<'_>, sink: &dyn DiagnosticSink) -> Vec<IpoRecord> {
        let rows: Vec<ElementRef<'_>> = table.select(&self.row_selector).collect();
        if rows.len() < 2 {
            sink.debug(&format!(
                "Skipping {} table with no data rows",
                self.category
            ));
            return Vec::new();
        }

        rows.iter()
            .skip(1)
            .take(self.max_rows)
            .enumerate()
            .fold(Vec::new(), |mut records, (index, row)| {
                let cells: Vec<String> = row
                    .select(&self.cell_selector)
                    .map(|td| clean_cell(&td.text().collect::<String>()))
                    .collect();

                match self.build_record(&cells) {
                    Ok(record) => records.push(record),
                    Err(reason) => sink.debug(&format!(
                        "Skipped {} row {}: {}",
                        self.category,
                        index + 1,
                        reason
                    )),
                }
                records
            })
    }

    /// Build a record from the cleaned cells of one data row.
    pub fn build_record(&self, cells: &[String]) -> std::result::Result<IpoRecord, RowRejection> {
        if cells.len() < self.min_columns {
            return Err(RowRejection::TooFewCells {
                found: cells.len(),
                required: self.min_columns,
            });
        }

        let cell = |index: usize| cells.get(index).map(String::as_str).unwrap_or("");
        let optional_cell = |index: Option<usize>| index.map(cell).unwrap_or("");

        let company = cell(self.columns.company);
        if company.is_empty() {
            return Err(RowRejection::EmptyCompany);
        }
        if company.chars().count() < MIN_COMPANY_CHARS {
            return Err(RowRejection::CompanyTooShort(company.to_string()));
        }
        let company_lower = company.to_lowercase();
        if self.header_tokens.iter().any(|t| *t == company_lower) {
            return Err(RowRejection::HeaderRow(company.to_string()));
        }

        let (price_low, price_high) = parse_price_range(cell(self.columns.price));
        let lot_size = match self.category {
            Category::Current => parse_lot_size(optional_cell(self.columns.lot_size)),
            Category::Upcoming => 0,
        };

        Ok(IpoRecord {
            company: company.to_string(),
            price_low,
            price_high,
            open_date: cell(self.columns.open_date).to_string(),
            close_date: close_date_or_tba(optional_cell(self.columns.close_date)),
            lot_size,
            status: self.category.status(),
            exchange: self.tags.exchange.clone(),
            ipo_type: self.tags.ipo_type.clone(),
        })
    }
}
