//! IPO record data structures.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder used when a listing has no close date yet.
pub const TBA: &str = "TBA";

/// Listing category requested from a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// IPOs currently open for subscription
    Current,
    /// IPOs announced but not yet open
    Upcoming,
}

impl Category {
    /// Status stamped on records extracted for this category.
    pub fn status(self) -> IpoStatus {
        match self {
            Category::Current => IpoStatus::Open,
            Category::Upcoming => IpoStatus::Upcoming,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Current => "current",
            Category::Upcoming => "upcoming",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscription status of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpoStatus {
    Open,
    Upcoming,
}

/// A single IPO listing as served to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IpoRecord {
    /// Company name, trimmed and never a header token
    pub company: String,

    /// Lower bound of the price band (0 when unknown)
    pub price_low: u32,

    /// Upper bound of the price band (equals `price_low` for a fixed price)
    pub price_high: u32,

    /// Subscription open date as displayed by the source
    pub open_date: String,

    /// Subscription close date as displayed by the source, or "TBA"
    pub close_date: String,

    /// Minimum shares per application (0 for upcoming listings)
    pub lot_size: u32,

    pub status: IpoStatus,

    /// Exchange tag, e.g. "NSE+BSE"
    pub exchange: String,

    /// Issue type tag, e.g. "Mainboard"
    #[serde(rename = "type")]
    pub ipo_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> IpoRecord {
        IpoRecord {
            company: "Acme Corp".to_string(),
            price_low: 100,
            price_high: 120,
            open_date: "01 Mar".to_string(),
            close_date: "05 Mar".to_string(),
            lot_size: 50,
            status: IpoStatus::Open,
            exchange: "NSE+BSE".to_string(),
            ipo_type: "Mainboard".to_string(),
        }
    }

    #[test]
    fn serializes_with_client_field_names() {
        let value = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(value["company"], "Acme Corp");
        assert_eq!(value["priceLow"], 100);
        assert_eq!(value["priceHigh"], 120);
        assert_eq!(value["openDate"], "01 Mar");
        assert_eq!(value["closeDate"], "05 Mar");
        assert_eq!(value["lotSize"], 50);
        assert_eq!(value["status"], "open");
        assert_eq!(value["type"], "Mainboard");
    }

    #[test]
    fn category_maps_to_status() {
        assert_eq!(Category::Current.status(), IpoStatus::Open);
        assert_eq!(Category::Upcoming.status(), IpoStatus::Upcoming);
        assert_eq!(Category::Upcoming.to_string(), "upcoming");
    }
}
