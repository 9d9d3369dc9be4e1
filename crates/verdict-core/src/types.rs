//! Shared record types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Class index of the positive label (spam, churn) in binary models
pub const POSITIVE_CLASS: usize = 1;

/// Class index of the negative label (ham, retained) in binary models
pub const NEGATIVE_CLASS: usize = 0;

/// One customer as seen by the churn models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    #[serde(rename = "Age")]
    pub age: i64,

    #[serde(rename = "Gender")]
    pub gender: String,

    #[serde(rename = "Location")]
    pub location: String,

    #[serde(rename = "Subscription_Length_Months")]
    pub subscription_length_months: i64,

    #[serde(rename = "Monthly_Bill")]
    pub monthly_bill: f64,

    #[serde(rename = "Total_Usage_GB")]
    pub total_usage_gb: i64,
}

impl CustomerRecord {
    /// Numeric columns in encoder order
    pub const NUMERIC_COLUMNS: [&'static str; 4] = [
        "Age",
        "Subscription_Length_Months",
        "Monthly_Bill",
        "Total_Usage_GB",
    ];

    /// Categorical columns in encoder order
    pub const CATEGORICAL_COLUMNS: [&'static str; 2] = ["Gender", "Location"];

    /// Numeric values in [`Self::NUMERIC_COLUMNS`] order
    pub fn numeric_values(&self) -> [f64; 4] {
        [
            self.age as f64,
            self.subscription_length_months as f64,
            self.monthly_bill,
            self.total_usage_gb as f64,
        ]
    }

    /// Categorical values in [`Self::CATEGORICAL_COLUMNS`] order
    pub fn categorical_values(&self) -> [&str; 2] {
        [&self.gender, &self.location]
    }
}

/// Label of a spam dataset row or feedback submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpamLabel {
    Spam,
    Ham,
}

impl SpamLabel {
    /// Parse a dataset label; only `spam`/`ham` (any case) are recognized
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("spam") {
            Some(Self::Spam)
        } else if raw.eq_ignore_ascii_case("ham") {
            Some(Self::Ham)
        } else {
            None
        }
    }

    /// Class index used by the spam models
    pub fn class_index(self) -> usize {
        match self {
            Self::Spam => POSITIVE_CLASS,
            Self::Ham => NEGATIVE_CLASS,
        }
    }
}

impl fmt::Display for SpamLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spam => f.write_str("Spam"),
            Self::Ham => f.write_str("Ham"),
        }
    }
}
