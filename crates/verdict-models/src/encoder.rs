//! Column encoder for customer records

use crate::preprocessor::Preprocessor;
use linfa::prelude::*;
use linfa_preprocessing::linear_scaling::LinearScaler;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use verdict_core::{CustomerRecord, Error, Result};

const NUMERIC: usize = CustomerRecord::NUMERIC_COLUMNS.len();
const CATEGORICAL: usize = CustomerRecord::CATEGORICAL_COLUMNS.len();

/// Standard-scales numeric columns and one-hot encodes categorical ones.
///
/// Output layout: scaled numeric columns, then one indicator per known
/// category of each categorical column in sorted order. Unknown categories
/// encode as all zeros.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnEncoder {
    scaler: LinearScaler<f64>,
    categories: Vec<Vec<String>>,
}

fn numeric_matrix(records: &[&CustomerRecord]) -> Array2<f64> {
    Array2::from_shape_fn((records.len(), NUMERIC), |(i, j)| records[i].numeric_values()[j])
}

impl ColumnEncoder {
    /// Fit scaling statistics and category lists
    pub fn fit(records: &[&CustomerRecord]) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::training("cannot fit an encoder on zero records"));
        }

        let numeric = DatasetBase::from(numeric_matrix(records));
        let scaler = LinearScaler::standard()
            .fit(&numeric)
            .map_err(|e| Error::training(format!("column scaler: {}", e)))?;

        let mut seen: Vec<BTreeSet<String>> = vec![BTreeSet::new(); CATEGORICAL];
        for record in records {
            for (set, value) in seen.iter_mut().zip(record.categorical_values()) {
                set.insert(value.to_string());
            }
        }
        let categories = seen.into_iter().map(|s| s.into_iter().collect()).collect();

        let encoder = Self { scaler, categories };
        encoder.validate()?;
        Ok(encoder)
    }

    /// Check the encoder's shape after deserialization
    pub fn validate(&self) -> Result<()> {
        let offsets = self.scaler.offsets();
        let scales = self.scaler.scales();
        if offsets.len() != NUMERIC || scales.len() != NUMERIC {
            return Err(Error::artifact(format!(
                "encoder expects {} numeric columns, artifact has {} offsets and {} scales",
                NUMERIC,
                offsets.len(),
                scales.len()
            )));
        }
        if self.categories.len() != CATEGORICAL {
            return Err(Error::artifact(format!(
                "encoder expects {} categorical columns, artifact has {}",
                CATEGORICAL,
                self.categories.len()
            )));
        }
        if offsets.iter().chain(scales.iter()).any(|v| !v.is_finite()) {
            return Err(Error::artifact("encoder has a non-finite offset or scale"));
        }
        Ok(())
    }

    /// Known categories per categorical column
    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }

    /// Encode one record
    pub fn encode(&self, record: &CustomerRecord) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.width());

        let scaled = self.scaler.transform(numeric_matrix(&[record]));
        row.extend(scaled.iter().copied());

        for (known, value) in self.categories.iter().zip(record.categorical_values()) {
            let hit = known.binary_search_by(|c| c.as_str().cmp(value)).ok();
            row.extend((0..known.len()).map(|j| if Some(j) == hit { 1.0 } else { 0.0 }));
        }

        row
    }

    fn width(&self) -> usize {
        NUMERIC + self.categories.iter().map(Vec::len).sum::<usize>()
    }
}

impl Preprocessor<CustomerRecord> for ColumnEncoder {
    fn transform(&self, input: &CustomerRecord) -> Result<Vec<f64>> {
        Ok(self.encode(input))
    }

    fn n_features(&self) -> usize {
        self.width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(age: i64, gender: &str, location: &str, bill: f64) -> CustomerRecord {
        CustomerRecord {
            age,
            gender: gender.to_string(),
            location: location.to_string(),
            subscription_length_months: age / 2,
            monthly_bill: bill,
            total_usage_gb: age * 5,
        }
    }

    #[test]
    fn test_fit_and_encode() {
        let a = customer(20, "Male", "Miami", 50.0);
        let b = customer(40, "Female", "Chicago", 70.0);
        let encoder = ColumnEncoder::fit(&[&a, &b]).unwrap();

        assert_eq!(encoder.categories()[0], vec!["Female", "Male"]);
        assert_eq!(encoder.categories()[1], vec!["Chicago", "Miami"]);
        assert_eq!(encoder.n_features(), 4 + 2 + 2);

        let row_a = encoder.encode(&a);
        let row_b = encoder.encode(&b);
        assert_eq!(row_a.len(), 8);
        // two records centre symmetrically around the mean
        assert!(row_a[0] < 0.0);
        assert!((row_a[0] + row_b[0]).abs() < 1e-9);
        assert!(row_a.iter().all(|v| v.is_finite()));
        assert_eq!(&row_a[4..], &[0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unknown_category_is_all_zero() {
        let a = customer(20, "Male", "Miami", 50.0);
        let b = customer(30, "Male", "Miami", 60.0);
        let encoder = ColumnEncoder::fit(&[&a, &b]).unwrap();
        let row = encoder.encode(&customer(20, "Other", "Nowhere", 50.0));

        assert_eq!(&row[4..], &[0.0, 0.0]);
    }

    #[test]
    fn test_survives_json() {
        let a = customer(20, "Male", "Miami", 50.0);
        let b = customer(40, "Female", "Chicago", 70.0);
        let encoder = ColumnEncoder::fit(&[&a, &b]).unwrap();

        let json = serde_json::to_string(&encoder).unwrap();
        let back: ColumnEncoder = serde_json::from_str(&json).unwrap();
        back.validate().unwrap();
        assert_eq!(back.encode(&a), encoder.encode(&a));
    }

    #[test]
    fn test_validate_rejects_bad_shape() {
        let a = customer(20, "Male", "Miami", 50.0);
        let b = customer(40, "Female", "Chicago", 70.0);
        let mut encoder = ColumnEncoder::fit(&[&a, &b]).unwrap();
        encoder.categories.pop();
        assert!(encoder.validate().is_err());
    }
}
