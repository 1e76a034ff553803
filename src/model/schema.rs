// Feature schema and typed input row

use crate::error::PredictError;
use serde::{Deserialize, Serialize};

/// Column label for the iron concentrate feature.
pub const IRON_CONCENTRATE: &str = "% Iron Concentrate";
/// Column label for the flotation column air flow feature.
pub const AIR_FLOW: &str = "Flotation Column 01 Air Flow";
/// Column label for the amine reagent flow feature.
pub const AMINE_FLOW: &str = "Amina Flow";

/// Ordered feature columns a regression artifact was trained on.
///
/// Column order and names must exactly match what the model expects;
/// a mismatch is rejected at load time, never downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    /// Column names in training order
    pub columns: Vec<String>,
}

impl FeatureSchema {
    /// The schema this build predicts with.
    pub fn expected() -> Self {
        Self {
            columns: vec![
                IRON_CONCENTRATE.to_string(),
                AIR_FLOW.to_string(),
                AMINE_FLOW.to_string(),
            ],
        }
    }

    /// Number of feature columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Checks another schema for an exact name-and-order match.
    pub fn matches(&self, other: &FeatureSchema) -> bool {
        self.columns == other.columns
    }

    /// Human-readable description of a mismatch against this schema.
    pub fn describe_mismatch(&self, other: &FeatureSchema) -> String {
        format!(
            "expected columns {:?}, artifact declares {:?}",
            self.columns, other.columns
        )
    }
}

/// One labeled input row for the regression model.
///
/// Fields are kept in training order; [`FeatureVector::to_row`] and
/// [`FeatureVector::labels`] always agree on that order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Iron recovered in the froth after separation (%)
    pub iron_concentrate_pct: f64,
    /// Air injected through the column dispersion system
    pub air_flow: f64,
    /// Amine collector reagent dosage fed to the column
    pub amine_flow: f64,
}

impl FeatureVector {
    /// Builds a feature vector, rejecting non-finite components.
    ///
    /// Range bounds are the calling layer's responsibility; this type only
    /// guarantees the values are real numbers.
    pub fn new(iron: f64, air: f64, amine: f64) -> Result<Self, PredictError> {
        for (field, value) in [
            (IRON_CONCENTRATE, iron),
            (AIR_FLOW, air),
            (AMINE_FLOW, amine),
        ] {
            if !value.is_finite() {
                return Err(PredictError::NonFiniteInput { field, value });
            }
        }

        Ok(Self {
            iron_concentrate_pct: iron,
            air_flow: air,
            amine_flow: amine,
        })
    }

    /// The row values in training order.
    pub fn to_row(&self) -> [f64; 3] {
        [self.iron_concentrate_pct, self.air_flow, self.amine_flow]
    }

    /// The column labels in training order.
    pub fn labels() -> [&'static str; 3] {
        [IRON_CONCENTRATE, AIR_FLOW, AMINE_FLOW]
    }

    /// Labeled row, for logging and diagnostics.
    pub fn labeled_row(&self) -> Vec<(&'static str, f64)> {
        Self::labels().into_iter().zip(self.to_row()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_schema_order() {
        let schema = FeatureSchema::expected();
        assert_eq!(
            schema.columns,
            vec![
                "% Iron Concentrate",
                "Flotation Column 01 Air Flow",
                "Amina Flow"
            ]
        );
        assert_eq!(schema.len(), 3);
    }

    #[test]
    fn test_row_assembly_preserves_order() {
        let features = FeatureVector::new(65.0, 200.0, 350.0).unwrap();
        assert_eq!(features.to_row(), [65.0, 200.0, 350.0]);
        assert_eq!(
            FeatureVector::labels(),
            [
                "% Iron Concentrate",
                "Flotation Column 01 Air Flow",
                "Amina Flow"
            ]
        );
        assert_eq!(
            features.labeled_row(),
            vec![
                ("% Iron Concentrate", 65.0),
                ("Flotation Column 01 Air Flow", 200.0),
                ("Amina Flow", 350.0)
            ]
        );
    }

    #[test]
    fn test_non_finite_components_rejected() {
        assert!(FeatureVector::new(f64::NAN, 200.0, 350.0).is_err());
        assert!(FeatureVector::new(65.0, f64::INFINITY, 350.0).is_err());
        assert!(FeatureVector::new(65.0, 200.0, f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_schema_mismatch_detection() {
        let expected = FeatureSchema::expected();
        let reordered = FeatureSchema {
            columns: vec![
                AIR_FLOW.to_string(),
                IRON_CONCENTRATE.to_string(),
                AMINE_FLOW.to_string(),
            ],
        };
        assert!(!expected.matches(&reordered));
        assert!(expected.describe_mismatch(&reordered).contains("Amina Flow"));
    }
}
