// Serialized regression artifact: on-disk format and inference entry point

use super::schema::FeatureSchema;
use crate::error::{LoadError, PredictError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Magic bytes identifying a silica model artifact.
pub const ARTIFACT_MAGIC: [u8; 4] = *b"SLCA";
/// Current artifact format version.
pub const ARTIFACT_VERSION: u16 = 1;

/// Artifact metadata carried alongside the regressor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Model name
    pub name: String,
    /// Training framework the weights were exported from
    pub framework: String,
    /// When the model was trained
    pub trained_at: Option<DateTime<Utc>>,
    /// Evaluation metrics recorded at export time
    pub metrics: HashMap<String, f64>,
}

impl ArtifactMetadata {
    pub fn new(name: &str, framework: &str) -> Self {
        Self {
            name: name.to_string(),
            framework: framework.to_string(),
            trained_at: None,
            metrics: HashMap::new(),
        }
    }

    pub fn with_metric(mut self, name: &str, value: f64) -> Self {
        self.metrics.insert(name.to_string(), value);
        self
    }
}

/// A pre-trained regression model in one of the supported families.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Regressor {
    /// Linear model: intercept + one coefficient per feature
    Linear(LinearModel),
    /// Gradient-boosted ensemble of binary regression trees
    GradientBoosted(TreeEnsemble),
}

/// Linear regression weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    fn predict_row(&self, row: &[f64]) -> Result<f64, PredictError> {
        if self.coefficients.len() != row.len() {
            return Err(PredictError::Inference(format!(
                "linear model has {} coefficients but the row has {} values",
                self.coefficients.len(),
                row.len()
            )));
        }
        let dot: f64 = self
            .coefficients
            .iter()
            .zip(row.iter())
            .map(|(c, v)| c * v)
            .sum();
        Ok(self.intercept + dot)
    }
}

/// Gradient-boosted tree ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsemble {
    /// Global bias added before the tree contributions
    pub base_score: f64,
    pub trees: Vec<RegressionTree>,
}

impl TreeEnsemble {
    fn predict_row(&self, row: &[f64]) -> Result<f64, PredictError> {
        let mut score = self.base_score;
        for (i, tree) in self.trees.iter().enumerate() {
            score += tree.predict_row(row).map_err(|e| {
                PredictError::Inference(format!("tree {}: {}", i, e))
            })?;
        }
        Ok(score)
    }
}

/// One binary regression tree stored as a flat node array, root at index 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

/// Tree node: an internal split or a terminal leaf value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: u32,
        right: u32,
    },
    Leaf {
        value: f64,
    },
}

impl RegressionTree {
    fn predict_row(&self, row: &[f64]) -> Result<f64, PredictError> {
        let mut idx = 0usize;
        // Bounded walk: malformed child links must not loop forever.
        for _ in 0..=self.nodes.len() {
            let node = self.nodes.get(idx).ok_or_else(|| {
                PredictError::Inference(format!("node index {} out of bounds", idx))
            })?;
            match node {
                TreeNode::Leaf { value } => return Ok(*value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row.get(*feature).copied().ok_or_else(|| {
                        PredictError::Inference(format!(
                            "split references feature index {} but the row has {} values",
                            feature,
                            row.len()
                        ))
                    })?;
                    idx = if value < *threshold {
                        *left as usize
                    } else {
                        *right as usize
                    };
                }
            }
        }
        Err(PredictError::Inference(
            "tree traversal did not reach a leaf".to_string(),
        ))
    }
}

/// A deserialized regression artifact: header fields, metadata, the feature
/// schema it was trained on, and the regressor itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionArtifact {
    magic: [u8; 4],
    version: u16,
    pub metadata: ArtifactMetadata,
    pub schema: FeatureSchema,
    pub model: Regressor,
}

impl RegressionArtifact {
    /// Wraps a regressor in the current artifact format.
    pub fn new(metadata: ArtifactMetadata, schema: FeatureSchema, model: Regressor) -> Self {
        Self {
            magic: ARTIFACT_MAGIC,
            version: ARTIFACT_VERSION,
            metadata,
            schema,
            model,
        }
    }

    /// Encodes the artifact for storage.
    pub fn encode(&self) -> Result<Vec<u8>, LoadError> {
        bincode::serialize(self)
            .map_err(|e| LoadError::Corrupt(format!("failed to encode artifact: {}", e)))
    }

    /// Decodes an artifact from raw bytes.
    ///
    /// The magic and version prefix is checked before the payload so an
    /// unrelated or future-format file reports [`LoadError::IncompatibleFormat`]
    /// rather than a generic decode failure.
    pub fn decode(bytes: &[u8]) -> Result<Self, LoadError> {
        if bytes.len() < 6 {
            return Err(LoadError::Corrupt(format!(
                "artifact is {} bytes, shorter than the fixed header",
                bytes.len()
            )));
        }
        if bytes[0..4] != ARTIFACT_MAGIC {
            return Err(LoadError::IncompatibleFormat(
                "bad magic bytes, not a silica model artifact".to_string(),
            ));
        }
        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != ARTIFACT_VERSION {
            return Err(LoadError::IncompatibleFormat(format!(
                "artifact format version {} is not supported (expected {})",
                version, ARTIFACT_VERSION
            )));
        }

        bincode::deserialize(bytes)
            .map_err(|e| LoadError::Corrupt(format!("failed to decode artifact: {}", e)))
    }

    /// Runs inference on one row in training order.
    ///
    /// The row must carry exactly one value per schema column; the caller is
    /// expected to have assembled it from a validated feature vector.
    pub fn predict_row(&self, row: &[f64]) -> Result<f64, PredictError> {
        if row.len() != self.schema.len() {
            return Err(PredictError::SchemaMismatch(format!(
                "row has {} values, schema declares {} columns",
                row.len(),
                self.schema.len()
            )));
        }
        match &self.model {
            Regressor::Linear(model) => model.predict_row(row),
            Regressor::GradientBoosted(ensemble) => ensemble.predict_row(row),
        }
    }
}
