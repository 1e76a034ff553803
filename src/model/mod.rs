//! Model loading and inference for the silica predictor
//!
//! The request/response core of the application:
//! - Artifact format and regression families (linear, gradient-boosted trees)
//! - Fixed-order, fixed-name feature schema with boundary validation
//! - Load-once, single-flight artifact cache
//! - Prediction service over a cached model handle

pub mod artifact;
pub mod loader;
pub mod predictor;
pub mod schema;

pub use artifact::{ArtifactMetadata, RegressionArtifact, Regressor};
pub use loader::{LoadedModel, ModelHandle, ModelLoader};
pub use predictor::{Prediction, Predictor, PredictorStatsSnapshot};
pub use schema::{FeatureSchema, FeatureVector};
