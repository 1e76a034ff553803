// Prediction service: feature row assembly and model invocation

use super::loader::ModelHandle;
use super::schema::FeatureVector;
use crate::error::PredictError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// One completed prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Request ID
    pub request_id: String,
    /// Predicted silica concentrate percentage, unrounded
    pub value: f64,
    /// The inputs the row was assembled from
    pub features: FeatureVector,
    /// Prediction timestamp
    pub predicted_at: DateTime<Utc>,
    /// Inference time in microseconds
    pub inference_time_us: u64,
}

/// Prediction service statistics.
#[derive(Default)]
pub struct PredictorStats {
    pub total_requests: AtomicU64,
    pub successful_requests: AtomicU64,
    pub failed_requests: AtomicU64,
    pub total_inference_time_us: AtomicU64,
}

/// Statistics snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorStatsSnapshot {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub avg_inference_time_us: u64,
}

/// Stateless prediction service over a loaded model handle.
///
/// Pure given the handle: identical inputs against the same model produce
/// identical outputs, and nothing here touches the filesystem.
#[derive(Default)]
pub struct Predictor {
    stats: PredictorStats,
}

impl Predictor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one prediction.
    ///
    /// The caller must hold a successfully loaded handle and is responsible
    /// for bounding the inputs to their operating ranges; this service only
    /// re-checks finiteness before assembling the row.
    pub fn predict(
        &self,
        handle: &ModelHandle,
        iron: f64,
        air: f64,
        amine: f64,
    ) -> Result<Prediction, PredictError> {
        self.stats.total_requests.fetch_add(1, Ordering::Relaxed);

        let result = self.run(handle, iron, air, amine);
        match &result {
            Ok(prediction) => {
                self.stats
                    .successful_requests
                    .fetch_add(1, Ordering::Relaxed);
                self.stats
                    .total_inference_time_us
                    .fetch_add(prediction.inference_time_us, Ordering::Relaxed);
            }
            Err(_) => {
                self.stats.failed_requests.fetch_add(1, Ordering::Relaxed);
            }
        }
        result
    }

    fn run(
        &self,
        handle: &ModelHandle,
        iron: f64,
        air: f64,
        amine: f64,
    ) -> Result<Prediction, PredictError> {
        let features = FeatureVector::new(iron, air, amine)?;
        let row = features.to_row();

        let start = std::time::Instant::now();
        let value = handle.artifact().predict_row(&row)?;
        let inference_time = start.elapsed();

        if !value.is_finite() {
            return Err(PredictError::Inference(format!(
                "model produced a non-finite value: {}",
                value
            )));
        }

        let prediction = Prediction {
            request_id: uuid::Uuid::new_v4().to_string(),
            value,
            features,
            predicted_at: Utc::now(),
            inference_time_us: inference_time.as_micros() as u64,
        };

        debug!(
            request_id = %prediction.request_id,
            value = prediction.value,
            row = ?features.labeled_row(),
            "prediction complete"
        );

        Ok(prediction)
    }

    /// Gets a statistics snapshot.
    pub fn stats(&self) -> PredictorStatsSnapshot {
        let successful = self.stats.successful_requests.load(Ordering::Relaxed);
        let total_time = self.stats.total_inference_time_us.load(Ordering::Relaxed);

        PredictorStatsSnapshot {
            total_requests: self.stats.total_requests.load(Ordering::Relaxed),
            successful_requests: successful,
            failed_requests: self.stats.failed_requests.load(Ordering::Relaxed),
            avg_inference_time_us: if successful > 0 {
                total_time / successful
            } else {
                0
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::artifact::{
        ArtifactMetadata, LinearModel, RegressionArtifact, Regressor,
    };
    use crate::model::loader::{ModelLoader, ModelHandle};
    use crate::model::schema::FeatureSchema;
    use std::path::Path;

    async fn stub_handle(dir: &Path, value: f64) -> ModelHandle {
        let artifact = RegressionArtifact::new(
            ArtifactMetadata::new("stub", "xgboost"),
            FeatureSchema::expected(),
            Regressor::Linear(LinearModel {
                intercept: value,
                coefficients: vec![0.0, 0.0, 0.0],
            }),
        );
        let path = dir.join("stub.bin");
        std::fs::write(&path, artifact.encode().unwrap()).unwrap();
        ModelLoader::new(FeatureSchema::expected())
            .load(&path)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_in_range_inputs_produce_finite_value() {
        let dir = tempfile::tempdir().unwrap();
        let handle = stub_handle(dir.path(), 2.5).await;
        let predictor = Predictor::new();

        for (iron, air, amine) in [
            (62.05, 175.84734, 241.70237),
            (65.0, 200.0, 350.0),
            (68.01, 372.44264, 739.304),
        ] {
            let prediction = predictor.predict(&handle, iron, air, amine).unwrap();
            assert!(prediction.value.is_finite());
        }
    }

    #[tokio::test]
    async fn test_non_finite_input_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let handle = stub_handle(dir.path(), 2.5).await;
        let predictor = Predictor::new();

        let err = predictor
            .predict(&handle, f64::NAN, 200.0, 350.0)
            .unwrap_err();
        assert!(matches!(err, PredictError::NonFiniteInput { .. }));

        let stats = predictor.stats();
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.failed_requests, 1);
    }

    #[tokio::test]
    async fn test_predict_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let handle = stub_handle(dir.path(), 2.5).await;
        let predictor = Predictor::new();

        let first = predictor.predict(&handle, 65.0, 200.0, 350.0).unwrap();
        let second = predictor.predict(&handle, 65.0, 200.0, 350.0).unwrap();
        assert_eq!(first.value.to_bits(), second.value.to_bits());
    }

    #[tokio::test]
    async fn test_stats_track_successes() {
        let dir = tempfile::tempdir().unwrap();
        let handle = stub_handle(dir.path(), 2.5).await;
        let predictor = Predictor::new();

        predictor.predict(&handle, 65.0, 200.0, 350.0).unwrap();
        predictor.predict(&handle, 64.0, 210.0, 360.0).unwrap();

        let stats = predictor.stats();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.successful_requests, 2);
        assert_eq!(stats.failed_requests, 0);
    }
}
