//! Interactive prediction session.
//!
//! Owns the interface-layer logic around the model components: the three
//! bounded input controls, the explicit submit action, and the
//! `Idle -> Predicting -> DisplayResult | DisplayError -> Idle` cycle. The
//! session clamps assignments into range and decides whether the model is
//! available before any prediction is attempted; the loader and predictor
//! stay free of presentation concerns.

use crate::config::{ControlSpec, SilicaConfig};
use crate::error::{PredictError, Result, SilicaError};
use crate::model::schema::{AIR_FLOW, AMINE_FLOW, IRON_CONCENTRATE};
use crate::model::{FeatureSchema, ModelLoader, Predictor, PredictorStatsSnapshot};
use std::sync::Arc;
use tracing::{info, warn};

/// Session display state.
///
/// The only triggering event is [`Session::submit`]; no transition happens
/// without explicit user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for input.
    Idle,
    /// A submit is in flight.
    Predicting,
    /// Last submit succeeded; holds the formatted percentage (`"2.50%"`).
    DisplayResult(String),
    /// Last submit failed; holds the user-facing message.
    DisplayError(String),
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }
}

/// A bounded numeric control with clamping assignment.
#[derive(Debug, Clone)]
pub struct BoundedControl {
    label: &'static str,
    spec: ControlSpec,
    value: f64,
}

impl BoundedControl {
    fn new(label: &'static str, spec: ControlSpec) -> Self {
        // Initial values are clamped into range like any other assignment.
        let value = spec.clamp(spec.initial);
        Self { label, spec, value }
    }

    /// Assigns a value, clamped into `[min, max]`. Non-finite values are
    /// rejected before they can reach the feature row.
    fn set(&mut self, value: f64) -> std::result::Result<f64, PredictError> {
        if !value.is_finite() {
            return Err(PredictError::NonFiniteInput {
                field: self.label,
                value,
            });
        }
        self.value = self.spec.clamp(value);
        Ok(self.value)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn spec(&self) -> &ControlSpec {
        &self.spec
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

/// One interactive prediction session.
pub struct Session {
    config: SilicaConfig,
    loader: Arc<ModelLoader>,
    predictor: Predictor,
    iron: BoundedControl,
    air: BoundedControl,
    amine: BoundedControl,
    state: SessionState,
}

impl Session {
    /// Creates a session with its own loader cache.
    pub fn new(config: SilicaConfig) -> Self {
        let loader = Arc::new(ModelLoader::new(FeatureSchema::expected()));
        Self::with_loader(config, loader)
    }

    /// Creates a session over an injected loader cache.
    pub fn with_loader(config: SilicaConfig, loader: Arc<ModelLoader>) -> Self {
        let controls = &config.controls;
        let iron = BoundedControl::new(IRON_CONCENTRATE, controls.iron);
        let air = BoundedControl::new(AIR_FLOW, controls.air);
        let amine = BoundedControl::new(AMINE_FLOW, controls.amine);

        Self {
            config,
            loader,
            predictor: Predictor::new(),
            iron,
            air,
            amine,
            state: SessionState::Idle,
        }
    }

    /// Sets the iron concentrate control, returning the clamped value.
    pub fn set_iron(&mut self, value: f64) -> Result<f64> {
        // Any user action after a displayed outcome returns the session to idle.
        self.state = SessionState::Idle;
        self.iron.set(value).map_err(SilicaError::Predict)
    }

    /// Sets the air flow control, returning the clamped value.
    pub fn set_air(&mut self, value: f64) -> Result<f64> {
        self.state = SessionState::Idle;
        self.air.set(value).map_err(SilicaError::Predict)
    }

    /// Sets the amine flow control, returning the clamped value.
    pub fn set_amine(&mut self, value: f64) -> Result<f64> {
        self.state = SessionState::Idle;
        self.amine.set(value).map_err(SilicaError::Predict)
    }

    /// Runs the submit action: load-if-needed, then predict.
    ///
    /// A load failure short-circuits with a warning message; the prediction
    /// service is never invoked without a loaded handle. Either way the
    /// controls keep their values and the session stays usable.
    pub async fn submit(&mut self) -> SessionState {
        self.state = SessionState::Predicting;

        let handle = match self.loader.load(&self.config.model.path).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(error = %e, "model unavailable, prediction not attempted");
                self.state = SessionState::DisplayError(format!(
                    "The model could not be loaded: {}. Verify the model artifact path.",
                    e
                ));
                return self.state.clone();
            }
        };

        match self.predictor.predict(
            &handle,
            self.iron.value(),
            self.air.value(),
            self.amine.value(),
        ) {
            Ok(prediction) => {
                info!(
                    request_id = %prediction.request_id,
                    value = prediction.value,
                    "prediction rendered"
                );
                self.state = SessionState::DisplayResult(format!("{:.2}%", prediction.value));
            }
            Err(e) => {
                warn!(error = %e, "prediction failed");
                self.state =
                    SessionState::DisplayError(format!("An error occurred during prediction: {}", e));
            }
        }

        self.state.clone()
    }

    /// Returns the session to idle after an outcome has been rendered.
    pub fn acknowledge(&mut self) {
        self.state = SessionState::Idle;
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Current control values as `(iron, air, amine)`.
    pub fn values(&self) -> (f64, f64, f64) {
        (self.iron.value(), self.air.value(), self.amine.value())
    }

    pub fn controls(&self) -> [&BoundedControl; 3] {
        [&self.iron, &self.air, &self.amine]
    }

    pub fn config(&self) -> &SilicaConfig {
        &self.config
    }

    /// Prediction service statistics for this session.
    pub fn stats(&self) -> PredictorStatsSnapshot {
        self.predictor.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::artifact::{
        ArtifactMetadata, LinearModel, RegressionArtifact, RegressionTree, Regressor,
        TreeEnsemble, TreeNode,
    };
    use std::path::{Path, PathBuf};

    fn stub_config(dir: &Path, file: &str) -> SilicaConfig {
        let mut config = SilicaConfig::default();
        config.model.path = dir.join(file);
        config
    }

    fn write_stub_artifact(path: &PathBuf, value: f64) {
        let artifact = RegressionArtifact::new(
            ArtifactMetadata::new("stub", "xgboost"),
            FeatureSchema::expected(),
            Regressor::Linear(LinearModel {
                intercept: value,
                coefficients: vec![0.0, 0.0, 0.0],
            }),
        );
        std::fs::write(path, artifact.encode().unwrap()).unwrap();
    }

    #[test]
    fn test_controls_start_at_initial_values() {
        let session = Session::new(SilicaConfig::default());
        assert_eq!(session.values(), (65.0, 200.0, 350.0));
        assert!(session.state().is_idle());
    }

    #[test]
    fn test_assignment_clamps_into_range() {
        let mut session = Session::new(SilicaConfig::default());

        assert_eq!(session.set_iron(100.0).unwrap(), 68.01);
        assert_eq!(session.set_air(0.0).unwrap(), 175.84734);
        assert_eq!(session.set_amine(300.0).unwrap(), 300.0);
        assert_eq!(session.values(), (68.01, 175.84734, 300.0));
    }

    #[test]
    fn test_non_finite_assignment_rejected() {
        let mut session = Session::new(SilicaConfig::default());
        assert!(session.set_air(f64::NAN).is_err());
        // Value unchanged after the rejection.
        assert_eq!(session.values().1, 200.0);
    }

    #[tokio::test]
    async fn test_submit_renders_two_decimal_percentage() {
        let dir = tempfile::tempdir().unwrap();
        let config = stub_config(dir.path(), "modelo.bin");
        write_stub_artifact(&config.model.path, 2.5);

        let mut session = Session::new(config);
        let state = session.submit().await;
        assert_eq!(state, SessionState::DisplayResult("2.50%".to_string()));

        session.acknowledge();
        assert!(session.state().is_idle());
    }

    #[tokio::test]
    async fn test_missing_artifact_warns_and_skips_predict() {
        let dir = tempfile::tempdir().unwrap();
        let config = stub_config(dir.path(), "missing.bin");

        let mut session = Session::new(config);
        match session.submit().await {
            SessionState::DisplayError(msg) => {
                assert!(msg.contains("could not be loaded"));
            }
            other => panic!("expected DisplayError, got {:?}", other),
        }

        // The prediction service was never invoked.
        assert_eq!(session.stats().total_requests, 0);
        // Controls keep their values for the retry.
        assert_eq!(session.values(), (65.0, 200.0, 350.0));
    }

    #[tokio::test]
    async fn test_inference_fault_surfaces_cause_text() {
        let dir = tempfile::tempdir().unwrap();
        let config = stub_config(dir.path(), "modelo.bin");

        // Well-formed artifact whose tree references a feature the row
        // does not have: decodes and passes the schema check, then faults
        // at inference time.
        let artifact = RegressionArtifact::new(
            ArtifactMetadata::new("broken", "xgboost"),
            FeatureSchema::expected(),
            Regressor::GradientBoosted(TreeEnsemble {
                base_score: 0.0,
                trees: vec![RegressionTree {
                    nodes: vec![
                        TreeNode::Split {
                            feature: 7,
                            threshold: 0.0,
                            left: 1,
                            right: 1,
                        },
                        TreeNode::Leaf { value: 0.0 },
                    ],
                }],
            }),
        );
        std::fs::write(&config.model.path, artifact.encode().unwrap()).unwrap();

        let mut session = Session::new(config);
        match session.submit().await {
            SessionState::DisplayError(msg) => {
                assert!(msg.contains("feature index 7"));
            }
            other => panic!("expected DisplayError, got {:?}", other),
        }

        // Still usable: controls retained, next action returns to idle.
        assert_eq!(session.values(), (65.0, 200.0, 350.0));
        session.set_iron(66.0).unwrap();
        assert!(session.state().is_idle());
    }

    #[tokio::test]
    async fn test_repeat_submit_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let config = stub_config(dir.path(), "modelo.bin");
        write_stub_artifact(&config.model.path, 3.14159);

        let mut session = Session::new(config);
        let first = session.submit().await;
        let second = session.submit().await;
        assert_eq!(first, second);
        assert_eq!(first, SessionState::DisplayResult("3.14%".to_string()));
    }
}
