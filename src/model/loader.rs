// Load-once model cache with single-flight first access

use super::artifact::RegressionArtifact;
use super::schema::FeatureSchema;
use crate::error::LoadError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};
use tracing::{info, warn};

/// Shared handle to a successfully loaded model.
///
/// Write-once, read-many: created by the loader on first successful load of
/// a path and never mutated afterwards.
pub type ModelHandle = Arc<LoadedModel>;

/// A deserialized artifact together with its provenance.
#[derive(Debug)]
pub struct LoadedModel {
    artifact: RegressionArtifact,
    path: PathBuf,
    loaded_at: DateTime<Utc>,
}

impl LoadedModel {
    pub fn artifact(&self) -> &RegressionArtifact {
        &self.artifact
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

/// Memoizing artifact loader, keyed by path.
///
/// Each distinct path is deserialized at most once per process lifetime;
/// concurrent first accesses share a single in-flight load. Failed attempts
/// are not memoized, so an operator can retry after fixing the artifact.
pub struct ModelLoader {
    expected_schema: FeatureSchema,
    entries: RwLock<HashMap<PathBuf, Arc<OnceCell<ModelHandle>>>>,
    attempts: AtomicU64,
}

impl ModelLoader {
    /// Creates a loader that validates artifacts against `expected_schema`.
    pub fn new(expected_schema: FeatureSchema) -> Self {
        Self {
            expected_schema,
            entries: RwLock::new(HashMap::new()),
            attempts: AtomicU64::new(0),
        }
    }

    /// Loads the artifact at `path`, or returns the cached handle.
    pub async fn load(&self, path: &Path) -> Result<ModelHandle, LoadError> {
        let cell = self.entry(path).await;
        let handle = cell
            .get_or_try_init(|| self.load_uncached(path))
            .await?
            .clone();
        Ok(handle)
    }

    /// Returns the cached handle for `path` without touching the filesystem.
    pub async fn peek(&self, path: &Path) -> Option<ModelHandle> {
        let entries = self.entries.read().await;
        entries.get(path).and_then(|cell| cell.get().cloned())
    }

    /// Number of disk load attempts performed so far.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    async fn entry(&self, path: &Path) -> Arc<OnceCell<ModelHandle>> {
        {
            let entries = self.entries.read().await;
            if let Some(cell) = entries.get(path) {
                return cell.clone();
            }
        }
        let mut entries = self.entries.write().await;
        entries
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    async fn load_uncached(&self, path: &Path) -> Result<ModelHandle, LoadError> {
        self.attempts.fetch_add(1, Ordering::Relaxed);

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            let err = match e.kind() {
                io::ErrorKind::NotFound => LoadError::NotFound(path.display().to_string()),
                _ => LoadError::Corrupt(format!("failed to read {}: {}", path.display(), e)),
            };
            warn!(path = %path.display(), error = %err, "model load failed");
            err
        })?;

        let artifact = RegressionArtifact::decode(&bytes).map_err(|e| {
            warn!(path = %path.display(), error = %e, "model decode failed");
            e
        })?;

        if !self.expected_schema.matches(&artifact.schema) {
            let err = LoadError::SchemaMismatch(
                self.expected_schema.describe_mismatch(&artifact.schema),
            );
            warn!(path = %path.display(), error = %err, "model schema rejected");
            return Err(err);
        }

        info!(
            path = %path.display(),
            model = %artifact.metadata.name,
            framework = %artifact.metadata.framework,
            "model loaded"
        );

        Ok(Arc::new(LoadedModel {
            artifact,
            path: path.to_path_buf(),
            loaded_at: Utc::now(),
        }))
    }
}
