//! Application state management

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::HeartIqError;
use crate::export::ArtifactHandle;
use crate::inference::InferenceEngine;

use super::error::ServerError;
use super::ServerConfig;

/// Whether a model could be loaded at startup
#[derive(Debug, Clone)]
pub enum ModelStatus {
    Ready(InferenceEngine),
    /// The page shows `reason` and the prediction endpoints answer 503
    Unavailable { reason: String },
}

/// Application state shared across handlers
#[derive(Debug)]
pub struct AppState {
    pub config: ServerConfig,
    pub model: ModelStatus,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Load the artifact named by the config. A missing or unreadable
    /// artifact leaves the server running in the unavailable state.
    pub fn new(config: ServerConfig) -> Self {
        let model = match ArtifactHandle::initialize(&config.artifact_path) {
            Ok(handle) => {
                info!(
                    path = %config.artifact_path.display(),
                    classes = ?handle.target_mapping,
                    "Model artifact loaded"
                );
                ModelStatus::Ready(InferenceEngine::new(handle))
            }
            Err(HeartIqError::ArtifactNotFound(_)) => {
                warn!(path = %config.artifact_path.display(), "Model artifact not found");
                ModelStatus::Unavailable {
                    reason: format!(
                        "Model file '{}' not found! Please run the training script first.",
                        config.artifact_path.display()
                    ),
                }
            }
            Err(e) => {
                warn!(path = %config.artifact_path.display(), error = %e, "Model artifact could not be loaded");
                ModelStatus::Unavailable {
                    reason: format!("Model file '{}' could not be loaded: {}", config.artifact_path.display(), e),
                }
            }
        };

        Self {
            config,
            model,
            started_at: Utc::now(),
        }
    }

    /// State around an already loaded artifact
    pub fn with_handle(config: ServerConfig, handle: ArtifactHandle) -> Self {
        Self {
            config,
            model: ModelStatus::Ready(InferenceEngine::new(handle)),
            started_at: Utc::now(),
        }
    }

    pub fn is_model_loaded(&self) -> bool {
        matches!(self.model, ModelStatus::Ready(_))
    }

    /// The inference engine, or 503 when no model is loaded
    pub fn engine(&self) -> Result<&InferenceEngine, ServerError> {
        match &self.model {
            ModelStatus::Ready(engine) => Ok(engine),
            ModelStatus::Unavailable { reason } => Err(ServerError::ModelUnavailable(reason.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifact_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::default().with_artifact_path(dir.path().join("absent.json"));
        let state = AppState::new(config);

        assert!(!state.is_model_loaded());
        match &state.model {
            ModelStatus::Unavailable { reason } => {
                assert!(reason.contains("not found"));
                assert!(reason.contains("absent.json"));
            }
            ModelStatus::Ready(_) => panic!("expected unavailable model"),
        }
        assert!(matches!(state.engine(), Err(ServerError::ModelUnavailable(_))));
    }
}
