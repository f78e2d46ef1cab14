//! Application state for the prediction server
//!
//! Holds the loaded predictor behind a mutex, the label list for the
//! metadata routes, and the start time for uptime reporting.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use signlang::backend::{default_device, DefaultBackend};
use signlang::inference::Predictor;
use signlang::model::{MODEL_CONFIG_FILE, MODEL_FILE_STEM};
use signlang::LABELS_FILE;

pub type SharedState = Arc<AppState>;

/// Server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Directory written by `signlang train`
    pub artifacts_dir: PathBuf,
    /// Explicit weights file, overriding `<artifacts>/model.mpk`
    pub model_path: Option<PathBuf>,
    /// Explicit architecture file, overriding `<artifacts>/model_config.json`
    pub config_path: Option<PathBuf>,
    /// Explicit label file, overriding `<artifacts>/label_classes.json`
    pub labels_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            artifacts_dir: PathBuf::from("artifacts"),
            model_path: None,
            config_path: None,
            labels_path: None,
        }
    }
}

impl ServerConfig {
    pub fn resolved_model_path(&self) -> PathBuf {
        self.model_path
            .clone()
            .unwrap_or_else(|| self.artifacts_dir.join(format!("{}.mpk", MODEL_FILE_STEM)))
    }

    pub fn resolved_config_path(&self) -> PathBuf {
        self.config_path
            .clone()
            .unwrap_or_else(|| self.artifacts_dir.join(MODEL_CONFIG_FILE))
    }

    pub fn resolved_labels_path(&self) -> PathBuf {
        self.labels_path
            .clone()
            .unwrap_or_else(|| self.artifacts_dir.join(LABELS_FILE))
    }
}

/// Shared application state
pub struct AppState {
    /// Loaded model; forward passes run one at a time
    pub predictor: Mutex<Predictor<DefaultBackend>>,
    /// Class list in index order
    pub labels: Vec<String>,
    /// Server start time
    pub started_at: Instant,
}

impl AppState {
    /// Load the model and labels named by `config`
    pub fn load(config: &ServerConfig) -> signlang::Result<Self> {
        let predictor = Predictor::<DefaultBackend>::load_from(
            &config.resolved_model_path(),
            &config.resolved_config_path(),
            &config.resolved_labels_path(),
            &default_device(),
        )?;
        Ok(Self::from_predictor(predictor))
    }

    pub fn from_predictor(predictor: Predictor<DefaultBackend>) -> Self {
        Self {
            labels: predictor.labels().classes().to_vec(),
            predictor: Mutex::new(predictor),
            started_at: Instant::now(),
        }
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
