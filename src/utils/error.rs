//! Error type shared by every signlang module
//!
//! Library code returns [`Result`]; the binaries wrap it in `anyhow`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignLangError {
    /// Malformed or unusable capture data
    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Label error: {0}")]
    Label(String),

    /// Model construction, loading or saving
    #[error("Model error: {0}")]
    Model(String),

    #[error("Training error: {0}")]
    Training(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A landmark vector the model cannot accept
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A JSON file that exists but does not parse into the expected shape
    #[error("Failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, SignLangError>;

/// Fail with [`SignLangError::PathNotFound`] unless `path` exists
pub fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(SignLangError::PathNotFound(path.to_path_buf()))
    }
}

/// Read and deserialize a JSON file, naming the file on parse failure
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    ensure_exists(path)?;
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|source| SignLangError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
