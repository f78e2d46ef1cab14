//! Label encoding shared by training and serving
//!
//! Class indices are positions in the sorted list of distinct labels. The
//! list is persisted as `label_classes.json` next to the model, and serving
//! decodes argmax indices through the same list.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::error::{read_json, Result, SignLangError};

/// Bidirectional mapping between label strings and class indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit on a set of labels: classes are the distinct labels in sorted order
    pub fn fit<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let classes: Vec<String> = labels
            .into_iter()
            .map(|l| l.as_ref().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if classes.is_empty() {
            return Err(SignLangError::Label("cannot fit on an empty label set".to_string()));
        }
        Ok(Self { classes })
    }

    /// Build from an explicit, already-ordered class list
    pub fn from_classes(classes: Vec<String>) -> Result<Self> {
        if classes.is_empty() {
            return Err(SignLangError::Label("class list is empty".to_string()));
        }
        let distinct: BTreeSet<&String> = classes.iter().collect();
        if distinct.len() != classes.len() {
            return Err(SignLangError::Label("class list contains duplicates".to_string()));
        }
        Ok(Self { classes })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn encode(&self, label: &str) -> Result<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .or_else(|_| {
                // Lists loaded from disk need not be sorted
                self.classes.iter().position(|c| c == label).ok_or(())
            })
            .map_err(|_| SignLangError::Label(format!("unknown label '{}'", label)))
    }

    pub fn encode_all<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>> {
        labels.iter().map(|l| self.encode(l.as_ref())).collect()
    }

    pub fn decode(&self, index: usize) -> Result<&str> {
        self.classes.get(index).map(String::as_str).ok_or_else(|| {
            SignLangError::Label(format!(
                "class index {} out of range for {} classes",
                index,
                self.classes.len()
            ))
        })
    }

    /// Write the class list as a JSON array of strings
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string(&self.classes)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Read a class list written by [`LabelEncoder::save`]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let classes: Vec<String> = read_json(path.as_ref())?;
        Self::from_classes(classes)
    }
}
