//! Metadata snapshot file format
//!
//! A host analyzer exports what its reflection layer knows about each class
//! into a JSON (or YAML) document. Only declared facts are stored here;
//! inherited interfaces and ancestor chains are resolved by [`ClassIndex`].
//!
//! [`ClassIndex`]: super::ClassIndex

use super::descriptor::{ClassKind, MetadataTag};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Snapshot errors
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to read metadata snapshot: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse metadata snapshot: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Failed to parse metadata snapshot: {0}")]
    YamlError(#[from] serde_yaml::Error),
    #[error("Class declared twice in metadata snapshot: {0}")]
    DuplicateClass(String),
}

/// Top-level snapshot document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataSnapshot {
    /// Version of the runtime the snapshot was taken on (e.g. "8.2.13")
    #[serde(default)]
    pub runtime_version: Option<String>,

    #[serde(default)]
    pub classes: Vec<ClassRecord>,
}

/// A declared type as exported by the host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassRecord {
    pub name: String,

    #[serde(default)]
    pub kind: ClassKind,

    /// Direct parent class
    #[serde(default)]
    pub parent: Option<String>,

    /// Directly implemented interfaces (extended interfaces for an interface)
    #[serde(default)]
    pub interfaces: Vec<String>,

    #[serde(default)]
    pub tags: Vec<MetadataTag>,

    #[serde(default)]
    pub methods: Vec<MethodRecord>,
}

/// A declared method as exported by the host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodRecord {
    pub name: String,

    /// Inferred from the method name when absent
    #[serde(default)]
    pub constructor: Option<bool>,

    #[serde(default)]
    pub tags: Vec<MetadataTag>,
}

impl MetadataSnapshot {
    /// Load a snapshot, choosing the format by file extension
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let contents = fs::read_to_string(path)?;
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let snapshot = match extension {
            "yml" | "yaml" => Self::from_yaml(&contents)?,
            _ => Self::from_json(&contents)?,
        };

        debug!(
            "Loaded metadata snapshot {} ({} classes)",
            path.display(),
            snapshot.classes.len()
        );

        Ok(snapshot)
    }

    pub fn from_json(contents: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, SnapshotError> {
        Ok(serde_yaml::from_str(contents)?)
    }
}
