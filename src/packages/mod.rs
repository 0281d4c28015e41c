//! Installed-package detection
//!
//! Providers that are not configured explicitly enable themselves when one
//! of their framework's packages is installed. [`PackageDetector`] is the
//! seam; [`InstalledPackages`] reads Composer's `installed.json`.

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Answers whether a named package is part of the current build
pub trait PackageDetector: Send + Sync {
    fn is_installed(&self, package: &str) -> bool;
}

/// Package errors
#[derive(Error, Debug)]
pub enum PackagesError {
    #[error("Failed to read {}: {source}", path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {}: {source}", path.display())]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Set of installed package names (lowercase, as Composer stores them)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledPackages {
    names: BTreeSet<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InstalledJson {
    /// Composer 2 layout
    Wrapped { packages: Vec<PackageEntry> },
    /// Composer 1 layout
    Flat(Vec<PackageEntry>),
}

#[derive(Deserialize)]
struct PackageEntry {
    name: String,
    #[serde(default)]
    replace: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    provide: BTreeMap<String, serde_json::Value>,
}

impl InstalledPackages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    /// Read `<vendor_dir>/composer/installed.json`; a missing file means
    /// nothing is installed
    pub fn from_vendor_dir(vendor_dir: &Path) -> Result<Self, PackagesError> {
        let path = vendor_dir.join("composer").join("installed.json");
        if !path.exists() {
            debug!("No {} found, assuming no installed packages", path.display());
            return Ok(Self::new());
        }
        Self::from_installed_json(&path)
    }

    pub fn from_installed_json(path: &Path) -> Result<Self, PackagesError> {
        let contents = fs::read_to_string(path).map_err(|source| PackagesError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;

        let packages = Self::parse(&contents).map_err(|source| PackagesError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("Found {} installed packages in {}", packages.len(), path.display());

        Ok(packages)
    }

    /// Parse installed.json contents. Names listed under `replace` and
    /// `provide` count as installed, as Composer treats them.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let entries = match serde_json::from_str::<InstalledJson>(contents)? {
            InstalledJson::Wrapped { packages } => packages,
            InstalledJson::Flat(packages) => packages,
        };

        let names = entries.into_iter().flat_map(|entry| {
            std::iter::once(entry.name)
                .chain(entry.replace.into_keys())
                .chain(entry.provide.into_keys())
        });

        Ok(Self::from_names(names))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl PackageDetector for InstalledPackages {
    fn is_installed(&self, package: &str) -> bool {
        self.names.contains(&package.to_ascii_lowercase())
    }
}
