//! Runtime capability gate
//!
//! Declarative metadata (PHP attributes) only exists from PHP 8.0. Rules
//! that read tags ask [`Capabilities`] first instead of trying and failing.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

/// First runtime version with attribute support
pub const DECLARATIVE_METADATA_SINCE: RuntimeVersion = RuntimeVersion::new(8, 0, 0);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RuntimeVersionError {
    #[error("Invalid runtime version '{0}', expected e.g. \"8.2\", \"7.4.33\" or \"80213\"")]
    Invalid(String),
}

/// A `major.minor.patch` runtime version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuntimeVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl RuntimeVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    /// Parse a dotted version (`8.1`, `8.2.13`, `7.4.33-dev`) or a numeric
    /// version id (`80213`)
    pub fn parse(input: &str) -> Result<Self, RuntimeVersionError> {
        static DOTTED: OnceLock<Regex> = OnceLock::new();
        let dotted = DOTTED.get_or_init(|| {
            Regex::new(r"^(\d+)\.(\d+)(?:\.(\d+))?(?:[-+.~][0-9A-Za-z.\-+~]*)?$")
                .expect("static regex is valid")
        });

        let trimmed = input.trim();
        let invalid = || RuntimeVersionError::Invalid(input.to_string());

        if let Some(caps) = dotted.captures(trimmed) {
            let part = |i: usize| -> Result<u32, RuntimeVersionError> {
                caps.get(i)
                    .map(|m| m.as_str().parse::<u32>().map_err(|_| invalid()))
                    .unwrap_or(Ok(0))
            };
            return Ok(Self::new(part(1)?, part(2)?, part(3)?));
        }

        if trimmed.len() >= 5 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            let id: u32 = trimmed.parse().map_err(|_| invalid())?;
            return Ok(Self::from_version_id(id));
        }

        Err(invalid())
    }

    /// Decode a PHP_VERSION_ID style identifier (`major * 10000 + minor * 100 + patch`)
    pub const fn from_version_id(id: u32) -> Self {
        Self::new(id / 10_000, (id / 100) % 100, id % 100)
    }

    pub const fn version_id(&self) -> u32 {
        self.major * 10_000 + self.minor * 100 + self.patch
    }
}

impl std::fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl std::str::FromStr for RuntimeVersion {
    type Err = RuntimeVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// What the analysed runtime can express, computed once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    declarative_metadata: bool,
}

impl Capabilities {
    pub fn for_version(version: RuntimeVersion) -> Self {
        Self {
            declarative_metadata: version >= DECLARATIVE_METADATA_SINCE,
        }
    }

    /// No version known: assume a current runtime
    pub fn modern() -> Self {
        Self {
            declarative_metadata: true,
        }
    }

    /// Every optional facility off
    pub fn legacy() -> Self {
        Self {
            declarative_metadata: false,
        }
    }

    pub fn supports_declarative_metadata(&self) -> bool {
        self.declarative_metadata
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::modern()
    }
}
