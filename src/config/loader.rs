use crate::runtime::{Capabilities, RuntimeVersion};
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for member usage analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-framework provider toggles
    pub providers: ProvidersConfig,

    /// Analysed runtime
    pub runtime: RuntimeConfig,

    /// Installed package detection
    pub packages: PackagesConfig,

    /// Report configuration
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub doctrine: ProviderToggle,
}

/// `enabled: true | false`, or left out to detect from installed packages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderToggle {
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Runtime version, e.g. "8.2" or "70433". Falls back to the snapshot's.
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagesConfig {
    /// Composer vendor directory, relative to the project root
    pub vendor_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output format: terminal, json
    pub format: String,

    /// Also list findings that no provider suppresses
    pub show_unused: bool,
}

impl Default for PackagesConfig {
    fn default() -> Self {
        Self {
            vendor_dir: PathBuf::from("vendor"),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: "terminal".to_string(),
            show_unused: true,
        }
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                // Try YAML first, then TOML
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        let default_names = [
            ".memberusage.yml",
            ".memberusage.yaml",
            ".memberusage.toml",
            "memberusage.yml",
            "memberusage.yaml",
            "memberusage.toml",
        ];

        for name in &default_names {
            let path = project_root.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        // No config file found, use defaults
        Ok(Self::default())
    }

    /// Capabilities of the configured runtime, else of `fallback_version`,
    /// else of a current runtime
    pub fn capabilities(&self, fallback_version: Option<&str>) -> Result<Capabilities> {
        let Some(raw) = self.runtime.version.as_deref().or(fallback_version) else {
            return Ok(Capabilities::modern());
        };

        let version = RuntimeVersion::parse(raw)
            .into_diagnostic()
            .wrap_err("Invalid runtime.version")?;

        Ok(Capabilities::for_version(version))
    }

    /// Vendor directory resolved against the project root
    pub fn vendor_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.packages.vendor_dir)
    }
}
