use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::logs::TEXT_LOG_SUMMARY;
use crate::pipeline::DEFAULT_JOB_FETCH_COUNT;

/// Configuration file structure for PhaseLens.
///
/// Lets users keep the service location and analysis defaults out of the
/// command line. Command-line flags take precedence over these values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Metadata service settings
    #[serde(default)]
    pub treeherder: TreeherderConfig,

    /// Local log cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Analysis parameters
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TreeherderConfig {
    /// Treeherder instance base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Number of jobs requested when enumerating a revision
    #[serde(default = "default_job_fetch_count")]
    pub job_fetch_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CacheConfig {
    /// Directory holding one sub-directory of logs per revision
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AnalysisConfig {
    /// Maximum number of jobs to process
    #[serde(default = "default_num_jobs")]
    pub num_jobs: usize,

    /// Artifact kind carrying the log URL
    #[serde(default = "default_artifact_name")]
    pub artifact_name: String,
}

impl Default for TreeherderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            job_fetch_count: default_job_fetch_count(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            num_jobs: default_num_jobs(),
            artifact_name: default_artifact_name(),
        }
    }
}

fn default_base_url() -> String {
    "https://treeherder.mozilla.org".to_string()
}

fn default_user_agent() -> String {
    format!("PhaseLens/{}", env!("CARGO_PKG_VERSION"))
}

fn default_job_fetch_count() -> usize {
    DEFAULT_JOB_FETCH_COUNT
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

fn default_num_jobs() -> usize {
    5
}

fn default_artifact_name() -> String {
    TEXT_LOG_SUMMARY.to_string()
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./phaselens.toml
    /// 3. ./phaselens.json
    /// 4. ./phaselens.yaml
    /// 5. ./phaselens.yml
    /// 6. `<platform config dir>/phaselens/config.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = ["phaselens.toml", "phaselens.json", "phaselens.yaml", "phaselens.yml"]
            .into_iter()
            .map(PathBuf::from)
            .chain(dirs::config_dir().map(|dir| dir.join("phaselens").join("config.toml")));

        for candidate in candidates {
            if candidate.exists() {
                return Self::load_from_path(&candidate);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => {
                // Try TOML first, then JSON, then YAML
                toml::from_str(&contents)
                    .or_else(|_| serde_json::from_str(&contents))
                    .or_else(|_| serde_yaml::from_str(&contents))
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))
            }
        }
    }
}
