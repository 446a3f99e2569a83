//! Configuration for annotator paths and flow settings.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (ANNOTATOR_HOME, ANNOTATOR_DATA)
//! 2. Config file (.annotator/config.yaml)
//! 3. Defaults (~/.annotator)
//!
//! Config file discovery:
//! - Searches current directory and parents for .annotator/config.yaml
//! - `paths.home` is relative to the .annotator/ directory, `paths.data` to
//!   the directory containing it

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::{AnnotateSettings, StaleChunkPolicy};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub flow: Option<FlowConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Annotator state directory (relative to .annotator/)
    pub home: Option<String>,
    /// Documents and answers directory (relative to project root)
    pub data: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlowConfig {
    pub stale_chunk_spans: Option<StaleChunkPolicy>,
    pub default_category: Option<String>,
    pub default_type: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to annotator home
    pub home: PathBuf,
    /// Absolute path to the data directory
    pub data: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Flow settings
    pub flow: FlowSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSettings {
    pub stale_chunk_spans: StaleChunkPolicy,
    pub default_category: String,
    pub default_type: String,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            stale_chunk_spans: StaleChunkPolicy::default(),
            default_category: "general".to_string(),
            default_type: "open".to_string(),
        }
    }
}

impl FlowSettings {
    /// Settings handed to the annotate reducer
    pub fn annotate_settings(&self) -> AnnotateSettings {
        AnnotateSettings {
            stale_chunk_spans: self.stale_chunk_spans,
        }
    }

    fn from_config(flow: Option<&FlowConfig>) -> Self {
        let defaults = Self::default();
        let Some(flow) = flow else {
            return defaults;
        };

        Self {
            stale_chunk_spans: flow.stale_chunk_spans.unwrap_or(defaults.stale_chunk_spans),
            default_category: flow
                .default_category
                .clone()
                .unwrap_or(defaults.default_category),
            default_type: flow.default_type.clone().unwrap_or(defaults.default_type),
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".annotator").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".annotator");

    let config_file = find_config_file();

    let (home, data, flow) = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;

        // .annotator/ and the project root above it
        let annotator_dir = config_path.parent().unwrap_or(Path::new("."));
        let base_dir = annotator_dir.parent().unwrap_or(Path::new("."));

        let home = if let Ok(env_home) = std::env::var("ANNOTATOR_HOME") {
            PathBuf::from(env_home)
        } else if let Some(ref home_path) = config.paths.home {
            resolve_path(annotator_dir, home_path)
        } else {
            default_home.clone()
        };

        let data = if let Ok(env_data) = std::env::var("ANNOTATOR_DATA") {
            PathBuf::from(env_data)
        } else if let Some(ref data_path) = config.paths.data {
            resolve_path(base_dir, data_path)
        } else {
            home.join("data")
        };

        (home, data, FlowSettings::from_config(config.flow.as_ref()))
    } else {
        let home = std::env::var("ANNOTATOR_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_home.clone());

        let data = std::env::var("ANNOTATOR_DATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join("data"));

        (home, data, FlowSettings::default())
    };

    Ok(ResolvedConfig {
        home,
        data,
        config_file,
        flow,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Get the data directory (documents and answers).
pub fn data_dir() -> Result<PathBuf> {
    Ok(config()?.data.clone())
}

/// Get the configured flow settings.
pub fn flow_settings() -> Result<FlowSettings> {
    Ok(config()?.flow.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let annotator_dir = temp.path().join(".annotator");
        std::fs::create_dir_all(&annotator_dir).unwrap();

        let config_path = annotator_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
paths:
  home: ./
  data: ../datasets
flow:
  stale_chunk_spans: keep
  default_category: finance
"#
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.paths.home, Some("./".to_string()));
        assert_eq!(config.paths.data, Some("../datasets".to_string()));

        let flow = FlowSettings::from_config(config.flow.as_ref());
        assert_eq!(flow.stale_chunk_spans, StaleChunkPolicy::Keep);
        assert_eq!(flow.default_category, "finance");
        assert_eq!(flow.default_type, "open");
    }

    #[test]
    fn test_flow_defaults_without_section() {
        let flow = FlowSettings::from_config(None);
        assert_eq!(flow, FlowSettings::default());
        assert_eq!(
            flow.annotate_settings().stale_chunk_spans,
            StaleChunkPolicy::Drop
        );
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        let yaml = r#"
version: "1.0"
flow:
  stale_chunk_spans: sometimes
"#;
        assert!(serde_yaml::from_str::<ConfigFile>(yaml).is_err());
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/subdir")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }
}
