//! Configuration loading from `.lineagerc.toml`.
//!
//! Configuration is optional - the CLI uses sensible defaults if no config
//! file exists, and command-line flags override anything set here.
//!
//! # Example Configuration
//!
//! ```toml
//! [catalog]
//! path = "data/distros.json"
//!
//! [build]
//! case_insensitive = true
//! cycle_policy = "reject"
//!
//! [output]
//! format = "tree"
//! color = false
//! ```

use anyhow::{Context, Result};
use lineage_core::{BuildOptions, CyclePolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file name looked up in the working directory.
pub const CONFIG_FILE: &str = ".lineagerc.toml";

/// Catalog used when neither the command line nor the config names one.
pub const DEFAULT_CATALOG: &str = "distros.json";

/// Root configuration structure loaded from `.lineagerc.toml`.
///
/// All sections are optional and will use defaults if not specified.
#[derive(Debug, Deserialize, Default)]
pub struct LineageConfig {
    /// Where the catalog lives.
    #[serde(default)]
    pub catalog: CatalogSection,

    /// Builder settings.
    #[serde(default)]
    pub build: BuildSection,

    /// Output formatting preferences.
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Deserialize, Default)]
pub struct CatalogSection {
    /// Path to the catalog JSON file, relative to the working directory.
    #[serde(default)]
    pub path: Option<String>,
}

/// Builder settings.
///
/// These map one-to-one onto [`BuildOptions`].
#[derive(Debug, Deserialize, Default)]
pub struct BuildSection {
    /// Match distribution names case-insensitively.
    ///
    /// Default: `false`
    #[serde(default)]
    pub case_insensitive: bool,

    /// `accept` keeps derivation cycles, `reject` fails the build on them.
    ///
    /// Default: `accept`
    #[serde(default)]
    pub cycle_policy: CyclePolicy,
}

/// Output formatting preferences.
///
/// Command-line flags (e.g., `--format json`) override these settings.
#[derive(Debug, Deserialize, Default)]
pub struct OutputSettings {
    /// Default output format for CLI commands.
    ///
    /// Valid values: `table`, `json`, `tree`
    /// Default: `table`
    #[serde(default)]
    pub format: Option<String>,

    /// Whether to use colored output.
    ///
    /// Defaults to `true` when stdout is a TTY.
    #[serde(default)]
    pub color: Option<bool>,
}

impl LineageConfig {
    /// Load configuration from `.lineagerc.toml` in the given directory.
    ///
    /// If the config file doesn't exist or can't be parsed, returns defaults.
    /// Parse errors are logged as warnings but don't cause failures.
    pub fn load(root: &Path) -> Self {
        Self::load_file(&root.join(CONFIG_FILE))
    }

    /// Load configuration from a path the user named with `--config`.
    ///
    /// Unlike [`LineageConfig::load`], a missing or unparsable file is an error.
    pub fn load_explicit(config_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))
    }

    /// Load configuration from a path, falling back to defaults.
    fn load_file(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", config_path.display(), e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", config_path.display(), e);
                }
            }
        }
        Self::default()
    }

    /// Resolve the catalog path: explicit argument > config > `distros.json`.
    pub fn catalog_path(&self, explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.catalog.path.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG))
    }

    /// Builder options from the config, with CLI flags able to switch features on.
    pub fn build_options(&self, ignore_case: bool, reject_cycles: bool) -> BuildOptions {
        BuildOptions {
            case_insensitive: ignore_case || self.build.case_insensitive,
            cycle_policy: if reject_cycles {
                CyclePolicy::Reject
            } else {
                self.build.cycle_policy
            },
        }
    }

    /// Get the default output format, if configured.
    pub fn default_format(&self) -> Option<&str> {
        self.output.format.as_deref()
    }

    /// Returns the configured color setting, or `None` to use auto-detection.
    pub fn use_color(&self) -> Option<bool> {
        self.output.color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = LineageConfig::default();
        assert!(config.catalog.path.is_none());
        assert!(!config.build.case_insensitive);
        assert_eq!(config.build.cycle_policy, CyclePolicy::Accept);
        assert!(config.output.format.is_none());
        assert_eq!(config.catalog_path(None), PathBuf::from(DEFAULT_CATALOG));
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[catalog]
path = "data/distros.json"

[build]
case_insensitive = true
cycle_policy = "reject"

[output]
format = "json"
color = false
"#;
        let config: LineageConfig = toml::from_str(toml_content).unwrap();

        assert_eq!(config.catalog_path(None), PathBuf::from("data/distros.json"));
        assert_eq!(
            config.catalog_path(Some(Path::new("other.json"))),
            PathBuf::from("other.json")
        );

        let options = config.build_options(false, false);
        assert!(options.case_insensitive);
        assert_eq!(options.cycle_policy, CyclePolicy::Reject);

        assert_eq!(config.default_format(), Some("json"));
        assert_eq!(config.use_color(), Some(false));
    }

    #[test]
    fn test_flags_override_config() {
        let config = LineageConfig::default();
        let options = config.build_options(true, true);
        assert!(options.case_insensitive);
        assert_eq!(options.cycle_policy, CyclePolicy::Reject);
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[build]\ncycle_policy = \"maybe\"\n").unwrap();

        let config = LineageConfig::load(dir.path());
        assert_eq!(config.build.cycle_policy, CyclePolicy::Accept);
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("strcit.toml");

        let err = LineageConfig::load_explicit(&missing).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_explicit_config_must_parse() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("strict.toml");
        std::fs::write(&path, "[build]\ncycle_policy = \"maybe\"\n").unwrap();

        let err = LineageConfig::load_explicit(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_explicit_config_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("strict.toml");
        std::fs::write(&path, "[build]\ncycle_policy = \"reject\"\n").unwrap();

        let config = LineageConfig::load_explicit(&path).unwrap();
        assert_eq!(config.build.cycle_policy, CyclePolicy::Reject);
    }

    #[test]
    fn test_load_from_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[output]\nformat = \"tree\"\n").unwrap();

        let config = LineageConfig::load(dir.path());
        assert_eq!(config.default_format(), Some("tree"));
    }
}
