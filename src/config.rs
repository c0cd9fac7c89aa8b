//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/mrca/mrca.toml`
//! 3. Project config: `<project_dir>/.mrca.toml`
//! 4. Environment variables: `MRCA_*` prefix
//!
//! Command-line flags are applied on top by the CLI layer.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, MatchMode};

/// Unified configuration for mrca.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Printed when the MRCA is the unnamed root (default: "root")
    pub root_label: String,
    /// How tip patterns match names (default: search)
    pub match_mode: MatchMode,
    /// Case-insensitive tip patterns (default: false)
    pub ignore_case: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_label: "root".into(),
            match_mode: MatchMode::Search,
            ignore_case: false,
        }
    }
}

/// Raw settings for intermediate parsing; `None` means "not specified".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub root_label: Option<String>,
    pub match_mode: Option<MatchMode>,
    pub ignore_case: Option<bool>,
}

/// Get the XDG config directory for mrca.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "mrca").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("mrca.toml"))
}

/// Get the path to the project config file.
pub fn project_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".mrca.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            root_label: overlay
                .root_label
                .clone()
                .unwrap_or_else(|| self.root_label.clone()),
            match_mode: overlay.match_mode.unwrap_or(self.match_mode),
            ignore_case: overlay.ignore_case.unwrap_or(self.ignore_case),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional directory holding a `.mrca.toml`
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_layers(
            global_config_path().as_deref(),
            project_dir,
            Environment::with_prefix("MRCA"),
        )
    }

    /// Layered load with every source given explicitly.
    ///
    /// # Arguments
    /// * `global_path` - Global config file, skipped if absent
    /// * `project_dir` - Optional directory holding a `.mrca.toml`
    /// * `env` - Source of `MRCA_*` overrides
    pub fn load_layers(
        global_path: Option<&Path>,
        project_dir: Option<&Path>,
        env: Environment,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_path {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(global_path)?);
            }
        }

        if let Some(dir) = project_dir {
            let local_path = project_config_path(dir);
            if local_path.exists() {
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        current.apply_env_overrides(env)
    }

    /// Apply `MRCA_*` environment variables as explicit overrides.
    ///
    /// The source is injectable so tests do not have to touch the process
    /// environment.
    pub fn apply_env_overrides(mut self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env.prefix_separator("_"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("root_label") {
            self.root_label = val;
        }
        if let Ok(val) = config.get_string("match_mode") {
            self.match_mode = val.parse()?;
        }
        if let Ok(val) = config.get_string("ignore_case") {
            self.ignore_case = parse_bool(&val).ok_or_else(|| ApplicationError::Config {
                message: format!("MRCA_IGNORE_CASE: expected a boolean, got '{val}'"),
            })?;
        }

        Ok(self)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# mrca configuration
#
# Locations (by precedence, lowest to highest):
#   Global:  ~/.config/mrca/mrca.toml
#   Project: <project_dir>/.mrca.toml
#   Env:     MRCA_* environment variables (e.g. MRCA_ROOT_LABEL)
#   Flags:   command-line options

# Printed when the MRCA is the unnamed root of the tree
# root_label = "root"

# "search": pattern may match anywhere in a tip name
# "full":   pattern must match the whole tip name
# match_mode = "search"

# Case-insensitive tip patterns
# ignore_case = false
"#
        .to_string()
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_from(vars: &[(&str, &str)]) -> Environment {
        let source = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix("MRCA").source(Some(source))
    }

    #[test]
    fn given_defaults_when_created_then_root_label_is_root() {
        let settings = Settings::default();
        assert_eq!(settings.root_label, "root");
        assert_eq!(settings.match_mode, MatchMode::Search);
        assert!(!settings.ignore_case);
    }

    #[test]
    fn given_partial_overlay_when_merging_then_only_specified_fields_change() {
        let overlay = RawSettings {
            root_label: Some("ROOT".into()),
            match_mode: None,
            ignore_case: Some(true),
        };
        let merged = Settings::default().merge_with(&overlay);
        assert_eq!(merged.root_label, "ROOT");
        assert_eq!(merged.match_mode, MatchMode::Search);
        assert!(merged.ignore_case);
    }

    #[test]
    fn given_env_vars_when_applying_overrides_then_replaces_values() {
        let settings = Settings::default()
            .apply_env_overrides(env_from(&[
                ("MRCA_ROOT_LABEL", "<root>"),
                ("MRCA_MATCH_MODE", "full"),
                ("MRCA_IGNORE_CASE", "yes"),
            ]))
            .unwrap();
        assert_eq!(settings.root_label, "<root>");
        assert_eq!(settings.match_mode, MatchMode::Full);
        assert!(settings.ignore_case);
    }

    #[test]
    fn given_bad_match_mode_in_env_when_applying_overrides_then_errors() {
        let result =
            Settings::default().apply_env_overrides(env_from(&[("MRCA_MATCH_MODE", "fuzzy")]));
        assert!(matches!(result, Err(ApplicationError::Config { .. })));
    }

    #[test]
    fn given_settings_when_serialized_then_template_keys_round_trip() {
        let text = Settings::default().to_toml().unwrap();
        let raw: RawSettings = toml::from_str(&text).unwrap();
        assert_eq!(raw.root_label.as_deref(), Some("root"));
        assert_eq!(raw.match_mode, Some(MatchMode::Search));
        let template: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(template.root_label.is_none());
    }
}
