//! Configuration loader with hierarchical merging.
//!
//! # Load Order
//!
//! 1. Default values (compile-time)
//! 2. Global config (`~/.edgeperm/config.toml`)
//! 3. Project config (`.edgeperm/config.toml`)
//! 4. Environment variables (`EDGEPERM_*`)
//!
//! Each layer overrides the previous.

use super::{
    default_config_path, ConfigError, EdgepermConfig, ImmutableFieldMode, PROJECT_CONFIG_DIR,
    PROJECT_CONFIG_FILE,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Helper macro for parsing boolean environment variables.
macro_rules! parse_env_bool {
    ($field:expr, $var:literal) => {
        if let Ok(val) = std::env::var($var) {
            $field = parse_bool(&val)
                .ok_or_else(|| ConfigError::invalid_env_var($var, "expected bool"))?;
        }
    };
}

/// Configuration loader with builder pattern.
///
/// # Example
///
/// ```no_run
/// use edgeperm_runtime::config::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .with_project_root("/path/to/project")
///     .skip_env_vars()
///     .load()?;
/// # Ok::<(), edgeperm_runtime::config::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// Global config file path (defaults to `~/.edgeperm/config.toml`).
    global_config_path: Option<PathBuf>,

    project_root: Option<PathBuf>,

    skip_env: bool,
    skip_global: bool,
    skip_project: bool,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom global config path.
    #[must_use]
    pub fn with_global_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Sets the project root directory.
    ///
    /// Project config will be loaded from `<project_root>/.edgeperm/config.toml`.
    #[must_use]
    pub fn with_project_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_root = Some(path.into());
        self
    }

    /// Skips environment variable loading.
    ///
    /// Useful for testing with deterministic config.
    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    #[must_use]
    pub fn skip_global_config(mut self) -> Self {
        self.skip_global = true;
        self
    }

    #[must_use]
    pub fn skip_project_config(mut self) -> Self {
        self.skip_project = true;
        self
    }

    /// Loads and merges configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any config file exists but cannot be parsed,
    /// or an `EDGEPERM_*` variable holds an invalid value.
    /// Missing config files are silently ignored.
    pub fn load(&self) -> Result<EdgepermConfig, ConfigError> {
        let mut config = EdgepermConfig::default();

        // Layer 1: Global config
        if !self.skip_global {
            let global_path = self
                .global_config_path
                .clone()
                .unwrap_or_else(default_config_path);

            if let Some(global_config) = self.load_file(&global_path)? {
                debug!(path = %global_path.display(), "Loaded global config");
                config.merge(&global_config);
            }
        }

        // Layer 2: Project config
        if !self.skip_project {
            if let Some(ref project_root) = self.project_root {
                let project_config_path = project_root
                    .join(PROJECT_CONFIG_DIR)
                    .join(PROJECT_CONFIG_FILE);

                if let Some(project_config) = self.load_file(&project_config_path)? {
                    debug!(
                        path = %project_config_path.display(),
                        project = %project_root.display(),
                        "Loaded project config"
                    );
                    config.merge(&project_config);
                }
            }
        }

        // Layer 3: Environment variables
        if !self.skip_env {
            self.apply_env_vars(&mut config)?;
        }

        Ok(config)
    }

    /// Loads a config file, returning None if it doesn't exist.
    fn load_file(&self, path: &Path) -> Result<Option<EdgepermConfig>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;

        let config =
            EdgepermConfig::from_toml(&content).map_err(|e| ConfigError::parse_toml(path, e))?;

        Ok(Some(config))
    }

    fn apply_env_vars(&self, config: &mut EdgepermConfig) -> Result<(), ConfigError> {
        parse_env_bool!(config.debug, "EDGEPERM_DEBUG");
        parse_env_bool!(config.audit.log_allowed, "EDGEPERM_AUDIT_LOG_ALLOWED");

        if let Ok(val) = std::env::var("EDGEPERM_IMMUTABLE_FIELDS") {
            config.identity.immutable_fields = val
                .parse::<ImmutableFieldMode>()
                .map_err(|msg| ConfigError::invalid_env_var("EDGEPERM_IMMUTABLE_FIELDS", msg))?;
        }

        if let Ok(val) = std::env::var("EDGEPERM_LOG_LEVEL") {
            if val.trim().is_empty() {
                return Err(ConfigError::invalid_env_var(
                    "EDGEPERM_LOG_LEVEL",
                    "expected a filter directive",
                ));
            }
            config.logging.level = val;
        }

        Ok(())
    }
}

/// Parses a boolean from string.
///
/// Accepts: "true", "false", "1", "0", "yes", "no", "on", "off" (case-insensitive).
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_config_file(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn load_defaults_only() {
        let config = ConfigLoader::new()
            .skip_global_config()
            .skip_project_config()
            .skip_env_vars()
            .load()
            .unwrap();

        assert_eq!(config, EdgepermConfig::default());
    }

    #[test]
    fn load_global_config() {
        let temp = TempDir::new().unwrap();
        let config_path = create_config_file(
            temp.path(),
            r#"
debug = true

[audit]
log_allowed = true
"#,
        );

        let config = ConfigLoader::new()
            .with_global_config(&config_path)
            .skip_project_config()
            .skip_env_vars()
            .load()
            .unwrap();

        assert!(config.debug);
        assert!(config.audit.log_allowed);
    }

    #[test]
    fn load_project_overrides_global() {
        let global_temp = TempDir::new().unwrap();
        let project_temp = TempDir::new().unwrap();

        let project_dir = project_temp.path().join(".edgeperm");
        std::fs::create_dir_all(&project_dir).unwrap();

        let global_path = create_config_file(
            global_temp.path(),
            r#"
debug = true

[logging]
level = "info"
"#,
        );

        create_config_file(
            &project_dir,
            r#"
[logging]
level = "edgeperm_runtime=trace"

[identity]
immutable_fields = "reject"
"#,
        );

        let config = ConfigLoader::new()
            .with_global_config(&global_path)
            .with_project_root(project_temp.path())
            .skip_env_vars()
            .load()
            .unwrap();

        // debug from global (not overridden in project)
        assert!(config.debug);
        assert_eq!(config.logging.level, "edgeperm_runtime=trace");
        assert_eq!(config.identity.immutable_fields, ImmutableFieldMode::Reject);
    }

    #[test]
    fn missing_config_files_ok() {
        let config = ConfigLoader::new()
            .with_global_config("/nonexistent/path/config.toml")
            .with_project_root("/nonexistent/project")
            .skip_env_vars()
            .load()
            .unwrap();

        assert_eq!(config, EdgepermConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = create_config_file(temp.path(), "debug = maybe\n");

        let err = ConfigLoader::new()
            .with_global_config(&path)
            .skip_project_config()
            .skip_env_vars()
            .load()
            .unwrap_err();

        assert!(matches!(err, ConfigError::ParseToml { .. }), "got: {err}");
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn parse_bool_values() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("yes"), Some(true));
        assert_eq!(parse_bool("on"), Some(true));

        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("no"), Some(false));
        assert_eq!(parse_bool("off"), Some(false));

        assert_eq!(parse_bool("invalid"), None);
    }

    #[test]
    fn env_var_override() {
        // The only test in this crate that touches EDGEPERM_* variables.
        std::env::set_var("EDGEPERM_DEBUG", "yes");
        std::env::set_var("EDGEPERM_IMMUTABLE_FIELDS", "reject");
        std::env::set_var("EDGEPERM_LOG_LEVEL", "debug");

        let config = ConfigLoader::new()
            .skip_global_config()
            .skip_project_config()
            .load();

        std::env::set_var("EDGEPERM_AUDIT_LOG_ALLOWED", "maybe");
        let invalid = ConfigLoader::new()
            .skip_global_config()
            .skip_project_config()
            .load();

        std::env::remove_var("EDGEPERM_DEBUG");
        std::env::remove_var("EDGEPERM_IMMUTABLE_FIELDS");
        std::env::remove_var("EDGEPERM_LOG_LEVEL");
        std::env::remove_var("EDGEPERM_AUDIT_LOG_ALLOWED");

        let config = config.unwrap();
        assert!(config.debug);
        assert_eq!(config.identity.immutable_fields, ImmutableFieldMode::Reject);
        assert_eq!(config.logging.level, "debug");

        let err = invalid.unwrap_err();
        assert!(err.to_string().contains("EDGEPERM_AUDIT_LOG_ALLOWED"), "got: {err}");
    }
}
