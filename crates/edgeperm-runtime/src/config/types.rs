//! Configuration types.
//!
//! All types implement [`Default`] for compile-time fallback values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Main configuration structure.
///
/// This is the unified configuration after merging all layers.
///
/// # Example
///
/// ```
/// use edgeperm_runtime::config::{EdgepermConfig, ImmutableFieldMode};
///
/// let config = EdgepermConfig::default();
/// assert!(!config.debug);
/// assert_eq!(config.identity.immutable_fields, ImmutableFieldMode::Strip);
/// assert!(config.identity.protect_default_admin);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EdgepermConfig {
    /// Enable debug mode (debug-level logging).
    pub debug: bool,

    /// Audit logging of authorization decisions.
    pub audit: AuditConfig,

    /// Identity payload rules.
    pub identity: IdentityConfig,

    pub logging: LoggingConfig,
}

impl EdgepermConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes to TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deserializes from TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if deserialization fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Merges another config into this one.
    ///
    /// Values from `other` override values in `self` only if they
    /// differ from the default.
    pub fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.debug != default.debug {
            self.debug = other.debug;
        }

        self.audit.merge(&other.audit);
        self.identity.merge(&other.identity);
        self.logging.merge(&other.logging);
    }
}

/// Audit logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AuditConfig {
    /// Log allowed decisions at `info` instead of `debug`.
    ///
    /// Denials are always logged at `warn`.
    pub log_allowed: bool,
}

impl AuditConfig {
    fn merge(&mut self, other: &Self) {
        if other.log_allowed {
            self.log_allowed = true;
        }
    }
}

/// What to do when an update payload carries `isDefaultAdmin`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImmutableFieldMode {
    /// Drop the field and apply the rest of the payload.
    #[default]
    Strip,
    /// Reject the whole request.
    Reject,
}

impl ImmutableFieldMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strip => "strip",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for ImmutableFieldMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImmutableFieldMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strip" => Ok(Self::Strip),
            "reject" => Ok(Self::Reject),
            other => Err(format!("expected 'strip' or 'reject', got '{other}'")),
        }
    }
}

/// Identity payload rules applied after authorization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IdentityConfig {
    pub immutable_fields: ImmutableFieldMode,

    /// Refuse to delete the bootstrap admin identity.
    pub protect_default_admin: bool,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            immutable_fields: ImmutableFieldMode::Strip,
            protect_default_admin: true,
        }
    }
}

impl IdentityConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.immutable_fields != default.immutable_fields {
            self.immutable_fields = other.immutable_fields;
        }
        if other.protect_default_admin != default.protect_default_admin {
            self.protect_default_admin = other.protect_default_admin;
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
        }
    }
}

impl LoggingConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.level != default.level {
            self.level = other.level.clone();
        }
    }
}
