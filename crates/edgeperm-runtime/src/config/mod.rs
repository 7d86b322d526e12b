//! Configuration management with hierarchical layering.
//!
//! # Architecture
//!
//! ```text
//! Priority (highest to lowest):
//!
//! ┌─────────────────────────────────────────────┐
//! │  1. CLI flags (ConfigResolver)              │  Per invocation
//! ├─────────────────────────────────────────────┤
//! │  2. Environment Variables (EDGEPERM_*)      │  Runtime override
//! ├─────────────────────────────────────────────┤
//! │  3. Project Config (.edgeperm/config.toml)  │  Deployment-specific
//! ├─────────────────────────────────────────────┤
//! │  4. Global Config (~/.edgeperm/config.toml) │  Operator defaults
//! ├─────────────────────────────────────────────┤
//! │  5. Default Values (compile-time)           │  Fallback
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Type |
//! |----------|--------------|------|
//! | `EDGEPERM_DEBUG` | `debug` | bool |
//! | `EDGEPERM_AUDIT_LOG_ALLOWED` | `audit.log_allowed` | bool |
//! | `EDGEPERM_IMMUTABLE_FIELDS` | `identity.immutable_fields` | `strip` \| `reject` |
//! | `EDGEPERM_LOG_LEVEL` | `logging.level` | filter directive |
//!
//! # Example Configuration
//!
//! ```toml
//! # ~/.edgeperm/config.toml
//! debug = false
//!
//! [audit]
//! log_allowed = true
//!
//! [identity]
//! immutable_fields = "strip"
//! protect_default_admin = true
//!
//! [logging]
//! level = "edgeperm_runtime=info"
//! ```

mod error;
mod loader;
mod resolver;
mod types;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use resolver::{ConfigResolver, NoOpResolver};
pub use types::{AuditConfig, EdgepermConfig, IdentityConfig, ImmutableFieldMode, LoggingConfig};

/// Default global config directory.
pub fn default_config_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".edgeperm")
}

/// Default global config file path.
pub fn default_config_path() -> std::path::PathBuf {
    default_config_dir().join("config.toml")
}

/// Project config directory name.
pub const PROJECT_CONFIG_DIR: &str = ".edgeperm";

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "config.toml";
