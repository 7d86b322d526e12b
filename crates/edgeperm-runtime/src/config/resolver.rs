//! Configuration resolver trait for layered overrides.
//!
//! # Architecture
//!
//! ```text
//! ConfigLoader.load()  →  EdgepermConfig (base)
//!                              │
//!                              ▼
//!                     ConfigResolver.apply()
//!                              │
//!                              ▼
//!                     EdgepermConfig (final)
//! ```
//!
//! The CLI implements this for its flags; the library never reads flags.

use super::EdgepermConfig;

/// Trait for applying configuration overrides.
///
/// Implementors modify an existing config with their specific overrides.
/// Only values that were explicitly given should be applied.
pub trait ConfigResolver {
    fn apply(&self, config: &mut EdgepermConfig);
}

/// No-op resolver that makes no changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpResolver;

impl ConfigResolver for NoOpResolver {
    fn apply(&self, _config: &mut EdgepermConfig) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImmutableFieldMode;

    #[test]
    fn noop_resolver_does_nothing() {
        let mut config = EdgepermConfig::default();
        let original = config.clone();

        NoOpResolver.apply(&mut config);

        assert_eq!(config, original);
    }

    #[test]
    fn custom_resolver() {
        struct StrictFields {
            reject: Option<bool>,
        }

        impl ConfigResolver for StrictFields {
            fn apply(&self, config: &mut EdgepermConfig) {
                if self.reject == Some(true) {
                    config.identity.immutable_fields = ImmutableFieldMode::Reject;
                }
            }
        }

        let mut config = EdgepermConfig::default();
        StrictFields { reject: None }.apply(&mut config);
        assert_eq!(config.identity.immutable_fields, ImmutableFieldMode::Strip);

        StrictFields { reject: Some(true) }.apply(&mut config);
        assert_eq!(config.identity.immutable_fields, ImmutableFieldMode::Reject);
    }
}
