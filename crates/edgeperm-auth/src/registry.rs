//! Permission token vocabulary.
//!
//! The registry is derived from the [`EntityActionMatrix`]: for every
//! namespace, the entity-level token plus one action-level token per grant
//! action that some entity type in the namespace supports.
//!
//! ```text
//! namespace   supported (union)            tokens
//! ─────────   ──────────────────────────   ─────────────────────────────────────────
//! ops         read, list, delete           ops, ops.read, ops.delete
//! router      create, read, list, ...      router, router.create, router.read, ...
//! ```
//!
//! The registry only validates token strings handed to identity create and
//! update. The evaluator never consults it.

use crate::error::AuthzError;
use crate::matrix::EntityActionMatrix;
use crate::token::{PermissionToken, ADMIN, ADMIN_READONLY};
use edgeperm_types::Resource;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static REGISTRY: LazyLock<PermissionRegistry> =
    LazyLock::new(|| PermissionRegistry::from_matrix(EntityActionMatrix::global()));

/// Canonical set of valid permission token strings.
///
/// # Example
///
/// ```
/// use edgeperm_auth::{AuthzError, PermissionRegistry};
///
/// let registry = PermissionRegistry::global();
/// assert!(registry.validate(["service", "ops.read", "admin_readonly"]).is_ok());
///
/// let err = registry
///     .validate(["ops.create", "authenticator", "ops.create"])
///     .unwrap_err();
/// assert_eq!(
///     err,
///     AuthzError::InvalidPermissionToken {
///         tokens: vec!["authenticator".into(), "ops.create".into()],
///     }
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRegistry {
    vocabulary: BTreeSet<String>,
}

impl PermissionRegistry {
    /// The process-wide registry, built from the global matrix on first use.
    #[must_use]
    pub fn global() -> &'static Self {
        &REGISTRY
    }

    /// Builds the vocabulary for `matrix`.
    #[must_use]
    pub fn from_matrix(matrix: &EntityActionMatrix) -> Self {
        let mut vocabulary = BTreeSet::new();
        vocabulary.insert(ADMIN.to_string());
        vocabulary.insert(ADMIN_READONLY.to_string());

        for resource in Resource::ALL {
            let supported = matrix.resource_actions(resource);
            if supported.is_empty() {
                continue;
            }
            vocabulary.insert(PermissionToken::Entity(resource).to_string());
            // `list` folds into `.read`
            for action in supported.actions() {
                vocabulary.insert(PermissionToken::action(resource, action).to_string());
            }
        }

        Self { vocabulary }
    }

    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.vocabulary.contains(token)
    }

    /// Every valid token, sorted.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.vocabulary.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    /// Checks every token against the vocabulary.
    ///
    /// Order and duplicates in the input are irrelevant.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::InvalidPermissionToken`] carrying the unknown
    /// tokens, sorted and de-duplicated.
    pub fn validate<I, S>(&self, tokens: I) -> Result<(), AuthzError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let bad: BTreeSet<String> = tokens
            .into_iter()
            .filter(|t| !self.contains(t.as_ref()))
            .map(|t| t.as_ref().to_string())
            .collect();

        if bad.is_empty() {
            Ok(())
        } else {
            Err(AuthzError::InvalidPermissionToken {
                tokens: bad.into_iter().collect(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> &'static PermissionRegistry {
        PermissionRegistry::global()
    }

    #[test]
    fn special_tokens_present() {
        assert!(registry().contains("admin"));
        assert!(registry().contains("admin_readonly"));
    }

    #[test]
    fn crud_namespaces_have_five_tokens() {
        for ns in ["identity", "service", "router", "ca", "enrollment", "posture-check"] {
            for suffix in ["", ".create", ".read", ".update", ".delete"] {
                let token = format!("{ns}{suffix}");
                assert!(registry().contains(&token), "missing {token}");
            }
        }
    }

    #[test]
    fn ops_vocabulary() {
        let ops: Vec<&str> = registry()
            .tokens()
            .filter(|t| *t == "ops" || t.starts_with("ops."))
            .collect();
        assert_eq!(ops, vec!["ops", "ops.delete", "ops.read"]);
    }

    #[test]
    fn vocabulary_size() {
        // 14 CRUD namespaces x 5, ops x 3, two special tokens
        assert_eq!(registry().len(), 14 * 5 + 3 + 2);
        assert!(!registry().is_empty());
    }

    #[test]
    fn no_list_or_authenticator_tokens() {
        for token in registry().tokens() {
            assert!(!token.ends_with(".list"), "{token}");
            assert!(!token.starts_with("authenticator"), "{token}");
            assert!(!token.starts_with("edge-router.") && token != "edge-router", "{token}");
            assert!(!token.starts_with("api-session"), "{token}");
        }
    }

    #[test]
    fn every_vocabulary_token_parses() {
        for token in registry().tokens() {
            assert!(token.parse::<PermissionToken>().is_ok(), "{token}");
        }
    }

    #[test]
    fn validate_empty_is_ok() {
        assert!(registry().validate(Vec::<String>::new()).is_ok());
    }

    #[test]
    fn validate_reports_sorted_unique() {
        let err = registry()
            .validate(["zzz", "service", "authenticator.read", "zzz", "Service"])
            .unwrap_err();
        assert_eq!(
            err,
            AuthzError::InvalidPermissionToken {
                tokens: vec![
                    "Service".into(),
                    "authenticator.read".into(),
                    "zzz".into()
                ],
            }
        );
    }
}
