//! Caller grants.
//!
//! [`CallerGrants`] is the resolved authority of whoever sent a request:
//! the two special flags plus the parsed permission tokens. Authentication
//! builds it; the evaluator only reads it.

use crate::matrix::RequiredGrant;
use crate::token::PermissionToken;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Resolved grants of the caller.
///
/// Immutable value type. Token strings that do not parse are dropped on
/// construction: a stored principal may predate a vocabulary change, and an
/// unknown token grants nothing either way.
///
/// # Example
///
/// ```
/// use edgeperm_auth::{CallerGrants, RequiredGrant};
/// use edgeperm_types::{Action, EntityType};
///
/// let grants = CallerGrants::from_tokens(["service.read", "config"]);
/// assert!(!grants.is_admin());
///
/// let listing = RequiredGrant::new(EntityType::Service, Action::List);
/// assert!(grants.holds(&listing).is_some());
///
/// let delete = RequiredGrant::new(EntityType::Service, Action::Delete);
/// assert!(grants.holds(&delete).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerGrants {
    is_admin: bool,
    is_admin_readonly: bool,
    tokens: BTreeSet<PermissionToken>,
}

impl CallerGrants {
    /// Builds grants from explicit flags and a token list.
    ///
    /// `admin` / `admin_readonly` appearing in `tokens` also set the
    /// corresponding flag.
    #[must_use]
    pub fn new<I, S>(is_admin: bool, is_admin_readonly: bool, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = BTreeSet::new();
        for raw in tokens {
            match raw.as_ref().parse::<PermissionToken>() {
                Ok(token) => {
                    parsed.insert(token);
                }
                Err(e) => tracing::debug!(token = raw.as_ref(), error = %e, "ignoring caller token"),
            }
        }

        Self {
            is_admin: is_admin || parsed.contains(&PermissionToken::Admin),
            is_admin_readonly: is_admin_readonly || parsed.contains(&PermissionToken::AdminReadOnly),
            tokens: parsed,
        }
    }

    /// Builds grants from token strings alone.
    #[must_use]
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(false, false, tokens)
    }

    /// A caller with no grants at all.
    #[must_use]
    pub fn none() -> Self {
        Self::from_tokens(std::iter::empty::<&str>())
    }

    #[must_use]
    pub fn admin() -> Self {
        Self::new(true, false, std::iter::empty::<&str>())
    }

    #[must_use]
    pub fn admin_readonly() -> Self {
        Self::new(false, true, std::iter::empty::<&str>())
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    #[must_use]
    pub fn is_admin_readonly(&self) -> bool {
        self.is_admin_readonly
    }

    /// Parsed tokens, sorted.
    pub fn tokens(&self) -> impl Iterator<Item = &PermissionToken> {
        self.tokens.iter()
    }

    /// Returns the first held token satisfying `required`, entity-level
    /// before action-level.
    ///
    /// The special flags are not considered here.
    #[must_use]
    pub fn holds(&self, required: &RequiredGrant) -> Option<PermissionToken> {
        required
            .tokens()
            .into_iter()
            .find(|t| self.tokens.contains(t))
    }
}

impl fmt::Display for CallerGrants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.is_admin && !self.tokens.contains(&PermissionToken::Admin) {
            parts.push(PermissionToken::Admin.to_string());
        }
        if self.is_admin_readonly && !self.tokens.contains(&PermissionToken::AdminReadOnly) {
            parts.push(PermissionToken::AdminReadOnly.to_string());
        }
        parts.extend(self.tokens.iter().map(ToString::to_string));
        write!(f, "[{}]", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgeperm_types::{Action, EntityType, Resource};

    #[test]
    fn none_holds_nothing() {
        let grants = CallerGrants::none();
        assert!(!grants.is_admin());
        assert!(!grants.is_admin_readonly());
        assert_eq!(grants.tokens().count(), 0);
        assert_eq!(grants.to_string(), "[]");
    }

    #[test]
    fn special_tokens_set_flags() {
        assert!(CallerGrants::from_tokens(["admin"]).is_admin());
        assert!(CallerGrants::from_tokens(["admin_readonly"]).is_admin_readonly());
        assert!(CallerGrants::admin().is_admin());
        assert!(CallerGrants::admin_readonly().is_admin_readonly());
    }

    #[test]
    fn unparsable_tokens_are_dropped() {
        let grants = CallerGrants::from_tokens(["authenticator", "service", "bogus.read"]);
        let tokens: Vec<_> = grants.tokens().copied().collect();
        assert_eq!(tokens, vec![PermissionToken::Entity(Resource::Service)]);
    }

    #[test]
    fn duplicates_and_order_are_irrelevant() {
        let a = CallerGrants::from_tokens(["ca.read", "service", "ca.read"]);
        let b = CallerGrants::from_tokens(["service", "ca.read"]);
        assert_eq!(a, b);
    }

    #[test]
    fn holds_prefers_entity_level() {
        let grants = CallerGrants::from_tokens(["router.read", "router"]);
        let required = RequiredGrant::new(EntityType::EdgeRouter, Action::Read);
        assert_eq!(grants.holds(&required), Some(PermissionToken::Entity(Resource::Router)));
    }

    #[test]
    fn holds_checks_namespace() {
        let grants = CallerGrants::from_tokens(["edge-router-policy.read"]);
        let required = RequiredGrant::new(EntityType::EdgeRouter, Action::List);
        assert_eq!(grants.holds(&required), None);
    }

    #[test]
    fn authenticator_grant_via_identity() {
        let grants = CallerGrants::from_tokens(["identity.update"]);
        let required = RequiredGrant::new(EntityType::Authenticator, Action::Update);
        assert_eq!(
            grants.holds(&required),
            Some(PermissionToken::Action(Resource::Identity, Action::Update))
        );
    }

    #[test]
    fn display_lists_flags_and_tokens() {
        let grants = CallerGrants::new(false, true, ["service.read"]);
        assert_eq!(grants.to_string(), "[admin_readonly, service.read]");
    }

    #[test]
    fn serde_roundtrip_shape() {
        let grants = CallerGrants::from_tokens(["ops.read"]);
        let json = serde_json::to_string(&grants).expect("serialize");
        assert_eq!(
            json,
            r#"{"isAdmin":false,"isAdminReadonly":false,"tokens":["ops.read"]}"#
        );
        let back: CallerGrants = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, grants);
    }
}
