//! Permission token grammar.
//!
//! ```text
//! token        = "admin" | "admin_readonly" | entity-level | action-level
//! entity-level = resource                      ; "service"
//! action-level = resource "." grant-action     ; "service.read"
//! grant-action = "create" | "read" | "update" | "delete"
//! ```
//!
//! Parsing only checks shape. Whether a well-formed token is part of the
//! vocabulary (e.g. `ops.create` is well-formed but api sessions cannot be
//! created) is decided by [`PermissionRegistry`](crate::PermissionRegistry).

use edgeperm_types::{Action, Resource};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Full bypass, including the escalation guard.
pub const ADMIN: &str = "admin";

/// Read and list on every entity type; no mutation, no escalation rights.
pub const ADMIN_READONLY: &str = "admin_readonly";

/// A token string that does not follow the token grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed permission token: '{0}'")]
pub struct ParseTokenError(pub String);

/// A parsed permission token.
///
/// # Example
///
/// ```
/// use edgeperm_auth::PermissionToken;
/// use edgeperm_types::{Action, Resource};
///
/// let token: PermissionToken = "service.read".parse().unwrap();
/// assert_eq!(token, PermissionToken::Action(Resource::Service, Action::Read));
/// assert!(token.satisfies(Resource::Service, Action::List));
/// assert!(!token.satisfies(Resource::Config, Action::Read));
///
/// assert!("authenticator.read".parse::<PermissionToken>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PermissionToken {
    Admin,
    AdminReadOnly,
    /// Every action on one resource.
    Entity(Resource),
    /// Exactly one grant action on one resource. Never holds [`Action::List`].
    Action(Resource, Action),
}

impl PermissionToken {
    /// Builds an action-level token, folding `list` into `read`.
    #[must_use]
    pub fn action(resource: Resource, action: Action) -> Self {
        Self::Action(resource, action.grant_action())
    }

    /// Returns `true` if this token grants `action` on `resource`.
    ///
    /// The special tokens are not matched here; the evaluator handles them
    /// before any token lookup.
    #[must_use]
    pub fn satisfies(&self, resource: Resource, action: Action) -> bool {
        match self {
            Self::Entity(r) => *r == resource,
            Self::Action(r, a) => *r == resource && *a == action.grant_action(),
            Self::Admin | Self::AdminReadOnly => false,
        }
    }

    /// The resource this token is written against, if any.
    #[must_use]
    pub fn resource(&self) -> Option<Resource> {
        match self {
            Self::Entity(r) | Self::Action(r, _) => Some(*r),
            Self::Admin | Self::AdminReadOnly => None,
        }
    }
}

impl fmt::Display for PermissionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => f.write_str(ADMIN),
            Self::AdminReadOnly => f.write_str(ADMIN_READONLY),
            Self::Entity(r) => write!(f, "{r}"),
            Self::Action(r, a) => write!(f, "{r}.{a}"),
        }
    }
}

impl FromStr for PermissionToken {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseTokenError(s.to_string());
        match s {
            ADMIN => return Ok(Self::Admin),
            ADMIN_READONLY => return Ok(Self::AdminReadOnly),
            _ => {}
        }

        match s.split_once('.') {
            None => s.parse().map(Self::Entity).map_err(|_| malformed()),
            Some((resource, action)) => {
                let resource: Resource = resource.parse().map_err(|_| malformed())?;
                let action: Action = action.parse().map_err(|_| malformed())?;
                // `list` is granted by `read`; a `.list` token is not part of the grammar
                if action == Action::List {
                    return Err(malformed());
                }
                Ok(Self::Action(resource, action))
            }
        }
    }
}

impl TryFrom<String> for PermissionToken {
    type Error = ParseTokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PermissionToken> for String {
    fn from(token: PermissionToken) -> Self {
        token.to_string()
    }
}
