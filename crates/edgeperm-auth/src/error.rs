//! Authorization error type.
//!
//! [`AuthzError`] is what a request handler sees. The two failure classes
//! never merge:
//!
//! ```text
//! request ──► authorize ──► Deny ─────────────────────► Unauthorized          401
//!                 │
//!                 └► Allow ──► field rules ──► strip ─► ImmutableFieldViolation 401
//!                                   │
//!                                   ├──► default admin ► EntityCannotBeDeleted  409
//!                                   │
//!                                   └──► registry ─────► InvalidPermissionToken 400
//! ```

use crate::decision::DenyReason;
use edgeperm_types::{EntityType, ErrorCode, Operation};
use thiserror::Error;

/// Error returned by authorization and identity payload checks.
///
/// # Example
///
/// ```
/// use edgeperm_auth::AuthzError;
/// use edgeperm_types::ErrorCode;
///
/// let err = AuthzError::InvalidPermissionToken {
///     tokens: vec!["authenticator".into()],
/// };
/// assert_eq!(err.http_status(), 400);
/// assert_eq!(err.code(), "AUTHZ_INVALID_PERMISSION_TOKEN");
/// assert!(err.to_string().contains("authenticator"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
    /// The evaluator denied the request.
    #[error("unauthorized: {operation} {entity} {reason}")]
    Unauthorized {
        entity: EntityType,
        operation: Operation,
        reason: DenyReason,
    },

    /// One or more supplied token strings are not in the vocabulary.
    /// `tokens` is sorted and de-duplicated.
    #[error("invalid permission token(s): {}", .tokens.join(", "))]
    InvalidPermissionToken { tokens: Vec<String> },

    /// An update payload tried to change a field that never changes.
    #[error("field '{field}' is immutable")]
    ImmutableFieldViolation { field: &'static str },

    #[error("{entity} '{id}' can not be deleted")]
    EntityCannotBeDeleted { entity: EntityType, id: String },
}

impl AuthzError {
    /// HTTP status the management API answers with.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Unauthorized { .. } | Self::ImmutableFieldViolation { .. } => 401,
            Self::InvalidPermissionToken { .. } => 400,
            Self::EntityCannotBeDeleted { .. } => 409,
        }
    }

    /// Returns `true` if this is an evaluator denial rather than a payload
    /// or entity-state rejection.
    #[must_use]
    pub fn is_denial(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

impl ErrorCode for AuthzError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "AUTHZ_UNAUTHORIZED",
            Self::InvalidPermissionToken { .. } => "AUTHZ_INVALID_PERMISSION_TOKEN",
            Self::ImmutableFieldViolation { .. } => "AUTHZ_IMMUTABLE_FIELD",
            Self::EntityCannotBeDeleted { .. } => "AUTHZ_ENTITY_CANNOT_BE_DELETED",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}
