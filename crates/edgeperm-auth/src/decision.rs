//! Authorization decisions.
//!
//! [`Decision`] is the pure result of evaluating one request. It carries
//! enough detail for an audit log line on either branch:
//!
//! ```text
//! Decision
//!   ├── Allow(AllowReason)   Admin | AdminReadOnly | Granted(token)
//!   └── Deny(DenyReason)     Escalation | NotGranted | Unresolved
//! ```
//!
//! Converting a denial into a handler error happens in
//! [`AuthorizationPolicy::require`](crate::AuthorizationPolicy::require).

use crate::matrix::{RequiredGrant, Unresolved};
use crate::token::PermissionToken;
use std::fmt;

/// Why a request was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowReason {
    /// Caller is `admin`.
    Admin,
    /// Caller is `admin_readonly` and the request only reads.
    AdminReadOnly,
    /// Caller holds this token for the required grant.
    Granted(PermissionToken),
}

impl fmt::Display for AllowReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => f.write_str("admin"),
            Self::AdminReadOnly => f.write_str("admin_readonly"),
            Self::Granted(token) => write!(f, "granted by '{token}'"),
        }
    }
}

/// Why a request was denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// An escalation guard rule fired.
    Escalation {
        /// Name of the rule, e.g. `"patch-admin-fields"`.
        rule: &'static str,
        detail: String,
    },
    /// The caller holds no token satisfying the required grant.
    NotGranted { required: RequiredGrant },
    /// The operation does not exist on the entity type.
    Unresolved(Unresolved),
}

impl DenyReason {
    /// Short machine-readable category for log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Escalation { .. } => "escalation",
            Self::NotGranted { .. } => "not_granted",
            Self::Unresolved(_) => "unresolved",
        }
    }

    /// The token a caller would need, when a token could help at all.
    ///
    /// Escalation denials return `None`: only `admin` passes the guard.
    #[must_use]
    pub fn required_token(&self) -> Option<PermissionToken> {
        match self {
            Self::NotGranted { required } => Some(required.action_token()),
            Self::Escalation { .. } | Self::Unresolved(_) => None,
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Escalation { rule, detail } => write!(f, "blocked by {rule}: {detail}"),
            Self::NotGranted { required } => write!(
                f,
                "requires '{}' or '{}'",
                required.action_token(),
                PermissionToken::Entity(required.resource())
            ),
            Self::Unresolved(inner) => write!(f, "{inner}"),
        }
    }
}

/// Result of evaluating one request.
///
/// # Example
///
/// ```
/// use edgeperm_auth::{AllowReason, Decision};
///
/// let decision = Decision::Allow(AllowReason::Admin);
/// assert!(decision.is_allowed());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow(AllowReason),
    Deny(DenyReason),
}

impl Decision {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }

    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Deny(_))
    }

    #[must_use]
    pub fn deny_reason(&self) -> Option<&DenyReason> {
        match self {
            Self::Deny(reason) => Some(reason),
            Self::Allow(_) => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow(reason) => write!(f, "allowed ({reason})"),
            Self::Deny(reason) => write!(f, "denied ({reason})"),
        }
    }
}
