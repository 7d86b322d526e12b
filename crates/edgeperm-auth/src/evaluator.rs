//! Authorization evaluator.
//!
//! # Architecture
//!
//! ```text
//! AuthorizationPolicy trait (edgeperm-auth)   <- abstract, pure
//!          │
//!          ├── Evaluator (THIS MODULE)        <- matrix + guard
//!          │
//!          └── AuthzService (edgeperm-runtime) <- wraps a policy, adds audit logs,
//!                                                identity field rules, config
//! ```
//!
//! # Evaluation Order
//!
//! ```text
//! 1. admin ─────────────────────────────────────────────► Allow
//! 2. guard (identity requests) ── rule fires ───────────► Deny(Escalation)
//! 3. matrix.resolve(entity, op) ── unsupported/unknown ─► Deny(Unresolved)
//! 4. admin_readonly && read-only action ────────────────► Allow
//! 5. caller holds `X` or `X.a` for the resolved grant ──► Allow
//! 6. ───────────────────────────────────────────────────► Deny(NotGranted)
//! ```
//!
//! For relationship listings step 3 yields the *target* pair, so owner grants
//! never reach step 5.

use crate::decision::{AllowReason, Decision, DenyReason};
use crate::error::AuthzError;
use crate::grants::CallerGrants;
use crate::guard::AdminEscalationGuard;
use crate::matrix::EntityActionMatrix;
use crate::request::AccessRequest;

/// Abstract authorization policy.
///
/// Implementations must be pure: no I/O, no shared mutable state.
///
/// # Example
///
/// ```
/// use edgeperm_auth::{AccessRequest, AllowReason, AuthorizationPolicy, CallerGrants, Decision};
/// use edgeperm_types::EntityType;
///
/// struct AllowAll;
///
/// impl AuthorizationPolicy for AllowAll {
///     fn authorize(&self, _grants: &CallerGrants, _request: &AccessRequest) -> Decision {
///         Decision::Allow(AllowReason::Admin)
///     }
/// }
///
/// let req = AccessRequest::delete(EntityType::Ca);
/// assert!(AllowAll.require(&CallerGrants::none(), &req).is_ok());
/// ```
pub trait AuthorizationPolicy: Send + Sync {
    /// Decides whether `grants` may perform `request`.
    fn authorize(&self, grants: &CallerGrants, request: &AccessRequest) -> Decision;

    /// Like [`authorize`](Self::authorize), but turns a denial into
    /// [`AuthzError::Unauthorized`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Unauthorized`] when the request is denied.
    fn require(&self, grants: &CallerGrants, request: &AccessRequest) -> Result<AllowReason, AuthzError> {
        match self.authorize(grants, request) {
            Decision::Allow(reason) => Ok(reason),
            Decision::Deny(reason) => Err(AuthzError::Unauthorized {
                entity: request.entity,
                operation: request.operation.clone(),
                reason,
            }),
        }
    }
}

/// Standard policy over the global [`EntityActionMatrix`] and an
/// [`AdminEscalationGuard`].
///
/// # Example
///
/// ```
/// use edgeperm_auth::{AccessRequest, AuthorizationPolicy, CallerGrants, Evaluator};
/// use edgeperm_types::EntityType;
///
/// let evaluator = Evaluator::new();
/// let grants = CallerGrants::from_tokens(["ops.read"]);
///
/// assert!(evaluator.authorize(&grants, &AccessRequest::list(EntityType::ApiSession)).is_allowed());
/// assert!(evaluator.authorize(&grants, &AccessRequest::delete(EntityType::ApiSession)).is_denied());
/// ```
#[derive(Debug)]
pub struct Evaluator {
    matrix: &'static EntityActionMatrix,
    guard: AdminEscalationGuard,
}

impl Evaluator {
    /// Evaluator with the standard guard rules.
    #[must_use]
    pub fn new() -> Self {
        Self::with_guard(AdminEscalationGuard::standard())
    }

    #[must_use]
    pub fn with_guard(guard: AdminEscalationGuard) -> Self {
        Self {
            matrix: EntityActionMatrix::global(),
            guard,
        }
    }

    #[must_use]
    pub fn matrix(&self) -> &'static EntityActionMatrix {
        self.matrix
    }

    #[must_use]
    pub fn guard(&self) -> &AdminEscalationGuard {
        &self.guard
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthorizationPolicy for Evaluator {
    fn authorize(&self, grants: &CallerGrants, request: &AccessRequest) -> Decision {
        if grants.is_admin() {
            return Decision::Allow(AllowReason::Admin);
        }

        if let Some(violation) = self.guard.check(request) {
            return Decision::Deny(DenyReason::Escalation {
                rule: violation.rule,
                detail: violation.detail,
            });
        }

        let required = match self.matrix.resolve(request.entity, &request.operation) {
            Ok(required) => required,
            Err(unresolved) => return Decision::Deny(DenyReason::Unresolved(unresolved)),
        };

        if grants.is_admin_readonly() && required.action.is_read_only() {
            return Decision::Allow(AllowReason::AdminReadOnly);
        }

        match grants.holds(&required) {
            Some(token) => Decision::Allow(AllowReason::Granted(token)),
            None => Decision::Deny(DenyReason::NotGranted { required }),
        }
    }
}
