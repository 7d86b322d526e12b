//! Authorization service.
//!
//! [`AuthzService`] is what a request handler talks to. It wraps an
//! [`AuthorizationPolicy`] with:
//!
//! - audit logging of every decision,
//! - the identity payload rules that run after authorization,
//! - token validation through the [`PermissionRegistry`],
//! - route resolution for raw `(method, path)` input.
//!
//! # Identity Flows
//!
//! ```text
//! create:  authorize ─► strip/reject isDefaultAdmin ─► validate permissions
//! update:  authorize ─► strip/reject isDefaultAdmin ─► validate permissions
//! delete:  authorize ─► refuse default admin
//! ```
//!
//! Every step runs before any state changes, so a rejected request leaves
//! nothing half applied.
//!
//! # Routes
//!
//! A bare `(method, path)` says nothing about the stored identity or the
//! payload, and the escalation guard needs both. Route authorization
//! therefore denies identity-namespace mutations from non-admin callers
//! unless [`AuthzService::authorize_route_with`] supplies that context.

use super::routes::{resolve, Method, RouteError, RouteMatch};
use crate::config::{AuditConfig, EdgepermConfig, IdentityConfig, ImmutableFieldMode};
use edgeperm_auth::{
    AccessRequest, AllowReason, AuthorizationPolicy, AuthzError, CallerGrants, Decision,
    DenyReason, Evaluator, IdentityChanges, IdentitySnapshot, PermissionRegistry, IS_DEFAULT_ADMIN_FIELD,
};
use edgeperm_types::{EntityType, UpdateMode};
use tracing::{debug, info, warn};

/// Deny rule for identity mutations authorized without their context.
pub const IDENTITY_CONTEXT_REQUIRED: &str = "identity-context-required";

/// Authorization facade for request handlers.
///
/// # Example
///
/// ```
/// use edgeperm_auth::{CallerGrants, IdentityChanges, IdentitySnapshot};
/// use edgeperm_runtime::auth::AuthzService;
/// use edgeperm_runtime::config::EdgepermConfig;
/// use edgeperm_types::UpdateMode;
///
/// let service = AuthzService::new(&EdgepermConfig::default());
///
/// // isDefaultAdmin is dropped from the payload, the rest applies
/// let changes = service
///     .prepare_identity_update(
///         &CallerGrants::admin(),
///         &IdentitySnapshot::new("id-1"),
///         IdentityChanges::new().with_name("ops-bot").with_is_default_admin(true),
///         UpdateMode::Partial,
///     )
///     .unwrap();
/// assert_eq!(changes.is_default_admin, None);
/// assert_eq!(changes.name.as_deref(), Some("ops-bot"));
/// ```
#[derive(Debug)]
pub struct AuthzService<P = Evaluator> {
    policy: P,
    registry: &'static PermissionRegistry,
    audit: AuditConfig,
    identity: IdentityConfig,
}

impl AuthzService<Evaluator> {
    /// Service over the standard [`Evaluator`].
    #[must_use]
    pub fn new(config: &EdgepermConfig) -> Self {
        Self::with_policy(Evaluator::new(), config)
    }
}

impl<P: AuthorizationPolicy> AuthzService<P> {
    /// Service over a custom policy.
    #[must_use]
    pub fn with_policy(policy: P, config: &EdgepermConfig) -> Self {
        Self {
            policy,
            registry: PermissionRegistry::global(),
            audit: config.audit.clone(),
            identity: config.identity.clone(),
        }
    }

    /// Evaluates `request` and writes an audit log line.
    pub fn authorize(&self, grants: &CallerGrants, request: &AccessRequest) -> Decision {
        let decision = self.policy.authorize(grants, request);
        self.audit(grants, request, &decision);
        decision
    }

    /// Evaluates `request`, turning a denial into an error.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::Unauthorized`] when the request is denied.
    pub fn require(&self, grants: &CallerGrants, request: &AccessRequest) -> Result<AllowReason, AuthzError> {
        match self.authorize(grants, request) {
            Decision::Allow(reason) => Ok(reason),
            Decision::Deny(reason) => Err(AuthzError::Unauthorized {
                entity: request.entity,
                operation: request.operation.clone(),
                reason,
            }),
        }
    }

    /// Checks token strings being assigned to an identity.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::InvalidPermissionToken`] listing the unknown
    /// tokens, sorted and de-duplicated.
    pub fn validate_tokens<I, S>(&self, tokens: I) -> Result<(), AuthzError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let result = self.registry.validate(tokens);
        if let Err(AuthzError::InvalidPermissionToken { tokens }) = &result {
            warn!(invalid = ?tokens, "rejected permission tokens");
        }
        result
    }

    /// Authorizes an identity create and returns the payload to persist.
    ///
    /// # Errors
    ///
    /// [`AuthzError::Unauthorized`] on denial, then
    /// [`AuthzError::ImmutableFieldViolation`] in reject mode, then
    /// [`AuthzError::InvalidPermissionToken`].
    pub fn prepare_identity_create(
        &self,
        grants: &CallerGrants,
        changes: IdentityChanges,
    ) -> Result<IdentityChanges, AuthzError> {
        let request = AccessRequest::create(EntityType::Identity).with_changes(changes);
        self.require(grants, &request)?;
        self.finish_identity_payload(request)
    }

    /// Authorizes an identity PUT or PATCH and returns the payload to apply.
    ///
    /// # Errors
    ///
    /// Same as [`prepare_identity_create`](Self::prepare_identity_create).
    pub fn prepare_identity_update(
        &self,
        grants: &CallerGrants,
        target: &IdentitySnapshot,
        changes: IdentityChanges,
        mode: UpdateMode,
    ) -> Result<IdentityChanges, AuthzError> {
        let request = match mode {
            UpdateMode::Full => AccessRequest::update(EntityType::Identity),
            UpdateMode::Partial => AccessRequest::patch(EntityType::Identity),
        }
        .with_target(target.clone())
        .with_changes(changes);
        self.require(grants, &request)?;
        self.finish_identity_payload(request)
    }

    /// Authorizes an identity delete.
    ///
    /// # Errors
    ///
    /// [`AuthzError::Unauthorized`] on denial, then
    /// [`AuthzError::EntityCannotBeDeleted`] for the default admin.
    pub fn prepare_identity_delete(
        &self,
        grants: &CallerGrants,
        target: &IdentitySnapshot,
    ) -> Result<(), AuthzError> {
        let request = AccessRequest::delete(EntityType::Identity).with_target(target.clone());
        self.require(grants, &request)?;

        if self.identity.protect_default_admin && target.is_default_admin {
            warn!(identity = %target.id, "refused to delete default admin");
            return Err(AuthzError::EntityCannotBeDeleted {
                entity: EntityType::Identity,
                id: target.id.clone(),
            });
        }
        Ok(())
    }

    /// Resolves a raw request line and authorizes it.
    ///
    /// Non-admin identity creates, updates and deletes, and authenticator
    /// mutations, are denied with [`IDENTITY_CONTEXT_REQUIRED`]: a path
    /// alone cannot show whether they escalate.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] when the path is not a management API route.
    pub fn authorize_route(
        &self,
        grants: &CallerGrants,
        method: Method,
        path: &str,
    ) -> Result<(RouteMatch, Decision), RouteError> {
        self.authorize_route_with(grants, method, path, None, None)
    }

    /// Resolves a raw request line and authorizes it with identity context.
    ///
    /// `target` is the stored identity being changed, or the identity owning
    /// the authenticator. `changes` is the identity payload. Identity
    /// mutations missing the context they need are denied as in
    /// [`authorize_route`](Self::authorize_route).
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] when the path is not a management API route.
    pub fn authorize_route_with(
        &self,
        grants: &CallerGrants,
        method: Method,
        path: &str,
        target: Option<IdentitySnapshot>,
        changes: Option<IdentityChanges>,
    ) -> Result<(RouteMatch, Decision), RouteError> {
        let matched = resolve(method, path)?;
        let mut request = AccessRequest::new(matched.entity(), matched.operation());
        if let Some(target) = target {
            request = request.with_target(target);
        }
        if let Some(changes) = changes {
            request = request.with_changes(changes);
        }

        let decision = match request.missing_identity_context() {
            Some(missing) if !grants.is_admin() => {
                let decision = Decision::Deny(DenyReason::Escalation {
                    rule: IDENTITY_CONTEXT_REQUIRED,
                    detail: format!("{request} cannot be checked without its {missing}"),
                });
                self.audit(grants, &request, &decision);
                decision
            }
            _ => self.authorize(grants, &request),
        };
        Ok((matched, decision))
    }

    fn finish_identity_payload(&self, request: AccessRequest) -> Result<IdentityChanges, AuthzError> {
        let mut changes = request.changes.unwrap_or_default();

        if let Some(value) = changes.take_default_admin() {
            match self.identity.immutable_fields {
                ImmutableFieldMode::Strip => {
                    debug!(field = IS_DEFAULT_ADMIN_FIELD, value, "stripped immutable field");
                }
                ImmutableFieldMode::Reject => {
                    warn!(field = IS_DEFAULT_ADMIN_FIELD, value, "rejected immutable field");
                    return Err(AuthzError::ImmutableFieldViolation {
                        field: IS_DEFAULT_ADMIN_FIELD,
                    });
                }
            }
        }

        if let Some(tokens) = &changes.permissions {
            self.validate_tokens(tokens)?;
        }
        Ok(changes)
    }

    fn audit(&self, grants: &CallerGrants, request: &AccessRequest, decision: &Decision) {
        match decision {
            Decision::Allow(reason) => {
                if self.audit.log_allowed {
                    info!(
                        entity = %request.entity,
                        operation = %request.operation,
                        reason = %reason,
                        "authorization allowed"
                    );
                } else {
                    debug!(
                        entity = %request.entity,
                        operation = %request.operation,
                        reason = %reason,
                        "authorization allowed"
                    );
                }
            }
            Decision::Deny(reason) => {
                warn!(
                    entity = %request.entity,
                    operation = %request.operation,
                    kind = reason.kind(),
                    reason = %reason,
                    grants = %grants,
                    "authorization denied"
                );
            }
        }
    }
}
