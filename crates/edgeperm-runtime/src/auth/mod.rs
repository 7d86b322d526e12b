//! Authorization wiring for the management API.
//!
//! Policy types ([`Evaluator`], [`CallerGrants`], [`AccessRequest`]) are
//! defined in `edgeperm-auth`. This module adds the runtime pieces:
//!
//! - [`AuthzService`]: audit logging and identity payload rules around a policy
//! - [`ROUTES`] / [`resolve`]: `(method, path)` to entity and operation
//!
//! # Architecture
//!
//! ```text
//! edgeperm-auth (pure policy)
//!     EntityActionMatrix, PermissionRegistry, AdminEscalationGuard, Evaluator
//!         ↓
//! edgeperm-runtime/auth (request handling)
//!     ROUTES, resolve, AuthzService
//! ```

mod routes;
mod service;

pub use routes::{resolve, Method, Route, RouteError, RouteKind, RouteMatch, ROUTES};
pub use service::{AuthzService, IDENTITY_CONTEXT_REQUIRED};

// Re-export from edgeperm-auth for convenience
pub use edgeperm_auth::{
    AccessRequest, AuthorizationPolicy, AuthzError, CallerGrants, Decision, Evaluator,
};
