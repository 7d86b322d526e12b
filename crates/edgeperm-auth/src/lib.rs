//! Authorization core for the edge management API.
//!
//! Decides, per request, whether a caller holding a set of permission grants
//! may perform an operation on an entity type.
//!
//! # Components
//!
//! | Component | Type | Role |
//! |-----------|------|------|
//! | Permission registry | [`PermissionRegistry`] | Vocabulary of valid token strings |
//! | Entity-action matrix | [`EntityActionMatrix`] | Supported actions, relationship listings, named operations |
//! | Escalation guard | [`AdminEscalationGuard`] | Ordered [`GuardRule`]s for identity and authenticator mutations |
//! | Evaluator | [`Evaluator`] + [`AuthorizationPolicy`] | `(grants, request) -> Decision` |
//!
//! # Crate Architecture
//!
//! ```text
//! edgeperm-types   (EntityType, Resource, Action, Operation, ErrorCode)
//!       ↑
//! edgeperm-auth    ◄── THIS CRATE
//! (PermissionToken, Matrix, Registry, Guard, Evaluator)
//!       ↑
//! edgeperm-runtime (AuthzService, route table, config)
//!       ↑
//! edgeperm-cli
//! ```
//!
//! # Design Principles
//!
//! - **Pure evaluation**: no I/O, no locks; the matrix and registry are built
//!   once and never change.
//! - **Explicit data**: relationship listings name their target entity type
//!   in a table instead of deriving it from path names.
//! - **Two failure classes**: denial (401) and invalid tokens (400) are
//!   separate [`AuthzError`] variants.
//!
//! # Example
//!
//! ```
//! use edgeperm_auth::{AccessRequest, AuthorizationPolicy, CallerGrants, Evaluator};
//! use edgeperm_types::EntityType;
//!
//! let evaluator = Evaluator::new();
//! let grants = CallerGrants::from_tokens(["edge-router-policy.read"]);
//!
//! let own = AccessRequest::list(EntityType::EdgeRouterPolicy);
//! assert!(evaluator.authorize(&grants, &own).is_allowed());
//!
//! // listing the routers of a policy needs router.read
//! let related = AccessRequest::list_related(EntityType::EdgeRouterPolicy, "edge-routers");
//! assert!(evaluator.authorize(&grants, &related).is_denied());
//! ```

pub mod decision;
pub mod error;
pub mod evaluator;
pub mod grants;
pub mod guard;
pub mod identity;
pub mod matrix;
pub mod registry;
pub mod request;
pub mod token;

pub use decision::{AllowReason, Decision, DenyReason};
pub use error::AuthzError;
pub use evaluator::{AuthorizationPolicy, Evaluator};
pub use grants::CallerGrants;
pub use guard::{
    AdminEscalationGuard, CreateAdminIdentity, CreateIdentityWithPermissions, FullIdentityUpdate,
    GuardRule, MutateAdminAuthenticator, MutateAdminIdentity, PatchAdminFields, Violation,
};
pub use identity::{IdentityChanges, IdentitySnapshot, IS_DEFAULT_ADMIN_FIELD};
pub use matrix::{
    EntityActionMatrix, EntityEntry, NamedOperation, RequiredGrant, SubresourceListing, Unresolved,
};
pub use registry::PermissionRegistry;
pub use request::AccessRequest;
pub use token::{ParseTokenError, PermissionToken, ADMIN, ADMIN_READONLY};
