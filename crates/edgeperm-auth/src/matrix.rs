//! Entity-action matrix.
//!
//! One immutable, process-wide table answering three questions for each
//! [`EntityType`]:
//!
//! - which [`Action`]s it supports,
//! - which grant a relationship listing on it requires,
//! - which action a named operation on it maps onto.
//!
//! # Relationship Listings
//!
//! A listing such as `GET /services/{id}/configs` returns `config` entities,
//! so it requires `config.read`. Owner grants never satisfy it: a caller
//! holding only `service` cannot list the configs attached to a service.
//!
//! ```text
//! owner               listing                         requires
//! ─────────────────   ─────────────────────────────   ───────────────────
//! service             configs                         config.read
//! edge-router-policy  edge-routers                    router.read
//! config-type         configs                         config.read
//! ```
//!
//! The full table is data in [`EntityActionMatrix::global`], never derived
//! from naming.

use crate::token::PermissionToken;
use edgeperm_types::{Action, ActionSet, EntityType, Operation, Resource};
use std::fmt;
use std::sync::LazyLock;

/// A relationship listing on an owner entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubresourceListing {
    /// Path segment after `/{collection}/{id}/`.
    pub name: &'static str,
    /// Entity type returned by the listing.
    pub target: EntityType,
}

impl SubresourceListing {
    const fn new(name: &'static str, target: EntityType) -> Self {
        Self { name, target }
    }

    /// The grant this listing requires: `list` on the target.
    #[must_use]
    pub fn required_grant(&self) -> RequiredGrant {
        RequiredGrant::new(self.target, Action::List)
    }
}

/// An entity-specific verb and the primary action it requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedOperation {
    pub name: &'static str,
    pub action: Action,
}

/// One row of the matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityEntry {
    pub entity: EntityType,
    pub actions: ActionSet,
    pub subresources: &'static [SubresourceListing],
    pub operations: &'static [NamedOperation],
}

impl EntityEntry {
    /// The namespace governing this entity type.
    #[must_use]
    pub fn resource(&self) -> Resource {
        self.entity.resource()
    }

    /// Looks up a relationship listing by name.
    #[must_use]
    pub fn subresource(&self, name: &str) -> Option<&SubresourceListing> {
        self.subresources.iter().find(|s| s.name == name)
    }

    /// Looks up a named operation.
    #[must_use]
    pub fn operation(&self, name: &str) -> Option<&NamedOperation> {
        self.operations.iter().find(|o| o.name == name)
    }
}

/// The `(entity type, action)` pair a request must be granted.
///
/// # Example
///
/// ```
/// use edgeperm_auth::RequiredGrant;
/// use edgeperm_types::{Action, EntityType};
///
/// let grant = RequiredGrant::new(EntityType::EdgeRouter, Action::List);
/// let tokens: Vec<String> = grant.tokens().iter().map(ToString::to_string).collect();
/// assert_eq!(tokens, vec!["router", "router.read"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequiredGrant {
    pub entity: EntityType,
    pub action: Action,
}

impl RequiredGrant {
    #[must_use]
    pub fn new(entity: EntityType, action: Action) -> Self {
        Self { entity, action }
    }

    #[must_use]
    pub fn resource(&self) -> Resource {
        self.entity.resource()
    }

    /// The entity-level and action-level tokens that satisfy this grant.
    #[must_use]
    pub fn tokens(&self) -> [PermissionToken; 2] {
        [
            PermissionToken::Entity(self.resource()),
            PermissionToken::action(self.resource(), self.action),
        ]
    }

    /// The action-level token, used when naming the requirement in a denial.
    #[must_use]
    pub fn action_token(&self) -> PermissionToken {
        PermissionToken::action(self.resource(), self.action)
    }
}

impl fmt::Display for RequiredGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.action, self.entity)
    }
}

/// Why an operation could not be mapped onto a required grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unresolved {
    UnsupportedAction { entity: EntityType, action: Action },
    UnknownListing { entity: EntityType, name: String },
    UnknownOperation { entity: EntityType, name: String },
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedAction { entity, action } => {
                write!(f, "{entity} does not support {action}")
            }
            Self::UnknownListing { entity, name } => {
                write!(f, "{entity} has no '{name}' listing")
            }
            Self::UnknownOperation { entity, name } => {
                write!(f, "{entity} has no '{name}' operation")
            }
        }
    }
}

use EntityType as E;

const IDENTITY_LISTINGS: &[SubresourceListing] = &[
    SubresourceListing::new("edge-router-policies", E::EdgeRouterPolicy),
    SubresourceListing::new("edge-routers", E::EdgeRouter),
    SubresourceListing::new("service-policies", E::ServicePolicy),
    SubresourceListing::new("services", E::Service),
];

const SERVICE_LISTINGS: &[SubresourceListing] = &[
    SubresourceListing::new("configs", E::Config),
    SubresourceListing::new("service-edge-router-policies", E::ServiceEdgeRouterPolicy),
    SubresourceListing::new("edge-routers", E::EdgeRouter),
    SubresourceListing::new("service-policies", E::ServicePolicy),
    SubresourceListing::new("identities", E::Identity),
    SubresourceListing::new("terminators", E::Terminator),
];

const CONFIG_LISTINGS: &[SubresourceListing] =
    &[SubresourceListing::new("services", E::Service)];

const CONFIG_TYPE_LISTINGS: &[SubresourceListing] =
    &[SubresourceListing::new("configs", E::Config)];

const EDGE_ROUTER_LISTINGS: &[SubresourceListing] = &[
    SubresourceListing::new("edge-router-policies", E::EdgeRouterPolicy),
    SubresourceListing::new("service-edge-router-policies", E::ServiceEdgeRouterPolicy),
    SubresourceListing::new("identities", E::Identity),
    SubresourceListing::new("services", E::Service),
];

const EDGE_ROUTER_POLICY_LISTINGS: &[SubresourceListing] = &[
    SubresourceListing::new("edge-routers", E::EdgeRouter),
    SubresourceListing::new("identities", E::Identity),
];

const SERVICE_EDGE_ROUTER_POLICY_LISTINGS: &[SubresourceListing] = &[
    SubresourceListing::new("edge-routers", E::EdgeRouter),
    SubresourceListing::new("services", E::Service),
];

const SERVICE_POLICY_LISTINGS: &[SubresourceListing] = &[
    SubresourceListing::new("services", E::Service),
    SubresourceListing::new("identities", E::Identity),
    SubresourceListing::new("posture-checks", E::PostureCheck),
];

const ENROLLMENT_OPERATIONS: &[NamedOperation] = &[NamedOperation {
    name: "refresh",
    action: Action::Update,
}];

static MATRIX: LazyLock<EntityActionMatrix> = LazyLock::new(EntityActionMatrix::build);

/// Static table of supported actions, listings and named operations.
///
/// Rows are indexed by [`EntityType`] declaration order, so every lookup is
/// a direct index.
///
/// # Example
///
/// ```
/// use edgeperm_auth::EntityActionMatrix;
/// use edgeperm_types::{Action, EntityType};
///
/// let matrix = EntityActionMatrix::global();
/// assert!(!matrix.supports(EntityType::ApiSession, Action::Create));
///
/// let grant = matrix
///     .required_grant_for_subresource(EntityType::Service, "configs")
///     .unwrap();
/// assert_eq!(grant.entity, EntityType::Config);
/// ```
#[derive(Debug)]
pub struct EntityActionMatrix {
    entries: Vec<EntityEntry>,
}

impl EntityActionMatrix {
    /// The process-wide matrix, built on first use.
    #[must_use]
    pub fn global() -> &'static Self {
        &MATRIX
    }

    fn build() -> Self {
        let entries = EntityType::ALL
            .into_iter()
            .map(|entity| {
                let actions = match entity {
                    E::ApiSession => ActionSet::READ_ONLY | ActionSet::DELETE,
                    _ => ActionSet::CRUD,
                };
                let subresources = match entity {
                    E::Identity => IDENTITY_LISTINGS,
                    E::Service => SERVICE_LISTINGS,
                    E::Config => CONFIG_LISTINGS,
                    E::ConfigType => CONFIG_TYPE_LISTINGS,
                    E::EdgeRouter => EDGE_ROUTER_LISTINGS,
                    E::EdgeRouterPolicy => EDGE_ROUTER_POLICY_LISTINGS,
                    E::ServiceEdgeRouterPolicy => SERVICE_EDGE_ROUTER_POLICY_LISTINGS,
                    E::ServicePolicy => SERVICE_POLICY_LISTINGS,
                    _ => &[],
                };
                let operations = match entity {
                    E::Enrollment => ENROLLMENT_OPERATIONS,
                    _ => &[],
                };
                EntityEntry {
                    entity,
                    actions,
                    subresources,
                    operations,
                }
            })
            .collect();
        Self { entries }
    }

    /// The row for `entity`.
    #[must_use]
    pub fn entry(&self, entity: EntityType) -> &EntityEntry {
        &self.entries[entity as usize]
    }

    /// Every row, in [`EntityType::ALL`] order.
    pub fn entries(&self) -> impl Iterator<Item = &EntityEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn supports(&self, entity: EntityType, action: Action) -> bool {
        self.entry(entity).actions.supports(action)
    }

    /// Union of the actions supported by every entity type in `resource`.
    #[must_use]
    pub fn resource_actions(&self, resource: Resource) -> ActionSet {
        resource
            .entity_types()
            .fold(ActionSet::empty(), |acc, e| acc | self.entry(e).actions)
    }

    /// The grant for a primary action, or `None` if `entity` does not
    /// support it.
    #[must_use]
    pub fn required_grant(&self, entity: EntityType, action: Action) -> Option<RequiredGrant> {
        self.supports(entity, action)
            .then(|| RequiredGrant::new(entity, action))
    }

    /// The grant a relationship listing requires: `list` on its target.
    #[must_use]
    pub fn required_grant_for_subresource(
        &self,
        owner: EntityType,
        name: &str,
    ) -> Option<RequiredGrant> {
        self.entry(owner)
            .subresource(name)
            .map(SubresourceListing::required_grant)
    }

    /// The primary action a named operation maps onto.
    #[must_use]
    pub fn required_action_for_operation(&self, entity: EntityType, name: &str) -> Option<Action> {
        self.entry(entity).operation(name).map(|o| o.action)
    }

    /// Maps any [`Operation`] on `entity` onto the grant it requires.
    ///
    /// # Errors
    ///
    /// Returns [`Unresolved`] when the action is unsupported, or the listing
    /// or named operation does not exist on `entity`.
    pub fn resolve(&self, entity: EntityType, operation: &Operation) -> Result<RequiredGrant, Unresolved> {
        let (entity, action) = match operation {
            Operation::ListRelated(name) => {
                let grant = self
                    .required_grant_for_subresource(entity, name)
                    .ok_or_else(|| Unresolved::UnknownListing {
                        entity,
                        name: name.clone(),
                    })?;
                (grant.entity, grant.action)
            }
            Operation::Invoke(name) => {
                let action = self
                    .required_action_for_operation(entity, name)
                    .ok_or_else(|| Unresolved::UnknownOperation {
                        entity,
                        name: name.clone(),
                    })?;
                (entity, action)
            }
            Operation::Create => (entity, Action::Create),
            Operation::Read => (entity, Action::Read),
            Operation::List => (entity, Action::List),
            Operation::Update(_) => (entity, Action::Update),
            Operation::Delete => (entity, Action::Delete),
        };

        self.required_grant(entity, action)
            .ok_or(Unresolved::UnsupportedAction { entity, action })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgeperm_types::UpdateMode;

    fn matrix() -> &'static EntityActionMatrix {
        EntityActionMatrix::global()
    }

    #[test]
    fn rows_follow_entity_order() {
        for (i, entry) in matrix().entries().enumerate() {
            assert_eq!(entry.entity, EntityType::ALL[i]);
        }
        assert_eq!(matrix().entries().count(), EntityType::ALL.len());
    }

    #[test]
    fn api_session_is_read_list_delete() {
        let entry = matrix().entry(E::ApiSession);
        assert_eq!(entry.actions.actions(), vec![Action::Read, Action::List, Action::Delete]);
        assert_eq!(entry.resource(), Resource::Ops);
    }

    #[test]
    fn other_entities_support_crud() {
        for entity in EntityType::ALL.into_iter().filter(|e| *e != E::ApiSession) {
            assert_eq!(matrix().entry(entity).actions, ActionSet::CRUD, "{entity}");
        }
    }

    #[test]
    fn ops_resource_actions() {
        let actions = matrix().resource_actions(Resource::Ops);
        assert!(!actions.supports(Action::Create));
        assert!(!actions.supports(Action::Update));
        assert!(actions.supports(Action::Delete));
    }

    #[test]
    fn required_grant_tokens() {
        let grant = matrix()
            .required_grant(E::ApiSession, Action::List)
            .expect("supported");
        let tokens: Vec<String> = grant.tokens().iter().map(ToString::to_string).collect();
        assert_eq!(tokens, vec!["ops", "ops.read"]);
        assert_eq!(matrix().required_grant(E::ApiSession, Action::Update), None);
    }

    #[test]
    fn subresource_targets() {
        let cases = [
            (E::Identity, "edge-routers", E::EdgeRouter),
            (E::Service, "terminators", E::Terminator),
            (E::Config, "services", E::Service),
            (E::ConfigType, "configs", E::Config),
            (E::EdgeRouter, "identities", E::Identity),
            (E::EdgeRouterPolicy, "edge-routers", E::EdgeRouter),
            (E::ServiceEdgeRouterPolicy, "services", E::Service),
            (E::ServicePolicy, "posture-checks", E::PostureCheck),
        ];
        for (owner, name, target) in cases {
            let grant = matrix()
                .required_grant_for_subresource(owner, name)
                .unwrap_or_else(|| panic!("{owner} {name}"));
            assert_eq!(grant, RequiredGrant::new(target, Action::List));
        }
    }

    #[test]
    fn edge_router_policy_listing_requires_router_read() {
        let grant = matrix()
            .required_grant_for_subresource(E::EdgeRouterPolicy, "edge-routers")
            .expect("listing");
        assert_eq!(grant.action_token().to_string(), "router.read");
    }

    #[test]
    fn unknown_subresource() {
        assert_eq!(matrix().required_grant_for_subresource(E::Ca, "services"), None);
        assert_eq!(
            matrix().required_grant_for_subresource(E::Service, "widgets"),
            None
        );
    }

    #[test]
    fn enrollment_refresh_is_update() {
        assert_eq!(
            matrix().required_action_for_operation(E::Enrollment, "refresh"),
            Some(Action::Update)
        );
        assert_eq!(matrix().required_action_for_operation(E::Identity, "refresh"), None);
    }

    #[test]
    fn resolve_primary_operations() {
        assert_eq!(
            matrix().resolve(E::Service, &Operation::Update(UpdateMode::Partial)),
            Ok(RequiredGrant::new(E::Service, Action::Update))
        );
        assert_eq!(
            matrix().resolve(E::ApiSession, &Operation::Create),
            Err(Unresolved::UnsupportedAction {
                entity: E::ApiSession,
                action: Action::Create
            })
        );
    }

    #[test]
    fn resolve_listing_uses_target() {
        assert_eq!(
            matrix().resolve(E::ConfigType, &Operation::ListRelated("configs".into())),
            Ok(RequiredGrant::new(E::Config, Action::List))
        );
        let err = matrix()
            .resolve(E::Ca, &Operation::ListRelated("identities".into()))
            .unwrap_err();
        assert!(err.to_string().contains("no 'identities' listing"), "got: {err}");
    }

    #[test]
    fn resolve_named_operation() {
        assert_eq!(
            matrix().resolve(E::Enrollment, &Operation::Invoke("refresh".into())),
            Ok(RequiredGrant::new(E::Enrollment, Action::Update))
        );
        assert!(matches!(
            matrix().resolve(E::Enrollment, &Operation::Invoke("revoke".into())),
            Err(Unresolved::UnknownOperation { .. })
        ));
    }

    #[test]
    fn every_listing_target_supports_list() {
        for entry in matrix().entries() {
            for listing in entry.subresources {
                assert!(
                    matrix().supports(listing.target, Action::List),
                    "{} {}",
                    entry.entity,
                    listing.name
                );
            }
        }
    }
}
