//! The request being authorized.

use crate::identity::{IdentityChanges, IdentitySnapshot};
use edgeperm_types::{EntityType, Operation, Resource, UpdateMode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An operation on an entity type, plus identity context when relevant.
///
/// # Example
///
/// ```
/// use edgeperm_auth::{AccessRequest, IdentityChanges, IdentitySnapshot};
/// use edgeperm_types::{EntityType, Operation};
///
/// let req = AccessRequest::patch(EntityType::Identity)
///     .with_target(IdentitySnapshot::new("id-1"))
///     .with_changes(IdentityChanges::new().with_name("renamed"));
/// assert_eq!(req.to_string(), "patch identity");
///
/// let req = AccessRequest::list_related(EntityType::Service, "configs");
/// assert_eq!(req.operation, Operation::ListRelated("configs".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequest {
    pub entity: EntityType,
    pub operation: Operation,
    /// Stored identity targeted by an update, patch or delete. For
    /// authenticator mutations, the identity owning the authenticator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<IdentitySnapshot>,
    /// Payload of an identity create, update or patch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<IdentityChanges>,
}

impl AccessRequest {
    #[must_use]
    pub fn new(entity: EntityType, operation: Operation) -> Self {
        Self {
            entity,
            operation,
            target: None,
            changes: None,
        }
    }

    #[must_use]
    pub fn create(entity: EntityType) -> Self {
        Self::new(entity, Operation::Create)
    }

    #[must_use]
    pub fn read(entity: EntityType) -> Self {
        Self::new(entity, Operation::Read)
    }

    #[must_use]
    pub fn list(entity: EntityType) -> Self {
        Self::new(entity, Operation::List)
    }

    /// `PUT`.
    #[must_use]
    pub fn update(entity: EntityType) -> Self {
        Self::new(entity, Operation::Update(UpdateMode::Full))
    }

    /// `PATCH`.
    #[must_use]
    pub fn patch(entity: EntityType) -> Self {
        Self::new(entity, Operation::Update(UpdateMode::Partial))
    }

    #[must_use]
    pub fn delete(entity: EntityType) -> Self {
        Self::new(entity, Operation::Delete)
    }

    #[must_use]
    pub fn list_related(owner: EntityType, listing: impl Into<String>) -> Self {
        Self::new(owner, Operation::ListRelated(listing.into()))
    }

    #[must_use]
    pub fn invoke(entity: EntityType, name: impl Into<String>) -> Self {
        Self::new(entity, Operation::Invoke(name.into()))
    }

    #[must_use]
    pub fn with_target(mut self, target: IdentitySnapshot) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_changes(mut self, changes: IdentityChanges) -> Self {
        self.changes = Some(changes);
        self
    }

    /// `true` for any mutation in the identity namespace: identities and
    /// the authenticators they own.
    #[must_use]
    pub fn is_identity_mutation(&self) -> bool {
        self.entity.resource() == Resource::Identity && self.operation.is_mutation()
    }

    /// Names the context an identity mutation needs but does not carry.
    ///
    /// Identity creates need the payload, deletes need the stored identity,
    /// updates need both. Authenticator mutations need the owning identity.
    /// Returns `None` when nothing is missing or the request is not an
    /// identity mutation.
    #[must_use]
    pub fn missing_identity_context(&self) -> Option<&'static str> {
        if !self.is_identity_mutation() {
            return None;
        }
        let needs_target =
            self.entity == EntityType::Authenticator || self.operation != Operation::Create;
        let needs_changes =
            self.entity == EntityType::Identity && self.operation != Operation::Delete;

        if needs_target && self.target.is_none() {
            Some("target")
        } else if needs_changes && self.changes.is_none() {
            Some("payload")
        } else {
            None
        }
    }
}

impl fmt::Display for AccessRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operation, self.entity)
    }
}
