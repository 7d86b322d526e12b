//! Core types for edgeperm.
//!
//! This crate provides the vocabulary shared by every layer of the
//! authorization core for the overlay control plane's management API.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  edgeperm-types   : EntityType, Resource, Action, ErrorCode │ ◄── HERE
//! ├─────────────────────────────────────────────────────────────┤
//! │  edgeperm-auth    : Matrix, Registry, Guard, Evaluator      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  edgeperm-runtime : AuthzService, routes, config            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  edgeperm-cli     : Command-line interface                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Entity Types vs Resources
//!
//! An [`EntityType`] is something the management API exposes (edge routers,
//! api sessions, authenticators, ...). A [`Resource`] is the namespace used
//! in permission tokens. Several entity types can share one resource:
//!
//! | Entity type | Resource |
//! |-------------|----------|
//! | `edge-router`, `transit-router` | `router` |
//! | `api-session` | `ops` |
//! | `authenticator` | `identity` |
//!
//! # Example
//!
//! ```
//! use edgeperm_types::{Action, EntityType, Resource};
//!
//! let entity: EntityType = "transit-router".parse().unwrap();
//! assert_eq!(entity.resource(), Resource::Router);
//!
//! // Listing is granted by the read token
//! assert_eq!(Action::List.grant_action(), Action::Read);
//! ```

mod action;
mod entity;
mod error;

pub use action::{Action, ActionSet, Operation, ParseActionError, UpdateMode};
pub use entity::{EntityType, ParseEntityError, Resource};
pub use error::{assert_error_code, assert_error_codes, ErrorCode};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_entity_type_has_a_resource() {
        for entity in EntityType::ALL {
            let resource = entity.resource();
            assert!(Resource::ALL.contains(&resource), "{entity} -> {resource}");
        }
    }

    #[test]
    fn every_resource_governs_at_least_one_entity() {
        for resource in Resource::ALL {
            assert!(
                EntityType::ALL.iter().any(|e| e.resource() == resource),
                "{resource} governs nothing"
            );
        }
    }

    #[test]
    fn shared_resources() {
        assert_eq!(EntityType::EdgeRouter.resource(), Resource::Router);
        assert_eq!(EntityType::TransitRouter.resource(), Resource::Router);
        assert_eq!(EntityType::ApiSession.resource(), Resource::Ops);
        assert_eq!(EntityType::Authenticator.resource(), Resource::Identity);
    }
}
