//! Entity types and permission resources.
//!
//! [`EntityType`] is the closed set of things the management API exposes.
//! [`Resource`] is the namespace a permission token is written against.
//! The mapping between them is fixed and lives here, next to the types,
//! so no layer above has to infer it from naming.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a string names no known entity type or resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: '{name}'")]
pub struct ParseEntityError {
    kind: &'static str,
    name: String,
}

impl ParseEntityError {
    /// The string that failed to parse.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// An entity type exposed by the management API.
///
/// # Example
///
/// ```
/// use edgeperm_types::EntityType;
///
/// let entity: EntityType = "service-policy".parse().unwrap();
/// assert_eq!(entity, EntityType::ServicePolicy);
/// assert_eq!(entity.collection(), "service-policies");
/// assert_eq!(entity.to_string(), "service-policy");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityType {
    Identity,
    Service,
    Config,
    ConfigType,
    EdgeRouter,
    TransitRouter,
    EdgeRouterPolicy,
    ServiceEdgeRouterPolicy,
    ServicePolicy,
    Terminator,
    Ca,
    Authenticator,
    Enrollment,
    ExternalJwtSigner,
    AuthPolicy,
    PostureCheck,
    ApiSession,
}

impl EntityType {
    /// Every entity type, in declaration order.
    pub const ALL: [Self; 17] = [
        Self::Identity,
        Self::Service,
        Self::Config,
        Self::ConfigType,
        Self::EdgeRouter,
        Self::TransitRouter,
        Self::EdgeRouterPolicy,
        Self::ServiceEdgeRouterPolicy,
        Self::ServicePolicy,
        Self::Terminator,
        Self::Ca,
        Self::Authenticator,
        Self::Enrollment,
        Self::ExternalJwtSigner,
        Self::AuthPolicy,
        Self::PostureCheck,
        Self::ApiSession,
    ];

    /// Singular kebab-case name (`"edge-router-policy"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Service => "service",
            Self::Config => "config",
            Self::ConfigType => "config-type",
            Self::EdgeRouter => "edge-router",
            Self::TransitRouter => "transit-router",
            Self::EdgeRouterPolicy => "edge-router-policy",
            Self::ServiceEdgeRouterPolicy => "service-edge-router-policy",
            Self::ServicePolicy => "service-policy",
            Self::Terminator => "terminator",
            Self::Ca => "ca",
            Self::Authenticator => "authenticator",
            Self::Enrollment => "enrollment",
            Self::ExternalJwtSigner => "external-jwt-signer",
            Self::AuthPolicy => "auth-policy",
            Self::PostureCheck => "posture-check",
            Self::ApiSession => "api-session",
        }
    }

    /// Plural path segment used by the management API (`"edge-router-policies"`).
    #[must_use]
    pub fn collection(self) -> &'static str {
        match self {
            Self::Identity => "identities",
            Self::Service => "services",
            Self::Config => "configs",
            Self::ConfigType => "config-types",
            Self::EdgeRouter => "edge-routers",
            Self::TransitRouter => "transit-routers",
            Self::EdgeRouterPolicy => "edge-router-policies",
            Self::ServiceEdgeRouterPolicy => "service-edge-router-policies",
            Self::ServicePolicy => "service-policies",
            Self::Terminator => "terminators",
            Self::Ca => "cas",
            Self::Authenticator => "authenticators",
            Self::Enrollment => "enrollments",
            Self::ExternalJwtSigner => "external-jwt-signers",
            Self::AuthPolicy => "auth-policies",
            Self::PostureCheck => "posture-checks",
            Self::ApiSession => "api-sessions",
        }
    }

    /// The permission namespace governing this entity type.
    ///
    /// Authenticators have no namespace of their own: they are managed
    /// through identity permissions.
    #[must_use]
    pub fn resource(self) -> Resource {
        match self {
            Self::Identity | Self::Authenticator => Resource::Identity,
            Self::Service => Resource::Service,
            Self::Config => Resource::Config,
            Self::ConfigType => Resource::ConfigType,
            Self::EdgeRouter | Self::TransitRouter => Resource::Router,
            Self::EdgeRouterPolicy => Resource::EdgeRouterPolicy,
            Self::ServiceEdgeRouterPolicy => Resource::ServiceEdgeRouterPolicy,
            Self::ServicePolicy => Resource::ServicePolicy,
            Self::Terminator => Resource::Terminator,
            Self::Ca => Resource::Ca,
            Self::Enrollment => Resource::Enrollment,
            Self::ExternalJwtSigner => Resource::ExternalJwtSigner,
            Self::AuthPolicy => Resource::AuthPolicy,
            Self::PostureCheck => Resource::PostureCheck,
            Self::ApiSession => Resource::Ops,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = ParseEntityError;

    /// Accepts the singular name; `"router"` is accepted as an alias for
    /// `transit-router`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "router" {
            return Ok(Self::TransitRouter);
        }
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| ParseEntityError {
                kind: "entity type",
                name: s.to_string(),
            })
    }
}

/// A permission namespace: the `X` in tokens `X` and `X.action`.
///
/// # Example
///
/// ```
/// use edgeperm_types::Resource;
///
/// let r: Resource = "ops".parse().unwrap();
/// assert_eq!(r, Resource::Ops);
/// assert!("authenticator".parse::<Resource>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    Identity,
    Service,
    Config,
    ConfigType,
    Router,
    EdgeRouterPolicy,
    ServiceEdgeRouterPolicy,
    ServicePolicy,
    Terminator,
    Ca,
    Enrollment,
    ExternalJwtSigner,
    AuthPolicy,
    PostureCheck,
    Ops,
}

impl Resource {
    /// Every resource, in declaration order.
    pub const ALL: [Self; 15] = [
        Self::Identity,
        Self::Service,
        Self::Config,
        Self::ConfigType,
        Self::Router,
        Self::EdgeRouterPolicy,
        Self::ServiceEdgeRouterPolicy,
        Self::ServicePolicy,
        Self::Terminator,
        Self::Ca,
        Self::Enrollment,
        Self::ExternalJwtSigner,
        Self::AuthPolicy,
        Self::PostureCheck,
        Self::Ops,
    ];

    /// Token namespace string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Service => "service",
            Self::Config => "config",
            Self::ConfigType => "config-type",
            Self::Router => "router",
            Self::EdgeRouterPolicy => "edge-router-policy",
            Self::ServiceEdgeRouterPolicy => "service-edge-router-policy",
            Self::ServicePolicy => "service-policy",
            Self::Terminator => "terminator",
            Self::Ca => "ca",
            Self::Enrollment => "enrollment",
            Self::ExternalJwtSigner => "external-jwt-signer",
            Self::AuthPolicy => "auth-policy",
            Self::PostureCheck => "posture-check",
            Self::Ops => "ops",
        }
    }

    /// Entity types governed by this resource.
    pub fn entity_types(self) -> impl Iterator<Item = EntityType> {
        EntityType::ALL
            .into_iter()
            .filter(move |e| e.resource() == self)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = ParseEntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ParseEntityError {
                kind: "resource",
                name: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_name_roundtrip() {
        for entity in EntityType::ALL {
            let parsed: EntityType = entity.as_str().parse().expect("parse own name");
            assert_eq!(parsed, entity);
        }
    }

    #[test]
    fn router_alias_is_transit_router() {
        assert_eq!(
            "router".parse::<EntityType>().expect("alias"),
            EntityType::TransitRouter
        );
    }

    #[test]
    fn collections_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for entity in EntityType::ALL {
            assert!(seen.insert(entity.collection()), "{}", entity.collection());
        }
    }

    #[test]
    fn unknown_entity_error() {
        let err = "widget".parse::<EntityType>().unwrap_err();
        assert_eq!(err.name(), "widget");
        assert!(err.to_string().contains("entity type"), "got: {err}");
    }

    #[test]
    fn authenticator_is_not_a_resource() {
        let err = "authenticator".parse::<Resource>().unwrap_err();
        assert!(err.to_string().contains("resource"), "got: {err}");
    }

    #[test]
    fn router_resource_governs_both_router_kinds() {
        let governed: Vec<_> = Resource::Router.entity_types().collect();
        assert_eq!(
            governed,
            vec![EntityType::EdgeRouter, EntityType::TransitRouter]
        );
    }

    #[test]
    fn identity_resource_governs_authenticators() {
        let governed: Vec<_> = Resource::Identity.entity_types().collect();
        assert_eq!(
            governed,
            vec![EntityType::Identity, EntityType::Authenticator]
        );
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&EntityType::ServiceEdgeRouterPolicy).expect("serialize");
        assert_eq!(json, "\"service-edge-router-policy\"");
        let parsed: Resource = serde_json::from_str("\"config-type\"").expect("deserialize");
        assert_eq!(parsed, Resource::ConfigType);
    }
}
