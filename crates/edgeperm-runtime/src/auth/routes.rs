//! Management API route table.
//!
//! Maps `(method, path)` onto the `(entity type, operation)` pair the
//! evaluator authorizes. The table is written out route by route so that a
//! route added here without a matching matrix entry fails the coverage test
//! instead of silently resolving to something else.
//!
//! ```text
//! GET    /services                 -> service        list
//! POST   /services                 -> service        create
//! GET    /services/{id}            -> service        read
//! PUT    /services/{id}            -> service        update (full)
//! PATCH  /services/{id}            -> service        update (partial)
//! DELETE /services/{id}            -> service        delete
//! GET    /services/{id}/configs    -> service        list-related configs
//! POST   /enrollments/{id}/refresh -> enrollment     invoke refresh
//! ```

use edgeperm_types::{EntityType, ErrorCode, Operation, UpdateMode};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// HTTP method of a management API route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            _ => Err(RouteError::UnknownMethod(s.to_string())),
        }
    }
}

/// Route resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("unknown HTTP method: '{0}'")]
    UnknownMethod(String),

    #[error("no route for {method} {path}")]
    NotFound { method: Method, path: String },
}

impl RouteError {
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::UnknownMethod(_) => 405,
            Self::NotFound { .. } => 404,
        }
    }
}

impl ErrorCode for RouteError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownMethod(_) => "ROUTE_UNKNOWN_METHOD",
            Self::NotFound { .. } => "ROUTE_NOT_FOUND",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// What a route does, in `'static` form so the table can be a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Create,
    Read,
    List,
    Update(UpdateMode),
    Delete,
    ListRelated(&'static str),
    Invoke(&'static str),
}

impl RouteKind {
    #[must_use]
    pub fn operation(self) -> Operation {
        match self {
            Self::Create => Operation::Create,
            Self::Read => Operation::Read,
            Self::List => Operation::List,
            Self::Update(mode) => Operation::Update(mode),
            Self::Delete => Operation::Delete,
            Self::ListRelated(name) => Operation::ListRelated(name.to_string()),
            Self::Invoke(name) => Operation::Invoke(name.to_string()),
        }
    }
}

/// One management API route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub method: Method,
    /// Path with `{id}` placeholders, e.g. `/services/{id}/configs`.
    pub pattern: &'static str,
    pub entity: EntityType,
    pub kind: RouteKind,
}

impl Route {
    /// Matches `path` segment by segment; `{id}` matches any non-empty segment.
    ///
    /// One leading and one trailing slash are ignored. Any other empty
    /// segment fails the match, so `/services//configs` is not a detail path.
    ///
    /// Returns the captured id, or `Some(None)` for collection routes.
    fn capture<'p>(&self, path: &'p str) -> Option<Option<&'p str>> {
        let path = path.strip_prefix('/').unwrap_or(path);
        let path = path.strip_suffix('/').unwrap_or(path);
        let mut pattern = self.pattern.trim_start_matches('/').split('/');
        let mut actual = path.split('/');
        let mut id = None;

        loop {
            match (pattern.next(), actual.next()) {
                (None, None) => return Some(id),
                (_, Some("")) => return None,
                (Some("{id}"), Some(seg)) => id = Some(seg),
                (Some(p), Some(seg)) if p == seg => {}
                _ => return None,
            }
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.pattern)
    }
}

/// A resolved request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: &'static Route,
    /// Value of the `{id}` segment, if the route has one.
    pub id: Option<String>,
}

impl RouteMatch {
    #[must_use]
    pub fn entity(&self) -> EntityType {
        self.route.entity
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        self.route.kind.operation()
    }
}

const fn route(method: Method, pattern: &'static str, entity: EntityType, kind: RouteKind) -> Route {
    Route {
        method,
        pattern,
        entity,
        kind,
    }
}

use EntityType as E;
use Method::{Delete as DELETE, Get as GET, Patch as PATCH, Post as POST, Put as PUT};
use RouteKind as K;

const FULL: RouteKind = K::Update(UpdateMode::Full);
const PARTIAL: RouteKind = K::Update(UpdateMode::Partial);

/// Every management API route.
#[rustfmt::skip]
pub static ROUTES: &[Route] = &[
    // identities
    route(GET, "/identities", E::Identity, K::List),
    route(POST, "/identities", E::Identity, K::Create),
    route(GET, "/identities/{id}", E::Identity, K::Read),
    route(PUT, "/identities/{id}", E::Identity, FULL),
    route(PATCH, "/identities/{id}", E::Identity, PARTIAL),
    route(DELETE, "/identities/{id}", E::Identity, K::Delete),
    route(GET, "/identities/{id}/edge-router-policies", E::Identity, K::ListRelated("edge-router-policies")),
    route(GET, "/identities/{id}/edge-routers", E::Identity, K::ListRelated("edge-routers")),
    route(GET, "/identities/{id}/service-policies", E::Identity, K::ListRelated("service-policies")),
    route(GET, "/identities/{id}/services", E::Identity, K::ListRelated("services")),
    // services
    route(GET, "/services", E::Service, K::List),
    route(POST, "/services", E::Service, K::Create),
    route(GET, "/services/{id}", E::Service, K::Read),
    route(PUT, "/services/{id}", E::Service, FULL),
    route(PATCH, "/services/{id}", E::Service, PARTIAL),
    route(DELETE, "/services/{id}", E::Service, K::Delete),
    route(GET, "/services/{id}/configs", E::Service, K::ListRelated("configs")),
    route(GET, "/services/{id}/service-edge-router-policies", E::Service, K::ListRelated("service-edge-router-policies")),
    route(GET, "/services/{id}/edge-routers", E::Service, K::ListRelated("edge-routers")),
    route(GET, "/services/{id}/service-policies", E::Service, K::ListRelated("service-policies")),
    route(GET, "/services/{id}/identities", E::Service, K::ListRelated("identities")),
    route(GET, "/services/{id}/terminators", E::Service, K::ListRelated("terminators")),
    // configs
    route(GET, "/configs", E::Config, K::List),
    route(POST, "/configs", E::Config, K::Create),
    route(GET, "/configs/{id}", E::Config, K::Read),
    route(PUT, "/configs/{id}", E::Config, FULL),
    route(PATCH, "/configs/{id}", E::Config, PARTIAL),
    route(DELETE, "/configs/{id}", E::Config, K::Delete),
    route(GET, "/configs/{id}/services", E::Config, K::ListRelated("services")),
    // config types
    route(GET, "/config-types", E::ConfigType, K::List),
    route(POST, "/config-types", E::ConfigType, K::Create),
    route(GET, "/config-types/{id}", E::ConfigType, K::Read),
    route(PUT, "/config-types/{id}", E::ConfigType, FULL),
    route(PATCH, "/config-types/{id}", E::ConfigType, PARTIAL),
    route(DELETE, "/config-types/{id}", E::ConfigType, K::Delete),
    route(GET, "/config-types/{id}/configs", E::ConfigType, K::ListRelated("configs")),
    // edge routers
    route(GET, "/edge-routers", E::EdgeRouter, K::List),
    route(POST, "/edge-routers", E::EdgeRouter, K::Create),
    route(GET, "/edge-routers/{id}", E::EdgeRouter, K::Read),
    route(PUT, "/edge-routers/{id}", E::EdgeRouter, FULL),
    route(PATCH, "/edge-routers/{id}", E::EdgeRouter, PARTIAL),
    route(DELETE, "/edge-routers/{id}", E::EdgeRouter, K::Delete),
    route(GET, "/edge-routers/{id}/edge-router-policies", E::EdgeRouter, K::ListRelated("edge-router-policies")),
    route(GET, "/edge-routers/{id}/service-edge-router-policies", E::EdgeRouter, K::ListRelated("service-edge-router-policies")),
    route(GET, "/edge-routers/{id}/identities", E::EdgeRouter, K::ListRelated("identities")),
    route(GET, "/edge-routers/{id}/services", E::EdgeRouter, K::ListRelated("services")),
    // transit routers
    route(GET, "/transit-routers", E::TransitRouter, K::List),
    route(POST, "/transit-routers", E::TransitRouter, K::Create),
    route(GET, "/transit-routers/{id}", E::TransitRouter, K::Read),
    route(PUT, "/transit-routers/{id}", E::TransitRouter, FULL),
    route(PATCH, "/transit-routers/{id}", E::TransitRouter, PARTIAL),
    route(DELETE, "/transit-routers/{id}", E::TransitRouter, K::Delete),
    // edge router policies
    route(GET, "/edge-router-policies", E::EdgeRouterPolicy, K::List),
    route(POST, "/edge-router-policies", E::EdgeRouterPolicy, K::Create),
    route(GET, "/edge-router-policies/{id}", E::EdgeRouterPolicy, K::Read),
    route(PUT, "/edge-router-policies/{id}", E::EdgeRouterPolicy, FULL),
    route(PATCH, "/edge-router-policies/{id}", E::EdgeRouterPolicy, PARTIAL),
    route(DELETE, "/edge-router-policies/{id}", E::EdgeRouterPolicy, K::Delete),
    route(GET, "/edge-router-policies/{id}/edge-routers", E::EdgeRouterPolicy, K::ListRelated("edge-routers")),
    route(GET, "/edge-router-policies/{id}/identities", E::EdgeRouterPolicy, K::ListRelated("identities")),
    // service edge router policies
    route(GET, "/service-edge-router-policies", E::ServiceEdgeRouterPolicy, K::List),
    route(POST, "/service-edge-router-policies", E::ServiceEdgeRouterPolicy, K::Create),
    route(GET, "/service-edge-router-policies/{id}", E::ServiceEdgeRouterPolicy, K::Read),
    route(PUT, "/service-edge-router-policies/{id}", E::ServiceEdgeRouterPolicy, FULL),
    route(PATCH, "/service-edge-router-policies/{id}", E::ServiceEdgeRouterPolicy, PARTIAL),
    route(DELETE, "/service-edge-router-policies/{id}", E::ServiceEdgeRouterPolicy, K::Delete),
    route(GET, "/service-edge-router-policies/{id}/edge-routers", E::ServiceEdgeRouterPolicy, K::ListRelated("edge-routers")),
    route(GET, "/service-edge-router-policies/{id}/services", E::ServiceEdgeRouterPolicy, K::ListRelated("services")),
    // service policies
    route(GET, "/service-policies", E::ServicePolicy, K::List),
    route(POST, "/service-policies", E::ServicePolicy, K::Create),
    route(GET, "/service-policies/{id}", E::ServicePolicy, K::Read),
    route(PUT, "/service-policies/{id}", E::ServicePolicy, FULL),
    route(PATCH, "/service-policies/{id}", E::ServicePolicy, PARTIAL),
    route(DELETE, "/service-policies/{id}", E::ServicePolicy, K::Delete),
    route(GET, "/service-policies/{id}/services", E::ServicePolicy, K::ListRelated("services")),
    route(GET, "/service-policies/{id}/identities", E::ServicePolicy, K::ListRelated("identities")),
    route(GET, "/service-policies/{id}/posture-checks", E::ServicePolicy, K::ListRelated("posture-checks")),
    // terminators
    route(GET, "/terminators", E::Terminator, K::List),
    route(POST, "/terminators", E::Terminator, K::Create),
    route(GET, "/terminators/{id}", E::Terminator, K::Read),
    route(PUT, "/terminators/{id}", E::Terminator, FULL),
    route(PATCH, "/terminators/{id}", E::Terminator, PARTIAL),
    route(DELETE, "/terminators/{id}", E::Terminator, K::Delete),
    // certificate authorities
    route(GET, "/cas", E::Ca, K::List),
    route(POST, "/cas", E::Ca, K::Create),
    route(GET, "/cas/{id}", E::Ca, K::Read),
    route(PUT, "/cas/{id}", E::Ca, FULL),
    route(PATCH, "/cas/{id}", E::Ca, PARTIAL),
    route(DELETE, "/cas/{id}", E::Ca, K::Delete),
    // authenticators
    route(GET, "/authenticators", E::Authenticator, K::List),
    route(POST, "/authenticators", E::Authenticator, K::Create),
    route(GET, "/authenticators/{id}", E::Authenticator, K::Read),
    route(PUT, "/authenticators/{id}", E::Authenticator, FULL),
    route(PATCH, "/authenticators/{id}", E::Authenticator, PARTIAL),
    route(DELETE, "/authenticators/{id}", E::Authenticator, K::Delete),
    // enrollments
    route(GET, "/enrollments", E::Enrollment, K::List),
    route(POST, "/enrollments", E::Enrollment, K::Create),
    route(GET, "/enrollments/{id}", E::Enrollment, K::Read),
    route(PUT, "/enrollments/{id}", E::Enrollment, FULL),
    route(PATCH, "/enrollments/{id}", E::Enrollment, PARTIAL),
    route(DELETE, "/enrollments/{id}", E::Enrollment, K::Delete),
    route(POST, "/enrollments/{id}/refresh", E::Enrollment, K::Invoke("refresh")),
    // external JWT signers
    route(GET, "/external-jwt-signers", E::ExternalJwtSigner, K::List),
    route(POST, "/external-jwt-signers", E::ExternalJwtSigner, K::Create),
    route(GET, "/external-jwt-signers/{id}", E::ExternalJwtSigner, K::Read),
    route(PUT, "/external-jwt-signers/{id}", E::ExternalJwtSigner, FULL),
    route(PATCH, "/external-jwt-signers/{id}", E::ExternalJwtSigner, PARTIAL),
    route(DELETE, "/external-jwt-signers/{id}", E::ExternalJwtSigner, K::Delete),
    // auth policies
    route(GET, "/auth-policies", E::AuthPolicy, K::List),
    route(POST, "/auth-policies", E::AuthPolicy, K::Create),
    route(GET, "/auth-policies/{id}", E::AuthPolicy, K::Read),
    route(PUT, "/auth-policies/{id}", E::AuthPolicy, FULL),
    route(PATCH, "/auth-policies/{id}", E::AuthPolicy, PARTIAL),
    route(DELETE, "/auth-policies/{id}", E::AuthPolicy, K::Delete),
    // posture checks
    route(GET, "/posture-checks", E::PostureCheck, K::List),
    route(POST, "/posture-checks", E::PostureCheck, K::Create),
    route(GET, "/posture-checks/{id}", E::PostureCheck, K::Read),
    route(PUT, "/posture-checks/{id}", E::PostureCheck, FULL),
    route(PATCH, "/posture-checks/{id}", E::PostureCheck, PARTIAL),
    route(DELETE, "/posture-checks/{id}", E::PostureCheck, K::Delete),
    // api sessions
    route(GET, "/api-sessions", E::ApiSession, K::List),
    route(GET, "/api-sessions/{id}", E::ApiSession, K::Read),
    route(DELETE, "/api-sessions/{id}", E::ApiSession, K::Delete),
];

/// Resolves a request line against [`ROUTES`].
///
/// A query string and trailing slash are ignored.
///
/// # Errors
///
/// Returns [`RouteError::NotFound`] when no route matches.
///
/// # Example
///
/// ```
/// use edgeperm_runtime::auth::{resolve, Method};
/// use edgeperm_types::{EntityType, Operation};
///
/// let m = resolve(Method::Get, "/edge-routers/er-1/edge-router-policies?limit=10").unwrap();
/// assert_eq!(m.entity(), EntityType::EdgeRouter);
/// assert_eq!(m.operation(), Operation::ListRelated("edge-router-policies".into()));
/// assert_eq!(m.id.as_deref(), Some("er-1"));
/// ```
pub fn resolve(method: Method, path: &str) -> Result<RouteMatch, RouteError> {
    let path = path.split(['?', '#']).next().unwrap_or_default();

    ROUTES
        .iter()
        .filter(|r| r.method == method)
        .find_map(|r| {
            r.capture(path).map(|id| RouteMatch {
                route: r,
                id: id.map(str::to_string),
            })
        })
        .ok_or_else(|| RouteError::NotFound {
            method,
            path: path.to_string(),
        })
}
