//! Edgeperm Runtime - request handling layer.
//!
//! Binds the pure policy in `edgeperm-auth` to the things a management API
//! server has to deal with: raw routes, audit logs and layered configuration.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Policy Layer                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  edgeperm-types : EntityType, Action, Operation, ErrorCode  │
//! │  edgeperm-auth  : Matrix, Registry, Guard, Evaluator        │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Runtime Layer (THIS CRATE)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  auth/   : ROUTES, resolve, AuthzService                    │
//! │  config/ : EdgepermConfig, ConfigLoader, ConfigResolver     │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Frontend Layer                             │
//! │  (edgeperm-cli)                                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! ## [`auth`] - Request Authorization
//!
//! - [`AuthzService`](auth::AuthzService): audited decisions and identity flows
//! - [`resolve`](auth::resolve): maps `(method, path)` to a route
//! - [`ROUTES`](auth::ROUTES): the management API route table
//!
//! ## [`config`] - Configuration Management
//!
//! - [`EdgepermConfig`](config::EdgepermConfig): merged settings
//! - [`ConfigLoader`](config::ConfigLoader): global, project and env layers
//! - [`ConfigResolver`](config::ConfigResolver): per-invocation overrides
//!
//! # Example
//!
//! ```
//! use edgeperm_auth::CallerGrants;
//! use edgeperm_runtime::auth::{AuthzService, Method};
//! use edgeperm_runtime::config::EdgepermConfig;
//!
//! let service = AuthzService::new(&EdgepermConfig::default());
//! let grants = CallerGrants::from_tokens(["service.read"]);
//!
//! let (route, decision) = service
//!     .authorize_route(&grants, Method::Get, "/services/svc-1/configs")
//!     .unwrap();
//! assert_eq!(route.route.to_string(), "GET /services/{id}/configs");
//! assert_eq!(route.id.as_deref(), Some("svc-1"));
//! assert!(decision.is_denied());
//! ```

pub mod auth;
pub mod config;

pub use auth::{AuthzService, Method, RouteError, RouteMatch};
pub use config::{ConfigError, ConfigLoader, ConfigResolver, EdgepermConfig};
