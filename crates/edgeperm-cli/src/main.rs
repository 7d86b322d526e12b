//! edgeperm CLI - management API permission evaluator
//!
//! # Configuration
//!
//! Configuration is loaded from multiple sources with priority:
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`EDGEPERM_*`)
//! 3. Project config (`.edgeperm/config.toml` in the project root)
//! 4. Global config (`~/.edgeperm/config.toml`, or `--config`)
//! 5. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! - `EDGEPERM_DEBUG`: Enable debug logging (`true`/`false`)
//! - `EDGEPERM_AUDIT_LOG_ALLOWED`: Log allowed decisions at info
//! - `EDGEPERM_IMMUTABLE_FIELDS`: `strip` or `reject` for `isDefaultAdmin`
//! - `EDGEPERM_LOG_LEVEL`: Default tracing filter when `RUST_LOG` is unset
//!
//! # Exit Status
//!
//! `0` when the request is allowed (or the tokens are valid), `1` on a
//! denial or any other rejection. Rejections print
//! `<http status> <error code>: <message>` to stdout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use edgeperm_auth::{
    AccessRequest, AuthzError, CallerGrants, Decision, EntityActionMatrix, IdentityChanges,
    IdentitySnapshot, PermissionRegistry,
};
use edgeperm_runtime::auth::{AuthzService, Method, RouteError, ROUTES};
use edgeperm_runtime::config::{ConfigLoader, ConfigResolver, EdgepermConfig, ImmutableFieldMode};
use edgeperm_types::{EntityType, ErrorCode, Operation, UpdateMode};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// edgeperm - management API permission evaluator
#[derive(Parser, Debug)]
#[command(name = "edgeperm")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project root directory (defaults to current directory)
    #[arg(short = 'C', long, global = true)]
    project: Option<PathBuf>,

    /// Global config file (defaults to ~/.edgeperm/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Reject payloads carrying isDefaultAdmin instead of stripping it
    #[arg(long, global = true)]
    reject_immutable: bool,

    /// Log allowed decisions at info level
    #[arg(long, global = true)]
    audit: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate one request against a caller's grants
    Check(CheckArgs),

    /// Resolve a management API route and evaluate it
    Route {
        /// HTTP method
        method: Method,

        /// Request path, e.g. /services/abc/configs
        path: String,

        #[command(flatten)]
        grants: GrantArgs,

        #[command(flatten)]
        context: IdentityContextArgs,
    },

    /// Validate permission tokens before assigning them to an identity
    Validate {
        /// Tokens to check (space or comma separated)
        #[arg(required = true, value_delimiter = ',')]
        tokens: Vec<String>,
    },

    /// Show the entity-action matrix
    Matrix {
        /// Only show this entity type
        entity: Option<EntityType>,
    },

    /// List every assignable permission token
    Tokens,

    /// List the management API route table
    Routes,

    /// Print the resolved configuration as TOML
    Config,
}

/// Caller grants, as carried by an authenticated session.
#[derive(clap::Args, Debug, Default)]
struct GrantArgs {
    /// Caller is admin
    #[arg(long)]
    admin: bool,

    /// Caller is admin_readonly
    #[arg(long)]
    admin_readonly: bool,

    /// Permission token held by the caller (repeatable, comma separated)
    #[arg(short = 'g', long = "grant", value_name = "TOKEN", value_delimiter = ',')]
    grants: Vec<String>,
}

impl GrantArgs {
    fn caller(&self) -> CallerGrants {
        CallerGrants::new(self.admin, self.admin_readonly, &self.grants)
    }
}

#[derive(clap::Args, Debug)]
struct CheckArgs {
    /// Entity type, e.g. service, edge-router, api-session
    entity: EntityType,

    /// create, read, list, update, patch, delete, list:<listing> or a named operation
    operation: String,

    #[command(flatten)]
    grants: GrantArgs,

    #[command(flatten)]
    context: IdentityContextArgs,
}

/// The stored identity and payload behind an identity-namespace request.
#[derive(clap::Args, Debug, Default)]
struct IdentityContextArgs {
    /// Identity payload as JSON, e.g. '{"name":"bot","isAdmin":true}'
    #[arg(long, value_name = "JSON")]
    payload: Option<String>,

    /// Id of the stored identity being changed (the owner, for authenticators)
    #[arg(long, value_name = "ID")]
    target: Option<String>,

    /// Stored identity is an admin
    #[arg(long)]
    target_admin: bool,

    /// Stored identity is the default admin
    #[arg(long)]
    default_admin: bool,
}

impl IdentityContextArgs {
    /// The stored identity, if any target flag was given.
    fn target_snapshot(&self) -> Option<IdentitySnapshot> {
        if self.target.is_none() && !self.target_admin && !self.default_admin {
            return None;
        }
        let snapshot = IdentitySnapshot::new(self.target.as_deref().unwrap_or("target"));
        Some(if self.default_admin {
            snapshot.default_admin()
        } else if self.target_admin {
            snapshot.admin()
        } else {
            snapshot
        })
    }

    fn changes(&self) -> Result<Option<IdentityChanges>> {
        self.payload
            .as_deref()
            .map(|json| serde_json::from_str::<IdentityChanges>(json))
            .transpose()
            .context("invalid --payload")
    }
}

/// CLI-based configuration resolver.
///
/// Applies CLI argument overrides on top of file and env config as the
/// highest-priority layer.
struct CliConfigResolver {
    project_root: PathBuf,
    global_config: Option<PathBuf>,
    debug: bool,
    reject_immutable: bool,
    audit: bool,
}

impl CliConfigResolver {
    fn from_args(args: &Args) -> Self {
        let project_root = args.project.clone().unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        });

        Self {
            project_root,
            global_config: args.config.clone(),
            debug: args.debug,
            reject_immutable: args.reject_immutable,
            audit: args.audit,
        }
    }

    fn load(&self) -> Result<EdgepermConfig> {
        let mut loader = ConfigLoader::new().with_project_root(&self.project_root);
        if let Some(ref path) = self.global_config {
            loader = loader.with_global_config(path);
        }

        let mut config = loader.load()?;
        self.apply(&mut config);
        Ok(config)
    }
}

impl ConfigResolver for CliConfigResolver {
    fn apply(&self, config: &mut EdgepermConfig) {
        if self.debug {
            config.debug = true;
        }
        if self.reject_immutable {
            config.identity.immutable_fields = ImmutableFieldMode::Reject;
        }
        if self.audit {
            config.audit.log_allowed = true;
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let resolver = CliConfigResolver::from_args(&args);
    let config = resolver.load().context("Config error")?;

    // Filter: --debug > --verbose > RUST_LOG env > config logging.level
    let filter = if config.debug {
        EnvFilter::new("debug")
    } else if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.logging.level))
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // stdout carries results only
    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .init();

    debug!(
        path = %resolver.project_root.display(),
        immutable_fields = %config.identity.immutable_fields,
        "Resolved config"
    );

    let service = AuthzService::new(&config);

    match args.command {
        Command::Check(check) => run_check(&service, &check),
        Command::Route {
            method,
            path,
            grants,
            context,
        } => run_route(&service, method, &path, &grants, &context),
        Command::Validate { tokens } => Ok(run_validate(&service, &tokens)),
        Command::Matrix { entity } => {
            print_matrix(entity);
            Ok(ExitCode::SUCCESS)
        }
        Command::Tokens => {
            for token in PermissionRegistry::global().tokens() {
                println!("{token}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Routes => {
            for route in ROUTES {
                println!(
                    "{:<6} {:<50} {:<28} {}",
                    route.method.as_str(),
                    route.pattern,
                    route.entity.as_str(),
                    route.kind.operation()
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Config => {
            print!("{}", config.to_toml().context("serialize config")?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Parses an operation name as typed on the command line.
fn parse_operation(s: &str) -> Operation {
    match s {
        "create" => Operation::Create,
        "read" => Operation::Read,
        "list" => Operation::List,
        "update" | "put" => Operation::Update(UpdateMode::Full),
        "patch" => Operation::Update(UpdateMode::Partial),
        "delete" => Operation::Delete,
        other => match other.strip_prefix("list:") {
            Some(listing) => Operation::ListRelated(listing.to_string()),
            None => Operation::Invoke(other.to_string()),
        },
    }
}

fn run_check(service: &AuthzService, args: &CheckArgs) -> Result<ExitCode> {
    let grants = args.grants.caller();
    let operation = parse_operation(&args.operation);
    let changes = args.context.changes()?;
    let target = args.context.target_snapshot();

    if args.entity == EntityType::Identity {
        let stored = target
            .clone()
            .unwrap_or_else(|| IdentitySnapshot::new("target"));
        let outcome = match operation {
            Operation::Create => Some(
                service
                    .prepare_identity_create(&grants, changes.clone().unwrap_or_default())
                    .map(Some),
            ),
            Operation::Update(mode) => Some(
                service
                    .prepare_identity_update(
                        &grants,
                        &stored,
                        changes.clone().unwrap_or_default(),
                        mode,
                    )
                    .map(Some),
            ),
            Operation::Delete => Some(
                service
                    .prepare_identity_delete(&grants, &stored)
                    .map(|()| None),
            ),
            _ => None,
        };

        if let Some(outcome) = outcome {
            return match outcome {
                Ok(payload) => {
                    println!("allow: {operation} identity");
                    if let Some(payload) = payload {
                        println!("{}", serde_json::to_string_pretty(&payload)?);
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => Ok(report(e.http_status(), &e)),
            };
        }
    }

    let mut request = AccessRequest::new(args.entity, operation);
    if let Some(target) = target {
        request = request.with_target(target);
    }
    if let Some(changes) = changes {
        request = request.with_changes(changes);
    }
    match service.require(&grants, &request) {
        Ok(reason) => {
            println!("allow: {reason}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(report(e.http_status(), &e)),
    }
}

fn run_route(
    service: &AuthzService,
    method: Method,
    path: &str,
    grants: &GrantArgs,
    context: &IdentityContextArgs,
) -> Result<ExitCode> {
    let changes = context.changes()?;
    let (matched, decision) = match service.authorize_route_with(
        &grants.caller(),
        method,
        path,
        context.target_snapshot(),
        changes,
    ) {
        Ok(result) => result,
        Err(e) => return Ok(report_route(&e)),
    };

    let entity = matched.entity();
    let operation = matched.operation();
    println!("{} -> {operation} {entity}", matched.route);
    if let Some(ref id) = matched.id {
        info!(id = %id, "Route id");
    }

    match decision {
        Decision::Allow(reason) => {
            println!("allow: {reason}");
            Ok(ExitCode::SUCCESS)
        }
        Decision::Deny(reason) => {
            let err = AuthzError::Unauthorized {
                entity,
                operation,
                reason,
            };
            Ok(report(err.http_status(), &err))
        }
    }
}

fn run_validate(service: &AuthzService, tokens: &[String]) -> ExitCode {
    match service.validate_tokens(tokens) {
        Ok(()) => {
            println!("ok: {} token(s) valid", tokens.len());
            ExitCode::SUCCESS
        }
        Err(e) => report(e.http_status(), &e),
    }
}

fn print_matrix(only: Option<EntityType>) {
    let matrix = EntityActionMatrix::global();
    for entry in matrix.entries() {
        if only.is_some_and(|e| e != entry.entity) {
            continue;
        }
        println!("{} [{}]: {}", entry.entity, entry.resource(), entry.actions);
        for listing in entry.subresources {
            println!("  list {:<32} requires {}", listing.name, listing.required_grant());
        }
        for op in entry.operations {
            println!("  {:<37} requires {}", op.name, op.action);
        }
    }
}

fn report_route(err: &RouteError) -> ExitCode {
    report(err.http_status(), err)
}

fn report<E: ErrorCode + std::fmt::Display>(status: u16, err: &E) -> ExitCode {
    println!("{status} {}: {err}", err.code());
    ExitCode::FAILURE
}
