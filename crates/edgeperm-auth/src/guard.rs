//! Admin escalation guard.
//!
//! Holding `identity` (or `identity.update`) lets a caller manage
//! identities, but it must never let that caller mint or tamper with
//! administrators. The guard is an ordered list of [`GuardRule`]s run before
//! any grant check on identity-namespace mutations from non-admin callers.
//!
//! # Rules
//!
//! | Order | Rule | Fires on |
//! |-------|------|----------|
//! | 1 | [`CreateAdminIdentity`] | create with `isAdmin: true` |
//! | 2 | [`CreateIdentityWithPermissions`] | create with non-empty `permissions` |
//! | 3 | [`FullIdentityUpdate`] | any `PUT` |
//! | 4 | [`PatchAdminFields`] | `PATCH` carrying `isAdmin` or `permissions` |
//! | 5 | [`MutateAdminIdentity`] | update, patch or delete of an admin |
//! | 6 | [`MutateAdminAuthenticator`] | any change to an authenticator owned by an admin |
//!
//! The first rule that fires decides the denial. New rules are appended with
//! [`AdminEscalationGuard::with_rule`]; the evaluator does not change.

use crate::request::AccessRequest;
use edgeperm_types::{EntityType, Operation, UpdateMode};
use std::fmt;

/// A fired guard rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub rule: &'static str,
    pub detail: String,
}

/// One escalation check over an identity request.
pub trait GuardRule: Send + Sync + fmt::Debug {
    /// Stable kebab-case name used in denials and logs.
    fn name(&self) -> &'static str;

    /// Returns a human-readable detail when the rule fires.
    fn check(&self, request: &AccessRequest) -> Option<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CreateAdminIdentity;

impl GuardRule for CreateAdminIdentity {
    fn name(&self) -> &'static str {
        "create-admin-identity"
    }

    fn check(&self, request: &AccessRequest) -> Option<String> {
        let creates_admin = request.entity == EntityType::Identity
            && request.operation == Operation::Create
            && request.changes.as_ref().is_some_and(|c| c.grants_admin());
        creates_admin.then(|| "only admin may create an admin identity".to_string())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CreateIdentityWithPermissions;

impl GuardRule for CreateIdentityWithPermissions {
    fn name(&self) -> &'static str {
        "create-identity-with-permissions"
    }

    fn check(&self, request: &AccessRequest) -> Option<String> {
        let with_permissions = request.entity == EntityType::Identity
            && request.operation == Operation::Create
            && request
                .changes
                .as_ref()
                .is_some_and(|c| c.carries_permissions());
        with_permissions.then(|| "only admin may create an identity with permissions".to_string())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FullIdentityUpdate;

impl GuardRule for FullIdentityUpdate {
    fn name(&self) -> &'static str {
        "full-identity-update"
    }

    fn check(&self, request: &AccessRequest) -> Option<String> {
        (request.entity == EntityType::Identity
            && request.operation == Operation::Update(UpdateMode::Full))
            .then(|| "full identity update is reserved to admin; use PATCH".to_string())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PatchAdminFields;

impl GuardRule for PatchAdminFields {
    fn name(&self) -> &'static str {
        "patch-admin-fields"
    }

    fn check(&self, request: &AccessRequest) -> Option<String> {
        if request.entity != EntityType::Identity
            || request.operation != Operation::Update(UpdateMode::Partial)
        {
            return None;
        }
        let changes = request.changes.as_ref()?;
        let field = if changes.is_admin.is_some() {
            "isAdmin"
        } else if changes.permissions.is_some() {
            "permissions"
        } else {
            return None;
        };
        Some(format!("only admin may patch '{field}'"))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MutateAdminIdentity;

impl GuardRule for MutateAdminIdentity {
    fn name(&self) -> &'static str {
        "mutate-admin-identity"
    }

    fn check(&self, request: &AccessRequest) -> Option<String> {
        if request.entity != EntityType::Identity
            || !matches!(request.operation, Operation::Update(_) | Operation::Delete)
        {
            return None;
        }
        let target = request.target.as_ref().filter(|t| t.is_admin)?;
        Some(format!(
            "only admin may {} admin identity '{}'",
            request.operation, target.id
        ))
    }
}

/// Authenticators are credentials: changing one owned by an admin is
/// as good as taking over that admin. The request target is the owner.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutateAdminAuthenticator;

impl GuardRule for MutateAdminAuthenticator {
    fn name(&self) -> &'static str {
        "mutate-admin-authenticator"
    }

    fn check(&self, request: &AccessRequest) -> Option<String> {
        if request.entity != EntityType::Authenticator || !request.operation.is_mutation() {
            return None;
        }
        let owner = request.target.as_ref().filter(|t| t.is_admin)?;
        Some(format!(
            "only admin may {} an authenticator of admin identity '{}'",
            request.operation, owner.id
        ))
    }
}

/// Ordered escalation rules for identity requests.
///
/// # Example
///
/// ```
/// use edgeperm_auth::{AccessRequest, AdminEscalationGuard, IdentityChanges};
/// use edgeperm_types::EntityType;
///
/// let guard = AdminEscalationGuard::standard();
///
/// let req = AccessRequest::create(EntityType::Identity)
///     .with_changes(IdentityChanges::new().with_is_admin(true));
/// assert_eq!(guard.check(&req).unwrap().rule, "create-admin-identity");
///
/// // non-identity requests are never guarded
/// assert!(guard.check(&AccessRequest::update(EntityType::Service)).is_none());
/// ```
#[derive(Debug)]
pub struct AdminEscalationGuard {
    rules: Vec<Box<dyn GuardRule>>,
}

impl AdminEscalationGuard {
    /// A guard with no rules.
    #[must_use]
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// The built-in rules in their fixed order.
    #[must_use]
    pub fn standard() -> Self {
        Self::empty()
            .with_rule(CreateAdminIdentity)
            .with_rule(CreateIdentityWithPermissions)
            .with_rule(FullIdentityUpdate)
            .with_rule(PatchAdminFields)
            .with_rule(MutateAdminIdentity)
            .with_rule(MutateAdminAuthenticator)
    }

    /// Appends a rule after the existing ones.
    #[must_use]
    pub fn with_rule(mut self, rule: impl GuardRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Rule names in evaluation order.
    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.name())
    }

    /// Runs the rules in order and returns the first violation.
    ///
    /// Only identity-namespace mutations are inspected. The caller is
    /// assumed not to be `admin`; the evaluator never consults the guard for
    /// admins.
    #[must_use]
    pub fn check(&self, request: &AccessRequest) -> Option<Violation> {
        if !request.is_identity_mutation() {
            return None;
        }
        self.rules.iter().find_map(|rule| {
            rule.check(request).map(|detail| Violation {
                rule: rule.name(),
                detail,
            })
        })
    }
}

impl Default for AdminEscalationGuard {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{IdentityChanges, IdentitySnapshot};

    fn identity_create(changes: IdentityChanges) -> AccessRequest {
        AccessRequest::create(EntityType::Identity).with_changes(changes)
    }

    #[test]
    fn standard_rule_order() {
        let names: Vec<_> = AdminEscalationGuard::standard().rule_names().collect();
        assert_eq!(
            names,
            vec![
                "create-admin-identity",
                "create-identity-with-permissions",
                "full-identity-update",
                "patch-admin-fields",
                "mutate-admin-identity",
                "mutate-admin-authenticator",
            ]
        );
    }

    #[test]
    fn create_admin_identity_rule() {
        let rule = CreateAdminIdentity;
        assert!(rule
            .check(&identity_create(IdentityChanges::new().with_is_admin(true)))
            .is_some());
        assert!(rule
            .check(&identity_create(IdentityChanges::new().with_is_admin(false)))
            .is_none());
        assert!(rule
            .check(&AccessRequest::patch(EntityType::Identity)
                .with_changes(IdentityChanges::new().with_is_admin(true)))
            .is_none());
    }

    #[test]
    fn create_with_permissions_rule() {
        let rule = CreateIdentityWithPermissions;
        assert!(rule
            .check(&identity_create(IdentityChanges::new().with_permissions(["service"])))
            .is_some());
        assert!(rule
            .check(&identity_create(
                IdentityChanges::new().with_permissions(Vec::<String>::new())
            ))
            .is_none());
        assert!(rule.check(&identity_create(IdentityChanges::new())).is_none());
    }

    #[test]
    fn full_update_rule_fires_without_payload() {
        let rule = FullIdentityUpdate;
        assert!(rule.check(&AccessRequest::update(EntityType::Identity)).is_some());
        assert!(rule.check(&AccessRequest::patch(EntityType::Identity)).is_none());
    }

    #[test]
    fn patch_admin_fields_rule() {
        let rule = PatchAdminFields;
        let patch = |c| AccessRequest::patch(EntityType::Identity).with_changes(c);

        let detail = rule
            .check(&patch(IdentityChanges::new().with_is_admin(false)))
            .expect("fires");
        assert!(detail.contains("isAdmin"), "got: {detail}");

        let detail = rule
            .check(&patch(IdentityChanges::new().with_permissions(Vec::<String>::new())))
            .expect("fires");
        assert!(detail.contains("permissions"), "got: {detail}");

        assert!(rule
            .check(&patch(IdentityChanges::new().with_name("x")))
            .is_none());
        assert!(rule.check(&AccessRequest::patch(EntityType::Identity)).is_none());
    }

    #[test]
    fn mutate_admin_identity_rule() {
        let rule = MutateAdminIdentity;
        let admin = IdentitySnapshot::new("adm").admin();
        let plain = IdentitySnapshot::new("usr");

        for req in [
            AccessRequest::delete(EntityType::Identity),
            AccessRequest::patch(EntityType::Identity),
            AccessRequest::update(EntityType::Identity),
        ] {
            assert!(rule.check(&req.clone().with_target(admin.clone())).is_some());
            assert!(rule.check(&req.with_target(plain.clone())).is_none());
        }
        assert!(rule
            .check(&AccessRequest::read(EntityType::Identity).with_target(admin))
            .is_none());
    }

    #[test]
    fn first_matching_rule_wins() {
        let guard = AdminEscalationGuard::standard();
        let req = identity_create(
            IdentityChanges::new()
                .with_is_admin(true)
                .with_permissions(["service"]),
        );
        assert_eq!(guard.check(&req).map(|v| v.rule), Some("create-admin-identity"));

        let req = AccessRequest::update(EntityType::Identity)
            .with_target(IdentitySnapshot::new("a").admin());
        assert_eq!(guard.check(&req).map(|v| v.rule), Some("full-identity-update"));
    }

    #[test]
    fn plain_identity_patch_passes() {
        let guard = AdminEscalationGuard::standard();
        let req = AccessRequest::patch(EntityType::Identity)
            .with_target(IdentitySnapshot::new("u"))
            .with_changes(IdentityChanges::new().with_role_attributes(["dev"]));
        assert_eq!(guard.check(&req), None);
    }

    #[test]
    fn identity_rules_skip_authenticators() {
        let guard = AdminEscalationGuard::standard();
        assert_eq!(guard.check(&AccessRequest::update(EntityType::Authenticator)), None);

        let plain_owner = AccessRequest::delete(EntityType::Authenticator)
            .with_target(IdentitySnapshot::new("usr"));
        assert_eq!(guard.check(&plain_owner), None);
    }

    #[test]
    fn mutate_admin_authenticator_rule() {
        let guard = AdminEscalationGuard::standard();
        let admin = IdentitySnapshot::new("adm").admin();

        for req in [
            AccessRequest::create(EntityType::Authenticator),
            AccessRequest::patch(EntityType::Authenticator),
            AccessRequest::update(EntityType::Authenticator),
            AccessRequest::delete(EntityType::Authenticator),
        ] {
            let violation = guard
                .check(&req.with_target(admin.clone()))
                .expect("fires");
            assert_eq!(violation.rule, "mutate-admin-authenticator");
            assert!(violation.detail.contains("'adm'"), "got: {}", violation.detail);
        }

        // reads are never guarded
        assert!(MutateAdminAuthenticator
            .check(&AccessRequest::read(EntityType::Authenticator).with_target(admin.clone()))
            .is_none());
        // the identity rule does not cover authenticators
        assert!(MutateAdminIdentity
            .check(&AccessRequest::delete(EntityType::Authenticator).with_target(admin))
            .is_none());
    }

    #[test]
    fn reads_and_listings_are_not_guarded() {
        let guard = AdminEscalationGuard::standard().with_rule(NoRenames);
        let req = AccessRequest::read(EntityType::Identity)
            .with_changes(IdentityChanges::new().with_name("x"));
        assert_eq!(guard.check(&req), None);
    }

    #[derive(Debug)]
    struct NoRenames;

    impl GuardRule for NoRenames {
        fn name(&self) -> &'static str {
            "no-renames"
        }

        fn check(&self, request: &AccessRequest) -> Option<String> {
            request
                .changes
                .as_ref()
                .and_then(|c| c.name.as_ref())
                .map(|n| format!("rename to '{n}'"))
        }
    }

    #[test]
    fn appended_rule_runs_last() {
        let guard = AdminEscalationGuard::standard().with_rule(NoRenames);
        assert_eq!(guard.rule_names().last(), Some("no-renames"));

        let req = AccessRequest::patch(EntityType::Identity)
            .with_changes(IdentityChanges::new().with_name("x"));
        let violation = guard.check(&req).expect("fires");
        assert_eq!(violation.rule, "no-renames");
        assert_eq!(violation.detail, "rename to 'x'");
    }

    #[test]
    fn empty_guard_never_fires() {
        let guard = AdminEscalationGuard::empty();
        assert_eq!(guard.check(&AccessRequest::update(EntityType::Identity)), None);
    }
}
