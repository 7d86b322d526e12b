//! Identity mutation context.
//!
//! Identity create, update, patch and delete carry extra input the guard
//! inspects: the stored target (for update, patch, delete) and the request
//! payload (for create, update, patch).

use serde::{Deserialize, Serialize};

/// Wire name of the bootstrap-admin flag.
pub const IS_DEFAULT_ADMIN_FIELD: &str = "isDefaultAdmin";

/// The stored identity a mutation targets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySnapshot {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub is_admin: bool,
    /// Set once at bootstrap.
    #[serde(default)]
    pub is_default_admin: bool,
}

impl IdentitySnapshot {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn admin(mut self) -> Self {
        self.is_admin = true;
        self
    }

    /// Marks the snapshot as the bootstrap admin (implies `is_admin`).
    #[must_use]
    pub fn default_admin(mut self) -> Self {
        self.is_admin = true;
        self.is_default_admin = true;
        self
    }
}

/// Fields present in an identity create/update/patch payload.
///
/// `None` means the field is absent. For a PATCH only present fields change;
/// for create and PUT absent fields take their defaults.
///
/// # Example
///
/// ```
/// use edgeperm_auth::IdentityChanges;
///
/// let changes: IdentityChanges =
///     serde_json::from_str(r#"{"name":"ci-bot","roleAttributes":["ci"]}"#).unwrap();
/// assert!(!changes.touches_admin_fields());
///
/// let changes: IdentityChanges = serde_json::from_str(r#"{"permissions":[]}"#).unwrap();
/// assert!(changes.touches_admin_fields());
/// assert!(!changes.carries_permissions());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default_admin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_attributes: Option<Vec<String>>,
}

impl IdentityChanges {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_is_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = Some(is_admin);
        self
    }

    #[must_use]
    pub fn with_is_default_admin(mut self, value: bool) -> Self {
        self.is_default_admin = Some(value);
        self
    }

    #[must_use]
    pub fn with_permissions<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = Some(tokens.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_role_attributes<I, S>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.role_attributes = Some(attrs.into_iter().map(Into::into).collect());
        self
    }

    /// `true` if the payload asks for `is_admin = true`.
    #[must_use]
    pub fn grants_admin(&self) -> bool {
        self.is_admin == Some(true)
    }

    /// `true` if the payload carries a non-empty permission set.
    #[must_use]
    pub fn carries_permissions(&self) -> bool {
        self.permissions.as_ref().is_some_and(|p| !p.is_empty())
    }

    /// `true` if `is_admin` or `permissions` is present, whatever its value.
    #[must_use]
    pub fn touches_admin_fields(&self) -> bool {
        self.is_admin.is_some() || self.permissions.is_some()
    }

    /// Removes `is_default_admin` from the payload, returning what was there.
    pub fn take_default_admin(&mut self) -> Option<bool> {
        self.is_default_admin.take()
    }
}
