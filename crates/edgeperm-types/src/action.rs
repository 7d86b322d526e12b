//! Actions and operations.
//!
//! An [`Action`] is what a permission grant talks about. An [`Operation`]
//! is what a request does; every operation resolves to exactly one action.
//!
//! ```text
//! Operation                 Action        Token suffix
//! ─────────────────────     ──────        ────────────
//! Create                    create        .create
//! Read                      read          .read
//! List                      list          .read
//! Update(Full | Partial)    update        .update
//! Delete                    delete        .delete
//! ListRelated(name)         list (on the target entity)
//! Invoke(name)              per entity (e.g. enrollment refresh -> update)
//! ```

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a string names no known action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action: '{0}'")]
pub struct ParseActionError(pub String);

/// A primary action on an entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    List,
    Update,
    Delete,
}

impl Action {
    /// Every action, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Create,
        Self::Read,
        Self::List,
        Self::Update,
        Self::Delete,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::List => "list",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// The action whose token grants this action.
    ///
    /// Listing has no token of its own: `X.read` grants both.
    ///
    /// ```
    /// use edgeperm_types::Action;
    ///
    /// assert_eq!(Action::List.grant_action(), Action::Read);
    /// assert_eq!(Action::Delete.grant_action(), Action::Delete);
    /// ```
    #[must_use]
    pub fn grant_action(self) -> Self {
        match self {
            Self::List => Self::Read,
            other => other,
        }
    }

    /// Returns `true` for read and list.
    #[must_use]
    pub fn is_read_only(self) -> bool {
        matches!(self, Self::Read | Self::List)
    }

    /// The corresponding [`ActionSet`] flag.
    #[must_use]
    pub fn flag(self) -> ActionSet {
        match self {
            Self::Create => ActionSet::CREATE,
            Self::Read => ActionSet::READ,
            Self::List => ActionSet::LIST,
            Self::Update => ActionSet::UPDATE,
            Self::Delete => ActionSet::DELETE,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ParseActionError(s.to_string()))
    }
}

bitflags! {
    /// The set of actions an entity type supports.
    ///
    /// | Flag | Typical route |
    /// |------|---------------|
    /// | [`CREATE`](Self::CREATE) | `POST /{collection}` |
    /// | [`READ`](Self::READ) | `GET /{collection}/{id}` |
    /// | [`LIST`](Self::LIST) | `GET /{collection}` |
    /// | [`UPDATE`](Self::UPDATE) | `PUT`/`PATCH /{collection}/{id}` |
    /// | [`DELETE`](Self::DELETE) | `DELETE /{collection}/{id}` |
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ActionSet: u8 {
        const CREATE = 0b0000_0001;
        const READ   = 0b0000_0010;
        const LIST   = 0b0000_0100;
        const UPDATE = 0b0000_1000;
        const DELETE = 0b0001_0000;
    }
}

impl ActionSet {
    /// Read and list.
    pub const READ_ONLY: Self = Self::READ.union(Self::LIST);

    /// Every primary action.
    pub const CRUD: Self = Self::CREATE
        .union(Self::READ_ONLY)
        .union(Self::UPDATE)
        .union(Self::DELETE);

    /// Returns `true` if `action` is in the set.
    #[must_use]
    pub fn supports(self, action: Action) -> bool {
        self.contains(action.flag())
    }

    /// The actions in the set, in [`Action::ALL`] order.
    #[must_use]
    pub fn actions(self) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|a| self.supports(*a))
            .collect()
    }
}

impl fmt::Display for ActionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.actions().into_iter().map(Action::as_str).collect();
        if names.is_empty() {
            write!(f, "(none)")
        } else {
            write!(f, "{}", names.join(", "))
        }
    }
}

/// How an update replaces the stored entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    /// `PUT`: the payload replaces every field.
    Full,
    /// `PATCH`: only fields present in the payload change.
    Partial,
}

/// What a request does to an entity type.
///
/// # Example
///
/// ```
/// use edgeperm_types::{Action, Operation, UpdateMode};
///
/// assert_eq!(Operation::Update(UpdateMode::Partial).primary_action(), Some(Action::Update));
/// assert_eq!(Operation::ListRelated("services".into()).primary_action(), None);
/// assert!(Operation::Delete.is_mutation());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "value")]
pub enum Operation {
    Create,
    Read,
    List,
    Update(UpdateMode),
    Delete,
    /// A relationship listing on one entity instance (`GET /services/{id}/configs`).
    ListRelated(String),
    /// An entity-specific verb (`POST /enrollments/{id}/refresh`).
    Invoke(String),
}

impl Operation {
    /// The primary action, if it does not depend on the entity matrix.
    ///
    /// Relationship listings and invoked verbs resolve through the matrix.
    #[must_use]
    pub fn primary_action(&self) -> Option<Action> {
        match self {
            Self::Create => Some(Action::Create),
            Self::Read => Some(Action::Read),
            Self::List => Some(Action::List),
            Self::Update(_) => Some(Action::Update),
            Self::Delete => Some(Action::Delete),
            Self::ListRelated(_) | Self::Invoke(_) => None,
        }
    }

    /// Returns `true` for create, update and delete.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Create | Self::Update(_) | Self::Delete)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Read => write!(f, "read"),
            Self::List => write!(f, "list"),
            Self::Update(UpdateMode::Full) => write!(f, "update"),
            Self::Update(UpdateMode::Partial) => write!(f, "patch"),
            Self::Delete => write!(f, "delete"),
            Self::ListRelated(name) => write!(f, "list {name}"),
            Self::Invoke(name) => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_parse_roundtrip() {
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>(), Ok(action));
        }
        assert_eq!(
            "refresh".parse::<Action>(),
            Err(ParseActionError("refresh".to_string()))
        );
    }

    #[test]
    fn only_list_folds_into_read() {
        for action in Action::ALL {
            if action == Action::List {
                assert_eq!(action.grant_action(), Action::Read);
            } else {
                assert_eq!(action.grant_action(), action);
            }
        }
    }

    #[test]
    fn read_only_actions() {
        assert!(Action::Read.is_read_only());
        assert!(Action::List.is_read_only());
        assert!(!Action::Create.is_read_only());
        assert!(!Action::Update.is_read_only());
        assert!(!Action::Delete.is_read_only());
    }

    #[test]
    fn crud_contains_everything() {
        for action in Action::ALL {
            assert!(ActionSet::CRUD.supports(action));
        }
        assert_eq!(ActionSet::CRUD.actions(), Action::ALL.to_vec());
    }

    #[test]
    fn read_only_set() {
        assert_eq!(ActionSet::READ_ONLY.actions(), vec![Action::Read, Action::List]);
        assert!(!ActionSet::READ_ONLY.supports(Action::Delete));
    }

    #[test]
    fn action_set_display() {
        let set = ActionSet::READ_ONLY | ActionSet::DELETE;
        assert_eq!(set.to_string(), "read, list, delete");
        assert_eq!(ActionSet::empty().to_string(), "(none)");
    }

    #[test]
    fn operation_actions() {
        assert_eq!(Operation::Create.primary_action(), Some(Action::Create));
        assert_eq!(
            Operation::Update(UpdateMode::Full).primary_action(),
            Some(Action::Update)
        );
        assert_eq!(Operation::Invoke("refresh".into()).primary_action(), None);
    }

    #[test]
    fn operation_display() {
        assert_eq!(Operation::Update(UpdateMode::Partial).to_string(), "patch");
        assert_eq!(
            Operation::ListRelated("configs".into()).to_string(),
            "list configs"
        );
    }

    #[test]
    fn operation_serde_shape() {
        let op = Operation::ListRelated("services".into());
        let json = serde_json::to_string(&op).expect("serialize");
        assert_eq!(json, r#"{"kind":"list-related","value":"services"}"#);
        let parsed: Operation = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, op);
    }
}
