//! Core data types shared by the predicate builder, the engine and hosts.
//!
//! - [`FieldSpec`]: which server-side columns participate in filtering and display
//! - [`RequestDescriptor`]: one logical query (filter, ordering, page size, cursor)
//! - [`Record`]: a single row returned by the remote source

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single row as returned by the remote source.
pub type Record = Map<String, Value>;

/// Role of a field within a lookup screen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldRole {
    /// Identity column, used as the selection key.
    Primary,

    /// Column shown to the user and matched on commit.
    #[default]
    Display,

    /// Extra column shown alongside the display value.
    Aux,
}

/// Describes one server-side column of a lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldSpec {
    /// Column name, optionally qualified (`Join.column`)
    #[serde(alias = "fieldName")]
    pub name: String,

    /// Role of the column
    #[serde(default)]
    pub role: FieldRole,

    /// Hidden columns are fetched but never searched
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl FieldSpec {
    /// Create a visible display field.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: FieldRole::Display,
            visible: true,
        }
    }

    /// Create a visible field with the given role.
    pub fn with_role(name: impl Into<String>, role: FieldRole) -> Self {
        Self {
            role,
            ..Self::new(name)
        }
    }

    /// Mark the field hidden.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Whether this field takes part in the derived search predicate.
    pub fn is_searchable(&self) -> bool {
        self.visible && !self.name.trim().is_empty()
    }
}

/// Paging direction of a query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// Opaque cursor telling the remote source where the next page begins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum Continuation {
    /// Numeric offset into the result set.
    Offset(u64),

    /// Server-issued cursor string.
    Cursor(String),
}

impl std::fmt::Display for Continuation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Continuation::Offset(offset) => write!(f, "{offset}"),
            Continuation::Cursor(cursor) => write!(f, "{cursor}"),
        }
    }
}

/// Serializable description of one logical query.
///
/// Two descriptors comparing equal means nothing changed and no refetch is
/// needed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescriptor {
    /// Filter expression; `None` matches everything
    pub filter: Option<String>,

    /// Ordering clause passed through to the source
    pub order_by: Option<String>,

    /// Maximum number of records per page
    pub page_size: u32,

    /// Where the requested page begins; `None` for the first page
    pub continuation: Option<Continuation>,

    /// Paging direction
    pub direction: Direction,
}

impl RequestDescriptor {
    /// Create a first-page descriptor.
    pub fn new(filter: Option<String>, page_size: u32) -> Self {
        Self {
            filter,
            order_by: None,
            page_size,
            continuation: None,
            direction: Direction::Forward,
        }
    }

    /// Same query, starting at `continuation`.
    pub fn continued(&self, continuation: Option<Continuation>) -> Self {
        Self {
            continuation,
            ..self.clone()
        }
    }
}
