//! Predicate builder
//!
//! Turns raw search text plus a screen's field metadata into a
//! [`RequestDescriptor`]. The filter language is the SQL-like dialect the
//! remote source understands:
//!
//! ```text
//! "ro ma" over Customer.city
//!   -> Customer.city LIKE '%ro%' AND Customer.city LIKE '%ma%'
//!
//! "ro" over Customer.city, Customer.name
//!   -> (Customer.city LIKE '%ro%') OR (Customer.name LIKE '%ro%')
//! ```
//!
//! Static fragments and the caller's additional condition are folded in
//! afterwards. Everything here is pure: no state, no I/O, no errors.

pub mod sanitize;

#[cfg(test)]
mod tests;

pub use sanitize::escape;

use crate::model::{Direction, FieldSpec, RequestDescriptor};

/// Marker inside a static fragment that is replaced by the derived predicate.
pub const VALUE_PLACEHOLDER: &str = "$value";

/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Reason a lookup configuration cannot produce a meaningful predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degenerate {
    /// No visible, named field to search on.
    NoSearchableFields,

    /// Fields cannot be qualified because the table name is missing.
    MissingTable,
}

impl std::fmt::Display for Degenerate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Degenerate::NoSearchableFields => write!(f, "no searchable fields, matching everything"),
            Degenerate::MissingTable => write!(f, "table name missing, fields left unqualified"),
        }
    }
}

/// Everything the builder needs for one descriptor.
#[derive(Debug, Clone)]
pub struct PredicateInput<'a> {
    /// Raw text typed by the user
    pub search_text: &'a str,

    /// Columns of the lookup
    pub fields: &'a [FieldSpec],

    /// Table (or join) name used to qualify columns
    pub table: &'a str,

    /// Static fragments, possibly containing [`VALUE_PLACEHOLDER`]
    pub static_fragments: &'a [String],

    /// Caller-supplied condition OR-ed with the rest
    pub additional_where: Option<&'a str>,

    /// Ordering clause
    pub order_by: Option<&'a str>,

    /// Page size
    pub page_size: u32,

    /// Paging direction
    pub direction: Direction,
}

impl<'a> PredicateInput<'a> {
    /// Create an input with no fragments and default paging.
    pub fn new(search_text: &'a str, fields: &'a [FieldSpec], table: &'a str) -> Self {
        Self {
            search_text,
            fields,
            table,
            static_fragments: &[],
            additional_where: None,
            order_by: None,
            page_size: DEFAULT_PAGE_SIZE,
            direction: Direction::Forward,
        }
    }

    pub fn static_fragments(mut self, fragments: &'a [String]) -> Self {
        self.static_fragments = fragments;
        self
    }

    pub fn additional_where(mut self, condition: Option<&'a str>) -> Self {
        self.additional_where = condition;
        self
    }

    pub fn order_by(mut self, order_by: Option<&'a str>) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Build the descriptor for this input.
    pub fn build(&self) -> RequestDescriptor {
        let derived = derive_predicate(self.search_text, self.fields, self.table);
        let core = combine_fragments(derived, self.static_fragments);

        // The additional condition widens the result (OR), it does not narrow it.
        let additional = self
            .additional_where
            .map(str::trim)
            .filter(|condition| !condition.is_empty())
            .map(str::to_string);
        let filter = join(core.into_iter().chain(additional).collect(), "OR");

        RequestDescriptor {
            filter,
            order_by: self
                .order_by
                .map(str::trim)
                .filter(|order| !order.is_empty())
                .map(str::to_string),
            page_size: self.page_size.max(1),
            continuation: None,
            direction: self.direction,
        }
    }
}

/// Build a first-page descriptor from search text, fields, table and static fragments.
///
/// # Arguments
/// * `search_text` - Raw text typed by the user
/// * `fields` - Columns of the lookup
/// * `table` - Table name qualifying the columns
/// * `static_fragments` - Extra conditions, optionally containing `$value`
///
/// # Returns
/// * `RequestDescriptor` - Descriptor with the default page size
pub fn build(
    search_text: &str,
    fields: &[FieldSpec],
    table: &str,
    static_fragments: &[String],
) -> RequestDescriptor {
    PredicateInput::new(search_text, fields, table)
        .static_fragments(static_fragments)
        .build()
}

/// Check whether a field list and table name can produce a real predicate.
pub fn diagnose(fields: &[FieldSpec], table: &str) -> Option<Degenerate> {
    if !fields.iter().any(FieldSpec::is_searchable) {
        return Some(Degenerate::NoSearchableFields);
    }
    if table.trim().is_empty() {
        return Some(Degenerate::MissingTable);
    }
    None
}

/// Split search text into non-empty whitespace-separated tokens.
pub fn tokenize(search_text: &str) -> Vec<&str> {
    search_text.split_whitespace().collect()
}

/// Qualify a column with its table unless it is already qualified.
fn qualify(table: &str, field: &str) -> String {
    let table = table.trim();
    let field = field.trim();
    if table.is_empty() || field.contains('.') {
        field.to_string()
    } else {
        format!("{table}.{field}")
    }
}

/// Per-field substring predicates, tokens AND-ed, fields OR-ed.
///
/// Returns `None` when there is nothing to search for.
fn derive_predicate(search_text: &str, fields: &[FieldSpec], table: &str) -> Option<String> {
    let tokens = tokenize(search_text);
    if tokens.is_empty() {
        return None;
    }

    let groups = fields
        .iter()
        .filter(|field| field.is_searchable())
        .map(|field| {
            let column = qualify(table, &field.name);
            tokens
                .iter()
                .map(|token| format!("{column} LIKE '%{}%'", escape(token)))
                .collect::<Vec<_>>()
                .join(" AND ")
        })
        .collect::<Vec<_>>();

    join(groups, "OR")
}

/// Fold static fragments around the derived predicate.
fn combine_fragments(derived: Option<String>, fragments: &[String]) -> Option<String> {
    let substitution = derived.as_deref().map(|predicate| {
        if is_compound(predicate) {
            format!("({predicate})")
        } else {
            predicate.to_string()
        }
    });

    let mut consumed = false;
    let mut parts = Vec::new();

    for fragment in fragments.iter().map(|f| f.trim()).filter(|f| !f.is_empty()) {
        if fragment.contains(VALUE_PLACEHOLDER) {
            // Without a search value there is nothing to substitute.
            if let Some(value) = &substitution {
                parts.push(fragment.replace(VALUE_PLACEHOLDER, value));
                consumed = true;
            }
        } else {
            parts.push(fragment.to_string());
        }
    }

    if !consumed {
        parts.extend(derived);
    }

    join(parts, "AND")
}

fn is_compound(predicate: &str) -> bool {
    predicate.contains(" AND ") || predicate.contains(" OR ")
}

/// Join parts with `op`, parenthesizing each when more than one survives.
fn join(parts: Vec<String>, op: &str) -> Option<String> {
    match parts.len() {
        0 => None,
        1 => parts.into_iter().next(),
        _ => Some(
            parts
                .iter()
                .map(|part| format!("({part})"))
                .collect::<Vec<_>>()
                .join(&format!(" {op} ")),
        ),
    }
}
