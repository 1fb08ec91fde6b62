//! Escaping of user text embedded in filter literals.

use std::fmt::Display;

/// Escape a value for use inside a single-quoted filter literal.
///
/// Every `'` is doubled. Any displayable value is accepted and stringified
/// first, so the function never fails.
pub fn escape(value: impl Display) -> String {
    value.to_string().replace('\'', "''")
}
