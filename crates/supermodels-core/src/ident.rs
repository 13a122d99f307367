//! SQL identifier checks.
//!
//! Table names come from configuration and the owner registry and are
//! spliced into SQL text, so they must be plain identifiers.

use crate::errors::CoreError;

/// Check that `name` is a plain SQL identifier: ASCII letter or `_` first,
/// then ASCII alphanumerics or `_`.
///
/// # Errors
///
/// Returns `CoreError::InvalidIdentifier` otherwise.
pub fn validate_identifier(name: &str) -> Result<(), CoreError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidIdentifier(name.to_string()))
    }
}
