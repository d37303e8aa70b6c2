//! Field resolution against the search definition.

use scour_schema::{FieldDefinition, SearchDefinition};

use crate::error::{Error, Result};

/// Resolve a field path to its definition. A dotted path like
/// `facts.memory` resolves to the key-value field registered under the
/// leading qualifier (`facts`); the remainder becomes the key name.
pub(crate) fn field<'a>(
    definition: &'a SearchDefinition,
    profile: Option<&str>,
    path: &str,
) -> Result<&'a FieldDefinition> {
    if let Some(field) = definition.field(profile, path) {
        return Ok(field);
    }
    if let Some((qualifier, _)) = path.split_once('.') {
        if let Some(field) = definition.field(profile, qualifier) {
            if field.is_key_value() {
                return Ok(field);
            }
        }
    }
    Err(Error::UnsupportedQuery(format!(
        "Field '{path}' not recognized for searching"
    )))
}

/// Key name for key-value access: the field path with its leading
/// qualifier stripped.
pub(crate) fn key_name(path: &str) -> &str {
    path.split_once('.').map(|(_, rest)| rest).unwrap_or(path)
}
