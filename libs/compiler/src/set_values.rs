//! Enumerated (set) field tests.
//!
//! Set fields declare a dictionary mapping query symbols to stored
//! representations. Boolean mappings are rendered against the column's
//! actual storage: numeric columns compare against zero, everything else
//! against a boolean literal.

use scour_schema::{FieldDefinition, Operator, Param, SetMapping};

use crate::error::{Error, Result};
use crate::expr::Compiler;

/// Translate a query symbol through the field's dictionary into a bind
/// parameter. Used for the IN/NOT IN element lists.
pub(crate) fn translate(field: &FieldDefinition, token: &str) -> Result<Param> {
    let symbol = token.trim().to_ascii_lowercase();
    match field.values.get(&symbol) {
        Some(SetMapping::Bool(b)) => Ok(Param::Bool(*b)),
        Some(SetMapping::Integer(i)) => Ok(Param::Integer(*i)),
        Some(SetMapping::Text(s)) => Ok(Param::Text(s.clone())),
        None => Err(unknown_value(field, token)),
    }
}

pub(crate) fn test(
    c: &mut Compiler<'_>,
    field: &FieldDefinition,
    column_sql: &str,
    op: Operator,
    value: &str,
) -> Result<String> {
    let symbol = value.trim().to_ascii_lowercase();
    let Some(mapping) = field.values.get(&symbol) else {
        return Err(unknown_value(field, value));
    };
    if !matches!(op, Operator::Eq | Operator::Ne) {
        return Err(Error::UnsupportedQuery(format!(
            "Operator '{op}' not supported for field '{}'",
            field.name
        )));
    }

    let numeric = c
        .entity
        .column(field.column())
        .map(|info| info.kind.is_numeric())
        .unwrap_or(false);

    let (negation, test_op, parameter) = match mapping {
        SetMapping::Bool(stored) => {
            let negation = if op == Operator::Ne { "NOT " } else { "" };
            if numeric {
                // truthy means any non-zero value
                let test_op = if *stored { Operator::Gt } else { Operator::Eq };
                (negation, test_op, Param::Integer(0))
            } else {
                let test_op = if *stored { Operator::Ne } else { Operator::Eq };
                (negation, test_op, Param::Bool(false))
            }
        }
        SetMapping::Integer(i) => ("", op, Param::Integer(*i)),
        SetMapping::Text(s) => ("", op, Param::Text(s.clone())),
    };

    let mapped = c.dialect.map_operator(test_op, field)?;
    c.ctx.push_param(parameter);
    Ok(format!("{negation}({column_sql} {mapped} ?)"))
}

fn unknown_value(field: &FieldDefinition, token: &str) -> Error {
    let valid: Vec<&str> = field.values.keys().map(String::as_str).collect();
    Error::UnsupportedQuery(format!(
        "'{}' is not a valid value for field '{}' (valid: {})",
        token.trim(),
        field.name,
        valid.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scour_schema::ValueKind;

    fn status_field() -> FieldDefinition {
        FieldDefinition::new("active", ValueKind::Set)
            .on_column("status")
            .with_value("on", SetMapping::Bool(true))
            .with_value("off", SetMapping::Bool(false))
    }

    #[test]
    fn translate_maps_through_the_dictionary() {
        let field = status_field().with_value("unknown", SetMapping::Integer(2));
        assert_eq!(translate(&field, "on").unwrap(), Param::Bool(true));
        assert_eq!(translate(&field, " OFF ").unwrap(), Param::Bool(false));
        assert_eq!(translate(&field, "unknown").unwrap(), Param::Integer(2));
    }

    #[test]
    fn translate_rejects_unknown_symbols() {
        let err = translate(&status_field(), "maybe").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'maybe'"));
        assert!(message.contains("off, on"));
    }
}
