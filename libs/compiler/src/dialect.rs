//! Database dialect strategies.
//!
//! The compiler holds a reference to the active [`Dialect`] and delegates
//! every dialect-sensitive decision: operator token mapping, full-text
//! test overrides, the falsy literal used in NOT/COALESCE guards, and
//! null-ordering hints. The default implementations on the trait are the
//! ANSI-like base dialect; [`PostgresDialect`] overrides the pieces that
//! differ.

use scour_schema::{FieldDefinition, Operator};

use crate::error::{Error, Result};

pub trait Dialect: Send + Sync {
    fn name(&self) -> &'static str;

    /// Map an abstract operator to its SQL token, validating the operator
    /// against the field type.
    fn map_operator(&self, op: Operator, field: &FieldDefinition) -> Result<&'static str> {
        base_operator(op, field)
    }

    /// Dialect-specific replacement for an entire field test. Returns a
    /// fragment containing exactly one `?` placeholder, or `None` to use
    /// the standard rendering.
    fn test_override(
        &self,
        _field: &FieldDefinition,
        _column_sql: &str,
        _op: Operator,
    ) -> Option<String> {
        None
    }

    /// Literal substituted for NULL when negating a predicate, so that
    /// `NOT <test>` does not become vacuously true on NULL.
    fn not_fallback_literal(&self) -> &'static str {
        "0"
    }

    /// Optional null-ordering hint appended to an ORDER BY term.
    fn order_null_hint(&self, _nullable: bool, _descending: bool) -> Option<&'static str> {
        None
    }
}

fn ensure_textual(op: Operator, field: &FieldDefinition) -> Result<()> {
    if field.is_textual() {
        Ok(())
    } else {
        Err(Error::UnsupportedQuery(format!(
            "Operator '{op}' is only applicable to text fields (field '{}')",
            field.name
        )))
    }
}

fn base_operator(op: Operator, field: &FieldDefinition) -> Result<&'static str> {
    let token = match op {
        Operator::Eq => "=",
        Operator::Ne => "<>",
        Operator::Like => {
            ensure_textual(op, field)?;
            "LIKE"
        }
        Operator::Unlike => {
            ensure_textual(op, field)?;
            "NOT LIKE"
        }
        Operator::Gt => ">",
        Operator::Lt => "<",
        Operator::Gte => ">=",
        Operator::Lte => "<=",
        Operator::In => "IN",
        Operator::NotIn => "NOT IN",
        Operator::Null => "IS NULL",
        Operator::NotNull => "IS NOT NULL",
        Operator::Not => {
            return Err(Error::UnsupportedQuery(
                "'not' has no SQL operator token".to_string(),
            ));
        }
    };
    Ok(token)
}

/// ANSI-like default dialect.
pub struct BaseDialect;

impl Dialect for BaseDialect {
    fn name(&self) -> &'static str {
        "base"
    }
}

/// PostgreSQL: case-insensitive LIKE, text-search matching for full-text
/// fields, boolean falsy literal, explicit null ordering.
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn map_operator(&self, op: Operator, field: &FieldDefinition) -> Result<&'static str> {
        match op {
            Operator::Like => {
                ensure_textual(op, field)?;
                Ok("ILIKE")
            }
            Operator::Unlike => {
                ensure_textual(op, field)?;
                Ok("NOT ILIKE")
            }
            _ => base_operator(op, field),
        }
    }

    fn test_override(
        &self,
        field: &FieldDefinition,
        column_sql: &str,
        op: Operator,
    ) -> Option<String> {
        if !field.full_text || !matches!(op, Operator::Like | Operator::Unlike) {
            return None;
        }
        let negation = if op == Operator::Unlike { "NOT " } else { "" };
        let locale = &field.full_text_locale;
        Some(format!(
            "{negation}(to_tsvector('{locale}', {column_sql}) @@ plainto_tsquery('{locale}', ?))"
        ))
    }

    fn not_fallback_literal(&self) -> &'static str {
        "false"
    }

    fn order_null_hint(&self, nullable: bool, descending: bool) -> Option<&'static str> {
        if !nullable {
            return None;
        }
        Some(if descending {
            "NULLS LAST"
        } else {
            "NULLS FIRST"
        })
    }
}

/// Select the dialect for a connection driver identifier. Unrecognized
/// drivers fall back to the base dialect.
pub fn for_driver(driver: &str) -> &'static dyn Dialect {
    static BASE: BaseDialect = BaseDialect;
    static POSTGRES: PostgresDialect = PostgresDialect;
    match driver.to_ascii_lowercase().as_str() {
        "postgres" | "postgresql" => &POSTGRES,
        _ => &BASE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scour_schema::ValueKind;

    fn text_field() -> FieldDefinition {
        FieldDefinition::new("name", ValueKind::Text)
    }

    fn numeric_field() -> FieldDefinition {
        FieldDefinition::new("uptime", ValueKind::Integer)
    }

    #[test]
    fn base_maps_the_full_operator_set() {
        let d = BaseDialect;
        let f = text_field();
        assert_eq!(d.map_operator(Operator::Eq, &f).unwrap(), "=");
        assert_eq!(d.map_operator(Operator::Ne, &f).unwrap(), "<>");
        assert_eq!(d.map_operator(Operator::Like, &f).unwrap(), "LIKE");
        assert_eq!(d.map_operator(Operator::Unlike, &f).unwrap(), "NOT LIKE");
        assert_eq!(d.map_operator(Operator::In, &f).unwrap(), "IN");
        assert_eq!(d.map_operator(Operator::NotIn, &f).unwrap(), "NOT IN");
        assert_eq!(d.map_operator(Operator::Null, &f).unwrap(), "IS NULL");
        assert_eq!(
            d.map_operator(Operator::NotNull, &f).unwrap(),
            "IS NOT NULL"
        );
    }

    #[test]
    fn like_rejects_non_text_fields() {
        let d = BaseDialect;
        assert!(d.map_operator(Operator::Like, &numeric_field()).is_err());
        let pg = PostgresDialect;
        assert!(pg.map_operator(Operator::Unlike, &numeric_field()).is_err());
    }

    #[test]
    fn postgres_uses_case_insensitive_like() {
        let d = PostgresDialect;
        let f = text_field();
        assert_eq!(d.map_operator(Operator::Like, &f).unwrap(), "ILIKE");
        assert_eq!(d.map_operator(Operator::Unlike, &f).unwrap(), "NOT ILIKE");
    }

    #[test]
    fn postgres_overrides_full_text_like() {
        let d = PostgresDialect;
        let f = text_field().with_full_text(Some("english"));
        let test = d.test_override(&f, "hosts.name", Operator::Like).unwrap();
        assert_eq!(
            test,
            "(to_tsvector('english', hosts.name) @@ plainto_tsquery('english', ?))"
        );
        let negated = d.test_override(&f, "hosts.name", Operator::Unlike).unwrap();
        assert!(negated.starts_with("NOT ("));
        assert!(d.test_override(&f, "hosts.name", Operator::Eq).is_none());
        assert!(d
            .test_override(&text_field(), "hosts.name", Operator::Like)
            .is_none());
    }

    #[test]
    fn falsy_literals_differ_per_dialect() {
        assert_eq!(BaseDialect.not_fallback_literal(), "0");
        assert_eq!(PostgresDialect.not_fallback_literal(), "false");
    }

    #[test]
    fn null_hints_apply_to_nullable_columns_only() {
        let d = PostgresDialect;
        assert_eq!(d.order_null_hint(true, false), Some("NULLS FIRST"));
        assert_eq!(d.order_null_hint(true, true), Some("NULLS LAST"));
        assert_eq!(d.order_null_hint(false, true), None);
        assert_eq!(BaseDialect.order_null_hint(true, true), None);
    }

    #[test]
    fn driver_selection_defaults_to_base() {
        assert_eq!(for_driver("postgresql").name(), "postgresql");
        assert_eq!(for_driver("PostgreS").name(), "postgresql");
        assert_eq!(for_driver("mysql2").name(), "base");
        assert_eq!(for_driver("sqlite3").name(), "base");
    }
}
