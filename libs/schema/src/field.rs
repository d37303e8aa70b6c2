//! Searchable field definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::value::Param;

/// Abstract query operators understood by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    Ne,
    Like,
    Unlike,
    Gt,
    Lt,
    Gte,
    Lte,
    In,
    NotIn,
    /// `IS NULL` test; unary over a field name.
    Null,
    /// `IS NOT NULL` test; unary over a field name.
    NotNull,
    /// Logical negation of a sub-expression; never mapped to a SQL operator
    /// token directly.
    Not,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Like => "like",
            Self::Unlike => "unlike",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::In => "in",
            Self::NotIn => "notin",
            Self::Null => "null",
            Self::NotNull => "notnull",
            Self::Not => "not",
        };
        f.write_str(s)
    }
}

/// The value kind a field holds, driving operator dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Text,
    Integer,
    Decimal,
    Date,
    DateTime,
    /// Enumerated values translated through the field's dictionary.
    Set,
    /// Integer column holding several bit-packed sub-fields.
    BitField,
}

/// Stored representation of an enumerated dictionary entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SetMapping {
    Bool(bool),
    Integer(i64),
    Text(String),
}

/// Result of an external field hook.
///
/// All members are optional; whatever the hook fills in is merged into the
/// final query specification.
#[derive(Debug, Clone, Default)]
pub struct ExternalClause {
    pub conditions: Option<String>,
    pub parameters: Vec<Param>,
    pub include: Option<String>,
    pub joins: Option<String>,
}

/// External field hook: `(field path, mapped SQL operator, raw value)`.
///
/// A failing hook aborts the compile with its message.
pub type ExternalHook =
    Arc<dyn Fn(&str, &str, &str) -> Result<ExternalClause, String> + Send + Sync>;

/// Value validator run before a field test is compiled.
pub type Validator = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Declaration of one searchable field.
///
/// Immutable once registered; shared read-only across compile calls.
#[derive(Clone)]
pub struct FieldDefinition {
    pub name: String,
    pub kind: ValueKind,
    /// Column name when it differs from the search name.
    pub column: Option<String>,
    /// Association the column lives behind, if any.
    pub relation: Option<String>,
    /// Key column for key-value table access.
    pub key_field: Option<String>,
    /// Association from the value table to its key table.
    pub key_relation: Option<String>,
    /// Bit offset for bit-packed fields, in units of `word_size`.
    pub offset: Option<u32>,
    /// Bit width of a bit-packed sub-field.
    pub word_size: u32,
    /// Participates in free-text keyword search.
    pub default: bool,
    pub full_text: bool,
    pub full_text_locale: String,
    pub ext_method: Option<ExternalHook>,
    pub validator: Option<Validator>,
    pub default_operator: Option<Operator>,
    /// Enumerated dictionary: query symbol to stored representation.
    pub values: BTreeMap<String, SetMapping>,
}

impl fmt::Debug for FieldDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("column", &self.column)
            .field("relation", &self.relation)
            .field("key_field", &self.key_field)
            .field("key_relation", &self.key_relation)
            .field("offset", &self.offset)
            .field("default", &self.default)
            .field("full_text", &self.full_text)
            .field("ext_method", &self.ext_method.is_some())
            .field("validator", &self.validator.is_some())
            .field("values", &self.values)
            .finish()
    }
}

impl FieldDefinition {
    pub fn new(name: &str, kind: ValueKind) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            kind,
            column: None,
            relation: None,
            key_field: None,
            key_relation: None,
            offset: None,
            word_size: 1,
            default: false,
            full_text: false,
            full_text_locale: "simple".to_string(),
            ext_method: None,
            validator: None,
            default_operator: None,
            values: BTreeMap::new(),
        }
    }

    pub fn on_column(mut self, column: &str) -> Self {
        self.column = Some(column.to_string());
        self
    }

    pub fn through_relation(mut self, relation: &str) -> Self {
        self.relation = Some(relation.to_string());
        self
    }

    pub fn with_key(mut self, key_relation: Option<&str>, key_field: &str) -> Self {
        self.key_relation = key_relation.map(str::to_string);
        self.key_field = Some(key_field.to_string());
        self
    }

    pub fn bit_packed(mut self, offset: u32, word_size: u32) -> Self {
        self.offset = Some(offset);
        self.word_size = word_size;
        self
    }

    pub fn searched_by_default(mut self) -> Self {
        self.default = true;
        self
    }

    pub fn with_full_text(mut self, locale: Option<&str>) -> Self {
        self.full_text = true;
        if let Some(locale) = locale {
            self.full_text_locale = locale.to_string();
        }
        self
    }

    pub fn with_ext_method(mut self, hook: ExternalHook) -> Self {
        self.ext_method = Some(hook);
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn with_default_operator(mut self, operator: Operator) -> Self {
        self.default_operator = Some(operator);
        self
    }

    pub fn with_value(mut self, symbol: &str, mapping: SetMapping) -> Self {
        self.values.insert(symbol.to_ascii_lowercase(), mapping);
        self
    }

    /// The backing column name.
    pub fn column(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }

    /// The operator applied during free-text keyword search.
    pub fn default_operator(&self) -> Operator {
        if let Some(op) = self.default_operator {
            return op;
        }
        match self.kind {
            ValueKind::Text => Operator::Like,
            _ => Operator::Eq,
        }
    }

    pub fn is_textual(&self) -> bool {
        matches!(self.kind, ValueKind::Text)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self.kind, ValueKind::Date | ValueKind::DateTime)
    }

    pub fn is_set(&self) -> bool {
        !self.values.is_empty()
    }

    pub fn is_key_value(&self) -> bool {
        self.key_field.is_some()
    }

    pub fn is_bit_packed(&self) -> bool {
        self.offset.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_fields_default_to_like() {
        let field = FieldDefinition::new("name", ValueKind::Text);
        assert_eq!(field.default_operator(), Operator::Like);
    }

    #[test]
    fn non_text_fields_default_to_eq() {
        let field = FieldDefinition::new("uptime", ValueKind::Integer);
        assert_eq!(field.default_operator(), Operator::Eq);

        let field = FieldDefinition::new("created_at", ValueKind::DateTime);
        assert_eq!(field.default_operator(), Operator::Eq);
    }

    #[test]
    fn declared_default_operator_wins() {
        let field =
            FieldDefinition::new("name", ValueKind::Text).with_default_operator(Operator::Eq);
        assert_eq!(field.default_operator(), Operator::Eq);
    }

    #[test]
    fn set_detection_uses_the_dictionary() {
        let field = FieldDefinition::new("status", ValueKind::Set);
        assert!(!field.is_set());

        let field = field.with_value("on", SetMapping::Bool(true));
        assert!(field.is_set());
    }

    #[test]
    fn column_falls_back_to_the_field_name() {
        let field = FieldDefinition::new("os", ValueKind::Text);
        assert_eq!(field.column(), "os");

        let field = field.on_column("operating_system");
        assert_eq!(field.column(), "operating_system");
    }
}
