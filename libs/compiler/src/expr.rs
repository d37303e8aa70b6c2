//! AST-to-SQL expression compilation.
//!
//! A [`Compiler`] is allocated per compile call and walks the tree once,
//! emitting condition text while recording bind parameters, key
//! conditions, includes and joins on its [`EmissionContext`]. Every `?`
//! placeholder is pushed together with its parameter, in emission order,
//! which keeps the placeholder/parameter pairing an invariant rather than
//! a bookkeeping exercise.

use scour_schema::{
    AssociationKind, EntityDescriptor, FieldDefinition, Operator, Param, SearchDefinition,
};

use crate::ast::{Ast, LogicalOp};
use crate::context::EmissionContext;
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::{joins, resolve, set_values, temporal};

pub(crate) struct Compiler<'a> {
    pub(crate) entity: &'a EntityDescriptor,
    pub(crate) definition: &'a SearchDefinition,
    pub(crate) profile: Option<&'a str>,
    pub(crate) dialect: &'a dyn Dialect,
    pub(crate) ctx: EmissionContext,
}

impl<'a> Compiler<'a> {
    pub(crate) fn new(
        entity: &'a EntityDescriptor,
        definition: &'a SearchDefinition,
        profile: Option<&'a str>,
        dialect: &'a dyn Dialect,
    ) -> Self {
        Self {
            entity,
            definition,
            profile,
            dialect,
            ctx: EmissionContext::new(),
        }
    }

    pub(crate) fn into_context(self) -> EmissionContext {
        self.ctx
    }

    /// Compile one node. `None` means the node contributes no condition
    /// (an unparsable temporal literal, or a keyword that matches no
    /// default field); callers drop absent children rather than failing.
    pub(crate) fn compile_node(&mut self, node: &Ast) -> Result<Option<String>> {
        match node {
            Ast::Leaf(value) => self.compile_leaf(value),
            Ast::Op { op, children } => self.compile_op(*op, children),
            Ast::Logical { op, children } => self.compile_logical(*op, children),
        }
    }

    /// A bare keyword. When the keyword names a set field with a truthy
    /// mapping, it is shorthand for that field being on; otherwise it is
    /// matched against every default field.
    fn compile_leaf(&mut self, value: &str) -> Result<Option<String>> {
        let definition = self.definition;
        if let Some(field) = definition.field(self.profile, value) {
            if field.is_set() {
                let truthy = field
                    .values
                    .iter()
                    .find(|(_, m)| matches!(m, scour_schema::SetMapping::Bool(true)));
                if let Some((symbol, _)) = truthy {
                    return self.field_test(field, Operator::Eq, symbol, &field.name);
                }
            }
        }
        self.default_fields_test(None, value)
    }

    fn compile_op(&mut self, op: Operator, children: &[Ast]) -> Result<Option<String>> {
        let definition = self.definition;
        match (op, children) {
            (Operator::Not, [child]) => {
                let Some(inner) = self.compile_node(child)? else {
                    return Ok(None);
                };
                // COALESCE keeps the negation from matching NULL rows.
                let falsy = self.dialect.not_fallback_literal();
                Ok(Some(format!("NOT COALESCE({inner}, {falsy})")))
            }
            (Operator::Null | Operator::NotNull, [Ast::Leaf(path)]) => {
                let field = resolve::field(definition, self.profile, path)?;
                let column_sql = self.field_sql(field, path)?;
                let mapped = self.dialect.map_operator(op, field)?;
                Ok(Some(format!("{column_sql} {mapped}")))
            }
            (_, [Ast::Leaf(value)]) => self.default_fields_test(Some(op), value),
            (_, [Ast::Leaf(path), Ast::Leaf(value)]) => {
                let field = resolve::field(definition, self.profile, path)?;
                if let Some(validator) = field.validator.clone() {
                    if !validator(value) {
                        return Err(Error::UnsupportedQuery(format!(
                            "Value '{value}' is not valid for field '{}'",
                            field.name
                        )));
                    }
                }
                self.field_test(field, op, value, path)
            }
            _ => Err(Error::UnsupportedQuery(
                "Don't know how to handle this query".to_string(),
            )),
        }
    }

    fn compile_logical(&mut self, op: LogicalOp, children: &[Ast]) -> Result<Option<String>> {
        if children.is_empty() {
            return Err(Error::UnsupportedQuery(
                "Empty logical expression".to_string(),
            ));
        }
        let mut parts = Vec::new();
        for child in children {
            if let Some(sql) = self.compile_node(child)? {
                parts.push(format!("({sql})"));
            }
        }
        if parts.is_empty() {
            return Ok(None);
        }
        Ok(Some(parts.join(&format!(" {} ", op.as_str()))))
    }

    /// Keyword search: OR the test over every default field. Fields whose
    /// type rejects the operator, or set fields that do not know the
    /// value, are skipped silently.
    fn default_fields_test(&mut self, op: Option<Operator>, value: &str) -> Result<Option<String>> {
        let definition = self.definition;
        let symbol = value.trim().to_ascii_lowercase();
        let mut tests = Vec::new();
        for field in definition.default_fields(self.profile) {
            let operator = op.unwrap_or_else(|| field.default_operator());
            if self.dialect.map_operator(operator, field).is_err() {
                continue;
            }
            if field.is_set() && !field.values.contains_key(&symbol) {
                continue;
            }
            if let Some(test) = self.field_test(field, operator, value, &field.name)? {
                tests.push(test);
            }
        }
        Ok(match tests.len() {
            0 => None,
            1 => tests.pop(),
            _ => Some(format!("({})", tests.join(" OR "))),
        })
    }

    /// Compile a single field test. Dispatch order: external hook,
    /// pattern match, element list, temporal, set, has-many subselect,
    /// plain comparison.
    fn field_test(
        &mut self,
        field: &FieldDefinition,
        op: Operator,
        value: &str,
        path: &str,
    ) -> Result<Option<String>> {
        let entity = self.entity;
        let dialect = self.dialect;

        if let Some(hook) = field.ext_method.clone() {
            let mapped = dialect.map_operator(op, field)?;
            let clause = hook(path, mapped, value).map_err(Error::UnsupportedQuery)?;
            if let Some(conditions) = &clause.conditions {
                let placeholders = conditions.matches('?').count();
                if placeholders != clause.parameters.len() {
                    return Err(Error::UnsupportedQuery(format!(
                        "External method for field '{}' returned {placeholders} placeholders \
                         but {} parameters",
                        field.name,
                        clause.parameters.len()
                    )));
                }
            }
            for parameter in clause.parameters {
                self.ctx.push_param(parameter);
            }
            if let Some(include) = &clause.include {
                self.ctx.add_include(include);
            }
            if let Some(join) = clause.joins {
                self.ctx.add_join(join);
            }
            return Ok(clause.conditions);
        }

        let column_sql = self.field_sql(field, path)?;

        match op {
            Operator::Like | Operator::Unlike => {
                if let Some(test) = dialect.test_override(field, &column_sql, op) {
                    self.ctx.push_param(Param::Text(value.to_string()));
                    return Ok(Some(test));
                }
                let mapped = dialect.map_operator(op, field)?;
                self.ctx.push_param(Param::Text(wildcard_pattern(value)));
                Ok(Some(format!("{column_sql} {mapped} ?")))
            }
            Operator::In | Operator::NotIn => {
                let mapped = dialect.map_operator(op, field)?;
                let mut placeholders = Vec::new();
                for token in value.split(',') {
                    let parameter = if field.is_set() {
                        set_values::translate(field, token)?
                    } else {
                        coerced_param(field, token.trim())
                    };
                    self.ctx.push_param(parameter);
                    placeholders.push("?");
                }
                Ok(Some(format!(
                    "{column_sql} {mapped} ({})",
                    placeholders.join(",")
                )))
            }
            _ if field.is_temporal() => temporal::test(self, field, &column_sql, op, value),
            _ if field.is_set() => {
                set_values::test(self, field, &column_sql, op, value).map(Some)
            }
            _ => {
                if !field.is_key_value() {
                    if let Some(relation) = field.relation.as_deref() {
                        if let Some(assoc) = entity.reflection(relation) {
                            if assoc.is_many() {
                                let mapped = dialect.map_operator(op, field)?;
                                self.ctx.push_param(coerced_param(field, value));
                                let pk = entity.qualified_primary_key();
                                let test = if assoc.kind == AssociationKind::HasManyThrough {
                                    let from =
                                        joins::through_from_clause(entity, relation, assoc)?;
                                    format!(
                                        "{pk} IN (SELECT {pk} FROM {from} \
                                         WHERE {column_sql} {mapped} ?)"
                                    )
                                } else {
                                    format!(
                                        "{pk} IN (SELECT {} FROM {} WHERE {column_sql} {mapped} ?)",
                                        assoc.foreign_key, assoc.table
                                    )
                                };
                                return Ok(Some(test));
                            }
                        }
                    }
                }
                let mapped = dialect.map_operator(op, field)?;
                self.ctx.push_param(coerced_param(field, value));
                Ok(Some(format!("{column_sql} {mapped} ?")))
            }
        }
    }

    /// The SQL reference for a field's column: key-value fields go through
    /// the join planner, relation fields qualify against the related table
    /// and record an include, bit-packed fields shift and mask their word
    /// out of the backing column.
    pub(crate) fn field_sql(&mut self, field: &FieldDefinition, path: &str) -> Result<String> {
        if field.is_key_value() {
            return joins::key_value_column(self, field, path);
        }
        let entity = self.entity;
        if let Some(relation) = field.relation.as_deref() {
            let Some(assoc) = entity.reflection(relation) else {
                return Err(Error::UnsupportedQuery(format!(
                    "No relation '{relation}' on {}",
                    entity.table
                )));
            };
            self.ctx.add_include(relation);
            return Ok(format!("{}.{}", assoc.table, field.column()));
        }
        if field.is_bit_packed() {
            let shift = u64::from(field.offset.unwrap_or(0)) * u64::from(field.word_size);
            let mask = 1u64
                .checked_shl(field.word_size)
                .map(|bound| bound - 1)
                .ok_or_else(|| {
                    Error::UnsupportedQuery(format!(
                        "Bit-packed field '{}' has a word size wider than 64 bits",
                        field.name
                    ))
                })?;
            return Ok(format!(
                "({} >> {shift} & {mask})",
                entity.qualified(field.column())
            ));
        }
        Ok(entity.qualified(field.column()))
    }
}

fn coerced_param(field: &FieldDefinition, value: &str) -> Param {
    if field.is_bit_packed() {
        Param::Integer(value.trim().parse().unwrap_or(0))
    } else {
        Param::Text(value.to_string())
    }
}

/// LIKE pattern for a user value: values carrying explicit wildcards keep
/// them (`*` rewritten to `%`), bare values are wrapped for substring
/// match.
fn wildcard_pattern(value: &str) -> String {
    if value.contains('%') || value.contains('*') {
        value.replace('*', "%")
    } else {
        format!("%{value}%")
    }
}
