//! Join planning for key-value and has-many-through fields.

use scour_schema::{Association, AssociationKind, EntityDescriptor, FieldDefinition, Param};

use crate::context::table_alias;
use crate::error::{Error, Result};
use crate::expr::Compiler;
use crate::resolve;

/// Plan the joins for a key-value field and return the value column
/// reference. The key restriction (`key_column = ?`) is recorded on the
/// context so the entry point can AND it ahead of the main condition.
///
/// Each call draws one alias suffix, so two key-value tests in the same
/// query join the key/value tables under distinct aliases and stay
/// independent.
pub(crate) fn key_value_column(
    c: &mut Compiler<'_>,
    field: &FieldDefinition,
    path: &str,
) -> Result<String> {
    let Some(key_field) = field.key_field.as_deref() else {
        return Err(Error::UnsupportedQuery(format!(
            "Field '{}' has no key column",
            field.name
        )));
    };
    let entity = c.entity;
    let suffix = c.ctx.next_suffix();

    let mut join = String::new();

    // Value side: the table holding the searched column.
    let (value_table, value_alias) = match field.relation.as_deref() {
        Some(relation) => {
            let Some(assoc) = entity.reflection(relation) else {
                return Err(Error::UnsupportedQuery(format!(
                    "No relation '{relation}' on {}",
                    entity.table
                )));
            };
            let alias = table_alias(&assoc.table, suffix);
            join.push_str(&format!(
                "INNER JOIN {} ON ({}.{} = {}.{}{})",
                aliased(&assoc.table, &alias),
                entity.table,
                assoc.primary_key,
                alias,
                assoc.foreign_key,
                guard(assoc),
            ));
            (assoc.table.clone(), alias)
        }
        None => (entity.table.clone(), entity.table.clone()),
    };

    // Key side: the table holding the key names, joined off the value
    // table under the same suffix.
    let key_column = match field.key_relation.as_deref() {
        Some(key_relation) => {
            let assoc = entity.reflection(key_relation).or_else(|| {
                entity
                    .reflections_of(&value_table)
                    .and_then(|m| m.get(key_relation))
            });
            let Some(assoc) = assoc else {
                return Err(Error::UnsupportedQuery(format!(
                    "No relation '{key_relation}' on {}",
                    entity.table
                )));
            };
            let key_alias = table_alias(&assoc.table, suffix);
            join.push_str(&format!(
                " INNER JOIN {} ON ({}.{} = {}.{}{})",
                aliased(&assoc.table, &key_alias),
                key_alias,
                assoc.primary_key,
                value_alias,
                assoc.foreign_key,
                guard(assoc),
            ));
            format!("{key_alias}.{key_field}")
        }
        None => format!("{value_alias}.{key_field}"),
    };

    if !join.is_empty() {
        c.ctx.add_join(join);
    }
    c.ctx.push_key(
        format!("{key_column} = ?"),
        Param::Text(resolve::key_name(path).to_string()),
    );
    Ok(format!("{}.{}", value_alias, field.column()))
}

fn aliased(table: &str, alias: &str) -> String {
    if alias == table {
        table.to_string()
    } else {
        format!("{table} AS {alias}")
    }
}

fn guard(assoc: &Association) -> String {
    match assoc.conditions.as_deref() {
        Some(conditions) => format!(" AND {conditions}"),
        None => String::new(),
    }
}

/// FROM clause for a has-many-through subselect: origin joined to the
/// middle table, joined to the endpoint table.
pub(crate) fn through_from_clause(
    entity: &EntityDescriptor,
    relation: &str,
    assoc: &Association,
) -> Result<String> {
    let Some(through) = assoc.through.as_deref() else {
        return Err(Error::UnsupportedQuery(format!(
            "Relation '{relation}' has no through association"
        )));
    };

    let (middle_table, origin_pk, origin_fk) = match entity.reflection(through) {
        Some(middle) => (
            middle.table.clone(),
            middle.primary_key.clone(),
            middle.foreign_key.clone(),
        ),
        // The middle association may not be reflected on the origin;
        // fall back to conventional naming.
        None => (
            through.to_string(),
            entity.primary_key.clone(),
            default_foreign_key(&entity.table),
        ),
    };

    // The endpoint side of the join is described by the endpoint table's
    // own has-many back onto the middle table, when the schema supplies
    // it; otherwise the through association carries the keys itself.
    let endpoint = entity.reflections_of(&assoc.table).and_then(|reflections| {
        reflections
            .values()
            .find(|a| a.kind == AssociationKind::HasMany && a.table == middle_table)
    });
    let (endpoint_pk, endpoint_fk, conditions) = match endpoint {
        Some(back) => (
            back.primary_key.clone(),
            back.foreign_key.clone(),
            back.conditions.clone(),
        ),
        None => (
            assoc.primary_key.clone(),
            assoc.foreign_key.clone(),
            assoc.conditions.clone(),
        ),
    };
    let guard = match conditions.as_deref() {
        Some(c) => format!(" AND {c}"),
        None => String::new(),
    };

    Ok(format!(
        "{origin} INNER JOIN {middle} ON {origin}.{origin_pk} = {middle}.{origin_fk} \
         INNER JOIN {endpoint} ON {endpoint}.{endpoint_pk} = {middle}.{endpoint_fk}{guard}",
        origin = entity.table,
        middle = middle_table,
        endpoint = assoc.table,
    ))
}

/// Conventional foreign key for a table name. Covers the common English
/// plural endings; tables with irregular plurals need an explicit
/// reflection.
fn default_foreign_key(table: &str) -> String {
    let singular = if let Some(stem) = table.strip_suffix("ies") {
        format!("{stem}y")
    } else if ["ses", "xes", "zes", "ches", "shes"]
        .iter()
        .any(|suffix| table.ends_with(suffix))
    {
        table[..table.len() - 2].to_string()
    } else {
        table.strip_suffix('s').unwrap_or(table).to_string()
    };
    format!("{singular}_id")
}
