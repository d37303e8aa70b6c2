//! Search query compiler: turns a parsed query AST into a parameterized
//! SQL condition against a described entity.
//!
//! The caller supplies an [`EntityDescriptor`] (table, columns, driver,
//! reflections), a [`SearchDefinition`] (the searchable fields), and an
//! optional [`Ast`]. [`compile`] returns a [`QuerySpec`]: the condition
//! text with `?` placeholders, the bind parameters in placeholder order,
//! plus any eager-load includes, join clauses and an ORDER BY term.
//!
//! [`EntityDescriptor`]: scour_schema::EntityDescriptor
//! [`SearchDefinition`]: scour_schema::SearchDefinition

pub mod ast;
mod context;
pub mod dialect;
pub mod error;
mod expr;
mod joins;
mod order;
mod resolve;
mod set_values;
mod temporal;

use serde::Serialize;

pub use ast::{Ast, LogicalOp};
pub use error::{Error, Result};
pub use scour_schema as schema;

use scour_schema::{EntityDescriptor, Param, SearchDefinition};

/// Per-call compile options.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Order specification: `"<field>"` or `"<field> desc"`. Falls back to
    /// the definition's default order.
    pub order: Option<String>,
    /// Field profile to resolve against; the default profile when unset.
    pub profile: Option<String>,
}

/// The compiled query: everything the caller needs to assemble and bind
/// the final statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuerySpec {
    /// Condition text and its bind parameters, in placeholder order.
    /// `None` when the query imposes no restriction.
    pub conditions: Option<(String, Vec<Param>)>,
    /// Relations to eager-load.
    pub includes: Vec<String>,
    /// Raw join clauses to splice into the FROM clause.
    pub joins: Vec<String>,
    pub order: Option<String>,
}

/// Compile a parsed query against an entity. `None` for the AST compiles
/// the empty query: no conditions, default order.
pub fn compile(
    entity: &EntityDescriptor,
    definition: &SearchDefinition,
    ast: Option<&Ast>,
    options: &CompileOptions,
) -> Result<QuerySpec> {
    let profile = options.profile.as_deref();
    if let Some(p) = profile {
        if !definition.has_profile(p) {
            return Err(Error::InvalidArgument(format!(
                "Unknown search profile '{p}'"
            )));
        }
    }
    let dialect = dialect::for_driver(&entity.driver);

    let mut compiler = expr::Compiler::new(entity, definition, profile, dialect);
    let main = match ast {
        Some(node) => compiler.compile_node(node)?,
        None => None,
    };
    let order = order::compile(&mut compiler, options.order.as_deref())?;
    let ctx = compiler.into_context();

    // Key conditions are ANDed ahead of the main condition, their
    // parameters ahead of the value parameters.
    let mut pieces = ctx.key_conditions;
    if let Some(main) = main {
        if pieces.is_empty() {
            pieces.push(main);
        } else {
            pieces.push(format!("({main})"));
        }
    }
    let conditions = if pieces.is_empty() {
        None
    } else {
        let mut parameters = ctx.key_parameters;
        parameters.extend(ctx.parameters);
        Some((pieces.join(" AND "), parameters))
    };

    tracing::debug!(
        dialect = dialect.name(),
        conditions = conditions.as_ref().map(|(sql, _)| sql.as_str()),
        parameters = conditions.as_ref().map(|(_, p)| p.len()).unwrap_or(0),
        "compiled search query"
    );

    Ok(QuerySpec {
        conditions,
        includes: ctx.includes,
        joins: ctx.joins,
        order,
    })
}
