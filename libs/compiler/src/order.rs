//! ORDER BY compilation.

use crate::error::Result;
use crate::expr::Compiler;
use crate::resolve;

/// Compile an order specification (`"<field>"` or `"<field> desc"`) into
/// an ORDER BY term, falling back to the definition's default order. The
/// dialect may append a null-ordering hint for nullable columns.
pub(crate) fn compile(c: &mut Compiler<'_>, spec: Option<&str>) -> Result<Option<String>> {
    let definition = c.definition;
    let spec = match spec.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s,
        None => match definition.default_order() {
            Some(s) => s,
            None => return Ok(None),
        },
    };

    let mut tokens = spec.split_whitespace();
    let name = tokens.next().unwrap_or(spec);
    let descending = tokens
        .next()
        .is_some_and(|t| t.eq_ignore_ascii_case("desc"));

    let field = resolve::field(definition, c.profile, name)?;
    let column_sql = c.field_sql(field, name)?;
    let nullable = c
        .entity
        .column(field.column())
        .map(|info| info.nullable)
        .unwrap_or(true);

    let direction = if descending { "DESC" } else { "ASC" };
    let mut order = format!("{column_sql} {direction}");
    if let Some(hint) = c.dialect.order_null_hint(nullable, descending) {
        order.push(' ');
        order.push_str(hint);
    }
    Ok(Some(order))
}
