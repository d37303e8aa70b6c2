//! Per-call accumulator for compile side effects.

use scour_schema::Param;

/// Collects everything a compile call emits besides the condition text:
/// bind parameters, key conditions for key-value access, eager-load
/// includes and raw join clauses. Allocated fresh per call and folded into
/// the final `QuerySpec` by the entry point.
#[derive(Debug, Default)]
pub(crate) struct EmissionContext {
    pub(crate) parameters: Vec<Param>,
    pub(crate) key_conditions: Vec<String>,
    pub(crate) key_parameters: Vec<Param>,
    pub(crate) includes: Vec<String>,
    pub(crate) joins: Vec<String>,
    alias_counter: usize,
}

impl EmissionContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_param(&mut self, parameter: Param) {
        self.parameters.push(parameter);
    }

    /// Key conditions are ANDed ahead of the main condition text, so their
    /// parameters bind ahead of the value parameters as well.
    pub(crate) fn push_key(&mut self, condition: String, parameter: Param) {
        self.key_conditions.push(condition);
        self.key_parameters.push(parameter);
    }

    pub(crate) fn add_include(&mut self, relation: &str) {
        if !self.includes.iter().any(|r| r == relation) {
            self.includes.push(relation.to_string());
        }
    }

    pub(crate) fn add_join(&mut self, join: String) {
        if !self.joins.contains(&join) {
            self.joins.push(join);
        }
    }

    /// Deterministic alias suffix, scoped to this call. Repeated joins of
    /// the same logical table within one query get distinct aliases.
    pub(crate) fn next_suffix(&mut self) -> usize {
        let suffix = self.alias_counter;
        self.alias_counter += 1;
        suffix
    }
}

/// The first join of a call keeps the bare table name; later ones are
/// suffixed.
pub(crate) fn table_alias(table: &str, suffix: usize) -> String {
    if suffix == 0 {
        table.to_string()
    } else {
        format!("{table}_{suffix}")
    }
}
