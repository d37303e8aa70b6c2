//! Target entity description: table, columns, driver, reflections.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::relation::Association;

/// Database-level column kind, as introspected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Text,
    Integer,
    Decimal,
    Date,
    DateTime,
    Boolean,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Decimal)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    pub kind: ColumnKind,
    pub nullable: bool,
}

/// Descriptor of the entity a query is compiled against.
///
/// `reflections` holds the entity's own associations plus any associations
/// of related tables the schema wants reachable by name (key-value key
/// tables, for instance). `related_reflections` maps a related table name
/// to that table's own associations, which the join planner scans when
/// resolving has-many-through chains.
#[derive(Debug, Clone)]
pub struct EntityDescriptor {
    pub table: String,
    pub primary_key: String,
    /// Connection driver identifier (e.g. `postgresql`); selects the dialect.
    pub driver: String,
    pub columns: BTreeMap<String, ColumnInfo>,
    pub reflections: BTreeMap<String, Association>,
    pub related_reflections: BTreeMap<String, BTreeMap<String, Association>>,
}

impl EntityDescriptor {
    pub fn new(table: &str, primary_key: &str, driver: &str) -> Self {
        Self {
            table: table.to_string(),
            primary_key: primary_key.to_string(),
            driver: driver.to_string(),
            columns: BTreeMap::new(),
            reflections: BTreeMap::new(),
            related_reflections: BTreeMap::new(),
        }
    }

    pub fn with_column(mut self, name: &str, kind: ColumnKind, nullable: bool) -> Self {
        self.columns
            .insert(name.to_string(), ColumnInfo { kind, nullable });
        self
    }

    pub fn with_reflection(mut self, name: &str, association: Association) -> Self {
        self.reflections.insert(name.to_string(), association);
        self
    }

    pub fn with_related_reflection(
        mut self,
        table: &str,
        name: &str,
        association: Association,
    ) -> Self {
        self.related_reflections
            .entry(table.to_string())
            .or_default()
            .insert(name.to_string(), association);
        self
    }

    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.get(name)
    }

    pub fn reflection(&self, name: &str) -> Option<&Association> {
        self.reflections.get(name)
    }

    pub fn reflections_of(&self, table: &str) -> Option<&BTreeMap<String, Association>> {
        self.related_reflections.get(table)
    }

    /// Table-qualified column reference.
    pub fn qualified(&self, column: &str) -> String {
        format!("{}.{}", self.table, column)
    }

    /// Table-qualified primary key reference.
    pub fn qualified_primary_key(&self) -> String {
        self.qualified(&self.primary_key)
    }
}
