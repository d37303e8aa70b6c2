//! Relational metadata supplied by the schema collaborator.

use serde::Serialize;

/// How an association reaches its target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    BelongsTo,
    HasOne,
    HasMany,
    HasManyThrough,
}

/// One association, as reflected from the schema.
///
/// For `HasManyThrough`, `foreign_key`/`primary_key` describe the
/// endpoint-side join (endpoint primary key against the middle table's
/// foreign key) and `through` names the intermediate association.
#[derive(Debug, Clone, Serialize)]
pub struct Association {
    pub kind: AssociationKind,
    /// Target table name.
    pub table: String,
    pub foreign_key: String,
    pub primary_key: String,
    pub through: Option<String>,
    /// Extra join conditions (polymorphic type guards, custom predicates),
    /// carried onto the join as additional `AND` terms.
    pub conditions: Option<String>,
}

impl Association {
    pub fn new(kind: AssociationKind, table: &str, foreign_key: &str, primary_key: &str) -> Self {
        Self {
            kind,
            table: table.to_string(),
            foreign_key: foreign_key.to_string(),
            primary_key: primary_key.to_string(),
            through: None,
            conditions: None,
        }
    }

    pub fn through(mut self, association: &str) -> Self {
        self.through = Some(association.to_string());
        self
    }

    pub fn with_conditions(mut self, conditions: &str) -> Self {
        self.conditions = Some(conditions.to_string());
        self
    }

    pub fn is_many(&self) -> bool {
        matches!(
            self.kind,
            AssociationKind::HasMany | AssociationKind::HasManyThrough
        )
    }
}
