//! Schema-side data model for the scour query compiler.
//!
//! A caller declares which attributes of an entity are searchable
//! ([`FieldDefinition`]), how the entity relates to other tables
//! ([`Association`]), and what the backing table looks like
//! ([`EntityDescriptor`]). The compiler crate consumes these as read-only
//! shared data; nothing here is mutated during a compile call, so a single
//! [`SearchDefinition`] can serve concurrent compilations.

pub mod definition;
pub mod entity;
pub mod field;
pub mod relation;
pub mod value;

pub use definition::{SearchDefinition, TemporalParser};
pub use entity::{ColumnInfo, ColumnKind, EntityDescriptor};
pub use field::{
    ExternalClause, ExternalHook, FieldDefinition, Operator, SetMapping, Validator, ValueKind,
};
pub use relation::{Association, AssociationKind};
pub use value::Param;
