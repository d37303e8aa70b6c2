//! Bind values emitted by the compiler.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// A positional bind value for the produced SQL.
///
/// Every `?` placeholder in a compiled condition corresponds, in order, to
/// exactly one `Param`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Param {
    Text(String),
    Integer(i64),
    Bool(bool),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
