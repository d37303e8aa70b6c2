//! The search definition: registered fields grouped by profile.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::field::FieldDefinition;

pub const DEFAULT_PROFILE: &str = "default";

/// Pluggable temporal literal parser. When unset, the compiler falls back
/// to its built-in parser.
pub type TemporalParser = fn(&str) -> Option<NaiveDateTime>;

/// All searchable fields of an entity, grouped by profile.
///
/// Field names are stored lowercased; lookups are case-insensitive.
/// Registration order is preserved so free-text keyword search visits
/// default fields deterministically.
#[derive(Clone, Default)]
pub struct SearchDefinition {
    profiles: BTreeMap<String, Vec<FieldDefinition>>,
    default_order: Option<String>,
    temporal_parser: Option<TemporalParser>,
}

impl SearchDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_order(mut self, order: &str) -> Self {
        self.default_order = Some(order.to_string());
        self
    }

    pub fn with_temporal_parser(mut self, parser: TemporalParser) -> Self {
        self.temporal_parser = Some(parser);
        self
    }

    /// Register a field on the default profile.
    pub fn with_field(self, field: FieldDefinition) -> Self {
        self.with_field_on(DEFAULT_PROFILE, field)
    }

    /// Register a field on a named profile.
    pub fn with_field_on(mut self, profile: &str, field: FieldDefinition) -> Self {
        self.profiles
            .entry(profile.to_ascii_lowercase())
            .or_default()
            .push(field);
        self
    }

    pub fn has_profile(&self, profile: &str) -> bool {
        self.profiles.contains_key(&profile.to_ascii_lowercase())
    }

    /// Look up a field by exact name within a profile.
    pub fn field(&self, profile: Option<&str>, name: &str) -> Option<&FieldDefinition> {
        let profile = profile.unwrap_or(DEFAULT_PROFILE).to_ascii_lowercase();
        let name = name.to_ascii_lowercase();
        self.profiles
            .get(&profile)?
            .iter()
            .find(|f| f.name == name)
    }

    /// Fields participating in free-text keyword search, in registration
    /// order.
    pub fn default_fields(&self, profile: Option<&str>) -> Vec<&FieldDefinition> {
        let profile = profile.unwrap_or(DEFAULT_PROFILE).to_ascii_lowercase();
        self.profiles
            .get(&profile)
            .map(|fields| fields.iter().filter(|f| f.default).collect())
            .unwrap_or_default()
    }

    pub fn default_order(&self) -> Option<&str> {
        self.default_order.as_deref()
    }

    pub fn temporal_parser(&self) -> Option<TemporalParser> {
        self.temporal_parser
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ValueKind;

    #[test]
    fn field_lookup_is_case_insensitive() {
        let definition =
            SearchDefinition::new().with_field(FieldDefinition::new("Name", ValueKind::Text));
        assert!(definition.field(None, "name").is_some());
        assert!(definition.field(None, "NAME").is_some());
        assert!(definition.field(None, "missing").is_none());
    }

    #[test]
    fn profiles_are_isolated() {
        let definition = SearchDefinition::new()
            .with_field(FieldDefinition::new("name", ValueKind::Text))
            .with_field_on("admin", FieldDefinition::new("secret", ValueKind::Text));

        assert!(definition.field(None, "secret").is_none());
        assert!(definition.field(Some("admin"), "secret").is_some());
        assert!(definition.field(Some("admin"), "name").is_none());
        assert!(definition.has_profile("admin"));
        assert!(!definition.has_profile("other"));
    }

    #[test]
    fn default_fields_preserve_registration_order() {
        let definition = SearchDefinition::new()
            .with_field(FieldDefinition::new("name", ValueKind::Text).searched_by_default())
            .with_field(FieldDefinition::new("uptime", ValueKind::Integer))
            .with_field(FieldDefinition::new("comment", ValueKind::Text).searched_by_default());

        let names: Vec<&str> = definition
            .default_fields(None)
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["name", "comment"]);
    }
}
