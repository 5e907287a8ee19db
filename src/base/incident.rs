//! The incident record passed between the incident tools.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::IncidentError;

pub const ID: &str = "id";
pub const TITLE: &str = "title";
pub const DESCRIPTION: &str = "description";
pub const SEVERITY: &str = "severity";
pub const STATUS: &str = "status";

/// A DevOps incident: a flat mapping of string keys to string values.
///
/// A well-formed incident carries `id`, `title`, `description`, `severity` and
/// `status`, but nothing enforces that on construction from JSON; accessors
/// report absent keys as [`IncidentError::MissingField`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Incident {
    fields: BTreeMap<String, String>,
}

impl Incident {
    /// Create a well-formed incident.
    pub fn new(id: impl Into<String>, title: impl Into<String>, description: impl Into<String>, severity: impl Into<String>, status: impl Into<String>) -> Self {
        let mut incident = Self::default();

        incident.set(ID, id);
        incident.set(TITLE, title);
        incident.set(DESCRIPTION, description);
        incident.set(SEVERITY, severity);
        incident.set(STATUS, status);

        incident
    }

    /// Get a field, failing if it is absent.
    pub fn field(&self, name: &str) -> Result<&str, IncidentError> {
        self.fields.get(name).map(String::as_str).ok_or_else(|| IncidentError::MissingField(name.to_string()))
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Remove a field, returning its previous value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }

    pub fn id(&self) -> Result<&str, IncidentError> {
        self.field(ID)
    }

    pub fn description(&self) -> Result<&str, IncidentError> {
        self.field(DESCRIPTION)
    }

    /// Iterate over all fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Incident {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self { fields: iter.into_iter().collect() }
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incident_serializes_as_flat_object() {
        let incident = Incident::new("INC-1", "Disk full", "  /var is full ", "low", "open");

        let json = serde_json::to_value(&incident).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": "INC-1",
                "title": "Disk full",
                "description": "  /var is full ",
                "severity": "low",
                "status": "open",
            })
        );
    }

    #[test]
    fn test_missing_field_is_reported_by_name() {
        let incident: Incident = serde_json::from_value(serde_json::json!({ "title": "No id here" })).unwrap();

        assert_eq!(incident.id(), Err(IncidentError::MissingField("id".to_string())));
        assert_eq!(incident.field(TITLE), Ok("No id here"));
    }

    #[test]
    fn test_non_string_values_are_rejected() {
        let result = serde_json::from_value::<Incident>(serde_json::json!({ "id": 42 }));

        assert!(result.is_err());
    }
}
