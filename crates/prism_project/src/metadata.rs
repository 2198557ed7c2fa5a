//! Metadata reflection.
//!
//! Tells API consumers which fields and associations they may select on
//! a target: the allow-list itself when one is configured, otherwise
//! whatever the target's schema declares.

use prism_core::GraphValue;
use prism_policy::Scope;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key metadata is merged under
pub const METADATA_KEY: &str = "metadata";

/// Selectable fields and associations of a target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Plain fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    /// Associations that accept nested selections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associations: Option<Vec<String>>,
}

impl Metadata {
    /// Build metadata, dropping empty categories
    #[must_use]
    pub fn new(fields: Vec<String>, associations: Vec<String>) -> Self {
        Self {
            fields: non_empty(fields),
            associations: non_empty(associations),
        }
    }

    /// Check if neither category is present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_none() && self.associations.is_none()
    }

    /// Convert to JSON
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut members = serde_json::Map::new();
        if let Some(fields) = &self.fields {
            members.insert("fields".to_string(), strings(fields));
        }
        if let Some(associations) = &self.associations {
            members.insert("associations".to_string(), strings(associations));
        }
        Value::Object(members)
    }
}

/// Describe what may be selected on `target` within `scope`.
///
/// A restricted scope reports its leaf entries as fields and its scoped
/// entries as associations. An unrestricted scope reports the target's
/// schema; for a sequence that is the schema of its elements.
#[must_use]
pub fn describe(target: &GraphValue<'_>, scope: Scope<'_>) -> Metadata {
    if scope.is_unrestricted() {
        return match target.schema() {
            Some(schema) => Metadata::new(schema.fields, schema.associations),
            None => Metadata::default(),
        };
    }

    let owned =
        |names: Vec<&str>| -> Vec<String> { names.into_iter().map(str::to_string).collect() };
    Metadata::new(owned(scope.leaf_names()), owned(scope.scoped_names()))
}

fn non_empty(names: Vec<String>) -> Option<Vec<String>> {
    if names.is_empty() { None } else { Some(names) }
}

fn strings(names: &[String]) -> Value {
    Value::Array(names.iter().cloned().map(Value::String).collect())
}
