//! Object graph adapter for JSON documents.
//!
//! Lets any `serde_json::Value` be projected: objects become
//! [`GraphObject`]s keyed by their members, arrays become
//! [`GraphSequence`]s without a native order-by.

use crate::graph::{GraphObject, GraphSequence, GraphValue, Schema};
use crate::value::Scalar;
use serde_json::{Map, Value};

/// A JSON object viewed as a graph object
#[derive(Debug, Clone, Copy)]
pub struct JsonObject<'a> {
    members: &'a Map<String, Value>,
    type_name: &'a str,
}

impl<'a> JsonObject<'a> {
    /// Wrap a JSON object
    #[must_use]
    pub fn new(members: &'a Map<String, Value>) -> Self {
        Self {
            members,
            type_name: "object",
        }
    }

    /// Set the type name reported in errors and diagnostics
    #[must_use]
    pub fn with_type_name(mut self, type_name: &'a str) -> Self {
        self.type_name = type_name;
        self
    }
}

impl GraphObject for JsonObject<'_> {
    fn type_name(&self) -> &str {
        self.type_name
    }

    /// Members holding objects (or arrays containing objects) are
    /// associations; everything else is a field.
    fn schema(&self) -> Schema {
        let mut schema = Schema::default();
        for (name, value) in self.members {
            if is_association(value) {
                schema.associations.push(name.clone());
            } else {
                schema.fields.push(name.clone());
            }
        }
        schema
    }

    fn get_attribute(&self, name: &str) -> Option<GraphValue<'_>> {
        self.members.get(name).map(GraphValue::from)
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }
}

/// A JSON array viewed as a graph sequence
#[derive(Debug, Clone, Copy)]
pub struct JsonArray<'a> {
    items: &'a [Value],
}

impl<'a> JsonArray<'a> {
    /// Wrap a JSON array
    #[must_use]
    pub fn new(items: &'a [Value]) -> Self {
        Self { items }
    }
}

impl GraphSequence for JsonArray<'_> {
    fn elements(&self) -> Vec<GraphValue<'_>> {
        self.items.iter().map(GraphValue::from).collect()
    }
}

fn is_association(value: &Value) -> bool {
    match value {
        Value::Object(_) => true,
        Value::Array(items) => items.iter().any(Value::is_object),
        _ => false,
    }
}

impl<'a> From<&'a Value> for GraphValue<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Object(members) => GraphValue::object(JsonObject::new(members)),
            Value::Array(items) => GraphValue::sequence(JsonArray::new(items)),
            scalar => GraphValue::Scalar(Scalar::from_json(scalar).unwrap_or(Scalar::Null)),
        }
    }
}
