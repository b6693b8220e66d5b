//! The generic value every resource is built on: an ID, the API's type tag and a bag of fields

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A raw API object. Every attribute other than `id` and `object` lands in `fields`, so resource
/// types built on top of this never lose data the API sends back
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Object {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The type tag the API attaches to every object (e.g. `"Parcel"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, returning the object for chaining
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Returns the named field as a float, if it is present and numeric
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// Returns the named field as a string slice, if it is present and a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Returns a copy of only the user settable fields. The ID and type tag are part of the URL
    /// and response respectively, so they never belong in a request body
    pub(crate) fn params(&self) -> Object {
        Object {
            id: None,
            object: None,
            fields: self.fields.clone(),
        }
    }
}
