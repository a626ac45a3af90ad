use std::collections::HashMap;

use serde_json::Value;

/// Reference to a record in the external store: entity logical name plus id.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct RecordRef {
    pub entity: String,
    pub id: String,
}

impl RecordRef {
    pub fn new(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Attribute bag sourced from the external record store. Read-only for this crate;
/// adapters and tests build records, the core only inspects them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    attributes: HashMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute; returns `self` so adapters can chain.
    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(attribute.into(), value.into());
        self
    }

    pub fn set(&mut self, attribute: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(attribute.into(), value.into());
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }

    /// Attribute as text, treating an absent attribute and a null value the same way.
    pub fn text(&self, attribute: &str) -> Option<&str> {
        match self.attributes.get(attribute) {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Whether the attribute is present with a non-null value.
    pub fn has(&self, attribute: &str) -> bool {
        !matches!(self.attributes.get(attribute), None | Some(Value::Null))
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}
