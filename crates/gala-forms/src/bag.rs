//! Data bag: the in-progress answers of one form session

use gala_common::FieldValue;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::schema::FormField;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataBag(BTreeMap<String, FieldValue>);

impl DataBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lenient read of a JSON object; `null` entries are dropped and any
    /// non-object document yields an empty bag.
    pub fn from_json(value: &Value) -> Self {
        let Some(entries) = value.as_object() else {
            return Self::default();
        };
        Self(
            entries
                .iter()
                .filter_map(|(k, v)| FieldValue::from_json(v).map(|fv| (k.clone(), fv)))
                .collect(),
        )
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.0.iter().map(|(k, v)| (k.clone(), v.to_json())).collect::<Map<_, _>>())
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    /// Stored value, or the field type's empty value when absent
    pub fn value_for(&self, field: &FormField) -> FieldValue {
        self.0.get(&field.name).cloned().unwrap_or_else(|| field.kind.empty_value())
    }

    pub fn has_value(&self, name: &str) -> bool {
        self.0.get(name).is_some_and(|v| !v.is_blank())
    }

    /// Upsert; no validation
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Checkbox-group toggle.
    ///
    /// ON appends `option` when absent; OFF removes every occurrence.
    /// The stored list keeps insertion order.
    pub fn toggle(&mut self, name: &str, option: &str, on: bool) {
        let mut items = self.0.get(name).map(|v| v.as_list().to_vec()).unwrap_or_default();
        if on {
            if !items.iter().any(|i| i == option) {
                items.push(option.to_string());
            }
        } else {
            items.retain(|i| i != option);
        }
        self.0.insert(name.to_string(), FieldValue::List(items));
    }

    /// Copy holding only the named keys
    pub fn subset<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Self {
        Self(
            names
                .into_iter()
                .filter_map(|n| self.0.get(n).map(|v| (n.to_string(), v.clone())))
                .collect(),
        )
    }

    pub fn as_map(&self) -> &BTreeMap<String, FieldValue> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, FieldValue>> for DataBag {
    fn from(map: BTreeMap<String, FieldValue>) -> Self {
        Self(map)
    }
}
