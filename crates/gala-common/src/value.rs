//! Field values as they travel through the data bag and the admin form state

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single answer: free text, a checkbox flag, or a checkbox-group list
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    List(Vec<String>),
    Text(String),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Lenient conversion from arbitrary JSON.
    ///
    /// `null` and objects have no field representation and yield `None`;
    /// numbers become text; list items that are not strings are stringified.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null | Value::Object(_) => None,
            Value::Bool(b) => Some(Self::Flag(*b)),
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Number(n) => Some(Self::Text(n.to_string())),
            Value::Array(items) => Some(Self::List(
                items
                    .iter()
                    .filter(|v| !v.is_null())
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            )),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Flag(b) => Value::Bool(*b),
            Self::List(items) => Value::Array(items.iter().cloned().map(Value::String).collect()),
            Self::Text(s) => Value::String(s.clone()),
        }
    }

    /// Empty string (after trimming), empty list, or `false`
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Flag(b) => !b,
            Self::List(items) => items.is_empty(),
            Self::Text(s) => s.trim().is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// List items, or an empty slice for non-list values
    pub fn as_list(&self) -> &[String] {
        match self {
            Self::List(items) => items,
            _ => &[],
        }
    }

    pub fn as_flag(&self) -> bool {
        matches!(self, Self::Flag(true))
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_is_lenient() {
        assert_eq!(FieldValue::from_json(&json!(null)), None);
        assert_eq!(FieldValue::from_json(&json!({"a": 1})), None);
        assert_eq!(FieldValue::from_json(&json!(42)), Some(FieldValue::text("42")));
        assert_eq!(
            FieldValue::from_json(&json!(["a", 7, null])),
            Some(FieldValue::list(["a", "7"]))
        );
    }

    #[test]
    fn test_untagged_deserialize() {
        let v: FieldValue = serde_json::from_value(json!(["x"])).unwrap();
        assert_eq!(v, FieldValue::list(["x"]));
        let v: FieldValue = serde_json::from_value(json!(true)).unwrap();
        assert_eq!(v, FieldValue::Flag(true));
    }

    #[test]
    fn test_blankness() {
        assert!(FieldValue::text("   ").is_blank());
        assert!(FieldValue::List(vec![]).is_blank());
        assert!(FieldValue::Flag(false).is_blank());
        assert!(!FieldValue::text("x").is_blank());
    }
}
