//! Admin edit form state

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::CommonResult;
use crate::fields::{field_spec, FieldOrigin, ValueKind, REGISTRATION_FIELDS};
use crate::keys::{to_camel_case, to_snake_case};
use crate::registration::Registration;
use crate::value::FieldValue;

/// Who is editing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditView {
    #[default]
    Registrant,
    Admin,
}

/// Flat camelCase map of every editable field
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminFormState(BTreeMap<String, FieldValue>);

impl AdminFormState {
    pub fn from_registration(registration: &Registration) -> Self {
        let wire = registration.to_wire();
        let fields = REGISTRATION_FIELDS
            .iter()
            .map(|spec| {
                let value = wire.get(spec.key).and_then(FieldValue::from_json).unwrap_or_else(|| {
                    match spec.kind {
                        ValueKind::List(_) => FieldValue::List(Vec::new()),
                        ValueKind::Flag => FieldValue::Flag(false),
                        ValueKind::Text | ValueKind::Code(_) => FieldValue::Text(String::new()),
                    }
                });
                (to_camel_case(spec.key), value)
            })
            .collect();
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    /// Write the state back onto a copy of `registration`.
    ///
    /// Unknown keys are ignored; `adminNotes` only applies in the admin view.
    /// Empty text clears an optional field.
    pub fn apply_to(&self, registration: &Registration, view: EditView) -> CommonResult<Registration> {
        let mut wire = registration.to_wire();
        for (camel, value) in &self.0 {
            let snake = to_snake_case(camel);
            let Some(spec) = field_spec(&snake) else {
                tracing::debug!(key = %camel, "ignoring unknown form key");
                continue;
            };
            if spec.origin == FieldOrigin::Admin && view != EditView::Admin {
                continue;
            }
            let json = match (spec.kind, value) {
                (ValueKind::Text | ValueKind::Code(_), FieldValue::Text(s))
                    if s.is_empty() && !is_mandatory(spec.key) =>
                {
                    Value::Null
                }
                _ => value.to_json(),
            };
            wire.insert(snake, json);
        }
        let updated = Registration::from_wire(wire)?;
        updated.check_required()?;
        Ok(updated)
    }
}

fn is_mandatory(key: &str) -> bool {
    matches!(key, "email" | "first_name" | "last_name")
}
