//! Registration record
//!
//! The persisted entity. Serialized with snake_case keys, which is the one
//! canonical wire shape; camelCase consumers go through [`crate::keys`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::{CommonError, CommonResult};
use crate::fields::{field_spec, FieldOrigin};
use crate::value::FieldValue;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Registration {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub edit_token: String,

    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub mobile_phone: Option<String>,

    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,

    pub assistant_name: Option<String>,
    pub assistant_email: Option<String>,
    pub assistant_phone: Option<String>,

    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub emergency_contact_relationship: Option<String>,

    pub arrival_date: Option<String>,
    pub departure_date: Option<String>,
    pub airport_transfer: Option<String>,
    pub accommodations: Vec<String>,
    pub dinner_attendance: Vec<String>,
    pub dietary_restrictions: Option<String>,
    pub activities: Vec<String>,
    pub tshirt_size: Option<String>,
    pub photo_consent: bool,
    pub special_requests: Option<String>,

    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub guest_dietary_restrictions: Option<String>,
    pub guest_dinner_attendance: Vec<String>,
    pub guest_activities: Vec<String>,

    pub admin_notes: Option<String>,
}

/// Fresh opaque token used for registrant self-service links
pub fn new_edit_token() -> String {
    Uuid::new_v4().simple().to_string()
}

impl Registration {
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            edit_token: new_edit_token(),
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Self::default()
        }
    }

    /// Build a new record from a submitted data bag.
    ///
    /// Only keys the form is allowed to write are taken; anything else in the
    /// bag (admin fields, stale or unknown keys) is ignored.
    pub fn from_submission(bag: &BTreeMap<String, FieldValue>) -> CommonResult<Self> {
        let mut wire = Map::new();
        for (key, value) in bag {
            match field_spec(key) {
                Some(spec) if spec.origin == FieldOrigin::Form => {
                    wire.insert(key.clone(), value.to_json());
                }
                _ => tracing::debug!(key = %key, "ignoring submitted key"),
            }
        }
        let mut registration = Self::from_wire(wire)?;
        registration.id = Uuid::new_v4();
        registration.created_at = Utc::now();
        registration.updated_at = None;
        registration.edit_token = new_edit_token();
        registration.check_required()?;
        Ok(registration)
    }

    /// Deserialize from a snake_case key map, naming the offending field on failure
    pub fn from_wire(wire: Map<String, Value>) -> CommonResult<Self> {
        let registration = serde_json::from_value(Value::Object(wire.clone()));
        match registration {
            Ok(r) => Ok(r),
            Err(err) => {
                // Re-run per key to report which field had the wrong shape.
                for (key, value) in wire {
                    let mut single = Map::new();
                    single.insert(key.clone(), value);
                    if let Err(e) = serde_json::from_value::<Self>(Value::Object(single)) {
                        return Err(CommonError::InvalidValue { field: key, reason: e.to_string() });
                    }
                }
                Err(err.into())
            }
        }
    }

    /// Snake_case key map of every field
    pub fn to_wire(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    pub fn check_required(&self) -> CommonResult<()> {
        for (name, value) in [
            ("email", &self.email),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
        ] {
            if value.trim().is_empty() {
                return Err(CommonError::MissingField(name.into()));
            }
        }
        Ok(())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// Recorded assistant name, if any
    pub fn assistant(&self) -> Option<&str> {
        self.assistant_name.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Replace every mutable field with `incoming`'s.
    ///
    /// Identity (`id`, `created_at`, `edit_token`) never changes. `admin_notes`
    /// is only taken when `include_admin_notes` is set. No version check is
    /// performed: the last write wins.
    pub fn apply_update(&mut self, incoming: Registration, include_admin_notes: bool) {
        let admin_notes = if include_admin_notes {
            incoming.admin_notes.clone()
        } else {
            self.admin_notes.take()
        };
        *self = Registration {
            id: self.id,
            created_at: self.created_at,
            edit_token: std::mem::take(&mut self.edit_token),
            updated_at: Some(Utc::now()),
            admin_notes,
            ..incoming
        };
    }
}
