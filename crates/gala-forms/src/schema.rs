//! Static form schema
//!
//! A tree of steps → groups → fields. Field `name` is the only identity:
//! it keys the data bag, the overlay join and the persisted record.

use gala_common::{Catalog, FieldValue};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::validation::Rule;

/// One `{label, value}` choice
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self { label: label.into(), value: value.into() }
    }

    /// All rows of a catalog, in catalog order
    pub fn from_catalog(catalog: Catalog) -> Vec<Self> {
        catalog.entries().iter().map(|e| Self::new(e.label, e.value)).collect()
    }
}

/// Input type. Only choice inputs carry options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "fieldType", rename_all = "camelCase")]
pub enum FieldKind {
    Text,
    Email,
    Tel,
    Textarea,
    Select { options: Vec<FieldOption> },
    Checkbox,
    CheckboxGroup { options: Vec<FieldOption> },
    Radio { options: Vec<FieldOption> },
}

impl FieldKind {
    pub fn options(&self) -> &[FieldOption] {
        match self {
            Self::Select { options } | Self::CheckboxGroup { options } | Self::Radio { options } => options,
            _ => &[],
        }
    }

    /// Value an absent field is treated as
    pub fn empty_value(&self) -> FieldValue {
        match self {
            Self::CheckboxGroup { .. } => FieldValue::List(Vec::new()),
            Self::Checkbox => FieldValue::Flag(false),
            _ => FieldValue::Text(String::new()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Tel => "tel",
            Self::Textarea => "textarea",
            Self::Select { .. } => "select",
            Self::Checkbox => "checkbox",
            Self::CheckboxGroup { .. } => "checkboxGroup",
            Self::Radio { .. } => "radio",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helper_text: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub hidden: bool,
}

impl FormField {
    fn new(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            label: label.into(),
            placeholder: None,
            helper_text: None,
            required: false,
            hidden: false,
        }
    }

    pub fn text(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub fn email(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Email)
    }

    pub fn tel(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Tel)
    }

    pub fn textarea(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Textarea)
    }

    pub fn checkbox(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Checkbox)
    }

    pub fn select(name: &str, label: &str, catalog: Catalog) -> Self {
        Self::new(name, label, FieldKind::Select { options: FieldOption::from_catalog(catalog) })
    }

    pub fn checkbox_group(name: &str, label: &str, catalog: Catalog) -> Self {
        Self::new(name, label, FieldKind::CheckboxGroup { options: FieldOption::from_catalog(catalog) })
    }

    pub fn radio(name: &str, label: &str, catalog: Catalog) -> Self {
        Self::new(name, label, FieldKind::Radio { options: FieldOption::from_catalog(catalog) })
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn placeholder(mut self, text: &str) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    pub fn helper(mut self, text: &str) -> Self {
        self.helper_text = Some(text.into());
        self
    }
}

/// Stable group identity; overlay sections bind to groups through this only
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupKey {
    PersonalDetails,
    Address,
    Assistant,
    EmergencyContact,
    Travel,
    Accommodations,
    Dining,
    Activities,
    Preferences,
    GuestInformation,
    GuestEventDetails,
}

impl GroupKey {
    /// Overlay section name for this group
    pub fn section_name(self) -> &'static str {
        match self {
            Self::PersonalDetails => "personalDetails",
            Self::Address => "address",
            Self::Assistant => "assistant",
            Self::EmergencyContact => "emergencyContact",
            Self::Travel => "travel",
            Self::Accommodations => "accommodations",
            Self::Dining => "dining",
            Self::Activities => "activities",
            Self::Preferences => "preferences",
            Self::GuestInformation => "guestInformation",
            Self::GuestEventDetails => "guestEventDetails",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldGroup {
    pub key: GroupKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_description: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    /// Render only when one of these fields is non-empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub show_if_field_has_value: Vec<String>,
    pub fields: Vec<FormField>,
}

impl FieldGroup {
    pub fn new(key: GroupKey, fields: Vec<FormField>) -> Self {
        Self {
            key,
            group_title: None,
            group_description: None,
            hidden: false,
            show_if_field_has_value: Vec::new(),
            fields,
        }
    }

    pub fn titled(mut self, title: &str) -> Self {
        self.group_title = Some(title.into());
        self
    }

    pub fn described(mut self, description: &str) -> Self {
        self.group_description = Some(description.into());
        self
    }

    pub fn show_if_any(mut self, names: &[&str]) -> Self {
        self.show_if_field_has_value = names.iter().map(|n| n.to_string()).collect();
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormStep {
    pub title: String,
    pub groups: Vec<FieldGroup>,
}

impl FormStep {
    pub fn new(title: &str, groups: Vec<FieldGroup>) -> Self {
        Self { title: title.into(), groups }
    }

    pub fn fields(&self) -> impl Iterator<Item = &FormField> {
        self.groups.iter().flat_map(|g| g.fields.iter())
    }
}

/// Page copy around the form
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormChrome {
    pub title: String,
    pub subtitle: String,
    pub submit_button_text: String,
    pub next_button_text: String,
    pub back_button_text: String,
    pub success_message: String,
}

impl FormChrome {
    /// Copy used when no CMS content is available
    pub fn fallback() -> Self {
        Self {
            title: "Event Registration".into(),
            subtitle: "Please complete the form below to confirm your attendance.".into(),
            submit_button_text: "Submit Registration".into(),
            next_button_text: "Next".into(),
            back_button_text: "Back".into(),
            success_message: "Thank you for registering! A confirmation email is on its way.".into(),
        }
    }

    /// Fill every empty slot from `defaults`
    pub fn fill_missing(&mut self, defaults: &FormChrome) {
        for (slot, default) in [
            (&mut self.title, &defaults.title),
            (&mut self.subtitle, &defaults.subtitle),
            (&mut self.submit_button_text, &defaults.submit_button_text),
            (&mut self.next_button_text, &defaults.next_button_text),
            (&mut self.back_button_text, &defaults.back_button_text),
            (&mut self.success_message, &defaults.success_message),
        ] {
            if slot.trim().is_empty() {
                slot.clone_from(default);
            }
        }
    }
}

pub const DEFAULT_SUBMIT_ENDPOINT: &str = "/api/registration";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormConfig {
    pub steps: Vec<FormStep>,
    pub chrome: FormChrome,
    pub submit_endpoint: String,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl FormConfig {
    /// Build a config, checking the structural invariants
    pub fn new(
        steps: Vec<FormStep>,
        chrome: FormChrome,
        submit_endpoint: impl Into<String>,
        rules: Vec<Rule>,
    ) -> Result<Self, SchemaError> {
        let config = Self { steps, chrome, submit_endpoint: submit_endpoint.into(), rules };
        config.check()?;
        Ok(config)
    }

    pub fn check(&self) -> Result<(), SchemaError> {
        if self.steps.is_empty() {
            return Err(SchemaError::Empty);
        }
        let mut names = HashSet::new();
        for field in self.fields() {
            if !names.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateFieldName(field.name.clone()));
            }
            let mut values = HashSet::new();
            for option in field.kind.options() {
                if !values.insert(option.value.as_str()) {
                    return Err(SchemaError::DuplicateOptionValue {
                        field: field.name.clone(),
                        value: option.value.clone(),
                    });
                }
            }
        }
        let referenced = self
            .steps
            .iter()
            .flat_map(|s| s.groups.iter())
            .flat_map(|g| g.show_if_field_has_value.iter())
            .chain(self.rules.iter().flat_map(Rule::fields));
        for name in referenced {
            if !names.contains(name.as_str()) {
                return Err(SchemaError::UnknownFieldReference(name.clone()));
            }
        }
        Ok(())
    }

    pub fn fields(&self) -> impl Iterator<Item = &FormField> {
        self.steps.iter().flat_map(FormStep::fields)
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields().find(|f| f.name == name)
    }

    pub fn last_step(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("form has no steps")]
    Empty,
    #[error("duplicate field name: {0}")]
    DuplicateFieldName(String),
    #[error("duplicate option value {value} in field {field}")]
    DuplicateOptionValue { field: String, value: String },
    #[error("reference to unknown field: {0}")]
    UnknownFieldReference(String),
}
