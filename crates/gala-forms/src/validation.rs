//! Declarative validation
//!
//! Rules run against the resolved config and the bag before a step advances
//! and before submission. Fields inside hidden or gated-off groups, and
//! hidden fields, are never checked.

use gala_common::email;
use serde::{Deserialize, Serialize};

use crate::bag::DataBag;
use crate::render::visible_fields;
use crate::schema::{FieldKind, FormConfig, FormField, FormStep};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "camelCase")]
pub enum Rule {
    Required { field: String },
    EmailFormat { field: String },
    /// `field` must be filled when any of `when` is filled
    RequiredWith { field: String, when: Vec<String> },
}

impl Rule {
    /// Every field name the rule mentions
    pub fn fields(&self) -> Vec<&String> {
        match self {
            Self::Required { field } | Self::EmailFormat { field } => vec![field],
            Self::RequiredWith { field, when } => std::iter::once(field).chain(when.iter()).collect(),
        }
    }

    fn target(&self) -> &str {
        match self {
            Self::Required { field } | Self::EmailFormat { field } | Self::RequiredWith { field, .. } => field,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

/// Rules implied by field definitions plus the config's declared rules
pub fn rules_for(config: &FormConfig) -> Vec<Rule> {
    let mut rules = Vec::new();
    for field in config.fields() {
        if field.required {
            rules.push(Rule::Required { field: field.name.clone() });
        }
        if matches!(field.kind, FieldKind::Email) {
            rules.push(Rule::EmailFormat { field: field.name.clone() });
        }
    }
    rules.extend(config.rules.iter().cloned());
    rules
}

pub fn validate_step(config: &FormConfig, index: usize, bag: &DataBag) -> Vec<ValidationIssue> {
    match config.steps.get(index) {
        Some(step) => check_step(config, step, bag),
        None => Vec::new(),
    }
}

/// Every step, in order
pub fn validate_all(config: &FormConfig, bag: &DataBag) -> Vec<ValidationIssue> {
    config.steps.iter().flat_map(|step| check_step(config, step, bag)).collect()
}

fn check_step(config: &FormConfig, step: &FormStep, bag: &DataBag) -> Vec<ValidationIssue> {
    let visible: Vec<&FormField> = visible_fields(step, bag).collect();
    rules_for(config)
        .iter()
        .filter_map(|rule| {
            let field = visible.iter().find(|f| f.name == rule.target())?;
            check(rule, field, config, bag)
        })
        .collect()
}

fn check(rule: &Rule, field: &FormField, config: &FormConfig, bag: &DataBag) -> Option<ValidationIssue> {
    let issue = |message: String| Some(ValidationIssue { field: field.name.clone(), message });
    match rule {
        Rule::Required { .. } if !bag.has_value(&field.name) => issue(format!("{} is required", field.label)),
        Rule::EmailFormat { .. } => {
            let value = bag.get(&field.name).and_then(|v| v.as_text()).unwrap_or("").trim();
            if !value.is_empty() && !email::is_valid(value) {
                issue(format!("{} must be a valid email address", field.label))
            } else {
                None
            }
        }
        Rule::RequiredWith { when, .. } if !bag.has_value(&field.name) => {
            let trigger = when.iter().find(|name| bag.has_value(name) && is_visible(config, name, bag))?;
            let trigger_label = config.field(trigger).map(|f| f.label.as_str()).unwrap_or(trigger);
            issue(format!("{} is required when {} is provided", field.label, trigger_label))
        }
        _ => None,
    }
}

/// Whether `name` renders on any step given the current answers
fn is_visible(config: &FormConfig, name: &str, bag: &DataBag) -> bool {
    config.steps.iter().any(|step| visible_fields(step, bag).any(|f| f.name == name))
}
