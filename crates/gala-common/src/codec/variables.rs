//! Email template variables

use std::collections::BTreeMap;

use crate::fields::REGISTRATION_FIELDS;
use crate::keys::to_camel_case;
use crate::registration::Registration;

/// camelCase variable name → rendered value
pub type Variables = BTreeMap<String, String>;

const EDIT_PATH: &str = "/register/edit?token=";
const ACTIVITIES_PATH: &str = "/activities?token=";

/// Builds the per-registrant self-service links
#[derive(Clone, Debug)]
pub struct RegistrantLinks {
    origin: String,
}

impl RegistrantLinks {
    pub fn new(origin: impl Into<String>) -> Self {
        let origin = origin.into();
        Self { origin: origin.trim_end_matches('/').to_string() }
    }

    pub fn edit_link(&self, token: &str) -> String {
        format!("{}{}{}", self.origin, EDIT_PATH, token)
    }

    pub fn activities_link(&self, token: &str) -> String {
        format!("{}{}{}", self.origin, ACTIVITIES_PATH, token)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct VariableOptions {
    /// Substitute the registrant's own name when no assistant was recorded
    pub assistant_fallback_to_registrant: bool,
}

/// Variable map for one registrant.
///
/// One entry per metadata field (empty string when absent, option lists as
/// labels joined by `", "`), plus `id`, `editLink`, `activitiesLink` and the
/// split assistant name.
pub fn build_variables(
    registration: &Registration,
    links: &RegistrantLinks,
    options: VariableOptions,
) -> Variables {
    let wire = registration.to_wire();
    let mut vars: Variables = REGISTRATION_FIELDS
        .iter()
        .map(|spec| (to_camel_case(spec.key), spec.display(wire.get(spec.key))))
        .collect();

    vars.insert("id".into(), registration.id.to_string());
    vars.insert("editLink".into(), links.edit_link(&registration.edit_token));
    vars.insert("activitiesLink".into(), links.activities_link(&registration.edit_token));

    let (name, first, last) = match registration.assistant() {
        Some(name) => {
            let (first, last) = split_name(name);
            (name.to_string(), first, last)
        }
        None if options.assistant_fallback_to_registrant => (
            format!("{} {}", registration.first_name, registration.last_name),
            registration.first_name.clone(),
            registration.last_name.clone(),
        ),
        None => (String::new(), String::new(), String::new()),
    };
    vars.insert("assistantName".into(), name);
    vars.insert("assistantFirstName".into(), first);
    vars.insert("assistantLastName".into(), last);

    vars
}

/// First whitespace-delimited token, then the (possibly multi-word) rest
fn split_name(name: &str) -> (String, String) {
    let mut parts = name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}
