//! Content overlay
//!
//! CMS-sourced copy and visibility overrides, merged onto a fresh copy of the
//! static form. The overlay can only change display text and visibility; it
//! never adds, removes or reorders steps, groups, fields or options.
//!
//! Field overrides join through [`FIELD_OVERLAY_PATHS`]; group overrides join
//! through [`GroupKey::section_name`](crate::schema::GroupKey::section_name).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::schema::{FieldGroup, FormChrome, FormConfig, FormField};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentOverlay {
    #[serde(deserialize_with = "lenient::string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub subtitle: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub submit_button_text: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub next_button_text: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub back_button_text: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub success_message: Option<String>,
    #[serde(deserialize_with = "lenient::map")]
    pub sections: BTreeMap<String, SectionOverlay>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionOverlay {
    #[serde(deserialize_with = "lenient::string")]
    pub group_title: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub group_description: Option<String>,
    #[serde(deserialize_with = "lenient::flag")]
    pub hidden: Option<bool>,
    #[serde(deserialize_with = "lenient::map")]
    pub fields: BTreeMap<String, FieldOverlay>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldOverlay {
    #[serde(deserialize_with = "lenient::string")]
    pub label: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub placeholder: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub helper_text: Option<String>,
    #[serde(deserialize_with = "lenient::flag")]
    pub hidden: Option<bool>,
}

impl ContentOverlay {
    /// Parse a CMS document. Wrongly typed values read as absent; a document
    /// that is not an object reads as an empty overlay.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "content overlay is not an object, ignoring");
            Self::default()
        })
    }

    fn field(&self, name: &str) -> Option<&FieldOverlay> {
        let (_, section, leaf) = FIELD_OVERLAY_PATHS.iter().find(|(field, _, _)| *field == name)?;
        self.sections.get(*section)?.fields.get(*leaf)
    }
}

/// field name → (overlay section, leaf key)
pub const FIELD_OVERLAY_PATHS: &[(&str, &str, &str)] = &[
    ("email", "personalDetails", "email"),
    ("first_name", "personalDetails", "firstName"),
    ("last_name", "personalDetails", "lastName"),
    ("title", "personalDetails", "jobTitle"),
    ("company", "personalDetails", "company"),
    ("phone", "personalDetails", "phone"),
    ("mobile_phone", "personalDetails", "mobilePhone"),
    ("address_line1", "address", "line1"),
    ("address_line2", "address", "line2"),
    ("city", "address", "city"),
    ("state", "address", "state"),
    ("postal_code", "address", "postalCode"),
    ("country", "address", "country"),
    ("assistant_name", "assistant", "name"),
    ("assistant_email", "assistant", "email"),
    ("assistant_phone", "assistant", "phone"),
    ("emergency_contact_name", "emergencyContact", "name"),
    ("emergency_contact_phone", "emergencyContact", "phone"),
    ("emergency_contact_relationship", "emergencyContact", "relationship"),
    ("arrival_date", "travel", "arrivalDate"),
    ("departure_date", "travel", "departureDate"),
    ("airport_transfer", "travel", "airportTransfer"),
    ("accommodations", "accommodations", "nights"),
    ("dinner_attendance", "dining", "dinners"),
    ("dietary_restrictions", "dining", "dietaryRestrictions"),
    ("activities", "activities", "activities"),
    ("tshirt_size", "activities", "tshirtSize"),
    ("photo_consent", "preferences", "photoConsent"),
    ("special_requests", "preferences", "specialRequests"),
    ("guest_name", "guestInformation", "name"),
    ("guest_email", "guestInformation", "email"),
    ("guest_dietary_restrictions", "guestInformation", "dietaryRestrictions"),
    ("guest_dinner_attendance", "guestEventDetails", "dinners"),
    ("guest_activities", "guestEventDetails", "activities"),
];

/// Resolve the form for one request.
///
/// `None` yields the static structure with the default chrome filled in.
pub fn merge(base: &FormConfig, overlay: Option<&ContentOverlay>) -> FormConfig {
    let mut resolved = base.clone();
    resolved.chrome.fill_missing(&FormChrome::fallback());

    let Some(overlay) = overlay else {
        return resolved;
    };

    let chrome = &mut resolved.chrome;
    for (slot, value) in [
        (&mut chrome.title, &overlay.title),
        (&mut chrome.subtitle, &overlay.subtitle),
        (&mut chrome.submit_button_text, &overlay.submit_button_text),
        (&mut chrome.next_button_text, &overlay.next_button_text),
        (&mut chrome.back_button_text, &overlay.back_button_text),
        (&mut chrome.success_message, &overlay.success_message),
    ] {
        if let Some(text) = non_empty(value) {
            *slot = text;
        }
    }

    for group in resolved.steps.iter_mut().flat_map(|s| s.groups.iter_mut()) {
        match overlay.sections.get(group.key.section_name()) {
            Some(section) => apply_group(group, section),
            None => tracing::debug!(section = group.key.section_name(), "no overlay section"),
        }
        for field in group.fields.iter_mut() {
            if let Some(field_overlay) = overlay.field(&field.name) {
                apply_field(field, field_overlay);
            }
        }
    }
    resolved
}

fn apply_group(group: &mut FieldGroup, section: &SectionOverlay) {
    if let Some(title) = non_empty(&section.group_title) {
        group.group_title = Some(title);
    }
    if let Some(description) = non_empty(&section.group_description) {
        group.group_description = Some(description);
    }
    // Groups can be hidden by content, never re-shown.
    if section.hidden == Some(true) {
        group.hidden = true;
    }
}

fn apply_field(field: &mut FormField, overlay: &FieldOverlay) {
    if let Some(label) = non_empty(&overlay.label) {
        field.label = label;
    }
    if let Some(placeholder) = non_empty(&overlay.placeholder) {
        field.placeholder = Some(placeholder);
    }
    if let Some(helper) = non_empty(&overlay.helper_text) {
        field.helper_text = Some(helper);
    }
    if let Some(hidden) = overlay.hidden {
        field.hidden = hidden;
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::collections::BTreeMap;

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(Value::deserialize(d)?.as_str().map(str::to_owned))
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(Value::deserialize(d)?.as_bool())
    }

    /// Keeps the entries that parse, drops the rest
    pub fn map<'de, D, T>(d: D) -> Result<BTreeMap<String, T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let Value::Object(entries) = Value::deserialize(d)? else {
            return Ok(BTreeMap::new());
        };
        Ok(entries
            .into_iter()
            .filter_map(|(key, value)| match serde_json::from_value(value) {
                Ok(parsed) => Some((key, parsed)),
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "skipping malformed overlay entry");
                    None
                }
            })
            .collect())
    }
}

/// CMS port
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Current overlay document, if the CMS has one
    async fn fetch_overlay(&self) -> Result<Option<ContentOverlay>, ContentError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("content unavailable: {0}")]
    Unavailable(String),
    #[error("content is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Fixed overlay (or none), for tests and offline mode
#[derive(Clone, Debug, Default)]
pub struct StaticContent(Option<ContentOverlay>);

impl StaticContent {
    pub fn new(overlay: Option<ContentOverlay>) -> Self {
        Self(overlay)
    }
}

#[async_trait]
impl ContentSource for StaticContent {
    async fn fetch_overlay(&self) -> Result<Option<ContentOverlay>, ContentError> {
        Ok(self.0.clone())
    }
}

/// JSON document on disk, re-read on every fetch so edits apply without a restart
#[derive(Clone, Debug)]
pub struct FileContent {
    path: PathBuf,
}

impl FileContent {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ContentSource for FileContent {
    async fn fetch_overlay(&self) -> Result<Option<ContentOverlay>, ContentError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(ContentError::Unavailable(err.to_string())),
        };
        let value: Value = serde_json::from_str(&raw)?;
        Ok(Some(ContentOverlay::from_value(value)))
    }
}

/// Fetch the overlay and merge it; any fetch failure falls back to the
/// static copy.
pub async fn resolve(base: &FormConfig, source: &dyn ContentSource) -> FormConfig {
    let overlay = match source.fetch_overlay().await {
        Ok(overlay) => overlay,
        Err(err) => {
            tracing::warn!(error = %err, "content fetch failed, using static form copy");
            None
        }
    };
    merge(base, overlay.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration_form::registration_form;
    use crate::schema::{FieldOption, GroupKey};
    use proptest::prelude::*;
    use serde_json::json;

    fn structure(config: &FormConfig) -> Vec<(GroupKey, Vec<(String, Vec<FieldOption>)>)> {
        config
            .steps
            .iter()
            .flat_map(|s| s.groups.iter())
            .map(|g| (g.key, g.fields.iter().map(|f| (f.name.clone(), f.kind.options().to_vec())).collect()))
            .collect()
    }

    fn overlay(doc: Value) -> ContentOverlay {
        ContentOverlay::from_value(doc)
    }

    #[test]
    fn test_null_overlay_keeps_structure() {
        let base = registration_form().unwrap();
        let resolved = merge(&base, None);
        assert_eq!(resolved.steps, base.steps);
        assert_eq!(resolved.chrome, FormChrome::fallback());
    }

    #[test]
    fn test_field_text_overrides() {
        let base = registration_form().unwrap();
        let doc = overlay(json!({
            "sections": {
                "personalDetails": {
                    "fields": {
                        "firstName": {"label": "Given Name", "placeholder": "", "helperText": "As on your passport"},
                        "jobTitle": {"label": "Role"}
                    }
                }
            }
        }));
        let resolved = merge(&base, Some(&doc));
        let first = resolved.field("first_name").unwrap();
        assert_eq!(first.label, "Given Name");
        assert_eq!(first.placeholder, None);
        assert_eq!(first.helper_text.as_deref(), Some("As on your passport"));
        assert_eq!(resolved.field("title").unwrap().label, "Role");
        // the static copy is untouched
        assert_eq!(base.field("first_name").unwrap().label, "First Name");
    }

    #[test]
    fn test_field_hidden_is_bidirectional() {
        let mut base = registration_form().unwrap();
        base.steps[0].groups[0].fields[3].hidden = true;
        let doc = overlay(json!({
            "sections": {
                "personalDetails": {"fields": {"jobTitle": {"hidden": false}, "company": {"hidden": true}}}
            }
        }));
        let resolved = merge(&base, Some(&doc));
        assert!(!resolved.field("title").unwrap().hidden);
        assert!(resolved.field("company").unwrap().hidden);
    }

    #[test]
    fn test_group_hidden_is_hide_only() {
        let mut base = registration_form().unwrap();
        base.steps[0].groups[2].hidden = true;
        let doc = overlay(json!({
            "sections": {
                "assistant": {"hidden": false, "groupTitle": "Assistant"},
                "address": {"hidden": true, "groupDescription": "Where should we ship your welcome kit?"}
            }
        }));
        let resolved = merge(&base, Some(&doc));
        let groups = &resolved.steps[0].groups;
        assert!(groups[2].hidden);
        assert_eq!(groups[2].group_title.as_deref(), Some("Assistant"));
        assert!(groups[1].hidden);
        assert_eq!(
            groups[1].group_description.as_deref(),
            Some("Where should we ship your welcome kit?")
        );
    }

    #[test]
    fn test_chrome_overrides_only_non_empty() {
        let base = registration_form().unwrap();
        let doc = overlay(json!({"title": "Leadership Summit 2026", "successMessage": "  "}));
        let resolved = merge(&base, Some(&doc));
        assert_eq!(resolved.chrome.title, "Leadership Summit 2026");
        assert_eq!(resolved.chrome.success_message, FormChrome::fallback().success_message);
    }

    #[test]
    fn test_malformed_overlay_is_lenient() {
        let base = registration_form().unwrap();
        let doc = overlay(json!({
            "title": 42,
            "sections": {
                "personalDetails": "oops",
                "address": {"hidden": "yes", "fields": {"city": {"label": ["Town"]}, "country": {"label": "Nation"}}},
                "unknownSection": {"groupTitle": "Nobody reads this"}
            }
        }));
        let resolved = merge(&base, Some(&doc));
        assert_eq!(resolved.chrome.title, FormChrome::fallback().title);
        assert!(!resolved.steps[0].groups[1].hidden);
        assert_eq!(resolved.field("city").unwrap().label, "City");
        assert_eq!(resolved.field("country").unwrap().label, "Nation");
        assert_eq!(structure(&resolved), structure(&base));

        assert_eq!(overlay(json!([1, 2, 3])), ContentOverlay::default());
    }

    #[test]
    fn test_every_form_field_has_an_overlay_path() {
        let base = registration_form().unwrap();
        for field in base.fields() {
            assert!(
                FIELD_OVERLAY_PATHS.iter().any(|(name, _, _)| *name == field.name),
                "{} has no overlay path",
                field.name
            );
        }
    }

    #[tokio::test]
    async fn test_resolve_falls_back_on_missing_file() {
        let base = registration_form().unwrap();
        let source = FileContent::new("/nonexistent/gala/content.json");
        assert_eq!(resolve(&base, &source).await, merge(&base, None));
    }

    #[tokio::test]
    async fn test_resolve_with_static_content() {
        let base = registration_form().unwrap();
        let source = StaticContent::new(Some(overlay(json!({"subtitle": "June 10-12, Lisbon"}))));
        assert_eq!(resolve(&base, &source).await.chrome.subtitle, "June 10-12, Lisbon");
    }

    fn arb_field_overlay() -> impl Strategy<Value = Value> {
        (
            proptest::option::of("[A-Za-z ]{0,12}"),
            proptest::option::of("[A-Za-z ]{0,12}"),
            proptest::option::of(any::<bool>()),
        )
            .prop_map(|(label, placeholder, hidden)| json!({"label": label, "placeholder": placeholder, "hidden": hidden}))
    }

    proptest! {
        #[test]
        fn merge_never_changes_names_order_or_options(
            picks in proptest::collection::vec((0..FIELD_OVERLAY_PATHS.len(), arb_field_overlay()), 0..20),
            hide_sections in proptest::collection::vec(any::<bool>(), 11),
        ) {
            let base = registration_form().unwrap();
            let mut sections = serde_json::Map::new();
            for (i, key) in [
                "personalDetails", "address", "assistant", "emergencyContact", "travel", "accommodations",
                "dining", "activities", "preferences", "guestInformation", "guestEventDetails",
            ].iter().enumerate() {
                sections.insert(key.to_string(), json!({"hidden": hide_sections[i], "fields": {}}));
            }
            for (index, field_doc) in picks {
                let (_, section, leaf) = FIELD_OVERLAY_PATHS[index];
                sections[section]["fields"][leaf] = field_doc;
            }
            let doc = overlay(json!({"sections": sections}));
            let resolved = merge(&base, Some(&doc));
            prop_assert_eq!(structure(&resolved), structure(&base));
            prop_assert_eq!(resolved.steps.len(), base.steps.len());
            prop_assert_eq!(&resolved.submit_endpoint, &base.submit_endpoint);
        }
    }
}
