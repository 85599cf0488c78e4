//! Step rendering
//!
//! Produces the view model a UI draws from: visible groups, their visible
//! fields, current values and option lists with selection state.

use gala_common::FieldValue;
use serde::Serialize;

use crate::bag::DataBag;
use crate::schema::{FieldGroup, FieldKind, FormField, FormStep, GroupKey};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedStep {
    pub index: usize,
    pub title: String,
    pub groups: Vec<RenderedGroup>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedGroup {
    pub key: GroupKey,
    pub title: Option<String>,
    pub description: Option<String>,
    pub fields: Vec<RenderedField>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedField {
    pub name: String,
    pub field_type: &'static str,
    pub label: String,
    pub placeholder: Option<String>,
    pub helper_text: Option<String>,
    pub required: bool,
    pub value: FieldValue,
    /// Catalog order, independent of the stored list order
    pub options: Vec<RenderedOption>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderedOption {
    pub label: String,
    pub value: String,
    pub selected: bool,
}

/// Hidden groups never show; conditional groups show when any named field
/// has a non-empty value in the bag.
pub fn group_is_visible(group: &FieldGroup, bag: &DataBag) -> bool {
    !group.hidden
        && (group.show_if_field_has_value.is_empty()
            || group.show_if_field_has_value.iter().any(|name| bag.has_value(name)))
}

/// Fields the user can currently see on `step`
pub fn visible_fields<'a>(step: &'a FormStep, bag: &'a DataBag) -> impl Iterator<Item = &'a FormField> + 'a {
    step.groups
        .iter()
        .filter(move |g| group_is_visible(g, bag))
        .flat_map(|g| g.fields.iter())
        .filter(|f| !f.hidden)
}

pub fn render_step(index: usize, step: &FormStep, bag: &DataBag) -> RenderedStep {
    let groups = step
        .groups
        .iter()
        .filter(|g| group_is_visible(g, bag))
        .map(|g| RenderedGroup {
            key: g.key,
            title: g.group_title.clone(),
            description: g.group_description.clone(),
            fields: g.fields.iter().filter(|f| !f.hidden).map(|f| render_field(f, bag)).collect(),
        })
        .collect();
    RenderedStep { index, title: step.title.clone(), groups }
}

fn render_field(field: &FormField, bag: &DataBag) -> RenderedField {
    let value = bag.value_for(field);
    let options = field
        .kind
        .options()
        .iter()
        .map(|o| RenderedOption {
            label: o.label.clone(),
            value: o.value.clone(),
            selected: match (&field.kind, &value) {
                (FieldKind::CheckboxGroup { .. }, v) => v.as_list().contains(&o.value),
                (_, FieldValue::Text(current)) => *current == o.value,
                _ => false,
            },
        })
        .collect();
    RenderedField {
        name: field.name.clone(),
        field_type: field.kind.type_name(),
        label: field.label.clone(),
        placeholder: field.placeholder.clone(),
        helper_text: field.helper_text.clone(),
        required: field.required,
        value,
        options,
    }
}
