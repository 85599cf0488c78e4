//! Option catalogs
//!
//! Fixed value→label tables shared by the form schema (rendering options), the
//! CSV export and the email variables (display). Records only ever store the
//! value; the label is re-resolved here on every read.

use serde::{Deserialize, Serialize};

/// One catalog row
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub value: &'static str,
    pub label: &'static str,
}

const fn entry(value: &'static str, label: &'static str) -> CatalogEntry {
    CatalogEntry { value, label }
}

const ACCOMMODATIONS: &[CatalogEntry] = &[
    entry("38978933", "Night 1 - Wednesday, June 10"),
    entry("38978934", "Night 2 - Thursday, June 11"),
    entry("38978935", "Night 3 - Friday, June 12"),
];

const DINNER_ATTENDANCE: &[CatalogEntry] = &[
    entry("welcome_reception", "Welcome Reception - Wednesday"),
    entry("gala_dinner", "Gala Dinner - Thursday"),
    entry("farewell_brunch", "Farewell Brunch - Friday"),
];

const ACTIVITIES: &[CatalogEntry] = &[
    entry("golf", "Golf Tournament"),
    entry("spa", "Spa Afternoon"),
    entry("city_tour", "Guided City Tour"),
    entry("wine_tasting", "Wine Tasting"),
    entry("hiking", "Morning Hike"),
];

const TSHIRT_SIZE: &[CatalogEntry] = &[
    entry("xs", "XS"),
    entry("s", "S"),
    entry("m", "M"),
    entry("l", "L"),
    entry("xl", "XL"),
    entry("xxl", "XXL"),
];

const AIRPORT_TRANSFER: &[CatalogEntry] = &[
    entry("yes", "Yes, please arrange a transfer"),
    entry("no", "No, I will arrange my own transport"),
];

/// Named option catalogs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Catalog {
    Accommodations,
    DinnerAttendance,
    Activities,
    TshirtSize,
    AirportTransfer,
}

impl Catalog {
    /// Catalog rows in display order
    pub fn entries(self) -> &'static [CatalogEntry] {
        match self {
            Self::Accommodations => ACCOMMODATIONS,
            Self::DinnerAttendance => DINNER_ATTENDANCE,
            Self::Activities => ACTIVITIES,
            Self::TshirtSize => TSHIRT_SIZE,
            Self::AirportTransfer => AIRPORT_TRANSFER,
        }
    }

    pub fn label_for(self, value: &str) -> Option<&'static str> {
        label_in(self.entries(), value)
    }

    /// Label for `value`, or the raw value when it is not in the catalog
    pub fn display<'a>(self, value: &'a str) -> &'a str {
        self.label_for(value).unwrap_or(value)
    }

    /// Human-readable rendering of a stored value list
    pub fn display_list(self, values: &[String]) -> String {
        join_labels(self.entries(), values)
    }
}

fn label_in(entries: &'static [CatalogEntry], value: &str) -> Option<&'static str> {
    entries.iter().find(|e| e.value == value).map(|e| e.label)
}

/// Resolve each value through `entries` and join with `", "`.
///
/// Stale or unknown codes pass through as their raw string.
pub fn join_labels(entries: &'static [CatalogEntry], values: &[String]) -> String {
    values
        .iter()
        .map(|v| label_in(entries, v).unwrap_or(v.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}
