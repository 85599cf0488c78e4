//! CSV export
//!
//! Every cell is quoted and embedded quotes are doubled. Rows keep the order
//! of the slice they are given; callers hand in the full, unfiltered set.

use chrono::NaiveDate;

use super::variables::RegistrantLinks;
use crate::fields::REGISTRATION_FIELDS;
use crate::registration::Registration;

const LEADING_COLUMNS: [&str; 2] = ["Registration ID", "Submitted At"];
const TRAILING_COLUMNS: [&str; 2] = ["Edit Link", "Activities Link"];

/// `registrations_<YYYY-MM-DD>.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("registrations_{}.csv", date.format("%Y-%m-%d"))
}

pub fn header_row() -> Vec<String> {
    LEADING_COLUMNS
        .iter()
        .copied()
        .chain(REGISTRATION_FIELDS.iter().map(|f| f.header))
        .chain(TRAILING_COLUMNS.iter().copied())
        .map(String::from)
        .collect()
}

pub fn registration_row(registration: &Registration, links: &RegistrantLinks) -> Vec<String> {
    let wire = registration.to_wire();
    let mut row = Vec::with_capacity(REGISTRATION_FIELDS.len() + 4);
    row.push(registration.id.to_string());
    row.push(registration.created_at.to_rfc3339());
    row.extend(REGISTRATION_FIELDS.iter().map(|f| f.display(wire.get(f.key))));
    row.push(links.edit_link(&registration.edit_token));
    row.push(links.activities_link(&registration.edit_token));
    row
}

/// Header plus one line per registration, CRLF-separated as in RFC 4180
pub fn export_csv(registrations: &[Registration], links: &RegistrantLinks) -> String {
    std::iter::once(header_row())
        .chain(registrations.iter().map(|r| registration_row(r, links)))
        .map(|row| row.iter().map(|cell| quote(cell)).collect::<Vec<_>>().join(","))
        .collect::<Vec<_>>()
        .join("\r\n")
}

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}
