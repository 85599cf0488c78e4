//! Admin table search
//!
//! Narrows the rendered registration table only. Exports always receive the
//! full set.

use crate::registration::Registration;

/// Case-insensitive substring match over names, email and company.
/// A blank query matches everything.
pub fn matches(registration: &Registration, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    let haystacks = [
        Some(registration.first_name.as_str()),
        Some(registration.last_name.as_str()),
        Some(registration.email.as_str()),
        registration.company.as_deref(),
        registration.assistant_name.as_deref(),
        registration.guest_name.as_deref(),
    ];
    let full_name = registration.full_name().to_lowercase();
    full_name.contains(&query)
        || haystacks
            .iter()
            .flatten()
            .any(|h| h.to_lowercase().contains(&query))
}

pub fn filter<'a>(registrations: &'a [Registration], query: &str) -> Vec<&'a Registration> {
    registrations.iter().filter(|r| matches(r, query)).collect()
}
