//! Recipient lists for the email composer
//!
//! One [`RecipientList`] per To/Cc/Bcc line. Predefined entries name a role
//! that the server expands per registration; custom entries are literal
//! addresses. Duplicates of either kind are dropped silently.

use gala_common::{EmailAddress, EmailError};
use serde::{Deserialize, Serialize};

/// Role-based recipient, resolved against each registration at send time
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredefinedRecipient {
    Registrant,
    Assistant,
    Guest,
}

impl PredefinedRecipient {
    pub const ALL: [Self; 3] = [Self::Registrant, Self::Assistant, Self::Guest];

    pub fn label(self) -> &'static str {
        match self {
            Self::Registrant => "Registrant",
            Self::Assistant => "Assistant",
            Self::Guest => "Guest",
        }
    }

    /// Case-insensitive match on the role name
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|r| r.label().eq_ignore_ascii_case(name))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum RecipientEntry {
    Predefined(PredefinedRecipient),
    Custom(EmailAddress),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecipientError {
    #[error("{0}")]
    InvalidEmail(#[from] EmailError),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecipientList {
    entries: Vec<RecipientEntry>,
}

impl RecipientList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[RecipientEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns false when the role is already on the list
    pub fn add_predefined(&mut self, recipient: PredefinedRecipient) -> bool {
        self.push(RecipientEntry::Predefined(recipient))
    }

    /// Returns false when the address (ignoring case) is already on the list
    pub fn add_custom(&mut self, address: &str) -> Result<bool, RecipientError> {
        let address = EmailAddress::parse(address)?;
        Ok(self.push(RecipientEntry::Custom(address)))
    }

    fn push(&mut self, entry: RecipientEntry) -> bool {
        if self.entries.contains(&entry) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Confirm typed input (Enter, comma, Tab or click). Comma-separated
    /// addresses are accepted together; if any is invalid nothing is added
    /// and the input should stay in the box.
    pub fn commit_input(&mut self, input: &str) -> Result<usize, RecipientError> {
        let addresses = input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(EmailAddress::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(addresses
            .into_iter()
            .filter(|a| self.push(RecipientEntry::Custom(a.clone())))
            .count())
    }

    /// Backspace on an empty input
    pub fn pop_last(&mut self) -> Option<RecipientEntry> {
        self.entries.pop()
    }

    pub fn remove(&mut self, entry: &RecipientEntry) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e != entry);
        self.entries.len() != before
    }

    /// Dropdown suggestions: roles not yet chosen whose label matches `filter`
    pub fn available_predefined(&self, filter: &str) -> Vec<PredefinedRecipient> {
        let filter = filter.trim().to_lowercase();
        PredefinedRecipient::ALL
            .into_iter()
            .filter(|p| !self.entries.contains(&RecipientEntry::Predefined(*p)))
            .filter(|p| p.label().to_lowercase().contains(&filter))
            .collect()
    }

    /// Wire form sent to the bulk endpoint
    pub fn flatten(&self) -> RecipientSet {
        let mut set = RecipientSet::default();
        for entry in &self.entries {
            match entry {
                RecipientEntry::Predefined(p) => set.predefined.push(*p),
                RecipientEntry::Custom(a) => set.custom.push(a.as_str().to_string()),
            }
        }
        set
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipientSet {
    pub predefined: Vec<PredefinedRecipient>,
    pub custom: Vec<String>,
}

impl RecipientSet {
    pub fn is_empty(&self) -> bool {
        self.predefined.is_empty() && self.custom.is_empty()
    }

    pub fn mentions(&self, recipient: PredefinedRecipient) -> bool {
        self.predefined.contains(&recipient)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipientFields {
    pub to: RecipientSet,
    pub cc: RecipientSet,
    pub bcc: RecipientSet,
}

impl RecipientFields {
    pub fn mentions(&self, recipient: PredefinedRecipient) -> bool {
        [&self.to, &self.cc, &self.bcc].iter().any(|s| s.mentions(recipient))
    }
}
