//! Email address value object
//!
//! Syntax check shared by form validation and the recipient builder.
//! Keeps the address as typed (trimmed); comparisons ignore case.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(value: impl AsRef<str>) -> Result<Self, EmailError> {
        let value = value.as_ref().trim();
        if value.is_empty() {
            return Err(EmailError::Empty);
        }
        if !is_valid(value) {
            return Err(EmailError::InvalidFormat(value.to_string()));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn domain(&self) -> Option<&str> {
        self.0.rsplit_once('@').map(|(_, d)| d)
    }
}

impl PartialEq for EmailAddress {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// `local@domain.tld` with no whitespace and exactly one `@`
pub fn is_valid(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("invalid email address: {0}")]
    InvalidFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        let email = EmailAddress::parse("  Test@Example.com ").unwrap();
        assert_eq!(email.as_str(), "Test@Example.com");
        assert_eq!(email.domain(), Some("Example.com"));
    }

    #[test]
    fn test_case_insensitive_equality() {
        assert_eq!(
            EmailAddress::parse("Foo@Example.com").unwrap(),
            EmailAddress::parse("foo@example.com").unwrap()
        );
    }

    #[test]
    fn test_invalid_emails() {
        assert!(matches!(EmailAddress::parse(""), Err(EmailError::Empty)));
        for bad in ["invalid", "a@b", "a@@b.com", "@b.com", "a b@c.com", "a@.com", "a@b.com."] {
            assert!(EmailAddress::parse(bad).is_err(), "{bad}");
        }
    }
}
