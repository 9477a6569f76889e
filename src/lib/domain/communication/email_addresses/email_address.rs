//! Email Address

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^@\s]*?@[^@\s]*?\.[^@\s]*$").unwrap();
}

/// Separator between entries of an address list
const LIST_SEPARATOR: char = ';';

/// An error that can occur when creating an email address
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmailAddressError {
    /// The email address is empty
    #[error("email is empty")]
    EmptyEmailAddress,

    /// The email address is invalid
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmailAddress(String),
}

/// An email address
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new email address
    pub fn new(raw: &str) -> Result<Self, EmailAddressError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(EmailAddressError::EmptyEmailAddress);
        }

        if !EMAIL_REGEX.is_match(trimmed) {
            return Err(EmailAddressError::InvalidEmailAddress(trimmed.to_string()));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Create a new email address without validation
    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.to_string())
    }

    /// Parses a semicolon-delimited list of addresses.
    ///
    /// Every segment is trimmed and segments left empty are skipped, so
    /// `"a@x.com; b@x.com;"` yields two addresses. An empty or blank input
    /// yields an empty list.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>, EmailAddressError> {
        raw.split(LIST_SEPARATOR)
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(Self::new)
            .collect()
    }

    /// Returns the address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(email: EmailAddress) -> Self {
        email.0
    }
}
