// Copyright (c) 2025 - Cowboy AI, Inc.
//! Domain Name Value Object with DNS Validation Invariants

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Domain name validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainNameError {
    #[error("Domain name is empty")]
    Empty,

    #[error("Domain name exceeds maximum length of 253 characters: {0}")]
    TooLong(usize),

    #[error("Domain name contains an empty label: {0}")]
    EmptyLabel(String),

    #[error("Label exceeds maximum length of 63 characters: {0}")]
    LabelTooLong(String),

    #[error("Invalid character in domain name: {0}")]
    InvalidCharacter(char),

    #[error("Label cannot start or end with hyphen: {0}")]
    InvalidLabelFormat(String),

    #[error("Top-level label cannot be all numeric: {0}")]
    NumericTopLevel(String),
}

/// Registered DNS name (apex or subdomain)
///
/// Follows RFC 1123 with these invariants:
/// - Total length ≤ 253 characters
/// - Each label ≤ 63 characters of `[a-z0-9-]`
/// - Labels cannot start or end with hyphens
/// - Top-level label cannot be all numeric
///
/// Names are stored lowercase without the trailing root dot. Use
/// [`DomainName::fqdn`] when Route 53 wants the absolute form.
///
/// # Examples
///
/// ```rust
/// use joelito_dev_infrastructure::domain::DomainName;
///
/// let apex = DomainName::new("Joelito.dev.").unwrap();
/// assert_eq!(apex.as_str(), "joelito.dev");
/// assert_eq!(apex.subdomain("www").unwrap().as_str(), "www.joelito.dev");
///
/// assert!(DomainName::new("").is_err());
/// assert!(DomainName::new("-invalid.dev").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainName(String);

impl DomainName {
    /// Maximum total length (RFC 1123)
    pub const MAX_LENGTH: usize = 253;

    /// Maximum length for a single label (RFC 1123)
    pub const MAX_LABEL_LENGTH: usize = 63;

    /// Create a new domain name with validation
    pub fn new(name: impl AsRef<str>) -> Result<Self, DomainNameError> {
        let trimmed = name.as_ref().trim();
        let name = trimmed.strip_suffix('.').unwrap_or(trimmed).to_ascii_lowercase();

        if name.is_empty() {
            return Err(DomainNameError::Empty);
        }

        if name.len() > Self::MAX_LENGTH {
            return Err(DomainNameError::TooLong(name.len()));
        }

        for label in name.split('.') {
            Self::validate_label(label, &name)?;
        }

        if let Some(tld) = name.rsplit('.').next() {
            if tld.chars().all(|c| c.is_ascii_digit()) {
                return Err(DomainNameError::NumericTopLevel(tld.to_string()));
            }
        }

        Ok(Self(name))
    }

    fn validate_label(label: &str, name: &str) -> Result<(), DomainNameError> {
        if label.is_empty() {
            return Err(DomainNameError::EmptyLabel(name.to_string()));
        }

        if label.len() > Self::MAX_LABEL_LENGTH {
            return Err(DomainNameError::LabelTooLong(label.to_string()));
        }

        if let Some(ch) = label
            .chars()
            .find(|ch| !ch.is_ascii_alphanumeric() && *ch != '-')
        {
            return Err(DomainNameError::InvalidCharacter(ch));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(DomainNameError::InvalidLabelFormat(label.to_string()));
        }

        Ok(())
    }

    /// Name as a string slice, without trailing dot
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Absolute form with the trailing root dot (`example.com.`)
    pub fn fqdn(&self) -> String {
        format!("{}.", self.0)
    }

    /// Prepend a single label (`www` → `www.example.com`)
    pub fn subdomain(&self, label: &str) -> Result<Self, DomainNameError> {
        Self::new(format!("{}.{}", label, self.0))
    }

    /// Whether this name is `zone` itself or lies beneath it
    pub fn is_within(&self, zone: &DomainName) -> bool {
        self.0 == zone.0 || self.0.ends_with(&format!(".{}", zone.0))
    }

    /// Record name relative to `zone`; `None` for the apex or for names
    /// outside the zone.
    pub fn relative_to(&self, zone: &DomainName) -> Option<&str> {
        self.0.strip_suffix(&format!(".{}", zone.0))
    }

    /// Certificate-style match against a covered name.
    ///
    /// `pattern` is either an exact name or a wildcard (`*.example.com`)
    /// which matches exactly one extra label.
    pub fn matches(&self, pattern: &str) -> bool {
        let pattern = pattern.trim_end_matches('.').to_ascii_lowercase();
        match pattern.strip_prefix("*.") {
            Some(parent) => self
                .0
                .split_once('.')
                .map(|(_, rest)| rest == parent)
                .unwrap_or(false),
            None => self.0 == pattern,
        }
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DomainName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DomainName {
    type Error = DomainNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for DomainName {
    type Error = DomainNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DomainName> for String {
    fn from(value: DomainName) -> Self {
        value.0
    }
}
