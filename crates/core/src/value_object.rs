//! Value objects: validated, immutable, compared by value.
//!
//! Construction goes through `parse`, so holding a `MobileNumber` or an
//! `EmailAddress` means the raw input already passed validation.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

static MOBILE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("static regex should not panic"));

static EMAIL_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex should not panic")
});

pub const MOBILE_NUMBER_MESSAGE: &str = "Mobile number must be 10 digits";
pub const EMAIL_EMPTY_MESSAGE: &str = "Email address can not be a null or empty";
pub const EMAIL_INVALID_MESSAGE: &str = "Email address should be a valid value";

/// A customer's mobile number: exactly ten ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MobileNumber(String);

impl MobileNumber {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        if MOBILE_NUMBER.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(DomainError::validation("mobileNumber", MOBILE_NUMBER_MESSAGE))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for MobileNumber {}

impl TryFrom<String> for MobileNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MobileNumber> for String {
    fn from(value: MobileNumber) -> Self {
        value.0
    }
}

impl core::fmt::Display for MobileNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A syntactically valid email address (`local@domain.tld`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Stored exactly as given; surrounding whitespace makes the address invalid.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        if raw.trim().is_empty() {
            return Err(DomainError::validation("email", EMAIL_EMPTY_MESSAGE));
        }
        if !EMAIL_ADDRESS.is_match(raw) {
            return Err(DomainError::validation("email", EMAIL_INVALID_MESSAGE));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for EmailAddress {}

impl TryFrom<String> for EmailAddress {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl core::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
