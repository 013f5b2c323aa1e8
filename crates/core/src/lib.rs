//! `microbank-core` — domain primitives shared by the accounts service.
//!
//! Pure domain code: identifiers, validated value objects and the error model.
//! No HTTP or storage concerns live here.

pub mod error;
pub mod id;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use id::{AccountNumber, CustomerId};
pub use value_object::{EmailAddress, MobileNumber, ValueObject};
