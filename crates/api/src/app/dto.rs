use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use microbank_accounts::customer::{
    validate_account_type, validate_branch_address, validate_name,
};
use microbank_accounts::{AccountDetails, CustomerDetails, NewCustomer};
use microbank_core::{AccountNumber, DomainError, DomainResult, EmailAddress, MobileNumber};

/// Field name -> first validation message for that field.
pub type FieldErrors = BTreeMap<String, String>;

// -------------------------
// Request / response bodies
// -------------------------

/// Customer payload, as accepted by create/update and returned by fetch.
///
/// Every field is optional on the wire so that a missing field turns into a
/// field-level validation error instead of a body rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile_number: Option<String>,
    #[serde(alias = "accountsDto", skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub account_number: Option<u64>,
    pub account_type: Option<String>,
    pub branch_address: Option<String>,
}

/// Success envelope returned by the mutating endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDto {
    pub status_code: String,
    pub status_message: String,
}

impl ResponseDto {
    pub fn new(status_code: &str, status_message: &str) -> Self {
        Self {
            status_code: status_code.to_string(),
            status_message: status_message.to_string(),
        }
    }
}

/// Failure envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponseDto {
    pub api_path: String,
    pub status_code: String,
    pub error_message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub field_errors: FieldErrors,
}

// -------------------------
// Validation into domain types
// -------------------------

fn collect<T>(errors: &mut FieldErrors, result: DomainResult<T>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(DomainError::Validation { field, message }) => {
            errors.entry(field.to_string()).or_insert(message);
            None
        }
        Err(other) => {
            errors.entry("request".to_string()).or_insert(other.to_string());
            None
        }
    }
}

/// Validate a raw path parameter as a mobile number.
pub fn parse_mobile_number(raw: &str) -> Result<MobileNumber, FieldErrors> {
    let mut errors = FieldErrors::new();
    collect(&mut errors, MobileNumber::parse(raw)).ok_or(errors)
}

impl CustomerDto {
    fn customer_fields(&self, errors: &mut FieldErrors) -> Option<(String, EmailAddress, MobileNumber)> {
        let name = collect(errors, validate_name(self.name.as_deref().unwrap_or_default()));
        let email = collect(errors, EmailAddress::parse(self.email.as_deref().unwrap_or_default()));
        let mobile = collect(
            errors,
            MobileNumber::parse(self.mobile_number.as_deref().unwrap_or_default()),
        );
        Some((name?, email?, mobile?))
    }

    /// Validate for `create`. Any account section is ignored; accounts are server-assigned.
    pub fn into_new_customer(self) -> Result<NewCustomer, FieldErrors> {
        let mut errors = FieldErrors::new();
        match self.customer_fields(&mut errors) {
            Some((name, email, mobile_number)) if errors.is_empty() => Ok(NewCustomer {
                name,
                email,
                mobile_number,
            }),
            _ => Err(errors),
        }
    }

    /// Validate for `update`. The account section is optional here; its absence is
    /// reported by the service as an unresolved update, not as a validation error.
    pub fn into_details(self) -> Result<CustomerDetails, FieldErrors> {
        let mut errors = FieldErrors::new();
        let customer = self.customer_fields(&mut errors);
        let account = match &self.account {
            Some(dto) => dto.validate(&mut errors).map(Some),
            None => Some(None),
        };

        match (customer, account) {
            (Some((name, email, mobile_number)), Some(account)) if errors.is_empty() => {
                Ok(CustomerDetails {
                    name,
                    email,
                    mobile_number,
                    account,
                })
            }
            _ => Err(errors),
        }
    }
}

impl AccountDto {
    fn validate(&self, errors: &mut FieldErrors) -> Option<AccountDetails> {
        let number = match self.account_number {
            Some(n) => Some(AccountNumber::new(n)),
            None => {
                errors
                    .entry("accountNumber".to_string())
                    .or_insert_with(|| "AccountNumber can not be a null or empty".to_string());
                None
            }
        };
        let account_type = collect(
            errors,
            validate_account_type(self.account_type.as_deref().unwrap_or_default()),
        );
        let branch_address = collect(
            errors,
            validate_branch_address(self.branch_address.as_deref().unwrap_or_default()),
        );
        Some(AccountDetails {
            account_number: number?,
            account_type: account_type?,
            branch_address: branch_address?,
        })
    }
}

impl From<CustomerDetails> for CustomerDto {
    fn from(details: CustomerDetails) -> Self {
        Self {
            name: Some(details.name),
            email: Some(details.email.into()),
            mobile_number: Some(details.mobile_number.into()),
            account: details.account.map(|a| AccountDto {
                account_number: Some(a.account_number.get()),
                account_type: Some(a.account_type),
                branch_address: Some(a.branch_address),
            }),
        }
    }
}
