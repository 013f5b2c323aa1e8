use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use microbank_core::{AccountNumber, CustomerId, DomainError, DomainResult, EmailAddress, MobileNumber};

/// Account type given to every account opened through `create`.
pub const DEFAULT_ACCOUNT_TYPE: &str = "Savings";

/// Branch every account opened through `create` is attached to.
pub const DEFAULT_BRANCH_ADDRESS: &str = "123 Main Street, New York";

/// Actor recorded in audit columns for changes made by this service.
pub const AUDIT_ACTOR: &str = "ACCOUNTS_MS";

/// Creation / last-modification stamps kept on stored records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditInfo {
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
}

impl AuditInfo {
    pub fn created(at: DateTime<Utc>, by: &str) -> Self {
        Self {
            created_at: at,
            created_by: by.to_string(),
            updated_at: None,
            updated_by: None,
        }
    }

    pub fn touch(&mut self, at: DateTime<Utc>, by: &str) {
        self.updated_at = Some(at);
        self.updated_by = Some(by.to_string());
    }
}

/// Stored customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub name: String,
    pub email: EmailAddress,
    pub mobile_number: MobileNumber,
    pub audit: AuditInfo,
}

/// Stored account record. Always owned by exactly one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub account_number: AccountNumber,
    pub customer_id: CustomerId,
    pub account_type: String,
    pub branch_address: String,
    pub audit: AuditInfo,
}

/// Input of `create`: the customer half only, the account is server-assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub email: EmailAddress,
    pub mobile_number: MobileNumber,
}

/// Account fields as seen by callers of the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDetails {
    pub account_number: AccountNumber,
    pub account_type: String,
    pub branch_address: String,
}

/// Customer together with its account, as returned by `fetch` and accepted by `update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub email: EmailAddress,
    pub mobile_number: MobileNumber,
    pub account: Option<AccountDetails>,
}

impl CustomerDetails {
    pub fn from_records(customer: &Customer, account: Option<&Account>) -> Self {
        Self {
            name: customer.name.clone(),
            email: customer.email.clone(),
            mobile_number: customer.mobile_number.clone(),
            account: account.map(AccountDetails::from),
        }
    }
}

impl From<&Account> for AccountDetails {
    fn from(account: &Account) -> Self {
        Self {
            account_number: account.account_number,
            account_type: account.account_type.clone(),
            branch_address: account.branch_address.clone(),
        }
    }
}

/// Rejects blank input; anything else is kept exactly as submitted.
fn require_text(field: &'static str, raw: &str, message: &str) -> DomainResult<String> {
    if raw.trim().is_empty() {
        Err(DomainError::validation(field, message))
    } else {
        Ok(raw.to_string())
    }
}

pub fn validate_name(raw: &str) -> DomainResult<String> {
    require_text("name", raw, "Name can not be a null or empty")
}

pub fn validate_account_type(raw: &str) -> DomainResult<String> {
    require_text("accountType", raw, "AccountType can not be a null or empty")
}

pub fn validate_branch_address(raw: &str) -> DomainResult<String> {
    require_text("branchAddress", raw, "BranchAddress can not be a null or empty")
}
