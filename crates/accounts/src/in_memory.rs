use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use microbank_core::{AccountNumber, CustomerId, DomainError, DomainResult, MobileNumber};

use crate::customer::{
    Account, AccountDetails, AuditInfo, Customer, CustomerDetails, NewCustomer, AUDIT_ACTOR,
    DEFAULT_ACCOUNT_TYPE, DEFAULT_BRANCH_ADDRESS,
};
use crate::numbers::{AccountNumberGenerator, SequentialAccountNumbers};
use crate::service::AccountService;

#[derive(Debug, Default)]
struct Tables {
    customers: HashMap<CustomerId, Customer>,
    accounts: HashMap<AccountNumber, Account>,
}

impl Tables {
    fn customer_by_mobile(&self, mobile_number: &MobileNumber) -> Option<&Customer> {
        self.customers
            .values()
            .find(|c| &c.mobile_number == mobile_number)
    }

    fn account_of(&self, customer_id: CustomerId) -> Option<&Account> {
        self.accounts.values().find(|a| a.customer_id == customer_id)
    }
}

/// In-memory account service for tests/dev.
///
/// Customers and accounts live behind one `RwLock` so that create and delete
/// touch both tables atomically.
pub struct InMemoryAccountService {
    tables: RwLock<Tables>,
    numbers: Arc<dyn AccountNumberGenerator>,
}

impl InMemoryAccountService {
    pub fn new() -> Self {
        Self::with_numbers(Arc::new(SequentialAccountNumbers::new()))
    }

    pub fn with_numbers(numbers: Arc<dyn AccountNumberGenerator>) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            numbers,
        }
    }

    /// Stored customer record (with audit columns) for a mobile number.
    pub fn customer_record(&self, mobile_number: &MobileNumber) -> DomainResult<Option<Customer>> {
        Ok(self.read()?.customer_by_mobile(mobile_number).cloned())
    }

    /// Stored account record (with audit columns) for an account number.
    pub fn account_record(&self, account_number: AccountNumber) -> DomainResult<Option<Account>> {
        Ok(self.read()?.accounts.get(&account_number).cloned())
    }

    fn read(&self) -> DomainResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| DomainError::unexpected("account store lock poisoned"))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| DomainError::unexpected("account store lock poisoned"))
    }
}

impl Default for InMemoryAccountService {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for InMemoryAccountService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InMemoryAccountService").finish_non_exhaustive()
    }
}

impl AccountService for InMemoryAccountService {
    fn create_account(&self, customer: NewCustomer) -> DomainResult<CustomerDetails> {
        let mut tables = self.write()?;

        if tables.customer_by_mobile(&customer.mobile_number).is_some() {
            return Err(DomainError::already_exists(format!(
                "Customer already registered with given mobileNumber {}",
                customer.mobile_number
            )));
        }

        let now = Utc::now();
        let customer = Customer {
            customer_id: CustomerId::new(),
            name: customer.name,
            email: customer.email,
            mobile_number: customer.mobile_number,
            audit: AuditInfo::created(now, AUDIT_ACTOR),
        };
        let account = Account {
            account_number: self.numbers.next_account_number(),
            customer_id: customer.customer_id,
            account_type: DEFAULT_ACCOUNT_TYPE.to_string(),
            branch_address: DEFAULT_BRANCH_ADDRESS.to_string(),
            audit: AuditInfo::created(now, AUDIT_ACTOR),
        };

        let details = CustomerDetails::from_records(&customer, Some(&account));
        tracing::debug!(
            customer_id = %customer.customer_id,
            account_number = %account.account_number,
            "account opened"
        );
        tables.accounts.insert(account.account_number, account);
        tables.customers.insert(customer.customer_id, customer);
        Ok(details)
    }

    fn fetch_account(&self, mobile_number: &MobileNumber) -> DomainResult<CustomerDetails> {
        let tables = self.read()?;
        let customer = tables
            .customer_by_mobile(mobile_number)
            .ok_or_else(|| DomainError::not_found("Customer", "mobileNumber", mobile_number.as_str()))?;
        let account = tables.account_of(customer.customer_id).ok_or_else(|| {
            DomainError::not_found("Account", "customerId", customer.customer_id.to_string())
        })?;
        Ok(CustomerDetails::from_records(customer, Some(account)))
    }

    fn update_account(&self, details: CustomerDetails) -> DomainResult<bool> {
        let Some(AccountDetails {
            account_number,
            account_type,
            branch_address,
        }) = details.account
        else {
            return Ok(false);
        };

        let mut tables = self.write()?;
        let Some(customer_id) = tables.accounts.get(&account_number).map(|a| a.customer_id) else {
            return Ok(false);
        };

        if let Some(other) = tables.customer_by_mobile(&details.mobile_number) {
            if other.customer_id != customer_id {
                return Err(DomainError::already_exists(format!(
                    "Customer already registered with given mobileNumber {}",
                    details.mobile_number
                )));
            }
        }

        let now = Utc::now();
        let Some(customer) = tables.customers.get_mut(&customer_id) else {
            return Err(DomainError::unexpected(format!(
                "account {account_number} references missing customer {customer_id}"
            )));
        };
        customer.name = details.name;
        customer.email = details.email;
        customer.mobile_number = details.mobile_number;
        customer.audit.touch(now, AUDIT_ACTOR);

        if let Some(account) = tables.accounts.get_mut(&account_number) {
            account.account_type = account_type;
            account.branch_address = branch_address;
            account.audit.touch(now, AUDIT_ACTOR);
        }
        Ok(true)
    }

    fn delete_account(&self, mobile_number: &MobileNumber) -> DomainResult<bool> {
        let mut tables = self.write()?;
        let Some(customer_id) = tables.customer_by_mobile(mobile_number).map(|c| c.customer_id) else {
            return Ok(false);
        };

        tables.accounts.retain(|_, a| a.customer_id != customer_id);
        tables.customers.remove(&customer_id);
        Ok(true)
    }
}
