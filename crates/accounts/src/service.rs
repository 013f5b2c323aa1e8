use std::sync::Arc;

use microbank_core::{DomainResult, MobileNumber};

use crate::customer::{CustomerDetails, NewCustomer};

/// Account service capability the HTTP gateway depends on.
///
/// `update_account` / `delete_account` report a missing target as `Ok(false)`;
/// `Err` is reserved for duplicates and genuine failures.
pub trait AccountService: Send + Sync {
    /// Persist a new customer together with a freshly opened account.
    ///
    /// Fails with `AlreadyExists` if the mobile number is already registered.
    fn create_account(&self, customer: NewCustomer) -> DomainResult<CustomerDetails>;

    /// Look up a customer and its account by mobile number.
    fn fetch_account(&self, mobile_number: &MobileNumber) -> DomainResult<CustomerDetails>;

    /// Replace customer and account fields, keyed by the embedded account number.
    fn update_account(&self, details: CustomerDetails) -> DomainResult<bool>;

    /// Remove a customer and its account.
    fn delete_account(&self, mobile_number: &MobileNumber) -> DomainResult<bool>;
}

impl<S> AccountService for Arc<S>
where
    S: AccountService + ?Sized,
{
    fn create_account(&self, customer: NewCustomer) -> DomainResult<CustomerDetails> {
        (**self).create_account(customer)
    }

    fn fetch_account(&self, mobile_number: &MobileNumber) -> DomainResult<CustomerDetails> {
        (**self).fetch_account(mobile_number)
    }

    fn update_account(&self, details: CustomerDetails) -> DomainResult<bool> {
        (**self).update_account(details)
    }

    fn delete_account(&self, mobile_number: &MobileNumber) -> DomainResult<bool> {
        (**self).delete_account(mobile_number)
    }
}
