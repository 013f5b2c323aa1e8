//! Customer / account records and the account service capability.
//!
//! The HTTP gateway only ever talks to [`AccountService`]; this crate also
//! ships [`InMemoryAccountService`] for local runs and tests.

pub mod customer;
pub mod in_memory;
pub mod numbers;
pub mod service;

pub use customer::{
    Account, AccountDetails, AuditInfo, Customer, CustomerDetails, NewCustomer,
    DEFAULT_ACCOUNT_TYPE, DEFAULT_BRANCH_ADDRESS,
};
pub use in_memory::InMemoryAccountService;
pub use numbers::{AccountNumberGenerator, SequentialAccountNumbers};
pub use service::AccountService;
