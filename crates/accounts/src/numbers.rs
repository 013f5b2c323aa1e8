//! Account number allocation.

use std::sync::atomic::{AtomicU64, Ordering};

use microbank_core::AccountNumber;

/// First number handed out; keeps every account number at ten digits.
pub const FIRST_ACCOUNT_NUMBER: u64 = 1_000_000_000;

/// Source of fresh, never-repeating account numbers.
pub trait AccountNumberGenerator: Send + Sync {
    fn next_account_number(&self) -> AccountNumber;
}

/// Monotonic counter starting at [`FIRST_ACCOUNT_NUMBER`].
#[derive(Debug)]
pub struct SequentialAccountNumbers {
    next: AtomicU64,
}

impl SequentialAccountNumbers {
    pub fn new() -> Self {
        Self::starting_at(FIRST_ACCOUNT_NUMBER)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialAccountNumbers {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountNumberGenerator for SequentialAccountNumbers {
    fn next_account_number(&self) -> AccountNumber {
        AccountNumber::new(self.next.fetch_add(1, Ordering::Relaxed))
    }
}
