//! Settlement seam for native-currency payouts.
//!
//! The vault never credits recipients directly; it goes through this trait
//! so the payout mechanism can be swapped (and made to fail) in tests.

use agora_types::{Address, U256};
use std::collections::HashMap;

use crate::error::LedgerError;

/// External fund-transfer mechanism used by treasury releases.
pub trait Settlement {
    /// Credit `amount` of native currency to `to`.
    ///
    /// A rejection here surfaces as `TransferFailed` at the call site and
    /// must not leave partial state behind.
    fn credit(&mut self, to: Address, amount: U256) -> Result<(), LedgerError>;
}

/// In-memory native-currency account book.
#[derive(Debug, Clone, Default)]
pub struct AccountBook {
    balances: HashMap<Address, U256>,
}

impl AccountBook {
    /// Create an empty account book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get account balance.
    pub fn balance_of(&self, address: &Address) -> U256 {
        self.balances.get(address).copied().unwrap_or(U256::ZERO)
    }

    /// Set account balance.
    pub fn set_balance(&mut self, address: Address, balance: U256) {
        self.balances.insert(address, balance);
    }
}

impl Settlement for AccountBook {
    fn credit(&mut self, to: Address, amount: U256) -> Result<(), LedgerError> {
        let balance = self
            .balance_of(&to)
            .checked_add(&amount)
            .ok_or(LedgerError::Overflow)?;
        self.balances.insert(to, balance);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_book_credit() {
        let mut book = AccountBook::new();
        let addr = Address::from_bytes([1u8; 20]);

        book.credit(addr, U256::from(100u64)).unwrap();
        book.credit(addr, U256::from(50u64)).unwrap();
        assert_eq!(book.balance_of(&addr), U256::from(150u64));
    }

    #[test]
    fn test_account_book_credit_overflow() {
        let mut book = AccountBook::new();
        let addr = Address::from_bytes([1u8; 20]);

        book.set_balance(addr, U256::MAX);
        assert_eq!(
            book.credit(addr, U256::ONE),
            Err(LedgerError::Overflow)
        );
    }
}
