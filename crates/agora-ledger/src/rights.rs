//! Voting-rights token ledger.
//!
//! A fungible balance is the holder's vote weight, read live at the moment
//! of voting. There is no snapshotting: transfers move voting power
//! immediately, even mid-proposal.

use agora_types::{Address, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::LedgerError;

/// Voting-rights ledger state.
#[derive(Debug, Clone)]
pub struct RightsLedger {
    /// Administrator account
    owner: Address,
    /// Balances mapping: address -> balance (zero balances are evicted)
    balances: HashMap<Address, U256>,
    /// Total supply
    total_supply: U256,
    /// Minter allow-list besides the owner (the treasury vault in normal operation)
    minters: HashMap<Address, bool>,
}

/// Rights transfer event. Mints come from the zero address, burns go to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEvent {
    pub from: Address,
    pub to: Address,
    pub value: U256,
}

impl RightsLedger {
    /// Create a new ledger with zero supply.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            balances: HashMap::new(),
            total_supply: U256::ZERO,
            minters: HashMap::new(),
        }
    }

    /// Allow-list a minter at construction time.
    pub fn with_minter(mut self, account: Address) -> Self {
        self.minters.insert(account, true);
        self
    }

    /// Get the administrator account.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Get balance of an address.
    pub fn balance_of(&self, address: &Address) -> U256 {
        self.balances.get(address).copied().unwrap_or(U256::ZERO)
    }

    /// Voting power equals the live balance.
    pub fn voting_power_of(&self, address: &Address) -> U256 {
        self.balance_of(address)
    }

    /// Get total supply.
    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    /// Check if an address may mint (owner is always allowed).
    pub fn is_minter(&self, address: &Address) -> bool {
        *address == self.owner || self.minters.get(address).copied().unwrap_or(false)
    }

    /// Toggle an address on the minter allow-list. Owner only, idempotent.
    pub fn set_minter(
        &mut self,
        caller: Address,
        account: Address,
        allowed: bool,
    ) -> Result<(), LedgerError> {
        if caller != self.owner {
            return Err(LedgerError::Unauthorized(
                "only the owner may manage minters".to_string(),
            ));
        }
        self.minters.insert(account, allowed);
        Ok(())
    }

    /// Transfer ownership. Owner only, zero address rejected.
    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), LedgerError> {
        if caller != self.owner {
            return Err(LedgerError::Unauthorized(
                "only the owner may transfer ownership".to_string(),
            ));
        }
        if new_owner.is_zero() {
            return Err(LedgerError::InvalidRecipient);
        }
        self.owner = new_owner;
        Ok(())
    }

    /// Mint new voting rights to `to`. Caller must be the owner or an
    /// allow-listed minter.
    pub fn mint(
        &mut self,
        caller: Address,
        to: Address,
        amount: U256,
    ) -> Result<TransferEvent, LedgerError> {
        if !self.is_minter(&caller) {
            return Err(LedgerError::Unauthorized(
                "caller may not mint".to_string(),
            ));
        }
        if to.is_zero() {
            return Err(LedgerError::InvalidRecipient);
        }
        if amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }

        let new_supply = self
            .total_supply
            .checked_add(&amount)
            .ok_or(LedgerError::Overflow)?;
        let new_balance = self
            .balance_of(&to)
            .checked_add(&amount)
            .ok_or(LedgerError::Overflow)?;

        self.total_supply = new_supply;
        self.set_balance(to, new_balance);

        Ok(TransferEvent {
            from: Address::ZERO,
            to,
            value: amount,
        })
    }

    /// Burn voting rights from the caller's own balance.
    pub fn burn(&mut self, caller: Address, amount: U256) -> Result<TransferEvent, LedgerError> {
        if amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }

        let balance = self.balance_of(&caller);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance {
                have: balance,
                need: amount,
            });
        }

        self.total_supply = self.total_supply.saturating_sub(&amount);
        self.set_balance(caller, balance.saturating_sub(&amount));

        Ok(TransferEvent {
            from: caller,
            to: Address::ZERO,
            value: amount,
        })
    }

    /// Transfer voting rights. Takes effect immediately.
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<TransferEvent, LedgerError> {
        if to.is_zero() {
            return Err(LedgerError::InvalidRecipient);
        }
        if amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }

        let from_balance = self.balance_of(&from);
        if from_balance < amount {
            return Err(LedgerError::InsufficientBalance {
                have: from_balance,
                need: amount,
            });
        }

        // Balance of `to` cannot overflow while the supply invariant holds
        let to_balance = self
            .balance_of(&to)
            .checked_add(&amount)
            .ok_or(LedgerError::Overflow)?;

        self.set_balance(from, from_balance.saturating_sub(&amount));
        self.set_balance(to, to_balance);

        Ok(TransferEvent {
            from,
            to,
            value: amount,
        })
    }

    /// Update a balance, evicting zero entries.
    fn set_balance(&mut self, address: Address, new_balance: U256) {
        if new_balance.is_zero() {
            self.balances.remove(&address);
        } else {
            self.balances.insert(address, new_balance);
        }
    }

    /// Sum of all balances. Equals `total_supply` at all times.
    pub fn balance_sum(&self) -> U256 {
        let mut sum = U256::ZERO;
        for value in self.balances.values() {
            sum = sum.saturating_add(value);
        }
        sum
    }
}
