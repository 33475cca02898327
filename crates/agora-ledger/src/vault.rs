//! Treasury vault: custody of pooled funds and the deposit -> mint exchange.

use agora_types::{Address, Timestamp, U256};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::rights::RightsLedger;
use crate::settlement::Settlement;

/// Voting-rights base units minted per currency base unit.
pub const DEFAULT_EXCHANGE_RATE: u64 = 100_000;

/// Treasury vault state.
#[derive(Debug, Clone)]
pub struct TreasuryVault {
    /// The vault's own account identity (allow-listed as a minter)
    address: Address,
    /// Custodied currency in base units
    pool: U256,
    /// Voting-rights base units minted per deposited base unit
    exchange_rate: U256,
    /// Append-only deposit/release history
    history: Vec<VaultEntry>,
}

/// Kind of vault history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    Deposit,
    Release,
}

/// One movement through the vault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultEntry {
    pub kind: EntryKind,
    /// Depositor for deposits, recipient for releases
    pub account: Address,
    pub amount: U256,
    pub at: Timestamp,
}

/// Emitted on every successful deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundsDeposited {
    pub depositor: Address,
    pub amount: U256,
    pub minted: U256,
}

/// Emitted on every successful release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundsReleased {
    pub to: Address,
    pub amount: U256,
}

impl TreasuryVault {
    /// Create a vault with the default exchange rate.
    pub fn new(address: Address) -> Self {
        Self::with_exchange_rate(address, U256::from(DEFAULT_EXCHANGE_RATE))
    }

    /// Create a vault with a custom exchange rate.
    pub fn with_exchange_rate(address: Address, exchange_rate: U256) -> Self {
        Self {
            address,
            pool: U256::ZERO,
            exchange_rate,
            history: Vec::new(),
        }
    }

    /// The vault's account identity.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Current pool balance.
    pub fn balance(&self) -> U256 {
        self.pool
    }

    /// Current exchange rate.
    pub fn exchange_rate(&self) -> U256 {
        self.exchange_rate
    }

    /// Deposit/release history.
    pub fn history(&self) -> &[VaultEntry] {
        &self.history
    }

    /// Accept a deposit and mint voting rights to the depositor.
    ///
    /// `minted = amount * exchange_rate`, both already in base units, so
    /// the product carries no rounding loss. The mint happens on every
    /// nonzero deposit, regardless of any proposal state.
    pub fn deposit(
        &mut self,
        depositor: Address,
        amount: U256,
        now: Timestamp,
        rights: &mut RightsLedger,
    ) -> Result<FundsDeposited, LedgerError> {
        if amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }

        let minted = amount
            .checked_mul(&self.exchange_rate)
            .ok_or(LedgerError::Overflow)?;
        let new_pool = self
            .pool
            .checked_add(&amount)
            .ok_or(LedgerError::Overflow)?;

        rights.mint(self.address, depositor, minted)?;

        self.pool = new_pool;
        self.history.push(VaultEntry {
            kind: EntryKind::Deposit,
            account: depositor,
            amount,
            at: now,
        });

        Ok(FundsDeposited {
            depositor,
            amount,
            minted,
        })
    }

    /// Release pooled funds to `to` through the settlement seam.
    ///
    /// Only the proposal-execution path calls this. The pool is debited
    /// only after the settlement accepts; a rejection surfaces as
    /// `TransferFailed` with the pool untouched.
    pub fn release(
        &mut self,
        to: Address,
        amount: U256,
        now: Timestamp,
        settlement: &mut dyn Settlement,
    ) -> Result<FundsReleased, LedgerError> {
        if amount > self.pool {
            return Err(LedgerError::InsufficientBalance {
                have: self.pool,
                need: amount,
            });
        }

        settlement
            .credit(to, amount)
            .map_err(|e| LedgerError::TransferFailed(e.to_string()))?;

        self.pool -= amount;
        self.history.push(VaultEntry {
            kind: EntryKind::Release,
            account: to,
            amount,
            at: now,
        });

        Ok(FundsReleased { to, amount })
    }
}
