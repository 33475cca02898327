//! Agora Ledger - balance-weighted voting rights and treasury custody.
//!
//! This crate provides:
//! - The voting-rights token ledger (mint, burn, transfer, live voting power)
//! - The treasury vault (deposit -> mint exchange, proposal payouts)
//! - The settlement seam for native-currency credits

pub mod error;
pub mod rights;
pub mod settlement;
pub mod vault;

pub use error::LedgerError;
pub use rights::{RightsLedger, TransferEvent};
pub use settlement::{AccountBook, Settlement};
pub use vault::{FundsDeposited, FundsReleased, TreasuryVault, DEFAULT_EXCHANGE_RATE};
