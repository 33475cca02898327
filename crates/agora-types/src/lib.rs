//! Agora Types - Core type definitions for the AGORA governance engine.
//!
//! This crate provides the fundamental types used throughout the engine:
//! - Addresses (20-byte, Bech32m encoded)
//! - U256 (256-bit unsigned integer, 18-decimal fixed point base units)
//! - Timestamps (seconds since the Unix epoch)

pub mod address;
pub mod u256;
pub mod error;

#[cfg(feature = "serde")]
mod serialization;

pub use address::Address;
pub use u256::U256;
pub use error::TypesError;

/// Seconds since the Unix epoch. Engine operations take the current time
/// as an explicit parameter; the node layer supplies the wall clock.
pub type Timestamp = u64;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Address, Timestamp, TypesError, U256};
}
