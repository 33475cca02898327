//! Agora Governance - proposal state machine and budget tracking.
//!
//! This crate provides:
//! - Proposal lifecycle: creation, weighted voting, quorum/majority
//!   evaluation, permissionless post-deadline execution
//! - Category budgets and the initiative funding workflow
//! - The single-writer deployment node tying the engine to the ledgers

pub mod budget;
pub mod config;
pub mod engine;
pub mod error;
pub mod node;
pub mod proposal;

pub use budget::{Budget, BudgetTracker, Category, Initiative, InitiativeFunded};
pub use config::GovernanceConfig;
pub use engine::{ProposalCreated, ProposalEngine, ProposalExecuted, VoteCast};
pub use error::GovernanceError;
pub use node::GovernanceNode;
pub use proposal::{Proposal, ProposalStatus, VoteRecord};
