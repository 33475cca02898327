//! Proposal records and passage evaluation.
//!
//! A proposal is a permanent historical record: immutable after creation
//! except for vote accumulation and the one-time executed flag. Its state
//! (Pending -> Passed/Failed -> Executed) is derived lazily from the clock
//! and tallies, never stored or scheduled.

use agora_types::{Address, Timestamp, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::GovernanceConfig;

/// Derived proposal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Voting window still open
    Pending,
    /// Deadline passed, quorum and majority met, not yet executed
    Passed,
    /// Deadline passed without meeting quorum or majority
    Failed,
    /// Funds released
    Executed,
}

/// A recorded vote: presence in the voters map is the has-voted flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    /// true = for, false = against
    pub choice: bool,
    /// Voting power credited at cast time
    pub weight: U256,
}

/// An atomic, all-or-nothing spending proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    /// Sequential ID, starts at 1, never reused
    pub id: u64,
    /// Proposer address
    pub proposer: Address,
    /// Payout recipient
    pub recipient: Address,
    /// Currency base units requested
    pub amount: U256,
    /// Description
    pub description: String,
    /// For votes (weighted), never decreases
    pub for_votes: U256,
    /// Against votes (weighted), never decreases
    pub against_votes: U256,
    /// Creation time
    pub created_at: Timestamp,
    /// Voting closes at this instant (inclusive)
    pub deadline: Timestamp,
    /// Flips false -> true exactly once
    pub executed: bool,
    /// Voter -> recorded vote, append-only
    pub voters: HashMap<Address, VoteRecord>,
}

impl Proposal {
    /// Create a new proposal with zero tallies.
    pub fn new(
        id: u64,
        proposer: Address,
        recipient: Address,
        amount: U256,
        description: String,
        created_at: Timestamp,
        deadline: Timestamp,
    ) -> Self {
        Self {
            id,
            proposer,
            recipient,
            amount,
            description,
            for_votes: U256::ZERO,
            against_votes: U256::ZERO,
            created_at,
            deadline,
            executed: false,
            voters: HashMap::new(),
        }
    }

    /// Record a vote. Preconditions are enforced by the engine.
    pub fn record_vote(&mut self, voter: Address, support: bool, weight: U256) {
        if support {
            self.for_votes = self.for_votes.saturating_add(&weight);
        } else {
            self.against_votes = self.against_votes.saturating_add(&weight);
        }
        self.voters.insert(voter, VoteRecord { choice: support, weight });
    }

    /// Check if voter has voted.
    pub fn has_voted(&self, voter: &Address) -> bool {
        self.voters.contains_key(voter)
    }

    /// Get a recorded vote.
    pub fn vote_of(&self, voter: &Address) -> Option<&VoteRecord> {
        self.voters.get(voter)
    }

    /// Total votes cast (for + against).
    pub fn total_votes(&self) -> U256 {
        self.for_votes.saturating_add(&self.against_votes)
    }

    /// Would the proposal pass right now?
    ///
    /// Quorum is a fraction of *total supply*; majority a fraction of
    /// *votes cast*. Both divisions truncate.
    pub fn has_passed(&self, total_supply: U256, config: &GovernanceConfig) -> bool {
        let hundred = U256::from(100u64);

        let quorum_required =
            total_supply.saturating_mul(&U256::from(config.quorum_percent)) / hundred;
        let votes_cast = self.total_votes();
        if votes_cast < quorum_required {
            return false;
        }

        let majority_required =
            votes_cast.saturating_mul(&U256::from(config.majority_percent)) / hundred;
        self.for_votes >= majority_required
    }

    /// Derive the current state.
    pub fn status(
        &self,
        now: Timestamp,
        total_supply: U256,
        config: &GovernanceConfig,
    ) -> ProposalStatus {
        if self.executed {
            ProposalStatus::Executed
        } else if now <= self.deadline {
            ProposalStatus::Pending
        } else if self.has_passed(total_supply, config) {
            ProposalStatus::Passed
        } else {
            ProposalStatus::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::from_bytes([n; 20])
    }

    fn proposal() -> Proposal {
        Proposal::new(
            1,
            addr(1),
            addr(2),
            U256::from(100u64),
            "Fund the node operators".to_string(),
            1_000,
            2_000,
        )
    }

    #[test]
    fn test_new_proposal_zero_tallies() {
        let p = proposal();
        assert_eq!(p.for_votes, U256::ZERO);
        assert_eq!(p.against_votes, U256::ZERO);
        assert!(!p.executed);
        assert!(p.voters.is_empty());
    }

    #[test]
    fn test_record_vote_accumulates() {
        let mut p = proposal();
        p.record_vote(addr(3), true, U256::from(500u64));
        p.record_vote(addr(4), false, U256::from(200u64));

        assert_eq!(p.for_votes, U256::from(500u64));
        assert_eq!(p.against_votes, U256::from(200u64));
        assert_eq!(p.total_votes(), U256::from(700u64));
        assert!(p.has_voted(&addr(3)));
        assert_eq!(p.vote_of(&addr(4)).unwrap().choice, false);
        assert_eq!(p.vote_of(&addr(4)).unwrap().weight, U256::from(200u64));
    }

    #[test]
    fn test_has_passed_exact_boundaries() {
        let config = GovernanceConfig::default();
        let supply = U256::from(1_000_000u64);

        // Exactly 10% of supply cast, exactly 51% in favor
        let mut p = proposal();
        p.record_vote(addr(3), true, U256::from(51_000u64));
        p.record_vote(addr(4), false, U256::from(49_000u64));
        assert!(p.has_passed(supply, &config));

        // One vote short of quorum fails regardless of split
        let mut p = proposal();
        p.record_vote(addr(3), true, U256::from(99_999u64));
        assert!(!p.has_passed(supply, &config));
    }

    #[test]
    fn test_has_passed_majority_short() {
        let config = GovernanceConfig::default();
        let supply = U256::from(1_000_000u64);

        // Quorum met, 50.999% in favor: 51% of 100_000 = 51_000 required
        let mut p = proposal();
        p.record_vote(addr(3), true, U256::from(50_999u64));
        p.record_vote(addr(4), false, U256::from(49_001u64));
        assert!(!p.has_passed(supply, &config));
    }

    #[test]
    fn test_has_passed_truncating_division() {
        let config = GovernanceConfig::default();
        // 10% of 1_000_009 truncates to 100_000
        let supply = U256::from(1_000_009u64);

        let mut p = proposal();
        // 51% of 100_001 truncates to 51_000
        p.record_vote(addr(3), true, U256::from(51_000u64));
        p.record_vote(addr(4), false, U256::from(49_001u64));
        assert!(p.has_passed(supply, &config));
    }

    #[test]
    fn test_status_derivation() {
        let config = GovernanceConfig::default();
        let supply = U256::from(1_000u64);

        let mut p = proposal();
        // Boundary: voting still open exactly at the deadline instant
        assert_eq!(p.status(2_000, supply, &config), ProposalStatus::Pending);
        assert_eq!(p.status(2_001, supply, &config), ProposalStatus::Failed);

        p.record_vote(addr(3), true, U256::from(600u64));
        assert_eq!(p.status(2_001, supply, &config), ProposalStatus::Passed);

        p.executed = true;
        assert_eq!(p.status(2_001, supply, &config), ProposalStatus::Executed);
    }

    #[test]
    fn test_proposal_serializes() {
        let mut p = proposal();
        p.record_vote(addr(3), true, U256::from(10u64));
        let json = serde_json::to_string(&p).unwrap();
        let back: Proposal = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, p.id);
        assert_eq!(back.for_votes, p.for_votes);
        assert!(back.has_voted(&addr(3)));
    }
}
