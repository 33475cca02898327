//! Proposal engine: creation, weighted voting, post-deadline execution.
//!
//! The engine owns the proposal arena and orchestrates against borrowed
//! ledger collaborators. All mutating entry points assume the caller has
//! serialized access (the node layer holds the deployment write lock).

use agora_ledger::{RightsLedger, Settlement, TreasuryVault};
use agora_types::{Address, Timestamp, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::GovernanceConfig;
use crate::error::GovernanceError;
use crate::proposal::{Proposal, ProposalStatus};

/// Emitted when a proposal is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalCreated {
    pub proposal_id: u64,
    pub proposer: Address,
    pub recipient: Address,
    pub amount: U256,
    pub deadline: Timestamp,
}

/// Emitted when a vote is cast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCast {
    pub proposal_id: u64,
    pub voter: Address,
    pub support: bool,
    pub weight: U256,
}

/// Emitted when a proposal is executed and funds released.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalExecuted {
    pub proposal_id: u64,
    pub recipient: Address,
    pub amount: U256,
}

/// Proposal state machine over an arena of proposal records.
#[derive(Debug)]
pub struct ProposalEngine {
    config: GovernanceConfig,
    proposals: HashMap<u64, Proposal>,
    next_id: u64,
    /// Exclusive-execution flag guarding the settlement call
    executing: bool,
}

impl ProposalEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: GovernanceConfig) -> Self {
        Self {
            config,
            proposals: HashMap::new(),
            next_id: 1,
            executing: false,
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    /// Create a proposal.
    ///
    /// The requested amount is checked against the pool at creation time
    /// only; the pool may drop below it before execution, in which case
    /// execution fails at settlement time.
    pub fn create(
        &mut self,
        proposer: Address,
        recipient: Address,
        amount: U256,
        description: String,
        duration: Timestamp,
        now: Timestamp,
        rights: &RightsLedger,
        vault: &TreasuryVault,
    ) -> Result<ProposalCreated, GovernanceError> {
        if rights.voting_power_of(&proposer).is_zero() {
            return Err(GovernanceError::NotATokenHolder);
        }
        if recipient.is_zero() {
            return Err(GovernanceError::InvalidRecipient);
        }
        if amount.is_zero() {
            return Err(GovernanceError::ZeroAmount);
        }
        let pool = vault.balance();
        if amount > pool {
            return Err(GovernanceError::InsufficientTreasuryBalance {
                have: pool,
                need: amount,
            });
        }
        if description.is_empty() {
            return Err(GovernanceError::EmptyDescription);
        }

        let duration = if duration == 0 {
            self.config.default_voting_period
        } else if duration < self.config.min_voting_period
            || duration > self.config.max_voting_period
        {
            return Err(GovernanceError::DurationOutOfRange(duration));
        } else {
            duration
        };

        let id = self.next_id;
        self.next_id += 1;

        let deadline = now + duration;
        let proposal = Proposal::new(id, proposer, recipient, amount, description, now, deadline);
        self.proposals.insert(id, proposal);

        Ok(ProposalCreated {
            proposal_id: id,
            proposer,
            recipient,
            amount,
            deadline,
        })
    }

    /// Cast a vote with the voter's live voting power.
    ///
    /// The deadline boundary is inclusive: a vote lands exactly at
    /// `now == deadline`.
    pub fn vote(
        &mut self,
        voter: Address,
        proposal_id: u64,
        support: bool,
        now: Timestamp,
        rights: &RightsLedger,
    ) -> Result<VoteCast, GovernanceError> {
        let proposal = self
            .proposals
            .get_mut(&proposal_id)
            .ok_or(GovernanceError::ProposalNotFound(proposal_id))?;

        if now > proposal.deadline {
            return Err(GovernanceError::VotingClosed);
        }
        if proposal.executed {
            return Err(GovernanceError::AlreadyExecuted);
        }
        if rights.voting_power_of(&voter).is_zero() {
            return Err(GovernanceError::NotATokenHolder);
        }
        if proposal.has_voted(&voter) {
            return Err(GovernanceError::AlreadyVoted);
        }

        // Re-read at credit time; kept separate from the holder check above
        let weight = rights.voting_power_of(&voter);
        if weight.is_zero() {
            return Err(GovernanceError::NoVotingPower);
        }

        proposal.record_vote(voter, support, weight);

        Ok(VoteCast {
            proposal_id,
            voter,
            support,
            weight,
        })
    }

    /// Would the proposal pass right now? Pure read, valid at any time.
    pub fn has_passed(
        &self,
        proposal_id: u64,
        rights: &RightsLedger,
    ) -> Result<bool, GovernanceError> {
        let proposal = self
            .proposals
            .get(&proposal_id)
            .ok_or(GovernanceError::ProposalNotFound(proposal_id))?;
        Ok(proposal.has_passed(rights.total_supply(), &self.config))
    }

    /// Execute a passed proposal after its deadline. Permissionless.
    ///
    /// The executed flag is committed before the settlement call; a
    /// settlement rejection rolls the whole operation back as one unit,
    /// leaving the proposal executable on retry.
    pub fn execute(
        &mut self,
        proposal_id: u64,
        now: Timestamp,
        rights: &RightsLedger,
        vault: &mut TreasuryVault,
        settlement: &mut dyn Settlement,
    ) -> Result<ProposalExecuted, GovernanceError> {
        if self.executing {
            return Err(GovernanceError::ReentrantExecution);
        }
        self.executing = true;
        let result = self.execute_locked(proposal_id, now, rights, vault, settlement);
        self.executing = false;
        result
    }

    fn execute_locked(
        &mut self,
        proposal_id: u64,
        now: Timestamp,
        rights: &RightsLedger,
        vault: &mut TreasuryVault,
        settlement: &mut dyn Settlement,
    ) -> Result<ProposalExecuted, GovernanceError> {
        let total_supply = rights.total_supply();
        let config = self.config.clone();
        let proposal = self
            .proposals
            .get_mut(&proposal_id)
            .ok_or(GovernanceError::ProposalNotFound(proposal_id))?;

        // Strictly after the deadline, unlike voting's inclusive boundary
        if now <= proposal.deadline {
            return Err(GovernanceError::VotingPeriodNotEnded);
        }
        if proposal.executed {
            return Err(GovernanceError::AlreadyExecuted);
        }
        if !proposal.has_passed(total_supply, &config) {
            return Err(GovernanceError::ProposalDidNotPass);
        }

        // Flag first, settlement second. Roll the flag back if the
        // settlement rejects so the operation fails as one unit.
        proposal.executed = true;
        let recipient = proposal.recipient;
        let amount = proposal.amount;

        match vault.release(recipient, amount, now, settlement) {
            Ok(_) => Ok(ProposalExecuted {
                proposal_id,
                recipient,
                amount,
            }),
            Err(e) => {
                proposal.executed = false;
                Err(e.into())
            }
        }
    }

    /// Get a proposal.
    pub fn get(&self, proposal_id: u64) -> Option<&Proposal> {
        self.proposals.get(&proposal_id)
    }

    /// Check whether an account has voted on a proposal.
    pub fn has_voted(
        &self,
        proposal_id: u64,
        account: &Address,
    ) -> Result<bool, GovernanceError> {
        let proposal = self
            .proposals
            .get(&proposal_id)
            .ok_or(GovernanceError::ProposalNotFound(proposal_id))?;
        Ok(proposal.has_voted(account))
    }

    /// Get an account's recorded choice on a proposal.
    pub fn vote_choice(
        &self,
        proposal_id: u64,
        account: &Address,
    ) -> Result<bool, GovernanceError> {
        let proposal = self
            .proposals
            .get(&proposal_id)
            .ok_or(GovernanceError::ProposalNotFound(proposal_id))?;
        proposal
            .vote_of(account)
            .map(|record| record.choice)
            .ok_or(GovernanceError::NotVoted)
    }

    /// Number of proposals ever created.
    pub fn proposal_count(&self) -> u64 {
        self.next_id - 1
    }

    /// All proposals.
    pub fn all(&self) -> Vec<&Proposal> {
        self.proposals.values().collect()
    }

    /// Proposals in a given derived state.
    pub fn by_status(
        &self,
        status: ProposalStatus,
        now: Timestamp,
        rights: &RightsLedger,
    ) -> Vec<&Proposal> {
        let total_supply = rights.total_supply();
        self.proposals
            .values()
            .filter(|p| p.status(now, total_supply, &self.config) == status)
            .collect()
    }

    /// Proposals still open for voting.
    pub fn open(&self, now: Timestamp) -> Vec<&Proposal> {
        self.proposals
            .values()
            .filter(|p| !p.executed && now <= p.deadline)
            .collect()
    }
}
