//! Deployment aggregate: the single-writer boundary around one governance
//! instance.
//!
//! All mutating calls hold the write lock for their whole duration, so the
//! live voting-power read inside `vote` can never interleave with a ledger
//! mutation. Read-only queries share the read lock and observe a consistent
//! snapshot.

use agora_ledger::{
    AccountBook, FundsDeposited, RightsLedger, TransferEvent, TreasuryVault,
};
use agora_types::{Address, Timestamp, U256};
use parking_lot::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::budget::{Budget, BudgetTracker, Category, Initiative};
use crate::config::GovernanceConfig;
use crate::engine::{ProposalCreated, ProposalEngine, ProposalExecuted, VoteCast};
use crate::error::GovernanceError;
use crate::proposal::Proposal;

struct Deployment {
    rights: RightsLedger,
    vault: TreasuryVault,
    engine: ProposalEngine,
    budgets: BudgetTracker,
    book: AccountBook,
}

/// One deployed governance instance.
pub struct GovernanceNode {
    inner: RwLock<Deployment>,
}

impl GovernanceNode {
    /// Create a node with the default configuration.
    pub fn new(owner: Address, vault_address: Address) -> Self {
        Self::with_config(owner, vault_address, GovernanceConfig::default())
    }

    /// Create a node with a custom configuration.
    pub fn with_config(owner: Address, vault_address: Address, config: GovernanceConfig) -> Self {
        let vault = TreasuryVault::new(vault_address);
        // The vault is the one expected authorized minter
        let rights = RightsLedger::new(owner).with_minter(vault_address);

        Self {
            inner: RwLock::new(Deployment {
                rights,
                vault,
                engine: ProposalEngine::new(config),
                budgets: BudgetTracker::new(owner),
                book: AccountBook::new(),
            }),
        }
    }

    fn now() -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    // --- mutating surface -------------------------------------------------

    /// Deposit currency into the pool, minting voting rights to the
    /// depositor at the fixed exchange rate.
    pub fn deposit(
        &self,
        depositor: Address,
        amount: U256,
    ) -> Result<FundsDeposited, GovernanceError> {
        let mut state = self.inner.write();
        let Deployment { rights, vault, .. } = &mut *state;
        let event = vault.deposit(depositor, amount, Self::now(), rights)?;
        tracing::info!(
            depositor = %event.depositor,
            amount = %event.amount,
            minted = %event.minted,
            "funds deposited"
        );
        Ok(event)
    }

    /// Create a spending proposal. Proposer must hold voting rights.
    pub fn create_proposal(
        &self,
        proposer: Address,
        recipient: Address,
        amount: U256,
        description: String,
        duration: Timestamp,
    ) -> Result<ProposalCreated, GovernanceError> {
        let mut state = self.inner.write();
        let Deployment {
            rights,
            vault,
            engine,
            ..
        } = &mut *state;
        let event = engine.create(
            proposer,
            recipient,
            amount,
            description,
            duration,
            Self::now(),
            rights,
            vault,
        )?;
        tracing::info!(
            id = event.proposal_id,
            proposer = %event.proposer,
            amount = %event.amount,
            deadline = event.deadline,
            "proposal created"
        );
        Ok(event)
    }

    /// Cast a vote with the caller's live voting power.
    pub fn vote(
        &self,
        voter: Address,
        proposal_id: u64,
        support: bool,
    ) -> Result<VoteCast, GovernanceError> {
        let mut state = self.inner.write();
        let Deployment { rights, engine, .. } = &mut *state;
        let event = engine.vote(voter, proposal_id, support, Self::now(), rights)?;
        tracing::info!(
            id = proposal_id,
            voter = %event.voter,
            support = event.support,
            weight = %event.weight,
            "vote cast"
        );
        Ok(event)
    }

    /// Execute a passed proposal after its deadline. Open to any caller.
    ///
    /// A linked initiative is funded as a follow-up; a budget rejection
    /// there does not undo the execution, it is logged and left for
    /// operator attention.
    pub fn execute_proposal(&self, proposal_id: u64) -> Result<ProposalExecuted, GovernanceError> {
        let mut state = self.inner.write();
        let now = Self::now();
        let Deployment {
            rights,
            vault,
            engine,
            budgets,
            book,
        } = &mut *state;

        let event = engine.execute(proposal_id, now, rights, vault, book)?;
        tracing::info!(
            id = proposal_id,
            recipient = %event.recipient,
            amount = %event.amount,
            "proposal executed"
        );

        match budgets.record_execution(proposal_id, now) {
            Ok(Some(funded)) => {
                tracing::info!(
                    initiative = funded.initiative_id,
                    budget = funded.budget_id,
                    amount = %funded.amount,
                    "initiative funded"
                );
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(id = proposal_id, error = %e, "initiative funding failed");
            }
        }

        Ok(event)
    }

    /// Transfer voting rights between accounts.
    pub fn transfer_rights(
        &self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<TransferEvent, GovernanceError> {
        Ok(self.inner.write().rights.transfer(from, to, amount)?)
    }

    /// Burn voting rights from the caller's balance.
    pub fn burn_rights(&self, caller: Address, amount: U256) -> Result<TransferEvent, GovernanceError> {
        Ok(self.inner.write().rights.burn(caller, amount)?)
    }

    /// Mint voting rights. Caller must be the owner or an allow-listed minter.
    pub fn mint_rights(
        &self,
        caller: Address,
        to: Address,
        amount: U256,
    ) -> Result<TransferEvent, GovernanceError> {
        Ok(self.inner.write().rights.mint(caller, to, amount)?)
    }

    /// Toggle a minter. Owner only.
    pub fn set_minter(
        &self,
        caller: Address,
        account: Address,
        allowed: bool,
    ) -> Result<(), GovernanceError> {
        Ok(self.inner.write().rights.set_minter(caller, account, allowed)?)
    }

    /// Add a budget category. Owner only.
    pub fn add_category(&self, caller: Address, name: String) -> Result<(), GovernanceError> {
        self.inner.write().budgets.add_category(caller, name)
    }

    /// Create a budget envelope. Owner only.
    pub fn create_budget(
        &self,
        caller: Address,
        category: String,
        allocated: U256,
        start_date: Timestamp,
        end_date: Timestamp,
    ) -> Result<u64, GovernanceError> {
        self.inner
            .write()
            .budgets
            .create_budget(caller, category, allocated, start_date, end_date)
    }

    /// Propose a funding initiative. Open to anyone.
    pub fn propose_initiative(
        &self,
        name: String,
        category: String,
        description: String,
        requested_amount: U256,
        recipient: Address,
    ) -> Result<u64, GovernanceError> {
        self.inner.write().budgets.propose_initiative(
            name,
            category,
            description,
            requested_amount,
            recipient,
        )
    }

    /// Approve an initiative. Owner only.
    pub fn approve_initiative(
        &self,
        caller: Address,
        initiative_id: u64,
        amount: U256,
    ) -> Result<(), GovernanceError> {
        self.inner
            .write()
            .budgets
            .approve_initiative(caller, initiative_id, amount)
    }

    /// Link an approved initiative to a proposal. Owner only.
    pub fn link_proposal(
        &self,
        caller: Address,
        initiative_id: u64,
        proposal_id: u64,
    ) -> Result<(), GovernanceError> {
        self.inner
            .write()
            .budgets
            .link_proposal(caller, initiative_id, proposal_id)
    }

    // --- read-only surface ------------------------------------------------

    /// Get the full proposal record.
    pub fn get_proposal(&self, proposal_id: u64) -> Result<Proposal, GovernanceError> {
        self.inner
            .read()
            .engine
            .get(proposal_id)
            .cloned()
            .ok_or(GovernanceError::ProposalNotFound(proposal_id))
    }

    /// Has the account voted on the proposal?
    pub fn has_voted(&self, proposal_id: u64, account: Address) -> Result<bool, GovernanceError> {
        self.inner.read().engine.has_voted(proposal_id, &account)
    }

    /// The account's recorded choice; fails with `NotVoted` if absent.
    pub fn get_vote_choice(
        &self,
        proposal_id: u64,
        account: Address,
    ) -> Result<bool, GovernanceError> {
        self.inner.read().engine.vote_choice(proposal_id, &account)
    }

    /// Would the proposal pass right now?
    pub fn has_proposal_passed(&self, proposal_id: u64) -> Result<bool, GovernanceError> {
        let state = self.inner.read();
        state.engine.has_passed(proposal_id, &state.rights)
    }

    /// Current pool balance.
    pub fn treasury_balance(&self) -> U256 {
        self.inner.read().vault.balance()
    }

    /// Live voting power of an account.
    pub fn voting_power_of(&self, account: Address) -> U256 {
        self.inner.read().rights.voting_power_of(&account)
    }

    /// Total voting-rights supply.
    pub fn total_supply(&self) -> U256 {
        self.inner.read().rights.total_supply()
    }

    /// Native-currency balance credited to an account by executed proposals.
    pub fn currency_balance_of(&self, account: Address) -> U256 {
        self.inner.read().book.balance_of(&account)
    }

    /// Number of proposals ever created.
    pub fn proposal_count(&self) -> u64 {
        self.inner.read().engine.proposal_count()
    }

    /// The budget category allow-list.
    pub fn categories(&self) -> Vec<Category> {
        self.inner.read().budgets.categories().to_vec()
    }

    /// Get a budget envelope.
    pub fn get_budget(&self, budget_id: u64) -> Result<Budget, GovernanceError> {
        self.inner
            .read()
            .budgets
            .budget(budget_id)
            .cloned()
            .ok_or(GovernanceError::BudgetNotFound(budget_id))
    }

    /// Get an initiative.
    pub fn get_initiative(&self, initiative_id: u64) -> Result<Initiative, GovernanceError> {
        self.inner
            .read()
            .budgets
            .initiative(initiative_id)
            .cloned()
            .ok_or(GovernanceError::InitiativeNotFound(initiative_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::from_bytes([n; 20])
    }

    fn node() -> GovernanceNode {
        GovernanceNode::new(addr(1), addr(9))
    }

    #[test]
    fn test_deposit_and_queries() {
        let node = node();

        let ev = node.deposit(addr(2), U256::UNIT).unwrap();
        assert_eq!(ev.minted, U256::from(100_000_000_000_000_000_000_000u128));
        assert_eq!(node.treasury_balance(), U256::UNIT);
        assert_eq!(node.voting_power_of(addr(2)), ev.minted);
        assert_eq!(node.total_supply(), ev.minted);
    }

    #[test]
    fn test_create_vote_and_read_back() {
        let node = node();
        node.deposit(addr(2), U256::UNIT).unwrap();

        let created = node
            .create_proposal(
                addr(2),
                addr(8),
                U256::from(100u64),
                "Fund relays".to_string(),
                0,
            )
            .unwrap();
        assert_eq!(created.proposal_id, 1);
        assert_eq!(node.proposal_count(), 1);

        node.vote(addr(2), 1, true).unwrap();
        assert!(node.has_voted(1, addr(2)).unwrap());
        assert!(node.get_vote_choice(1, addr(2)).unwrap());
        assert!(node.has_proposal_passed(1).unwrap());

        let proposal = node.get_proposal(1).unwrap();
        assert_eq!(proposal.for_votes, node.total_supply());

        // Premature execution: the window is still open
        assert_eq!(
            node.execute_proposal(1).unwrap_err(),
            GovernanceError::VotingPeriodNotEnded
        );
    }

    #[test]
    fn test_rights_surface() {
        let node = node();
        node.mint_rights(addr(1), addr(2), U256::from(1_000u64)).unwrap();
        node.transfer_rights(addr(2), addr(3), U256::from(400u64)).unwrap();
        node.burn_rights(addr(3), U256::from(100u64)).unwrap();

        assert_eq!(node.voting_power_of(addr(2)), U256::from(600u64));
        assert_eq!(node.voting_power_of(addr(3)), U256::from(300u64));
        assert_eq!(node.total_supply(), U256::from(900u64));
    }

    #[test]
    fn test_budget_surface() {
        let node = node();
        assert_eq!(node.categories().len(), 7);

        let budget_id = node
            .create_budget(
                addr(1),
                "Grants".to_string(),
                U256::from(1_000u64),
                0,
                u64::MAX,
            )
            .unwrap();
        let initiative_id = node
            .propose_initiative(
                "Relay grants".to_string(),
                "Grants".to_string(),
                "Support relay operators".to_string(),
                U256::from(500u64),
                addr(8),
            )
            .unwrap();
        node.approve_initiative(addr(1), initiative_id, U256::from(500u64))
            .unwrap();
        node.link_proposal(addr(1), initiative_id, 1).unwrap();

        assert_eq!(node.get_budget(budget_id).unwrap().spent, U256::ZERO);
        assert!(node.get_initiative(initiative_id).unwrap().approved);
    }
}
