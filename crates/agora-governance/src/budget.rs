//! Category budgets and initiative funding.
//!
//! Budgets are category-scoped spending ceilings; initiatives are funding
//! requests that ride on proposal execution. The tracker has no voting or
//! deadlines of its own: it only reacts to execution outcomes reported by
//! the node.

use agora_types::{Address, Timestamp, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::GovernanceError;

/// Categories preloaded into every tracker.
pub const DEFAULT_CATEGORIES: [&str; 7] = [
    "Grants",
    "Security",
    "Marketing",
    "Research & Development",
    "Operations",
    "Emergency",
    "Other",
];

/// An allow-listed spending category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub active: bool,
}

/// A category-scoped spending ceiling over a date window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: u64,
    pub category: String,
    pub allocated: U256,
    pub spent: U256,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub active: bool,
}

/// A funding request working its way toward a linked proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Initiative {
    pub id: u64,
    pub name: String,
    pub category: String,
    pub description: String,
    pub requested_amount: U256,
    pub approved_amount: U256,
    pub recipient: Address,
    pub approved: bool,
    pub funded: bool,
    pub linked_proposal: Option<u64>,
}

/// Emitted when a linked proposal's execution funds an initiative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiativeFunded {
    pub initiative_id: u64,
    pub proposal_id: u64,
    pub budget_id: u64,
    pub amount: U256,
}

/// Budget and initiative state.
#[derive(Debug)]
pub struct BudgetTracker {
    owner: Address,
    categories: Vec<Category>,
    budgets: HashMap<u64, Budget>,
    next_budget_id: u64,
    initiatives: HashMap<u64, Initiative>,
    next_initiative_id: u64,
}

impl BudgetTracker {
    /// Create a tracker preloaded with the default categories.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            categories: DEFAULT_CATEGORIES
                .iter()
                .map(|name| Category {
                    name: name.to_string(),
                    active: true,
                })
                .collect(),
            budgets: HashMap::new(),
            next_budget_id: 1,
            initiatives: HashMap::new(),
            next_initiative_id: 1,
        }
    }

    fn require_owner(&self, caller: Address) -> Result<(), GovernanceError> {
        if caller != self.owner {
            return Err(GovernanceError::Unauthorized(
                "only the owner may manage budgets".to_string(),
            ));
        }
        Ok(())
    }

    fn category_listed(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c.name == name && c.active)
    }

    /// The category allow-list.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Add a category to the allow-list. Owner only.
    pub fn add_category(&mut self, caller: Address, name: String) -> Result<(), GovernanceError> {
        self.require_owner(caller)?;
        if name.is_empty() {
            return Err(GovernanceError::EmptyName);
        }
        if self.categories.iter().any(|c| c.name == name) {
            return Err(GovernanceError::DuplicateCategory(name));
        }
        self.categories.push(Category { name, active: true });
        Ok(())
    }

    /// Toggle a category. Owner only, idempotent.
    pub fn set_category_active(
        &mut self,
        caller: Address,
        name: &str,
        active: bool,
    ) -> Result<(), GovernanceError> {
        self.require_owner(caller)?;
        let category = self
            .categories
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| GovernanceError::UnknownCategory(name.to_string()))?;
        category.active = active;
        Ok(())
    }

    /// Create a spending ceiling for a category over a date window. Owner only.
    pub fn create_budget(
        &mut self,
        caller: Address,
        category: String,
        allocated: U256,
        start_date: Timestamp,
        end_date: Timestamp,
    ) -> Result<u64, GovernanceError> {
        self.require_owner(caller)?;
        if allocated.is_zero() {
            return Err(GovernanceError::ZeroAmount);
        }
        if !self.category_listed(&category) {
            return Err(GovernanceError::UnknownCategory(category));
        }

        let id = self.next_budget_id;
        self.next_budget_id += 1;
        self.budgets.insert(
            id,
            Budget {
                id,
                category,
                allocated,
                spent: U256::ZERO,
                start_date,
                end_date,
                active: true,
            },
        );
        Ok(id)
    }

    /// Deactivate a budget. Owner only.
    pub fn set_budget_active(
        &mut self,
        caller: Address,
        budget_id: u64,
        active: bool,
    ) -> Result<(), GovernanceError> {
        self.require_owner(caller)?;
        let budget = self
            .budgets
            .get_mut(&budget_id)
            .ok_or(GovernanceError::BudgetNotFound(budget_id))?;
        budget.active = active;
        Ok(())
    }

    /// Get a budget.
    pub fn budget(&self, budget_id: u64) -> Option<&Budget> {
        self.budgets.get(&budget_id)
    }

    /// Propose an initiative. Open to anyone.
    pub fn propose_initiative(
        &mut self,
        name: String,
        category: String,
        description: String,
        requested_amount: U256,
        recipient: Address,
    ) -> Result<u64, GovernanceError> {
        if name.is_empty() {
            return Err(GovernanceError::EmptyName);
        }
        if description.is_empty() {
            return Err(GovernanceError::EmptyDescription);
        }
        if requested_amount.is_zero() {
            return Err(GovernanceError::ZeroAmount);
        }
        if recipient.is_zero() {
            return Err(GovernanceError::InvalidRecipient);
        }
        if !self.category_listed(&category) {
            return Err(GovernanceError::UnknownCategory(category));
        }

        let id = self.next_initiative_id;
        self.next_initiative_id += 1;
        self.initiatives.insert(
            id,
            Initiative {
                id,
                name,
                category,
                description,
                requested_amount,
                approved_amount: U256::ZERO,
                recipient,
                approved: false,
                funded: false,
                linked_proposal: None,
            },
        );
        Ok(id)
    }

    /// Approve an initiative for at most its requested amount. Owner only.
    pub fn approve_initiative(
        &mut self,
        caller: Address,
        initiative_id: u64,
        amount: U256,
    ) -> Result<(), GovernanceError> {
        self.require_owner(caller)?;
        let initiative = self
            .initiatives
            .get_mut(&initiative_id)
            .ok_or(GovernanceError::InitiativeNotFound(initiative_id))?;
        if initiative.approved {
            return Err(GovernanceError::AlreadyApproved);
        }
        if amount.is_zero() {
            return Err(GovernanceError::ZeroAmount);
        }
        if amount > initiative.requested_amount {
            return Err(GovernanceError::ApprovalExceedsRequest);
        }
        initiative.approved = true;
        initiative.approved_amount = amount;
        Ok(())
    }

    /// Link an approved initiative to an engine proposal. Owner only.
    pub fn link_proposal(
        &mut self,
        caller: Address,
        initiative_id: u64,
        proposal_id: u64,
    ) -> Result<(), GovernanceError> {
        self.require_owner(caller)?;
        let initiative = self
            .initiatives
            .get_mut(&initiative_id)
            .ok_or(GovernanceError::InitiativeNotFound(initiative_id))?;
        if !initiative.approved {
            return Err(GovernanceError::NotApproved);
        }
        if let Some(existing) = initiative.linked_proposal {
            return Err(GovernanceError::AlreadyLinked(existing));
        }
        initiative.linked_proposal = Some(proposal_id);
        Ok(())
    }

    /// Get an initiative.
    pub fn initiative(&self, initiative_id: u64) -> Option<&Initiative> {
        self.initiatives.get(&initiative_id)
    }

    /// React to a proposal's successful execution.
    ///
    /// If an initiative is linked to the proposal, mark it funded and debit
    /// the active budget covering `now` in the initiative's category.
    /// Returns `Ok(None)` when no initiative is linked.
    pub fn record_execution(
        &mut self,
        proposal_id: u64,
        now: Timestamp,
    ) -> Result<Option<InitiativeFunded>, GovernanceError> {
        let initiative_id = match self
            .initiatives
            .values()
            .find(|i| i.linked_proposal == Some(proposal_id))
            .map(|i| i.id)
        {
            Some(id) => id,
            None => return Ok(None),
        };

        let (category, amount) = {
            let initiative = &self.initiatives[&initiative_id];
            if initiative.funded {
                return Err(GovernanceError::AlreadyFunded);
            }
            (initiative.category.clone(), initiative.approved_amount)
        };

        // Locate the covering budget: window first, then category
        let mut covering = self
            .budgets
            .values_mut()
            .filter(|b| b.active && b.start_date <= now && now <= b.end_date)
            .peekable();
        if covering.peek().is_none() {
            return Err(GovernanceError::NoActiveBudget);
        }
        let budget = covering
            .find(|b| b.category == category)
            .ok_or_else(|| GovernanceError::CategoryMismatch(category.clone()))?;

        let new_spent = budget.spent.saturating_add(&amount);
        if new_spent > budget.allocated {
            return Err(GovernanceError::BudgetExceeded {
                spent: budget.spent,
                amount,
                allocated: budget.allocated,
            });
        }
        budget.spent = new_spent;
        let budget_id = budget.id;

        let initiative = self
            .initiatives
            .get_mut(&initiative_id)
            .ok_or(GovernanceError::InitiativeNotFound(initiative_id))?;
        initiative.funded = true;

        Ok(Some(InitiativeFunded {
            initiative_id,
            proposal_id,
            budget_id,
            amount,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::from_bytes([n; 20])
    }

    fn tracker() -> (BudgetTracker, Address) {
        let owner = addr(1);
        (BudgetTracker::new(owner), owner)
    }

    fn approved_linked_initiative(
        tracker: &mut BudgetTracker,
        owner: Address,
        category: &str,
        amount: u64,
        proposal_id: u64,
    ) -> u64 {
        let id = tracker
            .propose_initiative(
                "Node operator grants".to_string(),
                category.to_string(),
                "Quarterly operator support".to_string(),
                U256::from(amount),
                addr(9),
            )
            .unwrap();
        tracker.approve_initiative(owner, id, U256::from(amount)).unwrap();
        tracker.link_proposal(owner, id, proposal_id).unwrap();
        id
    }

    #[test]
    fn test_default_categories_preloaded() {
        let (tracker, _) = tracker();
        assert_eq!(tracker.categories().len(), 7);
        assert!(tracker.category_listed("Grants"));
        assert!(tracker.category_listed("Other"));
    }

    #[test]
    fn test_add_category() {
        let (mut tracker, owner) = tracker();

        assert!(tracker.add_category(addr(9), "Infra".to_string()).is_err());
        tracker.add_category(owner, "Infra".to_string()).unwrap();
        assert!(tracker.category_listed("Infra"));

        let err = tracker.add_category(owner, "Infra".to_string()).unwrap_err();
        assert_eq!(err, GovernanceError::DuplicateCategory("Infra".to_string()));
    }

    #[test]
    fn test_deactivated_category_rejected() {
        let (mut tracker, owner) = tracker();
        tracker.set_category_active(owner, "Marketing", false).unwrap();

        let err = tracker
            .create_budget(owner, "Marketing".to_string(), U256::from(100u64), 0, 10)
            .unwrap_err();
        assert!(matches!(err, GovernanceError::UnknownCategory(_)));
    }

    #[test]
    fn test_initiative_workflow() {
        let (mut tracker, owner) = tracker();

        let id = tracker
            .propose_initiative(
                "Audit".to_string(),
                "Security".to_string(),
                "External audit of the release path".to_string(),
                U256::from(500u64),
                addr(9),
            )
            .unwrap();
        assert_eq!(id, 1);

        // Approval above request is rejected
        let err = tracker
            .approve_initiative(owner, id, U256::from(600u64))
            .unwrap_err();
        assert_eq!(err, GovernanceError::ApprovalExceedsRequest);

        tracker.approve_initiative(owner, id, U256::from(400u64)).unwrap();
        let initiative = tracker.initiative(id).unwrap();
        assert!(initiative.approved);
        assert_eq!(initiative.approved_amount, U256::from(400u64));

        assert_eq!(
            tracker.approve_initiative(owner, id, U256::from(1u64)).unwrap_err(),
            GovernanceError::AlreadyApproved
        );

        tracker.link_proposal(owner, id, 7).unwrap();
        assert_eq!(
            tracker.link_proposal(owner, id, 8).unwrap_err(),
            GovernanceError::AlreadyLinked(7)
        );
    }

    #[test]
    fn test_link_requires_approval() {
        let (mut tracker, owner) = tracker();
        let id = tracker
            .propose_initiative(
                "Audit".to_string(),
                "Security".to_string(),
                "External audit".to_string(),
                U256::from(500u64),
                addr(9),
            )
            .unwrap();
        assert_eq!(
            tracker.link_proposal(owner, id, 7).unwrap_err(),
            GovernanceError::NotApproved
        );
    }

    #[test]
    fn test_record_execution_funds_initiative() {
        let (mut tracker, owner) = tracker();
        let budget_id = tracker
            .create_budget(owner, "Security".to_string(), U256::from(1_000u64), 0, 100)
            .unwrap();
        let id = approved_linked_initiative(&mut tracker, owner, "Security", 400, 7);

        let funded = tracker.record_execution(7, 50).unwrap().unwrap();
        assert_eq!(funded.initiative_id, id);
        assert_eq!(funded.budget_id, budget_id);
        assert_eq!(funded.amount, U256::from(400u64));

        assert!(tracker.initiative(id).unwrap().funded);
        assert_eq!(tracker.budget(budget_id).unwrap().spent, U256::from(400u64));

        // A second execution report is rejected
        assert_eq!(
            tracker.record_execution(7, 51).unwrap_err(),
            GovernanceError::AlreadyFunded
        );
    }

    #[test]
    fn test_record_execution_unlinked_proposal() {
        let (mut tracker, _) = tracker();
        assert_eq!(tracker.record_execution(99, 50).unwrap(), None);
    }

    #[test]
    fn test_record_execution_budget_exceeded() {
        let (mut tracker, owner) = tracker();
        tracker
            .create_budget(owner, "Security".to_string(), U256::from(300u64), 0, 100)
            .unwrap();
        approved_linked_initiative(&mut tracker, owner, "Security", 400, 7);

        let err = tracker.record_execution(7, 50).unwrap_err();
        assert!(matches!(err, GovernanceError::BudgetExceeded { .. }));
        // Nothing was debited or marked
        assert!(!tracker.initiative(1).unwrap().funded);
        assert_eq!(tracker.budget(1).unwrap().spent, U256::ZERO);
    }

    #[test]
    fn test_record_execution_category_mismatch() {
        let (mut tracker, owner) = tracker();
        tracker
            .create_budget(owner, "Marketing".to_string(), U256::from(1_000u64), 0, 100)
            .unwrap();
        approved_linked_initiative(&mut tracker, owner, "Security", 400, 7);

        let err = tracker.record_execution(7, 50).unwrap_err();
        assert_eq!(err, GovernanceError::CategoryMismatch("Security".to_string()));
    }

    #[test]
    fn test_record_execution_no_active_budget() {
        let (mut tracker, owner) = tracker();
        // Budget window closed before the execution time
        tracker
            .create_budget(owner, "Security".to_string(), U256::from(1_000u64), 0, 40)
            .unwrap();
        approved_linked_initiative(&mut tracker, owner, "Security", 400, 7);

        let err = tracker.record_execution(7, 50).unwrap_err();
        assert_eq!(err, GovernanceError::NoActiveBudget);
    }
}
