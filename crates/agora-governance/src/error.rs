use agora_ledger::LedgerError;
use agora_types::U256;
use thiserror::Error;

/// Errors that can occur in governance operations.
///
/// Every error is a rejection of the attempted state transition; no
/// operation leaves partial state behind.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GovernanceError {
    #[error("Proposal not found: {0}")]
    ProposalNotFound(u64),

    #[error("Proposal already executed")]
    AlreadyExecuted,

    #[error("Voting period has closed")]
    VotingClosed,

    #[error("Voting period not ended")]
    VotingPeriodNotEnded,

    #[error("Proposal did not pass")]
    ProposalDidNotPass,

    #[error("Already voted")]
    AlreadyVoted,

    #[error("Account has not voted on this proposal")]
    NotVoted,

    #[error("Caller holds no voting-rights tokens")]
    NotATokenHolder,

    #[error("No voting power")]
    NoVotingPower,

    #[error("Description must be nonempty")]
    EmptyDescription,

    #[error("Name must be nonempty")]
    EmptyName,

    #[error("Invalid recipient: zero address")]
    InvalidRecipient,

    #[error("Amount must be nonzero")]
    ZeroAmount,

    #[error("Voting duration out of range: {0} seconds")]
    DurationOutOfRange(u64),

    #[error("Requested amount exceeds treasury balance: have {have}, need {need}")]
    InsufficientTreasuryBalance { have: U256, need: U256 },

    #[error("Execution already in progress")]
    ReentrantExecution,

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Category already listed: {0}")]
    DuplicateCategory(String),

    #[error("Budget not found: {0}")]
    BudgetNotFound(u64),

    #[error("Initiative not found: {0}")]
    InitiativeNotFound(u64),

    #[error("Initiative already approved")]
    AlreadyApproved,

    #[error("Initiative not approved")]
    NotApproved,

    #[error("Initiative already linked to proposal {0}")]
    AlreadyLinked(u64),

    #[error("Initiative already funded")]
    AlreadyFunded,

    #[error("Approved amount exceeds requested amount")]
    ApprovalExceedsRequest,

    #[error("Budget exceeded: {spent} spent + {amount} over allocation {allocated}")]
    BudgetExceeded {
        spent: U256,
        amount: U256,
        allocated: U256,
    },

    #[error("No budget matches the initiative category: {0}")]
    CategoryMismatch(String),

    #[error("No active budget covers the current period")]
    NoActiveBudget,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
