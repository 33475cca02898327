//! Governance engine parameters.

use agora_types::Timestamp;

/// Seconds in one day.
const DAY: Timestamp = 24 * 60 * 60;

/// Engine configuration.
///
/// The defaults carry the canonical thresholds: 10% of total supply as
/// quorum, 51% of votes cast as majority, 3-day default voting period
/// bounded by [1 minute, 30 days].
#[derive(Debug, Clone)]
pub struct GovernanceConfig {
    /// Quorum as a percentage of *total supply* that must have voted
    pub quorum_percent: u64,
    /// Majority as a percentage of *votes cast* that must be in favor
    pub majority_percent: u64,
    /// Voting period applied when the caller supplies zero
    pub default_voting_period: Timestamp,
    /// Shortest accepted nonzero voting period
    pub min_voting_period: Timestamp,
    /// Longest accepted voting period
    pub max_voting_period: Timestamp,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            quorum_percent: 10,
            majority_percent: 51,
            default_voting_period: 3 * DAY,
            min_voting_period: 60,
            max_voting_period: 30 * DAY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GovernanceConfig::default();
        assert_eq!(config.quorum_percent, 10);
        assert_eq!(config.majority_percent, 51);
        assert_eq!(config.default_voting_period, 259_200);
        assert_eq!(config.min_voting_period, 60);
        assert_eq!(config.max_voting_period, 2_592_000);
    }
}
