use thiserror::Error;

use crate::primitives::{Amount, PlanIndex, StakeId, Timestamp};

/// Which minimum a stake request fell short of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinimumScope {
    Global,
    Tier(PlanIndex),
}

impl std::fmt::Display for MinimumScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MinimumScope::Global => f.write_str("global minimum"),
            MinimumScope::Tier(i) => write!(f, "minimum for plan {}", i),
        }
    }
}

/// Every rejection the staking ledger can produce.
///
/// All variants are terminal user errors: nothing inside the ledger retries,
/// and a rejected command leaves no partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ─── Stake Creation ──────────────────────────────────────────────────────
    #[error("staker already has a stake record for this slot")]
    AlreadyStaked,

    #[error("circular or self referral")]
    CircularOrSelfReferral,

    #[error("hardcap reached: invested {invested} + {requested} > cap {hardcap}")]
    HardcapReached {
        invested: Amount,
        requested: Amount,
        hardcap: Amount,
    },

    #[error("invalid address")]
    InvalidAddress,

    #[error("invalid price: current price is zero")]
    InvalidPrice,

    #[error("invalid plan index: {0}")]
    InvalidPlanIndex(PlanIndex),

    #[error("amount {amount} below {scope} of {minimum}")]
    BelowMinimumStake {
        amount: Amount,
        minimum: Amount,
        scope: MinimumScope,
    },

    #[error("amount {amount} above maximum stake {maximum}")]
    AboveMaximumStake { amount: Amount, maximum: Amount },

    #[error("sale has not started: starts at {start_time}, now {now}")]
    NotYetStarted { start_time: Timestamp, now: Timestamp },

    #[error("no payment tokens")]
    NoPaymentTokens,

    #[error("not enough staking tokens: available {available}, need {required}")]
    NoStakingTokens { available: Amount, required: Amount },

    #[error("referrer not qualified: total stake {total} below {required}")]
    ReferrerNotQualified { total: Amount, required: Amount },

    // ─── Stake Lifecycle ─────────────────────────────────────────────────────
    #[error("stake not found: {0}")]
    StakeNotFound(StakeId),

    #[error("stake already withdrawn")]
    AlreadyWithdrawn,

    #[error("lock period not over: unlocks at {unlocks_at}, now {now}")]
    LockStillActive { unlocks_at: Timestamp, now: Timestamp },

    #[error("can claim rewards weekly: next claim at {next_claim_at}")]
    TooSoonToClaim { next_claim_at: Timestamp },

    #[error("no rewards left to claim")]
    NothingToClaim,

    #[error("no new amount available to withdraw")]
    NothingToWithdraw,

    #[error("insufficient reserve: have {available}, need {required}")]
    InsufficientReserve { available: Amount, required: Amount },

    // ─── Administration ──────────────────────────────────────────────────────
    #[error("caller is not the owner")]
    Unauthorized,

    #[error("ledger is paused")]
    Paused,

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // ─── Engine ──────────────────────────────────────────────────────────────
    #[error("changeset prepared at version {prepared}, ledger is at {current}")]
    StaleChangeset { prepared: u64, current: u64 },

    #[error("arithmetic overflow")]
    ArithmeticOverflow,
}

impl LedgerError {
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        LedgerError::InvalidConfig {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_minimum_display_names_scope() {
        let err = LedgerError::BelowMinimumStake {
            amount: 25_000,
            minimum: 30_000,
            scope: MinimumScope::Tier(1),
        };
        let msg = err.to_string();
        assert!(msg.contains("minimum for plan 1"));
        assert!(msg.contains("25000"));
    }

    #[test]
    fn test_invalid_config_helper() {
        let err = LedgerError::invalid_config("APY too high");
        assert_eq!(err.to_string(), "invalid configuration: APY too high");
    }

    #[test]
    fn test_too_soon_display() {
        let err = LedgerError::TooSoonToClaim {
            next_claim_at: 604_800,
        };
        assert!(err.to_string().starts_with("can claim rewards weekly"));
    }
}
