use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::primitives::*;

/// A lock tier: yield, lock length and entry minimum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct StakePlan {
    /// Annual yield in basis points (8000 = 80%).
    pub apy_bps: BasisPoints,
    /// Lock duration in seconds.
    pub lock_duration: u64,
    /// Tier-specific minimum principal.
    pub min_stake_amount: Amount,
}

/// Where a stake is in its lifecycle at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakeStatus {
    Open,
    LockExpired,
    FullyWithdrawn,
}

/// A single principal commitment under one plan.
///
/// Plan parameters are copied in at open time so later admin changes never
/// alter an existing position.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Stake {
    pub id: StakeId,
    pub staker: Address,
    pub plan_index: PlanIndex,
    pub apy_bps: BasisPoints,
    pub lock_duration: u64,
    /// Staking tokens credited.
    pub principal: Amount,
    /// Payment spent, in `currency` base units.
    pub invested_value: Amount,
    pub currency: Currency,
    pub opened_at: Timestamp,
    pub last_claim_at: Timestamp,
    /// Gross rewards accounted on this stake (before referral shares).
    pub claimed_rewards: Amount,
    /// Zero until the first principal withdrawal.
    pub withdrawal_started_at: Timestamp,
    /// 0..=100, only ever increases.
    pub withdrawn_percentage: u8,
    pub total_withdrawn_amount: Amount,
    pub closed: bool,
    pub referrer: Option<Address>,
}

impl Stake {
    /// Instant at which the lock expires.
    pub fn lock_end(&self) -> Timestamp {
        self.opened_at.saturating_add(self.lock_duration)
    }

    pub fn is_lock_expired(&self, now: Timestamp) -> bool {
        now >= self.lock_end()
    }

    /// Principal not yet returned to the staker.
    pub fn remaining_principal(&self) -> Amount {
        self.principal.saturating_sub(self.total_withdrawn_amount)
    }

    pub fn status(&self, now: Timestamp) -> StakeStatus {
        if self.closed {
            StakeStatus::FullyWithdrawn
        } else if self.is_lock_expired(now) {
            StakeStatus::LockExpired
        } else {
            StakeStatus::Open
        }
    }
}

/// Per-address aggregate, created lazily on the first stake and never removed.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Staker {
    pub address: Address,
    /// Position in the staker registry (insertion order).
    pub index: u64,
    /// Set on the first stake and immutable afterwards.
    pub referrer: Option<Address>,
    /// Sum of the principal of stakes that are not closed.
    pub total_principal: Amount,
    pub total_invested: Amount,
    /// Append-only list of the staker's positions.
    pub stake_ids: Vec<StakeId>,
    pub created_at: Timestamp,
}

impl Staker {
    pub fn new(address: Address, index: u64, referrer: Option<Address>, now: Timestamp) -> Self {
        Self {
            address,
            index,
            referrer,
            total_principal: 0,
            total_invested: 0,
            stake_ids: Vec::new(),
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stake() -> Stake {
        Stake {
            id: 1,
            staker: [1u8; 20],
            plan_index: 0,
            apy_bps: 8_000,
            lock_duration: 100,
            principal: 1_000,
            invested_value: 1_000,
            currency: Currency::Stable,
            opened_at: 50,
            last_claim_at: 50,
            claimed_rewards: 0,
            withdrawal_started_at: 0,
            withdrawn_percentage: 0,
            total_withdrawn_amount: 0,
            closed: false,
            referrer: None,
        }
    }

    #[test]
    fn test_status_transitions() {
        let mut stake = sample_stake();
        assert_eq!(stake.status(149), StakeStatus::Open);
        assert_eq!(stake.status(150), StakeStatus::LockExpired);
        stake.closed = true;
        assert_eq!(stake.status(150), StakeStatus::FullyWithdrawn);
    }

    #[test]
    fn test_remaining_principal() {
        let mut stake = sample_stake();
        stake.total_withdrawn_amount = 300;
        assert_eq!(stake.remaining_principal(), 700);
    }
}
