use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::primitives::*;
use crate::stake::StakePlan;

/// Base (launch-time) price per whole staking token, per payment currency.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct BasePrices {
    pub native: Amount,
    pub stable: Amount,
}

impl BasePrices {
    pub fn get(&self, currency: Currency) -> Amount {
        match currency {
            Currency::Native => self.native,
            Currency::Stable => self.stable,
        }
    }
}

/// Rules for the referral cascade.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct ReferralPolicy {
    /// Ancestors whose total principal is below this receive nothing.
    pub min_qualifying_stake: Amount,
    /// Reject unqualified referrers when a stake is opened.
    pub require_qualified_referrer: bool,
}

/// Global stake bounds shared by every plan.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct StakeLimits {
    pub global_minimum: Amount,
    pub maximum: Amount,
}

/// Versioned, owner-configurable ledger parameters.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Incremented on every accepted administrative update.
    pub revision: u64,
    pub owner: Address,
    pub paused: bool,
    /// Reference point for price escalation.
    pub launch_time: Timestamp,
    /// Stakes are refused before this instant.
    pub start_time: Timestamp,
    pub base_prices: BasePrices,
    /// Maximum cumulative invested value, in stable-currency units.
    pub hardcap: Amount,
    pub plans: [StakePlan; PLAN_COUNT],
    pub limits: StakeLimits,
    pub referral: ReferralPolicy,
}

impl LedgerConfig {
    /// Default parameter set: three tiers (26/52/104 weeks at 80/100/120% APY).
    pub fn new(owner: Address, launch_time: Timestamp, base_prices: BasePrices) -> Self {
        let plans = std::array::from_fn(|i| StakePlan {
            apy_bps: DEFAULT_APY_BPS[i],
            lock_duration: DEFAULT_LOCK_WEEKS[i] * WEEK,
            min_stake_amount: DEFAULT_TIER_MINIMUM_TOKENS[i] * ONE_TOKEN,
        });
        Self {
            revision: 0,
            owner,
            paused: false,
            launch_time,
            start_time: launch_time,
            base_prices,
            hardcap: 100_000_000 * ONE_TOKEN,
            plans,
            limits: StakeLimits {
                global_minimum: DEFAULT_TIER_MINIMUM_TOKENS[0] * ONE_TOKEN,
                maximum: DEFAULT_MAX_STAKE_TOKENS * ONE_TOKEN,
            },
            referral: ReferralPolicy {
                min_qualifying_stake: 0,
                require_qualified_referrer: false,
            },
        }
    }

    pub fn plan(&self, index: PlanIndex) -> Option<&StakePlan> {
        self.plans.get(index as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan_table() {
        let cfg = LedgerConfig::new(
            [1u8; 20],
            0,
            BasePrices {
                native: ONE_TOKEN / 10,
                stable: 30 * ONE_TOKEN,
            },
        );
        assert_eq!(cfg.plans[0].lock_duration, 26 * WEEK);
        assert_eq!(cfg.plans[2].apy_bps, 12_000);
        assert_eq!(cfg.limits.global_minimum, cfg.plans[0].min_stake_amount);
        assert!(cfg.plan(3).is_none());
        assert_eq!(cfg.base_prices.get(Currency::Stable), 30 * ONE_TOKEN);
    }
}
