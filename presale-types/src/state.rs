use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::primitives::*;

/// Ledger-wide aggregates, mutated only inside the same commit as the
/// stakes they describe.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub struct GlobalCounters {
    /// Cumulative invested value in stable-currency units (hardcap basis).
    pub total_invested: Amount,
    /// Cumulative staking tokens sold into stakes.
    pub total_distributed: Amount,
    pub staker_count: u64,
    /// Number of stakes ever opened; the next stake id is `stake_count + 1`.
    pub stake_count: u64,
    /// Net rewards paid directly to stakers.
    pub total_rewards_paid: Amount,
    /// Referral balances credited by fan-out.
    pub total_referral_credited: Amount,
    pub total_principal_returned: Amount,
}

/// Balances held by the ledger on behalf of the operator.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub struct Treasury {
    /// Staking tokens available for sale.
    pub staking_inventory: Amount,
    /// Principal backing open stakes.
    pub locked_principal: Amount,
    /// Reward asset available for yield and referral payouts.
    pub reward_reserve: Amount,
    pub native_payments: Amount,
    pub stable_payments: Amount,
}

impl Treasury {
    pub fn payments(&self, currency: Currency) -> Amount {
        match currency {
            Currency::Native => self.native_payments,
            Currency::Stable => self.stable_payments,
        }
    }

    pub fn payments_mut(&mut self, currency: Currency) -> &mut Amount {
        match currency {
            Currency::Native => &mut self.native_payments,
            Currency::Stable => &mut self.stable_payments,
        }
    }

    /// Current balance of a withdrawable reserve.
    pub fn balance(&self, asset: ReserveAsset) -> Amount {
        match asset {
            ReserveAsset::StakingInventory => self.staking_inventory,
            ReserveAsset::Rewards => self.reward_reserve,
            ReserveAsset::Payments(c) => self.payments(c),
        }
    }

    pub fn balance_mut(&mut self, asset: ReserveAsset) -> &mut Amount {
        match asset {
            ReserveAsset::StakingInventory => &mut self.staking_inventory,
            ReserveAsset::Rewards => &mut self.reward_reserve,
            ReserveAsset::Payments(c) => self.payments_mut(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_accessors() {
        let mut t = Treasury::default();
        *t.balance_mut(ReserveAsset::Payments(Currency::Native)) += 7;
        *t.balance_mut(ReserveAsset::Rewards) += 3;
        assert_eq!(t.native_payments, 7);
        assert_eq!(t.balance(ReserveAsset::Rewards), 3);
        assert_eq!(t.payments(Currency::Stable), 0);
    }
}
