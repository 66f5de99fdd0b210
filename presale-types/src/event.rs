use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::primitives::*;

/// A fact recorded by a committed command.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// First stake of an address registered it as a staker.
    StakerAdded {
        staker: Address,
        referrer: Option<Address>,
        index: u64,
    },
    Staked {
        staker: Address,
        stake_id: StakeId,
        plan_index: PlanIndex,
        currency: Currency,
        payment: Amount,
        principal: Amount,
    },
    /// `gross` is the accrued reward; `net` is what reached the staker after
    /// referral shares.
    RewardsClaimed {
        staker: Address,
        stake_id: StakeId,
        weeks: u64,
        gross: Amount,
        net: Amount,
    },
    ReferralCredited {
        referrer: Address,
        from: Address,
        level: u8,
        amount: Amount,
    },
    Withdrawn {
        staker: Address,
        stake_id: StakeId,
        amount: Amount,
        withdrawn_percentage: u8,
        closed: bool,
    },
    ReferralRewardsWithdrawn {
        referrer: Address,
        amount: Amount,
    },
    StakePlanUpdated {
        plan_index: PlanIndex,
        apy_bps: BasisPoints,
        lock_duration: u64,
        min_stake_amount: Amount,
    },
    ConfigUpdated {
        revision: u64,
        field: String,
    },
    /// A treasury balance moved by an operator action.
    ReservesChanged {
        asset: ReserveAsset,
        delta: i128,
        balance: Amount,
    },
    Paused,
    Unpaused,
    OwnershipTransferred {
        previous: Address,
        new_owner: Address,
    },
}

impl LedgerEvent {
    /// Short name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerEvent::StakerAdded { .. } => "staker_added",
            LedgerEvent::Staked { .. } => "staked",
            LedgerEvent::RewardsClaimed { .. } => "rewards_claimed",
            LedgerEvent::ReferralCredited { .. } => "referral_credited",
            LedgerEvent::Withdrawn { .. } => "withdrawn",
            LedgerEvent::ReferralRewardsWithdrawn { .. } => "referral_rewards_withdrawn",
            LedgerEvent::StakePlanUpdated { .. } => "stake_plan_updated",
            LedgerEvent::ConfigUpdated { .. } => "config_updated",
            LedgerEvent::ReservesChanged { .. } => "reserves_changed",
            LedgerEvent::Paused => "paused",
            LedgerEvent::Unpaused => "unpaused",
            LedgerEvent::OwnershipTransferred { .. } => "ownership_transferred",
        }
    }
}
