use serde::Serialize;

use presale_types::config::{BasePrices, ReferralPolicy};
use presale_types::constants::PLAN_COUNT;
use presale_types::primitives::*;
use presale_types::stake::StakePlan;

/// A state-changing request submitted to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    OpenStake {
        staker: Address,
        plan_index: PlanIndex,
        currency: Currency,
        payment: Amount,
        /// `None` or the zero address means no referrer.
        referrer: Option<Address>,
    },
    ClaimRewards {
        staker: Address,
        stake_id: StakeId,
    },
    WithdrawPrincipal {
        staker: Address,
        stake_id: StakeId,
    },
    WithdrawReferralRewards {
        staker: Address,
    },
    /// Owner-only operation.
    Admin {
        caller: Address,
        action: AdminAction,
    },
}

/// Operations reserved to the ledger owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AdminAction {
    SetPlan {
        plan_index: PlanIndex,
        plan: StakePlan,
    },
    UpdateMinimumStakeAmounts {
        minimums: [Amount; PLAN_COUNT],
    },
    UpdateGlobalMinimum {
        minimum: Amount,
    },
    UpdateMaxStakeAmount {
        maximum: Amount,
    },
    UpdatePrices {
        prices: BasePrices,
    },
    UpdateApy {
        apys: [BasisPoints; PLAN_COUNT],
    },
    /// Lock periods in whole weeks.
    UpdateLockPeriods {
        weeks: [u64; PLAN_COUNT],
    },
    UpdateHardcap {
        hardcap: Amount,
    },
    UpdateStartTime {
        start_time: Timestamp,
    },
    UpdateReferralPolicy {
        policy: ReferralPolicy,
    },
    DepositStakingTokens {
        amount: Amount,
    },
    FundRewards {
        amount: Amount,
    },
    WithdrawPayments {
        currency: Currency,
    },
    EmergencyWithdraw {
        asset: ReserveAsset,
        amount: Amount,
    },
    /// Claim every eligible stake of the stakers at
    /// `offset..offset + limit` in registration order.
    DistributeRewards {
        offset: u64,
        limit: u64,
    },
    Pause,
    Unpause,
    TransferOwnership {
        new_owner: Address,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::OpenStake { .. } => "open_stake",
            Command::ClaimRewards { .. } => "claim_rewards",
            Command::WithdrawPrincipal { .. } => "withdraw_principal",
            Command::WithdrawReferralRewards { .. } => "withdraw_referral_rewards",
            Command::Admin { action, .. } => action.name(),
        }
    }
}

impl AdminAction {
    pub fn name(&self) -> &'static str {
        match self {
            AdminAction::SetPlan { .. } => "set_plan",
            AdminAction::UpdateMinimumStakeAmounts { .. } => "update_minimum_stake_amounts",
            AdminAction::UpdateGlobalMinimum { .. } => "update_global_minimum",
            AdminAction::UpdateMaxStakeAmount { .. } => "update_max_stake_amount",
            AdminAction::UpdatePrices { .. } => "update_prices",
            AdminAction::UpdateApy { .. } => "update_apy",
            AdminAction::UpdateLockPeriods { .. } => "update_lock_periods",
            AdminAction::UpdateHardcap { .. } => "update_hardcap",
            AdminAction::UpdateStartTime { .. } => "update_start_time",
            AdminAction::UpdateReferralPolicy { .. } => "update_referral_policy",
            AdminAction::DepositStakingTokens { .. } => "deposit_staking_tokens",
            AdminAction::FundRewards { .. } => "fund_rewards",
            AdminAction::WithdrawPayments { .. } => "withdraw_payments",
            AdminAction::EmergencyWithdraw { .. } => "emergency_withdraw",
            AdminAction::DistributeRewards { .. } => "distribute_rewards",
            AdminAction::Pause => "pause",
            AdminAction::Unpause => "unpause",
            AdminAction::TransferOwnership { .. } => "transfer_ownership",
        }
    }
}
