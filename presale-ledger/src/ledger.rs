//! Stake positions: opening, reward claims and principal withdrawal.
//!
//! Every function here works on a [`Draft`]; nothing reaches committed
//! state until the engine commits the resulting changeset.

use presale_types::constants::FULL_PERCENT;
use presale_types::error::LedgerError;
use presale_types::event::LedgerEvent;
use presale_types::primitives::*;
use presale_types::stake::{Stake, Staker};

use crate::accrual::{self, Accrual};
use crate::changeset::Draft;
use crate::math::{safe_add, safe_sub};
use crate::oracle;
use crate::plans;
use crate::referral;
use crate::state::LedgerView;
use crate::treasury;

/// Result of a successful claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub weeks: u64,
    pub gross: Amount,
    /// Paid to the staker; the rest went to referral balances.
    pub net: Amount,
}

/// Parameters of an `OpenStake` request.
#[derive(Debug, Clone, Copy)]
pub struct StakeRequest {
    pub staker: Address,
    pub plan_index: PlanIndex,
    pub currency: Currency,
    pub payment: Amount,
    pub referrer: Option<Address>,
}

fn require_address(address: &Address) -> Result<(), LedgerError> {
    if *address == ZERO_ADDRESS {
        return Err(LedgerError::InvalidAddress);
    }
    Ok(())
}

/// Load a stake and check that `staker` owns it.
fn owned_stake(draft: &Draft<'_>, staker: &Address, id: StakeId) -> Result<Stake, LedgerError> {
    draft
        .stake(id)
        .filter(|s| s.staker == *staker)
        .ok_or(LedgerError::StakeNotFound(id))
}

pub(crate) fn open_stake(
    draft: &mut Draft<'_>,
    req: StakeRequest,
    now: Timestamp,
) -> Result<(StakeId, Amount), LedgerError> {
    let config = draft.config().clone();
    if now < config.start_time {
        return Err(LedgerError::NotYetStarted {
            start_time: config.start_time,
            now,
        });
    }
    require_address(&req.staker)?;
    if referral::normalize(req.referrer) == Some(req.staker) {
        return Err(LedgerError::CircularOrSelfReferral);
    }
    if req.payment == 0 {
        return Err(LedgerError::NoPaymentTokens);
    }

    let price = oracle::current_price(&config, req.currency, now)?;
    let principal = oracle::tokens_for_payment(req.payment, price)?;
    let plan = *plans::validate(&config, req.plan_index, principal)?;

    let value = oracle::stable_value(&config, req.currency, req.payment, principal, now)?;
    let invested = safe_add(draft.counters.total_invested, value)?;
    if invested > config.hardcap {
        return Err(LedgerError::HardcapReached {
            invested: draft.counters.total_invested,
            requested: value,
            hardcap: config.hardcap,
        });
    }

    let mut staker = match draft.staker(&req.staker) {
        Some(existing) => existing,
        None => register(draft, &req, now)?,
    };

    treasury::lock_principal(&mut draft.treasury, principal)?;
    treasury::collect_payment(&mut draft.treasury, req.currency, req.payment)?;

    let id = draft.counters.stake_count + 1;
    let stake = Stake {
        id,
        staker: req.staker,
        plan_index: req.plan_index,
        apy_bps: plan.apy_bps,
        lock_duration: plan.lock_duration,
        principal,
        invested_value: req.payment,
        currency: req.currency,
        opened_at: now,
        last_claim_at: now,
        claimed_rewards: 0,
        withdrawal_started_at: 0,
        withdrawn_percentage: 0,
        total_withdrawn_amount: 0,
        closed: false,
        referrer: staker.referrer,
    };

    staker.stake_ids.push(id);
    staker.total_principal = safe_add(staker.total_principal, principal)?;
    staker.total_invested = safe_add(staker.total_invested, value)?;
    draft.put_staker(staker);
    draft.put_stake(stake);

    draft.counters.total_invested = invested;
    draft.counters.total_distributed = safe_add(draft.counters.total_distributed, principal)?;
    draft.counters.stake_count = id;

    draft.emit(LedgerEvent::Staked {
        staker: req.staker,
        stake_id: id,
        plan_index: req.plan_index,
        currency: req.currency,
        payment: req.payment,
        principal,
    });
    Ok((id, principal))
}

/// First stake of an address: create the staker and its referral edge.
fn register(draft: &mut Draft<'_>, req: &StakeRequest, now: Timestamp) -> Result<Staker, LedgerError> {
    let referrer = referral::normalize(req.referrer);
    if let Some(r) = referrer {
        let policy = draft.config().referral;
        referral::check_qualified(&*draft, &policy, &r)?;
        referral::link(draft, req.staker, r)?;
    }

    let index = draft.counters.staker_count;
    let staker = Staker::new(req.staker, index, referrer, now);
    draft.register_staker(staker.clone());
    draft.counters.staker_count += 1;
    draft.emit(LedgerEvent::StakerAdded {
        staker: req.staker,
        referrer,
        index,
    });
    Ok(staker)
}

/// Account a claim on the stake record.
fn mark_claim(stake: &mut Stake, amount: Amount, at: Timestamp) -> Result<(), LedgerError> {
    stake.claimed_rewards = safe_add(stake.claimed_rewards, amount)?;
    stake.last_claim_at = at;
    Ok(())
}

pub(crate) fn claim_rewards(
    draft: &mut Draft<'_>,
    staker: Address,
    stake_id: StakeId,
    now: Timestamp,
) -> Result<ClaimReceipt, LedgerError> {
    require_address(&staker)?;
    let mut stake = owned_stake(draft, &staker, stake_id)?;
    let Accrual { weeks, amount } = accrual::claimable(&stake, now)?;

    treasury::ensure_reserve(&draft.treasury, amount)?;
    let credits = referral::fan_out(&*draft, &staker, amount)?;
    let credited = referral::credit(draft, staker, &credits)?;
    let net = safe_sub(amount, credited)?;
    // Referral shares stay in the reserve until their owners withdraw them.
    treasury::pay_reward(&mut draft.treasury, net)?;

    mark_claim(&mut stake, amount, now)?;
    draft.put_stake(stake);

    draft.counters.total_rewards_paid = safe_add(draft.counters.total_rewards_paid, net)?;
    draft.counters.total_referral_credited =
        safe_add(draft.counters.total_referral_credited, credited)?;

    draft.emit(LedgerEvent::RewardsClaimed {
        staker,
        stake_id,
        weeks,
        gross: amount,
        net,
    });
    Ok(ClaimReceipt {
        weeks,
        gross: amount,
        net,
    })
}

/// Release the newly unlocked slice of a stake's principal.
pub(crate) fn withdraw_principal(
    draft: &mut Draft<'_>,
    staker: Address,
    stake_id: StakeId,
    now: Timestamp,
) -> Result<Amount, LedgerError> {
    require_address(&staker)?;
    let mut stake = owned_stake(draft, &staker, stake_id)?;
    let slice = crate::withdrawal::next_slice(&stake, now)?;

    stake.withdrawal_started_at = slice.started_at;
    stake.withdrawn_percentage = slice.percentage;
    stake.total_withdrawn_amount = safe_add(stake.total_withdrawn_amount, slice.amount)?;
    stake.closed = slice.percentage == FULL_PERCENT;

    treasury::release_principal(&mut draft.treasury, slice.amount)?;
    draft.counters.total_principal_returned =
        safe_add(draft.counters.total_principal_returned, slice.amount)?;

    if stake.closed {
        let mut owner = draft
            .staker(&staker)
            .ok_or(LedgerError::StakeNotFound(stake_id))?;
        owner.total_principal = owner.total_principal.saturating_sub(stake.principal);
        draft.put_staker(owner);
    }

    draft.emit(LedgerEvent::Withdrawn {
        staker,
        stake_id,
        amount: slice.amount,
        withdrawn_percentage: stake.withdrawn_percentage,
        closed: stake.closed,
    });
    draft.put_stake(stake);
    Ok(slice.amount)
}

/// Pay out the caller's whole referral balance.
pub(crate) fn withdraw_referral_rewards(
    draft: &mut Draft<'_>,
    referrer: Address,
) -> Result<Amount, LedgerError> {
    require_address(&referrer)?;
    let balance = draft.referral_balance(&referrer);
    if balance == 0 {
        return Err(LedgerError::NothingToWithdraw);
    }
    treasury::pay_reward(&mut draft.treasury, balance)?;
    draft.set_referral_balance(referrer, 0);
    draft.emit(LedgerEvent::ReferralRewardsWithdrawn {
        referrer,
        amount: balance,
    });
    Ok(balance)
}

/// Claim every claimable stake of a window of stakers in registration order.
///
/// Stakes that are not claimable are skipped; any other failure (such as
/// an exhausted reserve) rejects the whole batch.
pub(crate) fn distribute_rewards(
    draft: &mut Draft<'_>,
    offset: u64,
    limit: u64,
    now: Timestamp,
) -> Result<(u64, Amount), LedgerError> {
    let window: Vec<Address> = draft
        .staker_order()
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .collect();

    let mut paid = 0u64;
    let mut total: Amount = 0;
    for address in window {
        let Some(staker) = draft.staker(&address) else {
            continue;
        };
        for id in staker.stake_ids {
            let eligible = draft
                .stake(id)
                .map(|s| accrual::claimable(&s, now).is_ok())
                .unwrap_or(false);
            if !eligible {
                continue;
            }
            let receipt = claim_rewards(draft, address, id, now)?;
            paid += 1;
            total = safe_add(total, receipt.gross)?;
        }
    }
    Ok((paid, total))
}
