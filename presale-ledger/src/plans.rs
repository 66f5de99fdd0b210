//! The plan table: stake validation and the rules for changing it.

use presale_types::config::LedgerConfig;
use presale_types::constants::{LOCK_WEEKS_BOUNDS, MAX_APY_BPS, PLAN_COUNT, WEEK};
use presale_types::error::{LedgerError, MinimumScope};
use presale_types::primitives::{Amount, BasisPoints, PlanIndex};
use presale_types::stake::StakePlan;

/// Check a stake request against the plan table.
///
/// Order matters for error reporting: index, global minimum, tier minimum,
/// then the global maximum.
pub fn validate(
    config: &LedgerConfig,
    plan_index: PlanIndex,
    amount: Amount,
) -> Result<&StakePlan, LedgerError> {
    let plan = config
        .plan(plan_index)
        .ok_or(LedgerError::InvalidPlanIndex(plan_index))?;

    if amount < config.limits.global_minimum {
        return Err(LedgerError::BelowMinimumStake {
            amount,
            minimum: config.limits.global_minimum,
            scope: MinimumScope::Global,
        });
    }
    if amount < plan.min_stake_amount {
        return Err(LedgerError::BelowMinimumStake {
            amount,
            minimum: plan.min_stake_amount,
            scope: MinimumScope::Tier(plan_index),
        });
    }
    if amount > config.limits.maximum {
        return Err(LedgerError::AboveMaximumStake {
            amount,
            maximum: config.limits.maximum,
        });
    }
    Ok(plan)
}

fn check_apy(index: usize, apy: BasisPoints) -> Result<(), LedgerError> {
    if apy == 0 || apy > MAX_APY_BPS {
        return Err(LedgerError::invalid_config(format!(
            "plan {} APY {} bps outside 1..={}",
            index, apy, MAX_APY_BPS
        )));
    }
    Ok(())
}

fn check_lock(index: usize, lock_duration: u64) -> Result<(), LedgerError> {
    let (lo, hi) = LOCK_WEEKS_BOUNDS[index];
    if lock_duration < lo * WEEK || lock_duration > hi * WEEK {
        return Err(LedgerError::invalid_config(format!(
            "plan {} lock of {}s outside {}..={} weeks",
            index, lock_duration, lo, hi
        )));
    }
    Ok(())
}

/// Every structural invariant of the plan table and limits.
pub fn check_config(config: &LedgerConfig) -> Result<(), LedgerError> {
    let limits = &config.limits;
    if limits.global_minimum == 0 {
        return Err(LedgerError::invalid_config("global minimum must be positive"));
    }

    for (i, plan) in config.plans.iter().enumerate() {
        check_apy(i, plan.apy_bps)?;
        check_lock(i, plan.lock_duration)?;
        if i == 0 {
            continue;
        }
        let prev = &config.plans[i - 1];
        if plan.lock_duration <= prev.lock_duration {
            return Err(LedgerError::invalid_config(format!(
                "plan {} lock must be longer than plan {}",
                i,
                i - 1
            )));
        }
        if plan.min_stake_amount <= prev.min_stake_amount {
            return Err(LedgerError::invalid_config(format!(
                "plan {} minimum must exceed plan {} minimum",
                i,
                i - 1
            )));
        }
    }

    let first = config.plans[0].min_stake_amount;
    let last = config.plans[PLAN_COUNT - 1].min_stake_amount;
    if first < limits.global_minimum {
        return Err(LedgerError::invalid_config(
            "tier minimums must not be below the global minimum",
        ));
    }
    if limits.maximum <= limits.global_minimum || limits.maximum < last {
        return Err(LedgerError::invalid_config(format!(
            "maximum {} must exceed the global minimum and cover every tier minimum",
            limits.maximum
        )));
    }
    Ok(())
}

pub fn set_plan(
    config: &mut LedgerConfig,
    plan_index: PlanIndex,
    plan: StakePlan,
) -> Result<(), LedgerError> {
    let slot = config
        .plans
        .get_mut(plan_index as usize)
        .ok_or(LedgerError::InvalidPlanIndex(plan_index))?;
    *slot = plan;
    check_config(config)
}

/// Replace the tier minimums; the global minimum follows the lowest tier.
pub fn update_minimums(
    config: &mut LedgerConfig,
    minimums: [Amount; PLAN_COUNT],
) -> Result<(), LedgerError> {
    if minimums[0] == 0 {
        return Err(LedgerError::invalid_config("minimum stake must be positive"));
    }
    if minimums.windows(2).any(|w| w[1] <= w[0]) {
        return Err(LedgerError::invalid_config(
            "tier minimums must be strictly increasing",
        ));
    }
    if minimums[PLAN_COUNT - 1] >= config.limits.maximum {
        return Err(LedgerError::invalid_config(
            "highest tier minimum must be below the maximum stake",
        ));
    }
    for (plan, minimum) in config.plans.iter_mut().zip(minimums) {
        plan.min_stake_amount = minimum;
    }
    config.limits.global_minimum = minimums[0];
    check_config(config)
}

pub fn update_global_minimum(config: &mut LedgerConfig, minimum: Amount) -> Result<(), LedgerError> {
    if minimum == 0 || minimum > config.plans[0].min_stake_amount {
        return Err(LedgerError::invalid_config(format!(
            "global minimum {} must be positive and not above the lowest tier minimum",
            minimum
        )));
    }
    config.limits.global_minimum = minimum;
    check_config(config)
}

pub fn update_maximum(config: &mut LedgerConfig, maximum: Amount) -> Result<(), LedgerError> {
    let highest = config.plans[PLAN_COUNT - 1].min_stake_amount;
    if maximum <= config.limits.global_minimum || maximum < highest {
        return Err(LedgerError::invalid_config(format!(
            "maximum {} must exceed the global minimum and be at least {}",
            maximum, highest
        )));
    }
    config.limits.maximum = maximum;
    check_config(config)
}

pub fn update_apys(
    config: &mut LedgerConfig,
    apys: [BasisPoints; PLAN_COUNT],
) -> Result<(), LedgerError> {
    for (i, apy) in apys.iter().enumerate() {
        check_apy(i, *apy)?;
    }
    for (plan, apy) in config.plans.iter_mut().zip(apys) {
        plan.apy_bps = apy;
    }
    check_config(config)
}

/// Lock periods are given in whole weeks.
pub fn update_lock_periods(
    config: &mut LedgerConfig,
    weeks: [u64; PLAN_COUNT],
) -> Result<(), LedgerError> {
    for (i, w) in weeks.iter().enumerate() {
        check_lock(i, w.saturating_mul(WEEK))?;
    }
    if weeks.windows(2).any(|w| w[1] <= w[0]) {
        return Err(LedgerError::invalid_config(
            "lock periods must be strictly increasing",
        ));
    }
    for (plan, w) in config.plans.iter_mut().zip(weeks) {
        plan.lock_duration = w * WEEK;
    }
    check_config(config)
}
