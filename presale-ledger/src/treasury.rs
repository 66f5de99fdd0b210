//! Balance movements on the operator's reserves.

use presale_types::error::LedgerError;
use presale_types::primitives::{Amount, Currency, ReserveAsset};
use presale_types::state::Treasury;

use crate::math::{safe_add, safe_sub};

/// Move `principal` from the sale inventory into the locked pool.
pub fn lock_principal(t: &mut Treasury, principal: Amount) -> Result<(), LedgerError> {
    if t.staking_inventory < principal {
        return Err(LedgerError::NoStakingTokens {
            available: t.staking_inventory,
            required: principal,
        });
    }
    t.staking_inventory -= principal;
    t.locked_principal = safe_add(t.locked_principal, principal)?;
    Ok(())
}

/// Return principal to its staker.
pub fn release_principal(t: &mut Treasury, amount: Amount) -> Result<(), LedgerError> {
    t.locked_principal = safe_sub(t.locked_principal, amount)?;
    Ok(())
}

pub fn collect_payment(t: &mut Treasury, currency: Currency, amount: Amount) -> Result<(), LedgerError> {
    let slot = t.payments_mut(currency);
    *slot = safe_add(*slot, amount)?;
    Ok(())
}

pub fn ensure_reserve(t: &Treasury, required: Amount) -> Result<(), LedgerError> {
    if t.reward_reserve < required {
        return Err(LedgerError::InsufficientReserve {
            available: t.reward_reserve,
            required,
        });
    }
    Ok(())
}

/// Pay `amount` out of the reward reserve.
pub fn pay_reward(t: &mut Treasury, amount: Amount) -> Result<(), LedgerError> {
    ensure_reserve(t, amount)?;
    t.reward_reserve -= amount;
    Ok(())
}

/// Top up the sale inventory or the reward reserve.
pub fn deposit(t: &mut Treasury, asset: ReserveAsset, amount: Amount) -> Result<Amount, LedgerError> {
    if amount == 0 {
        return Err(LedgerError::invalid_config("deposit amount must be positive"));
    }
    if let ReserveAsset::Payments(_) = asset {
        return Err(LedgerError::invalid_config(
            "payment balances are only credited by stakes",
        ));
    }
    let slot = t.balance_mut(asset);
    *slot = safe_add(*slot, amount)?;
    Ok(*slot)
}

/// Drain the collected payments of one currency.
pub fn withdraw_payments(t: &mut Treasury, currency: Currency) -> Result<Amount, LedgerError> {
    let slot = t.payments_mut(currency);
    if *slot == 0 {
        return Err(LedgerError::NoPaymentTokens);
    }
    Ok(std::mem::take(slot))
}

/// Remove `amount` of any reserve. The locked principal pool is not a
/// [`ReserveAsset`] and cannot be drained this way.
pub fn emergency_withdraw(
    t: &mut Treasury,
    asset: ReserveAsset,
    amount: Amount,
) -> Result<Amount, LedgerError> {
    if amount == 0 {
        return Err(LedgerError::NothingToWithdraw);
    }
    let slot = t.balance_mut(asset);
    if *slot < amount {
        return Err(LedgerError::InsufficientReserve {
            available: *slot,
            required: amount,
        });
    }
    *slot -= amount;
    Ok(*slot)
}
