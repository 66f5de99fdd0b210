use presale_types::constants::{BPS_DENOMINATOR, WEEK, WEEKS_PER_YEAR};
use presale_types::error::LedgerError;
use presale_types::primitives::{Amount, Timestamp};
use presale_types::stake::Stake;

use crate::math::mul_div;

/// Reward owed on a stake at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accrual {
    /// Whole weeks paid, after capping at the lock end.
    pub weeks: u64,
    /// Gross reward, before referral shares.
    pub amount: Amount,
}

/// Compute the claimable reward on `stake` at `now`.
///
/// Claims are gated to one per full week since the last claim, and never
/// pay for weeks beyond the stake's lock end.
pub fn claimable(stake: &Stake, now: Timestamp) -> Result<Accrual, LedgerError> {
    if stake.closed {
        return Err(LedgerError::AlreadyWithdrawn);
    }

    let elapsed = now.saturating_sub(stake.last_claim_at) / WEEK;
    if elapsed == 0 {
        return Err(LedgerError::TooSoonToClaim {
            next_claim_at: stake.last_claim_at.saturating_add(WEEK),
        });
    }

    let remaining = stake.lock_end().saturating_sub(stake.last_claim_at) / WEEK;
    let weeks = elapsed.min(remaining);
    let amount = mul_div(
        stake.principal,
        stake.apy_bps as u128 * weeks as u128,
        WEEKS_PER_YEAR * BPS_DENOMINATOR,
    )?;
    if amount == 0 {
        return Err(LedgerError::NothingToClaim);
    }
    Ok(Accrual { weeks, amount })
}

/// Claimable amount, or zero wherever a claim would be rejected.
pub fn pending(stake: &Stake, now: Timestamp) -> Amount {
    claimable(stake, now).map(|a| a.amount).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use presale_types::constants::{DAY, ONE_TOKEN};
    use presale_types::primitives::Currency;

    fn stake(principal: Amount, apy_bps: u32, lock_weeks: u64) -> Stake {
        Stake {
            id: 1,
            staker: [1u8; 20],
            plan_index: 0,
            apy_bps,
            lock_duration: lock_weeks * WEEK,
            principal,
            invested_value: 0,
            currency: Currency::Stable,
            opened_at: 0,
            last_claim_at: 0,
            claimed_rewards: 0,
            withdrawal_started_at: 0,
            withdrawn_percentage: 0,
            total_withdrawn_amount: 0,
            closed: false,
            referrer: None,
        }
    }

    #[test]
    fn test_one_week_at_eighty_percent() {
        let s = stake(5_000 * ONE_TOKEN, 8_000, 26);
        let a = claimable(&s, WEEK).unwrap();
        assert_eq!(a.weeks, 1);
        // 5000 * 0.8 / 52 = 76.923076...
        assert_eq!(a.amount, 5_000 * ONE_TOKEN * 8_000 / 520_000);
        assert_eq!(a.amount / ONE_TOKEN, 76);
    }

    #[test]
    fn test_too_soon_within_week() {
        let s = stake(1_000, 8_000, 26);
        assert_eq!(
            claimable(&s, WEEK - 1),
            Err(LedgerError::TooSoonToClaim {
                next_claim_at: WEEK
            })
        );
        assert_eq!(pending(&s, 6 * DAY), 0);
    }

    #[test]
    fn test_capped_at_lock_end() {
        let s = stake(52 * 10_000, 10_000, 26);
        let a = claimable(&s, 40 * WEEK).unwrap();
        assert_eq!(a.weeks, 26);
        assert_eq!(a.amount, 26 * 10_000);
    }

    #[test]
    fn test_nothing_after_lock_fully_claimed() {
        let mut s = stake(52 * 10_000, 10_000, 26);
        s.last_claim_at = 26 * WEEK;
        assert_eq!(claimable(&s, 30 * WEEK), Err(LedgerError::NothingToClaim));
    }

    #[test]
    fn test_closed_stake_rejected() {
        let mut s = stake(1_000, 8_000, 26);
        s.closed = true;
        assert_eq!(claimable(&s, 50 * WEEK), Err(LedgerError::AlreadyWithdrawn));
    }
}
