use presale_types::constants::{FULL_PERCENT, WEEK, WITHDRAWAL_STEP_PERCENT};
use presale_types::error::LedgerError;
use presale_types::primitives::{Amount, Timestamp};
use presale_types::stake::Stake;

use crate::math::percent_of;

/// The next principal release for a stake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawalSlice {
    pub amount: Amount,
    /// Cumulative percentage after this slice.
    pub percentage: u8,
    /// Time of the first withdrawal, set by the first slice.
    pub started_at: Timestamp,
}

/// Percentage of principal released `now`, 10 points per full week after
/// the lock expired.
pub fn allowed_percentage(stake: &Stake, now: Timestamp) -> u8 {
    let weeks = now.saturating_sub(stake.lock_end()) / WEEK;
    let pct = weeks.saturating_mul(WITHDRAWAL_STEP_PERCENT as u64);
    pct.min(FULL_PERCENT as u64) as u8
}

pub fn next_slice(stake: &Stake, now: Timestamp) -> Result<WithdrawalSlice, LedgerError> {
    if stake.closed {
        return Err(LedgerError::AlreadyWithdrawn);
    }
    if !stake.is_lock_expired(now) {
        return Err(LedgerError::LockStillActive {
            unlocks_at: stake.lock_end(),
            now,
        });
    }

    let allowed = allowed_percentage(stake, now);
    if allowed <= stake.withdrawn_percentage {
        return Err(LedgerError::NothingToWithdraw);
    }
    let step = allowed - stake.withdrawn_percentage;

    let remaining = stake.remaining_principal();
    let amount = if allowed == FULL_PERCENT {
        // Last slice absorbs rounding so the total equals the principal.
        remaining
    } else {
        percent_of(stake.principal, step as u128)?.min(remaining)
    };

    let started_at = if stake.withdrawal_started_at == 0 {
        now
    } else {
        stake.withdrawal_started_at
    };

    Ok(WithdrawalSlice {
        amount,
        percentage: allowed,
        started_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use presale_types::primitives::Currency;

    fn stake(principal: Amount) -> Stake {
        Stake {
            id: 1,
            staker: [1u8; 20],
            plan_index: 0,
            apy_bps: 8_000,
            lock_duration: 26 * WEEK,
            principal,
            invested_value: 0,
            currency: Currency::Native,
            opened_at: 100,
            last_claim_at: 100,
            claimed_rewards: 0,
            withdrawal_started_at: 0,
            withdrawn_percentage: 0,
            total_withdrawn_amount: 0,
            closed: false,
            referrer: None,
        }
    }

    fn apply(s: &mut Stake, slice: WithdrawalSlice) {
        s.withdrawn_percentage = slice.percentage;
        s.total_withdrawn_amount += slice.amount;
        s.withdrawal_started_at = slice.started_at;
        s.closed = slice.percentage == FULL_PERCENT;
    }

    #[test]
    fn test_locked() {
        let s = stake(1_000);
        let end = s.lock_end();
        assert_eq!(
            next_slice(&s, end - 1),
            Err(LedgerError::LockStillActive {
                unlocks_at: end,
                now: end - 1
            })
        );
        // Expired but no full week yet.
        assert_eq!(next_slice(&s, end), Err(LedgerError::NothingToWithdraw));
    }

    #[test]
    fn test_weekly_steps_return_exact_principal() {
        let mut s = stake(999);
        let end = s.lock_end();
        let mut total = 0;
        for week in 1..=10u64 {
            let slice = next_slice(&s, end + week * WEEK).unwrap();
            assert_eq!(slice.percentage as u64, week * 10);
            total += slice.amount;
            apply(&mut s, slice);
            assert!(s.total_withdrawn_amount <= s.principal);
        }
        assert_eq!(total, 999);
        assert!(s.closed);
        assert_eq!(s.withdrawal_started_at, end + WEEK);
        assert_eq!(
            next_slice(&s, end + 20 * WEEK),
            Err(LedgerError::AlreadyWithdrawn)
        );
    }

    #[test]
    fn test_catch_up_in_one_call() {
        let s = stake(5_000);
        let slice = next_slice(&s, s.lock_end() + 10 * WEEK).unwrap();
        assert_eq!(slice.percentage, 100);
        assert_eq!(slice.amount, 5_000);
    }

    #[test]
    fn test_second_call_same_week_is_nothing() {
        let mut s = stake(5_000);
        let at = s.lock_end() + 3 * WEEK;
        let slice = next_slice(&s, at).unwrap();
        assert_eq!(slice.amount, 1_500);
        apply(&mut s, slice);
        assert_eq!(next_slice(&s, at + 1), Err(LedgerError::NothingToWithdraw));
    }
}
