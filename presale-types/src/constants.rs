use crate::primitives::{Amount, BasisPoints};

// ─── Fixed Point ─────────────────────────────────────────────────────────────

/// Denominator for basis-point rates (10000 bps = 100%).
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Number of decimal places of the staking asset.
pub const TOKEN_DECIMALS: u32 = 18;

/// One whole staking token in base units (10^18).
pub const ONE_TOKEN: Amount = 1_000_000_000_000_000_000;

/// Prices are quoted as payment base units per whole staking token.
pub const PRICE_PRECISION: Amount = ONE_TOKEN;

// ─── Time ────────────────────────────────────────────────────────────────────

/// One day in seconds.
pub const DAY: u64 = 86_400;

/// One week in seconds. Claims and withdrawals advance in whole weeks.
pub const WEEK: u64 = 7 * DAY;

/// Weeks per year used to derive the weekly yield from an APY.
pub const WEEKS_PER_YEAR: u128 = 52;

// ─── Pricing ─────────────────────────────────────────────────────────────────

/// Length of one price step.
pub const PRICE_INCREASE_INTERVAL: u64 = 120 * DAY;

/// Linear price increase per elapsed interval, in percent of the base price.
pub const PRICE_INCREASE_PERCENT: u128 = 1;

// ─── Plans ───────────────────────────────────────────────────────────────────

/// Number of lock tiers.
pub const PLAN_COUNT: usize = 3;

/// Upper bound on any plan's APY (120%).
pub const MAX_APY_BPS: BasisPoints = 12_000;

/// Admissible lock durations per tier, in weeks (inclusive).
pub const LOCK_WEEKS_BOUNDS: [(u64, u64); PLAN_COUNT] = [(20, 30), (40, 60), (90, 120)];

/// Default lock durations in weeks: six months, one year, two years.
pub const DEFAULT_LOCK_WEEKS: [u64; PLAN_COUNT] = [26, 52, 104];

/// Default APYs in basis points.
pub const DEFAULT_APY_BPS: [BasisPoints; PLAN_COUNT] = [8_000, 10_000, 12_000];

/// Default tier minimums in whole tokens.
pub const DEFAULT_TIER_MINIMUM_TOKENS: [u128; PLAN_COUNT] = [3_000, 30_000, 300_000];

/// Default global maximum stake in whole tokens.
pub const DEFAULT_MAX_STAKE_TOKENS: u128 = 1_000_000;

// ─── Withdrawals ─────────────────────────────────────────────────────────────

/// Percentage of principal unlocked per full week after lock expiry.
pub const WITHDRAWAL_STEP_PERCENT: u8 = 10;

/// Fully withdrawn.
pub const FULL_PERCENT: u8 = 100;

// ─── Referrals ───────────────────────────────────────────────────────────────

/// Maximum number of ancestor hops paid on a claim.
pub const MAX_REFERRAL_DEPTH: usize = 6;

/// Share of a claimed reward credited to each ancestor level, in basis points.
pub const REFERRAL_LEVEL_BPS: [BasisPoints; MAX_REFERRAL_DEPTH] = [3_000, 2_000, 1_000, 500, 500, 500];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referral_levels_sum_below_full_reward() {
        let total: u128 = REFERRAL_LEVEL_BPS.iter().map(|b| *b as u128).sum();
        assert_eq!(total, 7_500);
        assert!(total < BPS_DENOMINATOR);
    }

    #[test]
    fn test_default_plans_within_bounds() {
        for (i, weeks) in DEFAULT_LOCK_WEEKS.iter().enumerate() {
            let (lo, hi) = LOCK_WEEKS_BOUNDS[i];
            assert!(*weeks >= lo && *weeks <= hi);
            assert!(DEFAULT_APY_BPS[i] <= MAX_APY_BPS);
        }
    }

    #[test]
    fn test_week_seconds() {
        assert_eq!(WEEK, 604_800);
        assert_eq!(PRICE_INCREASE_INTERVAL, 172_800 * 60);
    }
}
