use serde::Serialize;

use presale_types::config::LedgerConfig;
use presale_types::constants::{PRICE_INCREASE_INTERVAL, PRICE_INCREASE_PERCENT, PRICE_PRECISION};
use presale_types::error::LedgerError;
use presale_types::primitives::{Amount, Currency, Timestamp};

use crate::math::{mul_div, safe_add, safe_mul};

/// A price observation for one currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    pub currency: Currency,
    /// Payment base units per whole staking token.
    pub price: Amount,
    /// Completed escalation intervals since launch.
    pub intervals: u64,
}

/// Number of whole escalation intervals elapsed at `now`.
pub fn elapsed_intervals(launch_time: Timestamp, now: Timestamp) -> u64 {
    now.saturating_sub(launch_time) / PRICE_INCREASE_INTERVAL
}

/// Linear escalation: `base * (100 + intervals) / 100`, floored.
///
/// A zero base price stays zero.
pub fn current_price(
    config: &LedgerConfig,
    currency: Currency,
    now: Timestamp,
) -> Result<Amount, LedgerError> {
    Ok(quote(config, currency, now)?.price)
}

pub fn quote(
    config: &LedgerConfig,
    currency: Currency,
    now: Timestamp,
) -> Result<PriceQuote, LedgerError> {
    let intervals = elapsed_intervals(config.launch_time, now);
    let step = safe_mul(intervals as u128, PRICE_INCREASE_PERCENT)?;
    let factor = safe_add(100, step)?;
    let price = mul_div(config.base_prices.get(currency), factor, 100)?;
    Ok(PriceQuote {
        currency,
        price,
        intervals,
    })
}

/// Staking tokens bought by `payment` at `price`.
pub fn tokens_for_payment(payment: Amount, price: Amount) -> Result<Amount, LedgerError> {
    if price == 0 {
        return Err(LedgerError::InvalidPrice);
    }
    mul_div(payment, PRICE_PRECISION, price)
}

/// Value of a purchase in stable-currency units, the unit the hardcap is
/// expressed in.
pub fn stable_value(
    config: &LedgerConfig,
    currency: Currency,
    payment: Amount,
    principal: Amount,
    now: Timestamp,
) -> Result<Amount, LedgerError> {
    match currency {
        Currency::Stable => Ok(payment),
        Currency::Native => mul_div(
            principal,
            current_price(config, Currency::Stable, now)?,
            PRICE_PRECISION,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use presale_types::config::BasePrices;
    use presale_types::constants::{DAY, ONE_TOKEN};

    fn config(native: Amount, stable: Amount) -> LedgerConfig {
        LedgerConfig::new([1u8; 20], 1_000, BasePrices { native, stable })
    }

    #[test]
    fn test_price_is_flat_within_first_interval() {
        let cfg = config(ONE_TOKEN / 1_000, 30 * ONE_TOKEN / 100);
        assert_eq!(current_price(&cfg, Currency::Stable, 1_000).unwrap(), 30 * ONE_TOKEN / 100);
        assert_eq!(
            current_price(&cfg, Currency::Stable, 1_000 + 120 * DAY - 1).unwrap(),
            30 * ONE_TOKEN / 100
        );
    }

    #[test]
    fn test_price_escalates_linearly() {
        let base = 1_000_000u128;
        let cfg = config(base, base);
        let after_one = current_price(&cfg, Currency::Native, 1_000 + 120 * DAY).unwrap();
        let after_two = current_price(&cfg, Currency::Native, 1_000 + 240 * DAY).unwrap();
        assert_eq!(after_one, base * 101 / 100);
        // Additive, not 1.01^2 (which would be 1_020_100).
        assert_eq!(after_two, base * 102 / 100);
        assert_eq!(after_two, 1_020_000);
    }

    #[test]
    fn test_price_before_launch_is_base() {
        let cfg = config(500, 700);
        assert_eq!(quote(&cfg, Currency::Native, 0).unwrap().intervals, 0);
        assert_eq!(current_price(&cfg, Currency::Native, 0).unwrap(), 500);
    }

    #[test]
    fn test_price_overflow_is_an_error() {
        let cfg = config(Amount::MAX, ONE_TOKEN);
        assert_eq!(current_price(&cfg, Currency::Native, 1_000).unwrap(), Amount::MAX);
        assert_eq!(
            current_price(&cfg, Currency::Native, 1_000 + 120 * DAY),
            Err(LedgerError::ArithmeticOverflow)
        );
    }

    #[test]
    fn test_tokens_for_payment() {
        // 30 stable units at 0.01 per token buys 3000 tokens.
        let price = ONE_TOKEN / 100;
        assert_eq!(
            tokens_for_payment(30 * ONE_TOKEN, price).unwrap(),
            3_000 * ONE_TOKEN
        );
        assert_eq!(tokens_for_payment(1, 0), Err(LedgerError::InvalidPrice));
    }

    #[test]
    fn test_stable_value_of_native_purchase() {
        let cfg = config(ONE_TOKEN / 1_000, ONE_TOKEN / 100);
        let value = stable_value(&cfg, Currency::Native, 3 * ONE_TOKEN, 3_000 * ONE_TOKEN, 1_000)
            .unwrap();
        assert_eq!(value, 30 * ONE_TOKEN);
        let value = stable_value(&cfg, Currency::Stable, 42, 0, 1_000).unwrap();
        assert_eq!(value, 42);
    }
}
