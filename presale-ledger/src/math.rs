//! Checked integer arithmetic for amounts and rates.
//!
//! Everything is `u128` base units. Products are formed at 256-bit width
//! before dividing, so `a * b / d` never loses precision to an intermediate
//! truncation and only fails when the final quotient does not fit.

use presale_types::constants::BPS_DENOMINATOR;
use presale_types::error::LedgerError;
use presale_types::primitives::{Amount, BasisPoints};

pub fn safe_add(a: u128, b: u128) -> Result<u128, LedgerError> {
    a.checked_add(b).ok_or(LedgerError::ArithmeticOverflow)
}

pub fn safe_sub(a: u128, b: u128) -> Result<u128, LedgerError> {
    a.checked_sub(b).ok_or(LedgerError::ArithmeticOverflow)
}

pub fn safe_mul(a: u128, b: u128) -> Result<u128, LedgerError> {
    a.checked_mul(b).ok_or(LedgerError::ArithmeticOverflow)
}

/// Full 256-bit product of two `u128`s as `(high, low)`.
fn wide_mul(a: u128, b: u128) -> (u128, u128) {
    const MASK: u128 = u64::MAX as u128;
    let (a_hi, a_lo) = (a >> 64, a & MASK);
    let (b_hi, b_lo) = (b >> 64, b & MASK);

    let ll = a_lo * b_lo;
    let lh = a_lo * b_hi;
    let hl = a_hi * b_lo;
    let hh = a_hi * b_hi;

    let mid = (ll >> 64) + (lh & MASK) + (hl & MASK);
    let low = (ll & MASK) | (mid << 64);
    let high = hh + (lh >> 64) + (hl >> 64) + (mid >> 64);
    (high, low)
}

/// `floor(a * b / d)`.
pub fn mul_div(a: u128, b: u128, d: u128) -> Result<u128, LedgerError> {
    if d == 0 {
        return Err(LedgerError::ArithmeticOverflow);
    }
    if let Some(p) = a.checked_mul(b) {
        return Ok(p / d);
    }

    let (high, low) = wide_mul(a, b);
    if high >= d {
        // Quotient needs more than 128 bits.
        return Err(LedgerError::ArithmeticOverflow);
    }

    // Restoring long division of the low word, seeded with the high word
    // as the running remainder (valid because high < d).
    let mut rem = high;
    let mut quot: u128 = 0;
    for i in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((low >> i) & 1);
        if carry == 1 || rem >= d {
            rem = rem.wrapping_sub(d);
            quot |= 1 << i;
        }
    }
    Ok(quot)
}

/// `amount * bps / 10000`, floored.
pub fn bps_of(amount: Amount, bps: BasisPoints) -> Result<Amount, LedgerError> {
    mul_div(amount, bps as u128, BPS_DENOMINATOR)
}

/// `amount * percent / 100`, floored.
pub fn percent_of(amount: Amount, percent: u128) -> Result<Amount, LedgerError> {
    mul_div(amount, percent, 100)
}
