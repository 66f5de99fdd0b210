//! Referral edges and the multi-level reward fan-out.

use std::collections::BTreeSet;

use presale_types::config::ReferralPolicy;
use presale_types::constants::{MAX_REFERRAL_DEPTH, REFERRAL_LEVEL_BPS};
use presale_types::error::LedgerError;
use presale_types::event::LedgerEvent;
use presale_types::primitives::{Address, Amount, ZERO_ADDRESS};

use crate::changeset::Draft;
use crate::math::{bps_of, safe_add};
use crate::state::LedgerView;

/// One level of a fan-out payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferralCredit {
    /// 1-based distance from the claiming staker.
    pub level: u8,
    pub referrer: Address,
    pub amount: Amount,
}

/// Normalise a caller-supplied referrer: the zero address means none.
pub fn normalize(referrer: Option<Address>) -> Option<Address> {
    referrer.filter(|r| *r != ZERO_ADDRESS)
}

/// The first `MAX_REFERRAL_DEPTH` ancestors of `origin`, nearest first.
pub fn ancestors<V: LedgerView + ?Sized>(
    view: &V,
    origin: &Address,
) -> [Option<Address>; MAX_REFERRAL_DEPTH] {
    let mut chain = [None; MAX_REFERRAL_DEPTH];
    let mut current = *origin;
    for slot in chain.iter_mut() {
        match view.referrer_of(&current) {
            Some(next) => {
                *slot = Some(next);
                current = next;
            }
            None => break,
        }
    }
    chain
}

/// Reject an edge `staker -> referrer` that would point at the staker itself
/// or close a loop through the referrer's existing ancestry.
pub fn check_edge<V: LedgerView + ?Sized>(
    view: &V,
    staker: &Address,
    referrer: &Address,
) -> Result<(), LedgerError> {
    if staker == referrer {
        return Err(LedgerError::CircularOrSelfReferral);
    }
    let mut seen = BTreeSet::new();
    let mut current = *referrer;
    while let Some(next) = view.referrer_of(&current) {
        if next == *staker || !seen.insert(next) {
            return Err(LedgerError::CircularOrSelfReferral);
        }
        current = next;
    }
    Ok(())
}

/// Enforce `require_qualified_referrer` at stake opening.
pub fn check_qualified<V: LedgerView + ?Sized>(
    view: &V,
    policy: &ReferralPolicy,
    referrer: &Address,
) -> Result<(), LedgerError> {
    if !policy.require_qualified_referrer {
        return Ok(());
    }
    let total = view.total_principal(referrer);
    if total < policy.min_qualifying_stake {
        return Err(LedgerError::ReferrerNotQualified {
            total,
            required: policy.min_qualifying_stake,
        });
    }
    Ok(())
}

/// Shares of `reward` owed to the ancestors of `origin`.
///
/// Each level takes its percentage of the full reward. Ancestors below the
/// qualifying stake are skipped without ending the walk.
pub fn fan_out<V: LedgerView + ?Sized>(
    view: &V,
    origin: &Address,
    reward: Amount,
) -> Result<Vec<ReferralCredit>, LedgerError> {
    let policy = view.config().referral;
    let mut credits = Vec::new();
    for (i, ancestor) in ancestors(view, origin).into_iter().enumerate() {
        let Some(referrer) = ancestor else {
            break;
        };
        if view.total_principal(&referrer) < policy.min_qualifying_stake {
            continue;
        }
        let amount = bps_of(reward, REFERRAL_LEVEL_BPS[i])?;
        if amount == 0 {
            continue;
        }
        credits.push(ReferralCredit {
            level: (i + 1) as u8,
            referrer,
            amount,
        });
    }
    Ok(credits)
}

/// Create the write-once edge `staker -> referrer`.
///
/// Must run before the staker record exists: an address that already staked
/// keeps whatever edge its first stake recorded.
pub(crate) fn link(
    draft: &mut Draft<'_>,
    staker: Address,
    referrer: Address,
) -> Result<(), LedgerError> {
    if draft.staker(&staker).is_some() {
        return Err(LedgerError::AlreadyStaked);
    }
    check_edge(&*draft, &staker, &referrer)?;
    draft.add_referee(referrer, staker);
    Ok(())
}

/// Credit `credits` to referral balances. Returns the total credited.
pub(crate) fn credit(
    draft: &mut Draft<'_>,
    origin: Address,
    credits: &[ReferralCredit],
) -> Result<Amount, LedgerError> {
    let mut total: Amount = 0;
    for c in credits {
        let balance = safe_add(draft.referral_balance(&c.referrer), c.amount)?;
        draft.set_referral_balance(c.referrer, balance);
        total = safe_add(total, c.amount)?;
        draft.emit(LedgerEvent::ReferralCredited {
            referrer: c.referrer,
            from: origin,
            level: c.level,
            amount: c.amount,
        });
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LedgerState;
    use presale_types::config::{BasePrices, LedgerConfig};
    use presale_types::stake::Staker;

    fn addr(n: u8) -> Address {
        [n; 20]
    }

    /// Chain 1 -> 2 -> 3 -> ... -> n, every node holding `principal`.
    fn chain(n: u8, principal: Amount) -> LedgerState {
        let mut state = LedgerState::new(LedgerConfig::new(
            addr(200),
            0,
            BasePrices { native: 1, stable: 1 },
        ));
        for i in 1..=n {
            let referrer = if i < n { Some(addr(i + 1)) } else { None };
            let mut staker = Staker::new(addr(i), i as u64, referrer, 0);
            staker.total_principal = principal;
            state.stakers.insert(addr(i), staker);
        }
        state
    }

    #[test]
    fn test_ancestors_bounded_to_six() {
        let state = chain(10, 1);
        let anc = ancestors(&state, &addr(1));
        assert_eq!(anc[0], Some(addr(2)));
        assert_eq!(anc[5], Some(addr(7)));
        let short = ancestors(&state, &addr(9));
        assert_eq!(short[0], Some(addr(10)));
        assert_eq!(short[1], None);
    }

    #[test]
    fn test_fan_out_level_shares() {
        let state = chain(10, 1);
        let credits = fan_out(&state, &addr(1), 10_000).unwrap();
        let amounts: Vec<_> = credits.iter().map(|c| c.amount).collect();
        assert_eq!(amounts, vec![3_000, 2_000, 1_000, 500, 500, 500]);
        assert_eq!(credits[5].referrer, addr(7));
        assert_eq!(credits[5].level, 6);
    }

    #[test]
    fn test_fan_out_skips_unqualified_but_continues() {
        let mut state = chain(4, 100);
        state.config.referral.min_qualifying_stake = 50;
        state.stakers.get_mut(&addr(2)).unwrap().total_principal = 10;
        let credits = fan_out(&state, &addr(1), 1_000).unwrap();
        assert_eq!(credits.len(), 2);
        assert_eq!(credits[0].referrer, addr(3));
        assert_eq!(credits[0].level, 2);
        assert_eq!(credits[0].amount, 200);
    }

    #[test]
    fn test_check_edge_rejects_self_and_cycles() {
        let state = chain(3, 1);
        assert_eq!(
            check_edge(&state, &addr(9), &addr(9)),
            Err(LedgerError::CircularOrSelfReferral)
        );
        // 3 is an ancestor of 1, so 3 -> 1 would close a loop.
        assert_eq!(
            check_edge(&state, &addr(3), &addr(1)),
            Err(LedgerError::CircularOrSelfReferral)
        );
        check_edge(&state, &addr(9), &addr(1)).unwrap();
    }

    #[test]
    fn test_check_qualified() {
        let state = chain(2, 100);
        let policy = ReferralPolicy {
            min_qualifying_stake: 500,
            require_qualified_referrer: true,
        };
        assert_eq!(
            check_qualified(&state, &policy, &addr(2)),
            Err(LedgerError::ReferrerNotQualified {
                total: 100,
                required: 500
            })
        );
        let lax = ReferralPolicy {
            require_qualified_referrer: false,
            ..policy
        };
        check_qualified(&state, &lax, &addr(2)).unwrap();
    }

    #[test]
    fn test_normalize_zero_address() {
        assert_eq!(normalize(Some(ZERO_ADDRESS)), None);
        assert_eq!(normalize(Some(addr(1))), Some(addr(1)));
    }
}
