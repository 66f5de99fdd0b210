use presale_types::error::LedgerError;
use presale_types::event::LedgerEvent;
use presale_types::primitives::{Address, Amount, ReserveAsset, Timestamp, ZERO_ADDRESS};

use crate::changeset::{Draft, Outcome};
use crate::command::AdminAction;
use crate::ledger;
use crate::plans;
use crate::state::LedgerView;
use crate::treasury;

/// Execute an owner-only action against the draft.
pub(crate) fn apply(
    draft: &mut Draft<'_>,
    caller: Address,
    action: AdminAction,
    now: Timestamp,
) -> Result<Outcome, LedgerError> {
    if caller != draft.config().owner {
        return Err(LedgerError::Unauthorized);
    }

    match action {
        AdminAction::SetPlan { plan_index, plan } => {
            plans::set_plan(draft.config_mut(), plan_index, plan)?;
            draft.emit(LedgerEvent::StakePlanUpdated {
                plan_index,
                apy_bps: plan.apy_bps,
                lock_duration: plan.lock_duration,
                min_stake_amount: plan.min_stake_amount,
            });
            bump(draft, "plans");
        }
        AdminAction::UpdateMinimumStakeAmounts { minimums } => {
            plans::update_minimums(draft.config_mut(), minimums)?;
            bump(draft, "minimum_stake_amounts");
        }
        AdminAction::UpdateGlobalMinimum { minimum } => {
            plans::update_global_minimum(draft.config_mut(), minimum)?;
            bump(draft, "global_minimum");
        }
        AdminAction::UpdateMaxStakeAmount { maximum } => {
            plans::update_maximum(draft.config_mut(), maximum)?;
            bump(draft, "max_stake_amount");
        }
        AdminAction::UpdatePrices { prices } => {
            if prices.native == 0 || prices.stable == 0 {
                tracing::warn!(
                    native = prices.native,
                    stable = prices.stable,
                    "base price set to zero; stakes in that currency will be refused"
                );
            }
            draft.config_mut().base_prices = prices;
            bump(draft, "base_prices");
        }
        AdminAction::UpdateApy { apys } => {
            plans::update_apys(draft.config_mut(), apys)?;
            bump(draft, "apy");
        }
        AdminAction::UpdateLockPeriods { weeks } => {
            plans::update_lock_periods(draft.config_mut(), weeks)?;
            bump(draft, "lock_periods");
        }
        AdminAction::UpdateHardcap { hardcap } => {
            if hardcap < draft.counters.total_invested {
                return Err(LedgerError::invalid_config(format!(
                    "hardcap {} below amount already invested {}",
                    hardcap, draft.counters.total_invested
                )));
            }
            draft.config_mut().hardcap = hardcap;
            bump(draft, "hardcap");
        }
        AdminAction::UpdateStartTime { start_time } => {
            draft.config_mut().start_time = start_time;
            bump(draft, "start_time");
        }
        AdminAction::UpdateReferralPolicy { policy } => {
            draft.config_mut().referral = policy;
            bump(draft, "referral_policy");
        }
        AdminAction::DepositStakingTokens { amount } => {
            let balance =
                treasury::deposit(&mut draft.treasury, ReserveAsset::StakingInventory, amount)?;
            reserves_changed(draft, ReserveAsset::StakingInventory, amount, true, balance);
        }
        AdminAction::FundRewards { amount } => {
            let balance = treasury::deposit(&mut draft.treasury, ReserveAsset::Rewards, amount)?;
            reserves_changed(draft, ReserveAsset::Rewards, amount, true, balance);
        }
        AdminAction::WithdrawPayments { currency } => {
            let amount = treasury::withdraw_payments(&mut draft.treasury, currency)?;
            reserves_changed(draft, ReserveAsset::Payments(currency), amount, false, 0);
            return Ok(Outcome::Paid { amount });
        }
        AdminAction::EmergencyWithdraw { asset, amount } => {
            let balance = treasury::emergency_withdraw(&mut draft.treasury, asset, amount)?;
            tracing::warn!(%asset, amount, balance, "emergency withdrawal");
            reserves_changed(draft, asset, amount, false, balance);
            return Ok(Outcome::Paid { amount });
        }
        AdminAction::DistributeRewards { offset, limit } => {
            let (stakes_paid, amount) = ledger::distribute_rewards(draft, offset, limit, now)?;
            return Ok(Outcome::Distributed {
                stakes_paid,
                amount,
            });
        }
        AdminAction::Pause => {
            draft.config_mut().paused = true;
            draft.emit(LedgerEvent::Paused);
            bump(draft, "paused");
        }
        AdminAction::Unpause => {
            draft.config_mut().paused = false;
            draft.emit(LedgerEvent::Unpaused);
            bump(draft, "paused");
        }
        AdminAction::TransferOwnership { new_owner } => {
            if new_owner == ZERO_ADDRESS {
                return Err(LedgerError::InvalidAddress);
            }
            let previous = draft.config().owner;
            draft.config_mut().owner = new_owner;
            draft.emit(LedgerEvent::OwnershipTransferred {
                previous,
                new_owner,
            });
            bump(draft, "owner");
        }
    }
    Ok(Outcome::Applied)
}

/// Advance the config revision and record which field moved.
fn bump(draft: &mut Draft<'_>, field: &str) {
    let config = draft.config_mut();
    config.revision += 1;
    let revision = config.revision;
    draft.emit(LedgerEvent::ConfigUpdated {
        revision,
        field: field.to_string(),
    });
}

fn reserves_changed(
    draft: &mut Draft<'_>,
    asset: ReserveAsset,
    amount: Amount,
    inflow: bool,
    balance: Amount,
) {
    let magnitude = i128::try_from(amount).unwrap_or(i128::MAX);
    draft.emit(LedgerEvent::ReservesChanged {
        asset,
        delta: if inflow { magnitude } else { -magnitude },
        balance,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{open_stake, StakeRequest};
    use crate::state::LedgerState;
    use presale_types::config::{BasePrices, LedgerConfig};
    use presale_types::constants::ONE_TOKEN;
    use presale_types::primitives::Currency;

    const OWNER: Address = [0xAA; 20];
    const ALICE: Address = [1; 20];
    const T0: Timestamp = 1_700_000_000;

    fn state() -> LedgerState {
        let config = LedgerConfig::new(
            OWNER,
            T0,
            BasePrices {
                native: ONE_TOKEN / 100,
                stable: ONE_TOKEN,
            },
        );
        let mut state = LedgerState::new(config);
        state.treasury.staking_inventory = 1_000_000 * ONE_TOKEN;
        state.treasury.reward_reserve = 1_000 * ONE_TOKEN;
        state
    }

    #[test]
    fn test_only_owner_may_act() {
        let base = state();
        let mut draft = Draft::new(&base);
        assert_eq!(
            apply(&mut draft, ALICE, AdminAction::Pause, T0),
            Err(LedgerError::Unauthorized)
        );
        assert!(!draft.config().paused);
    }

    #[test]
    fn test_hardcap_cannot_drop_below_invested() {
        let base = state();
        let mut draft = Draft::new(&base);
        let req = StakeRequest {
            staker: ALICE,
            plan_index: 0,
            currency: Currency::Stable,
            payment: 5_000 * ONE_TOKEN,
            referrer: None,
        };
        open_stake(&mut draft, req, T0).unwrap();

        let err = apply(
            &mut draft,
            OWNER,
            AdminAction::UpdateHardcap {
                hardcap: 5_000 * ONE_TOKEN - 1,
            },
            T0,
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidConfig { .. }));

        apply(
            &mut draft,
            OWNER,
            AdminAction::UpdateHardcap {
                hardcap: 5_000 * ONE_TOKEN,
            },
            T0,
        )
        .unwrap();
        assert_eq!(draft.config().hardcap, 5_000 * ONE_TOKEN);
    }

    #[test]
    fn test_transfer_ownership() {
        let base = state();
        let mut draft = Draft::new(&base);
        assert_eq!(
            apply(
                &mut draft,
                OWNER,
                AdminAction::TransferOwnership {
                    new_owner: ZERO_ADDRESS
                },
                T0
            ),
            Err(LedgerError::InvalidAddress)
        );
        apply(&mut draft, OWNER, AdminAction::TransferOwnership { new_owner: ALICE }, T0).unwrap();
        assert_eq!(draft.config().owner, ALICE);
        assert_eq!(
            apply(&mut draft, OWNER, AdminAction::Pause, T0),
            Err(LedgerError::Unauthorized)
        );
        let revision = base.config.revision;
        assert_eq!(draft.config().revision, revision + 1);
    }

    #[test]
    fn test_emergency_withdraw_reports_outflow() {
        let base = state();
        let mut draft = Draft::new(&base);
        let outcome = apply(
            &mut draft,
            OWNER,
            AdminAction::EmergencyWithdraw {
                asset: ReserveAsset::Rewards,
                amount: 400 * ONE_TOKEN,
            },
            T0,
        )
        .unwrap();
        assert_eq!(
            outcome,
            Outcome::Paid {
                amount: 400 * ONE_TOKEN
            }
        );
        assert_eq!(draft.treasury.reward_reserve, 600 * ONE_TOKEN);

        let changeset = draft.finish(Outcome::Applied);
        assert_eq!(
            changeset.events,
            vec![LedgerEvent::ReservesChanged {
                asset: ReserveAsset::Rewards,
                delta: -400 * ONE_TOKEN as i128,
                balance: 600 * ONE_TOKEN,
            }]
        );
    }

    #[test]
    fn test_zero_price_is_accepted() {
        let base = state();
        let mut draft = Draft::new(&base);
        apply(
            &mut draft,
            OWNER,
            AdminAction::UpdatePrices {
                prices: BasePrices {
                    native: 0,
                    stable: ONE_TOKEN,
                },
            },
            T0,
        )
        .unwrap();
        assert_eq!(draft.config().base_prices.native, 0);
    }
}
