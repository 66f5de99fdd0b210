use serde::Serialize;

use presale_storage::ledger_store::LedgerSnapshot;
use presale_types::config::LedgerConfig;
use presale_types::error::LedgerError;
use presale_types::event::LedgerEvent;
use presale_types::primitives::*;
use presale_types::stake::{Stake, StakePlan, Staker};
use presale_types::state::Treasury;

use crate::accrual;
use crate::admin;
use crate::changeset::{Changeset, Draft, Outcome};
use crate::command::Command;
use crate::error::EngineError;
use crate::ledger::{self, StakeRequest};
use crate::oracle::{self, PriceQuote};
use crate::plans;
use crate::state::{LedgerState, LedgerView};

/// What a committed command returns to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub outcome: Outcome,
    pub events: Vec<LedgerEvent>,
    /// Ledger version after the commit.
    pub version: u64,
}

/// Reporting view over the global aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalStats {
    pub version: u64,
    pub config_revision: u64,
    pub paused: bool,
    pub staker_count: u64,
    pub stake_count: u64,
    pub total_invested: Amount,
    pub hardcap: Amount,
    pub total_distributed: Amount,
    pub total_rewards_paid: Amount,
    pub total_referral_credited: Amount,
    pub total_principal_returned: Amount,
    pub treasury: Treasury,
    pub native_price: Amount,
    pub stable_price: Amount,
}

/// The staking ledger with a two-phase command boundary.
pub struct LedgerEngine {
    state: LedgerState,
}

impl LedgerEngine {
    /// Fresh ledger with the given genesis configuration.
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerError> {
        plans::check_config(&config)?;
        Ok(Self {
            state: LedgerState::new(config),
        })
    }

    /// Rebuild a ledger from persisted records.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Result<Self, EngineError> {
        let config = snapshot.config.ok_or_else(|| EngineError::CorruptState {
            reason: "no ledger config in store".to_string(),
        })?;
        let mut state = LedgerState::new(config);
        state.version = snapshot.version;
        state.counters = snapshot.counters;
        state.treasury = snapshot.treasury;

        let mut order: Vec<(u64, Address)> = snapshot
            .stakers
            .iter()
            .map(|s| (s.index, s.address))
            .collect();
        order.sort_unstable();
        for (expected, (index, address)) in order.iter().enumerate() {
            if *index != expected as u64 {
                return Err(EngineError::CorruptState {
                    reason: format!(
                        "staker {} has index {}, expected {}",
                        format_address(address),
                        index,
                        expected
                    ),
                });
            }
        }
        state.staker_order = order.into_iter().map(|(_, a)| a).collect();
        state.stakers = snapshot
            .stakers
            .into_iter()
            .map(|s| (s.address, s))
            .collect();

        for stake in snapshot.stakes {
            if !state.stakers.contains_key(&stake.staker) {
                return Err(EngineError::CorruptState {
                    reason: format!("stake {} has no staker record", stake.id),
                });
            }
            state.stakes.insert(stake.id, stake);
        }
        if state.stakes.len() as u64 != state.counters.stake_count {
            return Err(EngineError::CorruptState {
                reason: format!(
                    "{} stakes stored but counter says {}",
                    state.stakes.len(),
                    state.counters.stake_count
                ),
            });
        }
        state.referral_balances = snapshot.referral_balances.into_iter().collect();
        state.referees = snapshot.referees.into_iter().collect();

        tracing::info!(
            version = state.version,
            stakers = state.staker_order.len(),
            stakes = state.stakes.len(),
            "ledger restored from store"
        );
        Ok(Self { state })
    }

    // ── Two-phase boundary ──────────────────────────────────────────────

    /// Evaluate `command` at `now` without touching state.
    pub fn prepare(&self, command: &Command, now: Timestamp) -> Result<Changeset, LedgerError> {
        let result = self.evaluate(command, now);
        if let Err(e) = &result {
            tracing::debug!(command = command.name(), now, error = %e, "command rejected");
        }
        result
    }

    fn evaluate(&self, command: &Command, now: Timestamp) -> Result<Changeset, LedgerError> {
        let mut draft = Draft::new(&self.state);
        let paused = self.state.config.paused;

        let outcome = match command {
            Command::Admin { caller, action } => admin::apply(&mut draft, *caller, action.clone(), now)?,
            _ if paused => return Err(LedgerError::Paused),
            Command::OpenStake {
                staker,
                plan_index,
                currency,
                payment,
                referrer,
            } => {
                let req = StakeRequest {
                    staker: *staker,
                    plan_index: *plan_index,
                    currency: *currency,
                    payment: *payment,
                    referrer: *referrer,
                };
                let (stake_id, principal) = ledger::open_stake(&mut draft, req, now)?;
                Outcome::StakeOpened {
                    stake_id,
                    principal,
                }
            }
            Command::ClaimRewards { staker, stake_id } => {
                let receipt = ledger::claim_rewards(&mut draft, *staker, *stake_id, now)?;
                Outcome::Paid {
                    amount: receipt.net,
                }
            }
            Command::WithdrawPrincipal { staker, stake_id } => {
                let amount = ledger::withdraw_principal(&mut draft, *staker, *stake_id, now)?;
                Outcome::Paid { amount }
            }
            Command::WithdrawReferralRewards { staker } => {
                let amount = ledger::withdraw_referral_rewards(&mut draft, *staker)?;
                Outcome::Paid { amount }
            }
        };
        Ok(draft.finish(outcome))
    }

    /// Apply a prepared changeset. Fails if anything was committed since it
    /// was prepared.
    pub fn commit(&mut self, changeset: Changeset) -> Result<Receipt, LedgerError> {
        if changeset.base_version != self.state.version {
            return Err(LedgerError::StaleChangeset {
                prepared: changeset.base_version,
                current: self.state.version,
            });
        }
        let outcome = changeset.outcome.clone();
        let events = changeset.events.clone();
        self.state.apply(changeset);

        for event in &events {
            tracing::debug!(version = self.state.version, event = event.kind(), "ledger event");
        }
        tracing::info!(
            version = self.state.version,
            events = events.len(),
            ?outcome,
            "changeset committed"
        );
        Ok(Receipt {
            outcome,
            events,
            version: self.state.version,
        })
    }

    /// `prepare` followed by `commit`.
    pub fn execute(&mut self, command: &Command, now: Timestamp) -> Result<Receipt, LedgerError> {
        let changeset = self.prepare(command, now)?;
        self.commit(changeset)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.state.config
    }

    pub fn version(&self) -> u64 {
        self.state.version
    }

    pub fn stake(&self, id: StakeId) -> Option<&Stake> {
        self.state.stakes.get(&id)
    }

    pub fn staker(&self, address: &Address) -> Option<&Staker> {
        self.state.stakers.get(address)
    }

    pub fn stakes_of(&self, address: &Address) -> Vec<&Stake> {
        self.staker(address)
            .map(|s| s.stake_ids.iter().filter_map(|id| self.stake(*id)).collect())
            .unwrap_or_default()
    }

    pub fn plan(&self, index: PlanIndex) -> Result<&StakePlan, LedgerError> {
        self.state
            .config
            .plan(index)
            .ok_or(LedgerError::InvalidPlanIndex(index))
    }

    pub fn current_price(&self, currency: Currency, now: Timestamp) -> Result<Amount, LedgerError> {
        oracle::current_price(&self.state.config, currency, now)
    }

    pub fn quote(&self, currency: Currency, now: Timestamp) -> Result<PriceQuote, LedgerError> {
        oracle::quote(&self.state.config, currency, now)
    }

    pub fn referral_balance(&self, address: &Address) -> Amount {
        self.state.referral_balance(address)
    }

    /// Stakers that named `address` as their referrer, in registration order.
    pub fn referrals_of(&self, address: &Address) -> &[Address] {
        self.state.referees(address)
    }

    /// Claimable reward on a stake, or zero where a claim would fail.
    pub fn pending_rewards(&self, stake_id: StakeId, now: Timestamp) -> Amount {
        self.stake(stake_id)
            .map(|s| accrual::pending(s, now))
            .unwrap_or(0)
    }

    pub fn global_stats(&self, now: Timestamp) -> Result<GlobalStats, LedgerError> {
        let c = &self.state.counters;
        Ok(GlobalStats {
            version: self.state.version,
            config_revision: self.state.config.revision,
            paused: self.state.config.paused,
            staker_count: c.staker_count,
            stake_count: c.stake_count,
            total_invested: c.total_invested,
            hardcap: self.state.config.hardcap,
            total_distributed: c.total_distributed,
            total_rewards_paid: c.total_rewards_paid,
            total_referral_credited: c.total_referral_credited,
            total_principal_returned: c.total_principal_returned,
            treasury: self.state.treasury.clone(),
            native_price: self.current_price(Currency::Native, now)?,
            stable_price: self.current_price(Currency::Stable, now)?,
        })
    }
}
