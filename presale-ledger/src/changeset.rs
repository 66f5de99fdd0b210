use std::collections::BTreeMap;

use serde::Serialize;

use presale_types::config::LedgerConfig;
use presale_types::event::LedgerEvent;
use presale_types::primitives::{Address, Amount, StakeId};
use presale_types::stake::{Stake, Staker};
use presale_types::state::{GlobalCounters, Treasury};

use crate::state::{LedgerState, LedgerView};

/// What a committed command produced for its caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    StakeOpened { stake_id: StakeId, principal: Amount },
    /// Amount transferred out to the caller.
    Paid { amount: Amount },
    Distributed { stakes_paid: u64, amount: Amount },
    Applied,
}

/// The full effect of one command, expressed as the new values of every
/// touched record.
///
/// Produced by `prepare` without mutating the ledger; applied by `commit`
/// only while the ledger is still at `base_version`.
#[derive(Debug, Clone)]
pub struct Changeset {
    pub base_version: u64,
    pub config: Option<LedgerConfig>,
    pub counters: GlobalCounters,
    pub treasury: Treasury,
    pub stakes: Vec<Stake>,
    pub stakers: Vec<Staker>,
    /// Addresses registered by this changeset, in order.
    pub new_stakers: Vec<Address>,
    pub referral_balances: Vec<(Address, Amount)>,
    pub referees: Vec<(Address, Vec<Address>)>,
    pub events: Vec<LedgerEvent>,
    pub outcome: Outcome,
}

/// Copy-on-write overlay over committed state used while preparing.
pub(crate) struct Draft<'a> {
    base: &'a LedgerState,
    config: Option<LedgerConfig>,
    pub(crate) counters: GlobalCounters,
    pub(crate) treasury: Treasury,
    stakes: BTreeMap<StakeId, Stake>,
    stakers: BTreeMap<Address, Staker>,
    new_stakers: Vec<Address>,
    referral_balances: BTreeMap<Address, Amount>,
    referees: BTreeMap<Address, Vec<Address>>,
    events: Vec<LedgerEvent>,
}

impl<'a> Draft<'a> {
    pub(crate) fn new(base: &'a LedgerState) -> Self {
        Self {
            base,
            config: None,
            counters: base.counters.clone(),
            treasury: base.treasury.clone(),
            stakes: BTreeMap::new(),
            stakers: BTreeMap::new(),
            new_stakers: Vec::new(),
            referral_balances: BTreeMap::new(),
            referees: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    pub(crate) fn config_mut(&mut self) -> &mut LedgerConfig {
        let base = self.base;
        self.config.get_or_insert_with(|| base.config.clone())
    }

    pub(crate) fn put_stake(&mut self, stake: Stake) {
        self.stakes.insert(stake.id, stake);
    }

    pub(crate) fn put_staker(&mut self, staker: Staker) {
        self.stakers.insert(staker.address, staker);
    }

    pub(crate) fn register_staker(&mut self, staker: Staker) {
        self.new_stakers.push(staker.address);
        self.put_staker(staker);
    }

    pub(crate) fn set_referral_balance(&mut self, address: Address, amount: Amount) {
        self.referral_balances.insert(address, amount);
    }

    pub(crate) fn add_referee(&mut self, referrer: Address, referee: Address) {
        let base = self.base;
        self.referees
            .entry(referrer)
            .or_insert_with(|| base.referees(&referrer).to_vec())
            .push(referee);
    }

    pub(crate) fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    /// Staker addresses in registration order, including ones added here.
    pub(crate) fn staker_order(&self) -> Vec<Address> {
        let mut order = self.base.staker_order().to_vec();
        order.extend_from_slice(&self.new_stakers);
        order
    }

    pub(crate) fn finish(self, outcome: Outcome) -> Changeset {
        Changeset {
            base_version: self.base.version,
            config: self.config,
            counters: self.counters,
            treasury: self.treasury,
            stakes: self.stakes.into_values().collect(),
            stakers: self.stakers.into_values().collect(),
            new_stakers: self.new_stakers,
            referral_balances: self.referral_balances.into_iter().collect(),
            referees: self.referees.into_iter().collect(),
            events: self.events,
            outcome,
        }
    }
}

impl LedgerView for Draft<'_> {
    fn config(&self) -> &LedgerConfig {
        self.config.as_ref().unwrap_or(&self.base.config)
    }

    fn stake(&self, id: StakeId) -> Option<Stake> {
        self.stakes
            .get(&id)
            .cloned()
            .or_else(|| self.base.stake(id))
    }

    fn staker(&self, address: &Address) -> Option<Staker> {
        self.stakers
            .get(address)
            .cloned()
            .or_else(|| self.base.staker(address))
    }

    fn referral_balance(&self, address: &Address) -> Amount {
        self.referral_balances
            .get(address)
            .copied()
            .unwrap_or_else(|| self.base.referral_balance(address))
    }
}
