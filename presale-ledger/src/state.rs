use std::collections::BTreeMap;

use presale_types::config::LedgerConfig;
use presale_types::primitives::{Address, Amount, StakeId};
use presale_types::stake::{Stake, Staker};
use presale_types::state::{GlobalCounters, Treasury};

use crate::changeset::Changeset;

/// Read access shared by committed state and in-flight drafts.
pub trait LedgerView {
    fn config(&self) -> &LedgerConfig;
    fn stake(&self, id: StakeId) -> Option<Stake>;
    fn staker(&self, address: &Address) -> Option<Staker>;
    fn referral_balance(&self, address: &Address) -> Amount;

    fn referrer_of(&self, address: &Address) -> Option<Address> {
        self.staker(address).and_then(|s| s.referrer)
    }

    fn total_principal(&self, address: &Address) -> Amount {
        self.staker(address).map(|s| s.total_principal).unwrap_or(0)
    }
}

/// Committed ledger state.
#[derive(Debug, Clone)]
pub struct LedgerState {
    pub(crate) config: LedgerConfig,
    pub(crate) counters: GlobalCounters,
    pub(crate) treasury: Treasury,
    pub(crate) stakes: BTreeMap<StakeId, Stake>,
    pub(crate) stakers: BTreeMap<Address, Staker>,
    /// Staker addresses in registration order.
    pub(crate) staker_order: Vec<Address>,
    pub(crate) referral_balances: BTreeMap<Address, Amount>,
    /// Referrer -> stakers that named it, in registration order.
    pub(crate) referees: BTreeMap<Address, Vec<Address>>,
    /// Incremented by every commit.
    pub(crate) version: u64,
}

impl LedgerState {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            counters: GlobalCounters::default(),
            treasury: Treasury::default(),
            stakes: BTreeMap::new(),
            stakers: BTreeMap::new(),
            staker_order: Vec::new(),
            referral_balances: BTreeMap::new(),
            referees: BTreeMap::new(),
            version: 0,
        }
    }

    pub fn counters(&self) -> &GlobalCounters {
        &self.counters
    }

    pub fn treasury(&self) -> &Treasury {
        &self.treasury
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn staker_order(&self) -> &[Address] {
        &self.staker_order
    }

    pub fn referees(&self, referrer: &Address) -> &[Address] {
        self.referees.get(referrer).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn stakes(&self) -> impl Iterator<Item = &Stake> {
        self.stakes.values()
    }

    /// Apply a changeset that has already been checked against `version`.
    pub(crate) fn apply(&mut self, changeset: Changeset) {
        if let Some(config) = changeset.config {
            self.config = config;
        }
        self.counters = changeset.counters;
        self.treasury = changeset.treasury;
        for stake in changeset.stakes {
            self.stakes.insert(stake.id, stake);
        }
        for staker in changeset.stakers {
            self.stakers.insert(staker.address, staker);
        }
        self.staker_order.extend(changeset.new_stakers);
        for (address, amount) in changeset.referral_balances {
            if amount == 0 {
                self.referral_balances.remove(&address);
            } else {
                self.referral_balances.insert(address, amount);
            }
        }
        for (referrer, list) in changeset.referees {
            self.referees.insert(referrer, list);
        }
        self.version += 1;
    }
}

impl LedgerView for LedgerState {
    fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn stake(&self, id: StakeId) -> Option<Stake> {
        self.stakes.get(&id).cloned()
    }

    fn staker(&self, address: &Address) -> Option<Staker> {
        self.stakers.get(address).cloned()
    }

    fn referral_balance(&self, address: &Address) -> Amount {
        self.referral_balances.get(address).copied().unwrap_or(0)
    }

    fn referrer_of(&self, address: &Address) -> Option<Address> {
        self.stakers.get(address).and_then(|s| s.referrer)
    }

    fn total_principal(&self, address: &Address) -> Amount {
        self.stakers
            .get(address)
            .map(|s| s.total_principal)
            .unwrap_or(0)
    }
}
