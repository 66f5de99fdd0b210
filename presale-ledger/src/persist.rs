//! Write-ahead persistence around [`LedgerEngine`].
//!
//! Every command is prepared in memory, its changeset is written to the
//! store as one atomic batch, and only then is it committed in memory. A
//! failed write leaves both the store and the engine at the previous
//! version.

use presale_storage::error::StorageError;
use presale_storage::ledger_store::{LedgerBatch, LedgerStore};
use presale_storage::traits::BatchWriter;
use presale_types::config::LedgerConfig;
use presale_types::primitives::{format_address, Timestamp};

use crate::changeset::Changeset;
use crate::command::Command;
use crate::engine::{LedgerEngine, Receipt};
use crate::error::EngineError;

/// Translate a changeset into the store writes that persist it.
pub fn changeset_batch(changeset: &Changeset, new_version: u64) -> Result<LedgerBatch, StorageError> {
    let mut batch = LedgerBatch::new();
    if let Some(config) = &changeset.config {
        batch.put_config(config)?;
    }
    batch.put_counters(&changeset.counters)?;
    batch.put_treasury(&changeset.treasury)?;
    for stake in &changeset.stakes {
        batch.put_stake(stake)?;
    }
    for staker in &changeset.stakers {
        batch.put_staker(staker)?;
    }
    for (address, amount) in &changeset.referral_balances {
        batch.put_referral_balance(address, *amount)?;
    }
    for (referrer, referees) in &changeset.referees {
        batch.put_referees(referrer, referees)?;
    }
    batch.put_version(new_version)?;
    Ok(batch)
}

/// A ledger engine whose every commit is durable.
pub struct PersistentLedger<S: BatchWriter> {
    engine: LedgerEngine,
    store: LedgerStore<S>,
}

impl<S: BatchWriter> PersistentLedger<S> {
    /// Open a store, restoring the ledger it holds or initialising it with
    /// `genesis` when empty.
    pub fn open(store: S, genesis: LedgerConfig) -> Result<Self, EngineError> {
        let store = LedgerStore::new(store);
        store.check_schema_version()?;
        let snapshot = store.load_snapshot()?;
        let engine = if snapshot.config.is_some() {
            LedgerEngine::from_snapshot(snapshot)?
        } else {
            let engine = Self::genesis(&store, genesis)?;
            tracing::info!(
                owner = %format_address(&engine.config().owner),
                "initialised empty ledger store"
            );
            engine
        };
        Ok(Self { engine, store })
    }

    fn genesis(store: &LedgerStore<S>, config: LedgerConfig) -> Result<LedgerEngine, EngineError> {
        let engine = LedgerEngine::new(config)?;
        let mut batch = LedgerBatch::new();
        batch.put_config(engine.config())?;
        batch.put_counters(engine.state().counters())?;
        batch.put_treasury(engine.state().treasury())?;
        batch.put_version(engine.version())?;
        store.commit(batch)?;
        Ok(engine)
    }

    pub fn engine(&self) -> &LedgerEngine {
        &self.engine
    }

    /// Prepare, persist, then commit `command`.
    pub fn execute(&mut self, command: &Command, now: Timestamp) -> Result<Receipt, EngineError> {
        let changeset = self.engine.prepare(command, now)?;
        let batch = changeset_batch(&changeset, self.engine.version() + 1)?;
        let writes = batch.len();
        self.store.commit(batch).inspect_err(|e| {
            tracing::error!(command = command.name(), error = %e, "failed to persist changeset");
        })?;
        tracing::trace!(command = command.name(), writes, "changeset persisted");
        Ok(self.engine.commit(changeset)?)
    }

    /// Wipe the stored ledger and start over from `genesis`.
    pub fn reset(&mut self, genesis: LedgerConfig) -> Result<usize, EngineError> {
        let removed = self.store.clear()?;
        self.engine = Self::genesis(&self.store, genesis)?;
        tracing::warn!(removed, "ledger store reset to genesis");
        Ok(removed)
    }
}
