//! Async facade over the persistent ledger.
//!
//! The ledger is a single writer: every mutating command holds the write
//! lock across prepare, persist and commit, while queries share the read
//! lock.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use presale_ledger::engine::Receipt;
use presale_ledger::oracle::PriceQuote;
use presale_ledger::{Command, GlobalStats, LedgerEngine, PersistentLedger};
use presale_storage::memory::MemoryStore;
use presale_storage::sqlite::SqliteStore;
use presale_storage::traits::BatchWriter;
use presale_types::config::LedgerConfig;
use presale_types::constants::PLAN_COUNT;
use presale_types::primitives::*;
use presale_types::stake::{Stake, StakePlan, Staker};

use crate::clock::Clock;
use crate::config::NodeConfig;
use crate::error::NodeError;

pub type DynStore = Arc<dyn BatchWriter>;

/// A stake together with what could be claimed on it right now.
#[derive(Debug, Clone, Serialize)]
pub struct StakeView {
    pub stake: Stake,
    pub pending_rewards: Amount,
}

/// Everything known about one address.
#[derive(Debug, Clone, Serialize)]
pub struct StakerView {
    pub staker: Staker,
    pub stakes: Vec<StakeView>,
    pub referral_balance: Amount,
    pub referrals: Vec<Address>,
}

/// Open the backend named by `storage.db_type`.
pub fn open_store(config: &NodeConfig) -> Result<DynStore, NodeError> {
    match config.storage.db_type.as_str() {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        "sqlite" => {
            std::fs::create_dir_all(&config.storage.data_dir)?;
            let path = config.database_path();
            tracing::debug!(path = %path.display(), "opening sqlite store");
            Ok(Arc::new(SqliteStore::open(path)?))
        }
        other => Err(NodeError::ConfigError {
            reason: format!("unknown db_type '{}', expected 'memory' or 'sqlite'", other),
        }),
    }
}

#[derive(Clone)]
pub struct LedgerService {
    ledger: Arc<RwLock<PersistentLedger<DynStore>>>,
    clock: Arc<dyn Clock>,
}

impl LedgerService {
    pub fn open(config: &NodeConfig, clock: Arc<dyn Clock>) -> Result<Self, NodeError> {
        let genesis = config.ledger.to_genesis()?;
        Self::with_store(open_store(config)?, genesis, clock)
    }

    pub fn with_store(
        store: DynStore,
        genesis: LedgerConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, NodeError> {
        let ledger = PersistentLedger::open(store, genesis)?;
        Ok(Self {
            ledger: Arc::new(RwLock::new(ledger)),
            clock,
        })
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Run a command at the clock's current time.
    pub async fn execute(&self, command: Command) -> Result<Receipt, NodeError> {
        let now = self.clock.now();
        self.execute_at(command, now).await
    }

    pub async fn execute_at(&self, command: Command, now: Timestamp) -> Result<Receipt, NodeError> {
        let mut ledger = self.ledger.write().await;
        Ok(ledger.execute(&command, now)?)
    }

    /// Run `f` against the committed engine under the read lock.
    pub async fn read<R>(&self, f: impl FnOnce(&LedgerEngine) -> R) -> R {
        let ledger = self.ledger.read().await;
        f(ledger.engine())
    }

    pub async fn stats(&self) -> Result<GlobalStats, NodeError> {
        let now = self.now();
        Ok(self.read(|e| e.global_stats(now)).await?)
    }

    pub async fn plans(&self) -> [StakePlan; PLAN_COUNT] {
        self.read(|e| e.config().plans).await
    }

    pub async fn quotes(&self) -> Result<Vec<PriceQuote>, NodeError> {
        let now = self.now();
        let quotes = self
            .read(|e| {
                Currency::ALL
                    .iter()
                    .map(|c| e.quote(*c, now))
                    .collect::<Result<Vec<_>, _>>()
            })
            .await?;
        Ok(quotes)
    }

    pub async fn stake(&self, id: StakeId) -> Option<StakeView> {
        let now = self.now();
        self.read(|e| {
            e.stake(id).map(|s| StakeView {
                stake: s.clone(),
                pending_rewards: e.pending_rewards(id, now),
            })
        })
        .await
    }

    pub async fn staker(&self, address: Address) -> Option<StakerView> {
        let now = self.now();
        self.read(|e| {
            let staker = e.staker(&address)?.clone();
            let stakes = e
                .stakes_of(&address)
                .into_iter()
                .map(|s| StakeView {
                    stake: s.clone(),
                    pending_rewards: e.pending_rewards(s.id, now),
                })
                .collect();
            Some(StakerView {
                staker,
                stakes,
                referral_balance: e.referral_balance(&address),
                referrals: e.referrals_of(&address).to_vec(),
            })
        })
        .await
    }

    /// Referees of `address` and its unwithdrawn referral balance.
    pub async fn referrals(&self, address: Address) -> (Vec<Address>, Amount) {
        self.read(|e| (e.referrals_of(&address).to_vec(), e.referral_balance(&address)))
            .await
    }

    /// Wipe the store and restart from `genesis`.
    pub async fn reset(&self, genesis: LedgerConfig) -> Result<usize, NodeError> {
        let mut ledger = self.ledger.write().await;
        Ok(ledger.reset(genesis)?)
    }
}
