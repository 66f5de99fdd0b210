use borsh::{BorshDeserialize, BorshSerialize};

use presale_types::config::LedgerConfig;
use presale_types::primitives::{Address, Amount, StakeId};
use presale_types::stake::{Stake, Staker};
use presale_types::state::{GlobalCounters, Treasury};

use crate::error::StorageError;
use crate::traits::{BatchOp, BatchWriter};

// Key layout.
const SCHEMA_VERSION_KEY: &[u8] = b"meta:schema_version";
const CONFIG_KEY: &[u8] = b"ledger:config";
const COUNTERS_KEY: &[u8] = b"ledger:counters";
const TREASURY_KEY: &[u8] = b"ledger:treasury";
const VERSION_KEY: &[u8] = b"ledger:version";
const STAKE_PREFIX: &[u8] = b"stake:";
const STAKER_PREFIX: &[u8] = b"staker:";
const REFERRAL_BALANCE_PREFIX: &[u8] = b"referral:balance:";
const REFEREES_PREFIX: &[u8] = b"referral:referees:";

/// Bump whenever a persisted borsh layout changes.
pub const SCHEMA_VERSION: u32 = 1;

fn encode<T: BorshSerialize>(value: &T) -> Result<Vec<u8>, StorageError> {
    borsh::to_vec(value).map_err(|e| StorageError::SerializationError {
        reason: e.to_string(),
    })
}

fn decode<T: BorshDeserialize>(bytes: &[u8]) -> Result<T, StorageError> {
    T::try_from_slice(bytes).map_err(|e| StorageError::DeserializationError {
        reason: e.to_string(),
    })
}

fn prefixed(prefix: &[u8], suffix: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + suffix.len());
    key.extend_from_slice(prefix);
    key.extend_from_slice(suffix);
    key
}

fn stake_key(id: StakeId) -> Vec<u8> {
    // Big-endian so that a prefix scan returns stakes in id order.
    prefixed(STAKE_PREFIX, &id.to_be_bytes())
}

fn address_suffix(key: &[u8], prefix: &[u8]) -> Result<Address, StorageError> {
    key.get(prefix.len()..)
        .and_then(|s| <[u8; 20]>::try_from(s).ok())
        .ok_or_else(|| StorageError::MalformedKey {
            prefix: String::from_utf8_lossy(prefix).into_owned(),
            len: key.len(),
        })
}

/// Typed writes collected for one atomic commit.
#[derive(Debug, Default)]
pub struct LedgerBatch {
    ops: Vec<BatchOp>,
}

impl LedgerBatch {
    pub fn new() -> Self {
        Self::default()
    }

    fn put<T: BorshSerialize>(&mut self, key: Vec<u8>, value: &T) -> Result<(), StorageError> {
        self.ops.push(BatchOp::Put {
            key,
            value: encode(value)?,
        });
        Ok(())
    }

    pub fn put_config(&mut self, config: &LedgerConfig) -> Result<(), StorageError> {
        self.put(CONFIG_KEY.to_vec(), config)
    }

    pub fn put_counters(&mut self, counters: &GlobalCounters) -> Result<(), StorageError> {
        self.put(COUNTERS_KEY.to_vec(), counters)
    }

    pub fn put_treasury(&mut self, treasury: &Treasury) -> Result<(), StorageError> {
        self.put(TREASURY_KEY.to_vec(), treasury)
    }

    pub fn put_version(&mut self, version: u64) -> Result<(), StorageError> {
        self.put(VERSION_KEY.to_vec(), &version)
    }

    pub fn put_stake(&mut self, stake: &Stake) -> Result<(), StorageError> {
        self.put(stake_key(stake.id), stake)
    }

    pub fn put_staker(&mut self, staker: &Staker) -> Result<(), StorageError> {
        self.put(prefixed(STAKER_PREFIX, &staker.address), staker)
    }

    /// A zero balance is stored as an absent key.
    pub fn put_referral_balance(
        &mut self,
        address: &Address,
        amount: Amount,
    ) -> Result<(), StorageError> {
        let key = prefixed(REFERRAL_BALANCE_PREFIX, address);
        if amount == 0 {
            self.ops.push(BatchOp::Delete { key });
            Ok(())
        } else {
            self.put(key, &amount)
        }
    }

    pub fn put_referees(
        &mut self,
        referrer: &Address,
        referees: &[Address],
    ) -> Result<(), StorageError> {
        self.put(prefixed(REFEREES_PREFIX, referrer), &referees.to_vec())
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}

/// Everything needed to rebuild an engine after restart.
#[derive(Debug, Default)]
pub struct LedgerSnapshot {
    pub config: Option<LedgerConfig>,
    pub version: u64,
    pub counters: GlobalCounters,
    pub treasury: Treasury,
    /// Ordered by stake id.
    pub stakes: Vec<Stake>,
    pub stakers: Vec<Staker>,
    pub referral_balances: Vec<(Address, Amount)>,
    pub referees: Vec<(Address, Vec<Address>)>,
}

/// Ledger entities persisted under typed key prefixes.
pub struct LedgerStore<S: BatchWriter> {
    store: S,
}

impl<S: BatchWriter> LedgerStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    // ── Schema Version ─────────────────────────────────────────────────

    /// Stamp a fresh store with the current version, or verify an existing one.
    pub fn check_schema_version(&self) -> Result<(), StorageError> {
        match self.store.get(SCHEMA_VERSION_KEY)? {
            None => {
                if self.store.get(CONFIG_KEY)?.is_some() {
                    tracing::warn!(
                        expected = SCHEMA_VERSION,
                        "ledger store has data but no schema version; stamping current version"
                    );
                }
                self.store.put(SCHEMA_VERSION_KEY, &encode(&SCHEMA_VERSION)?)
            }
            Some(bytes) => {
                let stored: u32 = decode(&bytes)?;
                if stored == SCHEMA_VERSION {
                    Ok(())
                } else {
                    Err(StorageError::SchemaMismatch {
                        stored,
                        expected: SCHEMA_VERSION,
                    })
                }
            }
        }
    }

    // ── Writes ──────────────────────────────────────────────────────────

    pub fn commit(&self, batch: LedgerBatch) -> Result<(), StorageError> {
        if batch.is_empty() {
            return Ok(());
        }
        self.store.write_batch(batch.into_ops())
    }

    /// Remove every ledger key, leaving only the schema stamp.
    pub fn clear(&self) -> Result<usize, StorageError> {
        let mut ops = Vec::new();
        for prefix in [
            b"ledger:".as_slice(),
            STAKE_PREFIX,
            STAKER_PREFIX,
            b"referral:".as_slice(),
        ] {
            for (key, _) in self.store.prefix_scan(prefix)? {
                ops.push(BatchOp::Delete { key });
            }
        }
        let removed = ops.len();
        self.store.write_batch(ops)?;
        Ok(removed)
    }

    // ── Reads ───────────────────────────────────────────────────────────

    fn load<T: BorshDeserialize>(&self, key: &[u8]) -> Result<Option<T>, StorageError> {
        self.store.get(key)?.map(|b| decode(&b)).transpose()
    }

    pub fn load_config(&self) -> Result<Option<LedgerConfig>, StorageError> {
        self.load(CONFIG_KEY)
    }

    pub fn load_stake(&self, id: StakeId) -> Result<Option<Stake>, StorageError> {
        self.load(&stake_key(id))
    }

    pub fn load_staker(&self, address: &Address) -> Result<Option<Staker>, StorageError> {
        self.load(&prefixed(STAKER_PREFIX, address))
    }

    pub fn load_snapshot(&self) -> Result<LedgerSnapshot, StorageError> {
        let mut snapshot = LedgerSnapshot {
            config: self.load_config()?,
            version: self.load(VERSION_KEY)?.unwrap_or(0),
            counters: self.load(COUNTERS_KEY)?.unwrap_or_default(),
            treasury: self.load(TREASURY_KEY)?.unwrap_or_default(),
            ..Default::default()
        };

        for (_, value) in self.store.prefix_scan(STAKE_PREFIX)? {
            snapshot.stakes.push(decode(&value)?);
        }
        for (_, value) in self.store.prefix_scan(STAKER_PREFIX)? {
            snapshot.stakers.push(decode(&value)?);
        }
        for (key, value) in self.store.prefix_scan(REFERRAL_BALANCE_PREFIX)? {
            let addr = address_suffix(&key, REFERRAL_BALANCE_PREFIX)?;
            snapshot.referral_balances.push((addr, decode(&value)?));
        }
        for (key, value) in self.store.prefix_scan(REFEREES_PREFIX)? {
            let addr = address_suffix(&key, REFEREES_PREFIX)?;
            snapshot.referees.push((addr, decode(&value)?));
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::traits::KvStore;
    use presale_types::config::BasePrices;
    use presale_types::primitives::Currency;
    use std::sync::Arc;

    fn config() -> LedgerConfig {
        LedgerConfig::new(
            [1u8; 20],
            0,
            BasePrices {
                native: 10,
                stable: 20,
            },
        )
    }

    fn stake(id: StakeId, owner: Address) -> Stake {
        Stake {
            id,
            staker: owner,
            plan_index: 0,
            apy_bps: 8_000,
            lock_duration: 10,
            principal: 1_000,
            invested_value: 100,
            currency: Currency::Stable,
            opened_at: 0,
            last_claim_at: 0,
            claimed_rewards: 0,
            withdrawal_started_at: 0,
            withdrawn_percentage: 0,
            total_withdrawn_amount: 0,
            closed: false,
            referrer: None,
        }
    }

    #[test]
    fn test_schema_version_stamped_then_verified() {
        let kv = Arc::new(MemoryStore::new());
        let store = LedgerStore::new(kv.clone());
        store.check_schema_version().unwrap();
        store.check_schema_version().unwrap();

        kv.put(SCHEMA_VERSION_KEY, &borsh::to_vec(&99u32).unwrap())
            .unwrap();
        match store.check_schema_version() {
            Err(StorageError::SchemaMismatch { stored, expected }) => {
                assert_eq!(stored, 99);
                assert_eq!(expected, SCHEMA_VERSION);
            }
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let store = LedgerStore::new(MemoryStore::new());
        let alice = [2u8; 20];
        let bob = [3u8; 20];
        let mut staker = Staker::new(alice, 0, Some(bob), 5);
        staker.stake_ids = vec![2, 10];

        let mut batch = LedgerBatch::new();
        batch.put_config(&config()).unwrap();
        batch.put_version(4).unwrap();
        batch.put_stake(&stake(10, alice)).unwrap();
        batch.put_stake(&stake(2, alice)).unwrap();
        batch.put_staker(&staker).unwrap();
        batch.put_referral_balance(&bob, 77).unwrap();
        batch.put_referees(&bob, &[alice]).unwrap();
        store.commit(batch).unwrap();

        let snap = store.load_snapshot().unwrap();
        assert_eq!(snap.config, Some(config()));
        assert_eq!(snap.version, 4);
        assert_eq!(
            snap.stakes.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![2, 10]
        );
        assert_eq!(snap.stakers, vec![staker]);
        assert_eq!(snap.referral_balances, vec![(bob, 77)]);
        assert_eq!(snap.referees, vec![(bob, vec![alice])]);
        assert_eq!(store.load_stake(10).unwrap().map(|s| s.id), Some(10));
    }

    #[test]
    fn test_zero_referral_balance_deletes_key() {
        let store = LedgerStore::new(MemoryStore::new());
        let bob = [3u8; 20];
        let mut batch = LedgerBatch::new();
        batch.put_referral_balance(&bob, 5).unwrap();
        store.commit(batch).unwrap();

        let mut batch = LedgerBatch::new();
        batch.put_referral_balance(&bob, 0).unwrap();
        store.commit(batch).unwrap();
        assert!(store.load_snapshot().unwrap().referral_balances.is_empty());
    }

    #[test]
    fn test_clear_keeps_schema_stamp() {
        let kv = Arc::new(MemoryStore::new());
        let store = LedgerStore::new(kv.clone());
        store.check_schema_version().unwrap();
        let mut batch = LedgerBatch::new();
        batch.put_config(&config()).unwrap();
        batch.put_stake(&stake(1, [2u8; 20])).unwrap();
        store.commit(batch).unwrap();

        assert_eq!(store.clear().unwrap(), 2);
        assert!(store.load_config().unwrap().is_none());
        assert_eq!(kv.len().unwrap(), 1);
    }
}
