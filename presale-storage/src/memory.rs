use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::StorageError;
use crate::traits::{BatchOp, BatchWriter, KvPairs, KvStore};

type Map = BTreeMap<Vec<u8>, Vec<u8>>;

/// Volatile store for tests and `db_type = "memory"` nodes.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<Map>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Map>, StorageError> {
        self.data.read().map_err(|e| StorageError::ReadError {
            reason: e.to_string(),
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Map>, StorageError> {
        self.data.write().map_err(|e| StorageError::WriteError {
            reason: e.to_string(),
        })
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.read()?.get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.write()?.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        self.write()?.remove(key);
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<KvPairs, StorageError> {
        let data = self.read()?;
        Ok(data
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

impl BatchWriter for MemoryStore {
    /// The whole batch is applied under one write guard, so readers observe
    /// either none or all of it.
    fn write_batch(&self, ops: Vec<BatchOp>) -> Result<(), StorageError> {
        let mut data = self.write()?;
        for op in ops {
            match op {
                BatchOp::Put { key, value } => {
                    data.insert(key, value);
                }
                BatchOp::Delete { key } => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_delete() {
        let store = MemoryStore::new();
        assert!(store.is_empty().unwrap());
        store.put(b"stake:1", b"a").unwrap();
        assert_eq!(store.get(b"stake:1").unwrap(), Some(b"a".to_vec()));
        store.put(b"stake:1", b"b").unwrap();
        assert_eq!(store.get(b"stake:1").unwrap(), Some(b"b".to_vec()));
        store.delete(b"stake:1").unwrap();
        assert_eq!(store.get(b"stake:1").unwrap(), None);
        // Deleting again is a no-op.
        store.delete(b"stake:1").unwrap();
    }

    #[test]
    fn test_prefix_scan_is_ordered_and_bounded() {
        let store = MemoryStore::new();
        store.put(b"staker:b", b"2").unwrap();
        store.put(b"staker:a", b"1").unwrap();
        store.put(b"stake:x", b"0").unwrap();
        store.put(b"stakes", b"9").unwrap();

        let pairs = store.prefix_scan(b"staker:").unwrap();
        let keys: Vec<_> = pairs.iter().map(|(k, _)| k.as_slice()).collect();
        assert_eq!(keys, vec![b"staker:a".as_slice(), b"staker:b".as_slice()]);
        assert!(store.prefix_scan(b"missing:").unwrap().is_empty());
    }

    #[test]
    fn test_batch_applies_puts_and_deletes() {
        let store = MemoryStore::new();
        store.put(b"old", b"x").unwrap();
        store
            .write_batch(vec![
                BatchOp::Put {
                    key: b"k1".to_vec(),
                    value: b"v1".to_vec(),
                },
                BatchOp::Delete {
                    key: b"old".to_vec(),
                },
                BatchOp::Put {
                    key: b"k2".to_vec(),
                    value: b"v2".to_vec(),
                },
            ])
            .unwrap();
        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(store.get(b"old").unwrap(), None);
        assert_eq!(store.get(b"k2").unwrap(), Some(b"v2".to_vec()));
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prefix_scan_matches_filter(
                keys in proptest::collection::btree_set(proptest::collection::vec(0u8..4, 0..6), 0..32),
                prefix in proptest::collection::vec(0u8..4, 0..3),
            ) {
                let store = MemoryStore::new();
                for k in &keys {
                    store.put(k, b"v").unwrap();
                }
                let scanned: Vec<Vec<u8>> = store
                    .prefix_scan(&prefix)
                    .unwrap()
                    .into_iter()
                    .map(|(k, _)| k)
                    .collect();
                let expected: Vec<Vec<u8>> = keys
                    .iter()
                    .filter(|k| k.starts_with(&prefix))
                    .cloned()
                    .collect();
                prop_assert_eq!(scanned, expected);
            }
        }
    }
}
