//! Storage for the presale staking ledger.
//!
//! A small [`KvStore`](traits::KvStore) / [`BatchWriter`](traits::BatchWriter)
//! abstraction with in-memory and SQLite backends, and the typed
//! [`LedgerStore`](ledger_store::LedgerStore) that lays ledger entities out
//! under key prefixes.

pub mod error;
pub mod ledger_store;
pub mod memory;
pub mod sqlite;
pub mod traits;
