//! Presale staking ledger engine.
//!
//! Prices stakes, validates them against the plan table, accrues weekly
//! rewards, fans a share of every claim out across up to six referral
//! levels, and releases principal in weekly slices once a lock expires.
//! Every command is evaluated in two phases: [`LedgerEngine::prepare`]
//! produces a [`Changeset`] without touching state, and
//! [`LedgerEngine::commit`] applies it.

pub mod accrual;
pub mod admin;
pub mod changeset;
pub mod command;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod math;
pub mod oracle;
pub mod persist;
pub mod plans;
pub mod referral;
pub mod state;
pub mod treasury;
pub mod withdrawal;

pub use changeset::{Changeset, Outcome};
pub use command::{AdminAction, Command};
pub use engine::{GlobalStats, LedgerEngine, Receipt};
pub use error::EngineError;
pub use persist::PersistentLedger;
