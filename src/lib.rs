//! Scrapyard - Virtual-Currency Rewards Ledger
//!
//! Wallet/ledger engine behind the Saw and Job Site mini-games: daily
//! free-play quotas per account tier, a shared jackpot pool taxed by
//! every spin, and an append-only audit trail that reconciles exactly
//! with balance deltas under concurrent play.

pub mod api;
pub mod config;
pub mod errors;
pub mod games;
pub mod jackpot;
pub mod ledger;
pub mod quota;
pub mod rng;
pub mod service;

pub use config::EngineConfig;
pub use errors::{LedgerError, LedgerResult};
pub use jackpot::JackpotPool;
pub use ledger::{Transaction, TxReason, WalletLedger};
pub use quota::QuotaTracker;
pub use rng::{OutcomeSource, ScriptedOutcomes, SeededOutcomes, SystemOutcomes};
pub use service::PlayService;
