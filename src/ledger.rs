//! Wallet ledger: balances and their append-only audit trail.
//!
//! This is the single path through which any balance changes. Every
//! successful mutation writes the new balance and appends exactly one
//! transaction row as one indivisible unit, so the reconciliation
//! invariant holds at all times: for every user,
//! `balance == opening_balance + sum(transaction amounts)`.
//!
//! Mutations for one user are linearizable: each wallet lives behind a
//! sharded concurrent-map entry, and `apply_delta` holds that entry's
//! exclusive guard for the whole read-compute-write-append sequence. Two
//! in-flight plays by the same user always observe strictly sequential
//! balance states; plays by different users proceed in parallel.

use crate::errors::{LedgerError, LedgerResult};
use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Why a transaction row was written.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TxReason {
    SawWin,
    SawLoss,
    JackpotWin,
    MinesStart,
    MinesWin,
    DailySpinWin,
    Purchase,
    Grant,
}

/// One append-only audit trail row. Never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    /// Globally monotonic identifier.
    pub id: u64,
    pub user_id: String,
    /// Signed net delta applied to the balance.
    pub amount: i64,
    pub reason: TxReason,
    /// Unix timestamp in milliseconds.
    pub timestamp_ms: u64,
}

/// A user's wallet together with its transaction history. Only the
/// ledger constructs or mutates these.
#[derive(Debug)]
struct WalletAccount {
    balance: u64,
    history: Vec<Transaction>,
}

/// Concurrent wallet ledger.
pub struct WalletLedger {
    wallets: DashMap<String, WalletAccount>,
    tx_counter: AtomicU64,
}

impl WalletLedger {
    pub fn new() -> Self {
        Self {
            wallets: DashMap::new(),
            tx_counter: AtomicU64::new(0),
        }
    }

    /// Create a wallet for a new user. An opening balance greater than
    /// zero is recorded as a `Grant` row so reconciliation holds from the
    /// first transaction.
    pub fn create_wallet(&self, user_id: &str, opening_balance: u64) -> LedgerResult<u64> {
        match self.wallets.entry(user_id.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(LedgerError::InvalidState(format!(
                "wallet already exists for user {user_id}"
            ))),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let mut account = WalletAccount {
                    balance: opening_balance,
                    history: Vec::new(),
                };
                if opening_balance > 0 {
                    account.history.push(self.next_row(
                        user_id,
                        opening_balance as i64,
                        TxReason::Grant,
                    ));
                }
                slot.insert(account);
                tracing::info!(user_id, opening_balance, "wallet created");
                Ok(opening_balance)
            }
        }
    }

    /// Current balance, failing if no wallet exists.
    pub fn balance(&self, user_id: &str) -> LedgerResult<u64> {
        self.wallets
            .get(user_id)
            .map(|account| account.balance)
            .ok_or_else(|| LedgerError::UserNotFound {
                user_id: user_id.to_string(),
            })
    }

    /// Apply a signed delta to a wallet and append the matching audit row.
    ///
    /// Fails with `InsufficientFunds` when the delta would drive the
    /// balance negative; in that case nothing is written — no balance
    /// change, no row. On success returns the new balance.
    pub fn apply_delta(&self, user_id: &str, amount: i64, reason: TxReason) -> LedgerResult<u64> {
        let mut account =
            self.wallets
                .get_mut(user_id)
                .ok_or_else(|| LedgerError::UserNotFound {
                    user_id: user_id.to_string(),
                })?;

        let new_balance = if amount >= 0 {
            account
                .balance
                .checked_add(amount as u64)
                .ok_or_else(|| LedgerError::InvalidState("balance overflow".to_string()))?
        } else {
            account
                .balance
                .checked_sub(amount.unsigned_abs())
                .ok_or(LedgerError::InsufficientFunds)?
        };

        let row = self.next_row(user_id, amount, reason);
        tracing::debug!(user_id, amount, tx_id = row.id, ?reason, new_balance, "delta applied");
        account.balance = new_balance;
        account.history.push(row);
        Ok(new_balance)
    }

    /// Snapshot of a user's audit trail, oldest first.
    pub fn transactions(&self, user_id: &str) -> LedgerResult<Vec<Transaction>> {
        self.wallets
            .get(user_id)
            .map(|account| account.history.clone())
            .ok_or_else(|| LedgerError::UserNotFound {
                user_id: user_id.to_string(),
            })
    }

    /// Total number of rows written across all users.
    pub fn transaction_count(&self) -> u64 {
        self.tx_counter.load(Ordering::SeqCst)
    }

    fn next_row(&self, user_id: &str, amount: i64, reason: TxReason) -> Transaction {
        Transaction {
            id: self.tx_counter.fetch_add(1, Ordering::SeqCst) + 1,
            user_id: user_id.to_string(),
            amount,
            reason,
            timestamp_ms: Utc::now().timestamp_millis() as u64,
        }
    }
}

impl Default for WalletLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Every credit, including the opening grant, has a row, so the
    /// balance must equal the plain sum of the audit trail.
    fn reconcile(ledger: &WalletLedger, user_id: &str) {
        let total: i64 = ledger
            .transactions(user_id)
            .expect("history")
            .iter()
            .map(|tx| tx.amount)
            .sum();
        assert_eq!(ledger.balance(user_id).expect("balance") as i64, total);
    }

    #[test]
    fn test_create_wallet_rejects_duplicates() {
        let ledger = WalletLedger::new();
        ledger.create_wallet("miner-1", 0).expect("first create");
        assert!(matches!(
            ledger.create_wallet("miner-1", 0),
            Err(LedgerError::InvalidState(_))
        ));
    }

    #[test]
    fn test_opening_balance_writes_grant_row() {
        let ledger = WalletLedger::new();
        ledger.create_wallet("miner-1", 250).expect("create");
        let history = ledger.transactions("miner-1").expect("history");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].reason, TxReason::Grant);
        assert_eq!(history[0].amount, 250);
        assert_eq!(ledger.balance("miner-1").expect("balance"), 250);
    }

    #[test]
    fn test_reasons_serialize_as_snake_case_tags() {
        assert_eq!(
            serde_json::to_string(&TxReason::DailySpinWin).expect("serialize"),
            "\"daily_spin_win\""
        );
        assert_eq!(
            serde_json::to_string(&TxReason::JackpotWin).expect("serialize"),
            "\"jackpot_win\""
        );
    }

    #[test]
    fn test_unknown_user_fails() {
        let ledger = WalletLedger::new();
        assert!(matches!(
            ledger.balance("ghost"),
            Err(LedgerError::UserNotFound { .. })
        ));
        assert!(matches!(
            ledger.apply_delta("ghost", 10, TxReason::Purchase),
            Err(LedgerError::UserNotFound { .. })
        ));
    }

    #[test]
    fn test_delta_updates_balance_and_appends_row() {
        let ledger = WalletLedger::new();
        ledger.create_wallet("miner-1", 100).expect("create");

        assert_eq!(
            ledger.apply_delta("miner-1", 45, TxReason::SawWin).expect("credit"),
            145
        );
        assert_eq!(
            ledger.apply_delta("miner-1", -20, TxReason::SawLoss).expect("debit"),
            125
        );

        let history = ledger.transactions("miner-1").expect("history");
        assert_eq!(history.len(), 3); // grant + two plays
        assert!(history.windows(2).all(|w| w[0].id < w[1].id));
        reconcile(&ledger, "miner-1");
    }

    #[test]
    fn test_overdraft_has_zero_observable_effect() {
        let ledger = WalletLedger::new();
        ledger.create_wallet("miner-1", 15).expect("create");

        assert!(matches!(
            ledger.apply_delta("miner-1", -20, TxReason::MinesStart),
            Err(LedgerError::InsufficientFunds)
        ));

        // No balance change, no row.
        assert_eq!(ledger.balance("miner-1").expect("balance"), 15);
        assert_eq!(ledger.transactions("miner-1").expect("history").len(), 1);
    }

    #[test]
    fn test_concurrent_deltas_lose_no_updates() {
        let ledger = Arc::new(WalletLedger::new());
        ledger.create_wallet("miner-1", 1_000).expect("create");

        const THREADS: usize = 8;
        const ROUNDS: usize = 200;

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let ledger = ledger.clone();
                std::thread::spawn(move || {
                    for _ in 0..ROUNDS {
                        // Alternate credits and debits so interleavings
                        // that lose updates cannot cancel out.
                        if t % 2 == 0 {
                            ledger
                                .apply_delta("miner-1", 5, TxReason::SawWin)
                                .expect("credit");
                        } else {
                            ledger
                                .apply_delta("miner-1", -1, TxReason::SawLoss)
                                .expect("debit");
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker panicked");
        }

        let expected = 1_000 + (THREADS as i64 / 2) * ROUNDS as i64 * 5
            - (THREADS as i64 / 2) * ROUNDS as i64;
        assert_eq!(ledger.balance("miner-1").expect("balance") as i64, expected);
        assert_eq!(
            ledger.transactions("miner-1").expect("history").len(),
            1 + THREADS * ROUNDS
        );
        reconcile(&ledger, "miner-1");
    }

    #[test]
    fn test_transaction_ids_are_unique_under_concurrency() {
        let ledger = Arc::new(WalletLedger::new());
        for user in ["a", "b", "c", "d"] {
            ledger.create_wallet(user, 0).expect("create");
        }

        let handles: Vec<_> = ["a", "b", "c", "d"]
            .into_iter()
            .map(|user| {
                let ledger = ledger.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        ledger.apply_delta(user, 1, TxReason::Purchase).expect("credit");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker panicked");
        }

        let mut ids: Vec<u64> = ["a", "b", "c", "d"]
            .into_iter()
            .flat_map(|user| ledger.transactions(user).expect("history"))
            .map(|tx| tx.id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 400);
    }
}
