//! API request and response models.
//!
//! Every mutating request carries an already-resolved `user_id` (and
//! `tier` where the daily quota applies) — identity resolution belongs to
//! the excluded session layer.

use crate::games::mines::{BoardStatus, RevealOutcome};
use crate::games::saw::SpinLabel;
use crate::ledger::{Transaction, TxReason};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// GET /health
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// POST /api/users
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: String,
    pub balance: u64,
}

/// GET /api/wallet/:user_id
#[derive(Debug, Serialize, Deserialize)]
pub struct WalletResponse {
    pub user_id: String,
    pub balance: u64,
}

/// One audit-trail row as exposed to clients.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionView {
    pub id: u64,
    pub amount: i64,
    pub reason: TxReason,
    pub timestamp_ms: u64,
}

impl From<Transaction> for TransactionView {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            amount: tx.amount,
            reason: tx.reason,
            timestamp_ms: tx.timestamp_ms,
        }
    }
}

/// GET /api/wallet/:user_id/transactions
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionsResponse {
    pub user_id: String,
    pub transactions: Vec<TransactionView>,
}

/// POST /api/saw/spin
#[derive(Debug, Serialize, Deserialize)]
pub struct SawSpinRequest {
    pub user_id: String,
    #[serde(default)]
    pub tier: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SawSpinResponse {
    pub label: SpinLabel,
    pub payout: i64,
    pub new_balance: u64,
    pub free_play: bool,
    pub free_plays_remaining: u32,
}

/// POST /api/mines/boards
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateBoardRequest {
    pub user_id: String,
    #[serde(default)]
    pub tier: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateBoardResponse {
    pub board_id: Uuid,
    pub free_play: bool,
    pub balance: u64,
}

/// POST /api/mines/boards/:board_id/reveal
#[derive(Debug, Serialize, Deserialize)]
pub struct RevealRequest {
    pub cell: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RevealResponse {
    pub cell_outcome: RevealOutcome,
    pub board_status: BoardStatus,
    pub pending_winnings: u64,
}

/// POST /api/mines/boards/:board_id/cashout
#[derive(Debug, Serialize, Deserialize)]
pub struct CashOutResponse {
    pub credited_amount: u64,
    pub new_balance: u64,
}

/// POST /api/daily/spin
#[derive(Debug, Serialize, Deserialize)]
pub struct DailySpinRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DailySpinResponse {
    pub prize: u64,
    pub new_balance: u64,
}

/// POST /api/purchase
#[derive(Debug, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PurchaseResponse {
    pub credited_amount: u64,
    pub new_balance: u64,
}

/// GET /api/jackpot
#[derive(Debug, Serialize, Deserialize)]
pub struct JackpotResponse {
    pub value: u64,
}
