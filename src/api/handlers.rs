//! Request Handlers
//!
//! Thin axum handlers over the play service. Handlers translate ledger
//! errors into structured API errors and keep the play counters current.

use super::{errors::ApiError, middleware::RequestId, models::*, monitoring::MetricsRegistry};
use crate::games::saw::SpinLabel;
use crate::service::PlayService;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::{atomic::Ordering, Arc};
use uuid::Uuid;

/// Shared application state
pub struct AppState {
    pub service: Arc<PlayService>,
    pub metrics: Arc<MetricsRegistry>,
    pub version: String,
}

/// Health check handler - minimal response time
/// GET /health
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Running".to_string(),
        version: state.version.clone(),
    })
}

/// Register a user and create their wallet
/// POST /api/users
pub async fn register_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    if request.user_id.trim().is_empty() {
        state.metrics.record_request(false);
        return Err(ApiError::bad_request(
            request_id.0,
            "user_id must not be empty".to_string(),
        ));
    }

    let balance = state
        .service
        .register_user(&request.user_id)
        .map_err(|e| {
            state.metrics.record_request(false);
            ApiError::from_ledger(request_id.0.clone(), e)
        })?;

    state.metrics.record_request(true);
    Ok(Json(RegisterResponse {
        user_id: request.user_id,
        balance,
    }))
}

/// Wallet balance lookup
/// GET /api/wallet/:user_id
pub async fn wallet_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<WalletResponse>, ApiError> {
    let balance = state.service.balance(&user_id).map_err(|e| {
        state.metrics.record_request(false);
        ApiError::from_ledger(request_id.0.clone(), e)
    })?;

    state.metrics.record_request(true);
    Ok(Json(WalletResponse { user_id, balance }))
}

/// Audit trail lookup, oldest first
/// GET /api/wallet/:user_id/transactions
pub async fn transactions_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<TransactionsResponse>, ApiError> {
    let transactions = state.service.transactions(&user_id).map_err(|e| {
        state.metrics.record_request(false);
        ApiError::from_ledger(request_id.0.clone(), e)
    })?;

    state.metrics.record_request(true);
    Ok(Json(TransactionsResponse {
        user_id,
        transactions: transactions.into_iter().map(TransactionView::from).collect(),
    }))
}

/// Spin the Saw
/// POST /api/saw/spin
pub async fn saw_spin_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<SawSpinRequest>,
) -> Result<Json<SawSpinResponse>, ApiError> {
    let receipt = state
        .service
        .spin_saw(&request.user_id, request.tier)
        .map_err(|e| {
            state.metrics.record_request(false);
            ApiError::from_ledger(request_id.0.clone(), e)
        })?;

    state.metrics.record_request(true);
    state.metrics.saw_spins_total.fetch_add(1, Ordering::Relaxed);
    if receipt.label == SpinLabel::JackpotWin {
        state
            .metrics
            .jackpot_payouts_total
            .fetch_add(1, Ordering::Relaxed);
    }
    state.metrics.record_delta(receipt.payout);

    Ok(Json(SawSpinResponse {
        label: receipt.label,
        payout: receipt.payout,
        new_balance: receipt.new_balance,
        free_play: receipt.free_play,
        free_plays_remaining: receipt.free_plays_remaining,
    }))
}

/// Open a Job Site board
/// POST /api/mines/boards
pub async fn create_board_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateBoardRequest>,
) -> Result<Json<CreateBoardResponse>, ApiError> {
    let receipt = state
        .service
        .create_mines_board(&request.user_id, request.tier)
        .map_err(|e| {
            state.metrics.record_request(false);
            ApiError::from_ledger(request_id.0.clone(), e)
        })?;

    state.metrics.record_request(true);
    state
        .metrics
        .mines_boards_total
        .fetch_add(1, Ordering::Relaxed);

    Ok(Json(CreateBoardResponse {
        board_id: receipt.board_id,
        free_play: receipt.free_play,
        balance: receipt.balance,
    }))
}

/// Reveal one cell
/// POST /api/mines/boards/:board_id/reveal
pub async fn reveal_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(board_id): Path<Uuid>,
    Json(request): Json<RevealRequest>,
) -> Result<Json<RevealResponse>, ApiError> {
    let receipt = state
        .service
        .reveal_mines_cell(board_id, request.cell)
        .map_err(|e| {
            state.metrics.record_request(false);
            ApiError::from_ledger(request_id.0.clone(), e)
        })?;

    state.metrics.record_request(true);
    Ok(Json(RevealResponse {
        cell_outcome: receipt.outcome,
        board_status: receipt.status,
        pending_winnings: receipt.pending_winnings,
    }))
}

/// Cash a board out
/// POST /api/mines/boards/:board_id/cashout
pub async fn cashout_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(board_id): Path<Uuid>,
) -> Result<Json<CashOutResponse>, ApiError> {
    let receipt = state.service.cash_out_mines(board_id).map_err(|e| {
        state.metrics.record_request(false);
        ApiError::from_ledger(request_id.0.clone(), e)
    })?;

    state.metrics.record_request(true);
    state
        .metrics
        .mines_cashouts_total
        .fetch_add(1, Ordering::Relaxed);
    state.metrics.record_delta(receipt.credited_amount as i64);

    Ok(Json(CashOutResponse {
        credited_amount: receipt.credited_amount,
        new_balance: receipt.new_balance,
    }))
}

/// Spin the daily prize wheel
/// POST /api/daily/spin
pub async fn daily_spin_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<DailySpinRequest>,
) -> Result<Json<DailySpinResponse>, ApiError> {
    let receipt = state.service.spin_daily(&request.user_id).map_err(|e| {
        state.metrics.record_request(false);
        ApiError::from_ledger(request_id.0.clone(), e)
    })?;

    state.metrics.record_request(true);
    state
        .metrics
        .daily_spins_total
        .fetch_add(1, Ordering::Relaxed);
    state.metrics.record_delta(receipt.prize as i64);

    Ok(Json(DailySpinResponse {
        prize: receipt.prize,
        new_balance: receipt.new_balance,
    }))
}

/// Credit a confirmed crate purchase
/// POST /api/purchase
pub async fn purchase_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<PurchaseRequest>,
) -> Result<Json<PurchaseResponse>, ApiError> {
    let receipt = state
        .service
        .credit_purchase(&request.user_id)
        .map_err(|e| {
            state.metrics.record_request(false);
            ApiError::from_ledger(request_id.0.clone(), e)
        })?;

    state.metrics.record_request(true);
    state.metrics.record_delta(receipt.credited_amount as i64);

    Ok(Json(PurchaseResponse {
        credited_amount: receipt.credited_amount,
        new_balance: receipt.new_balance,
    }))
}

/// Current jackpot pool value, polled by the presentation layer
/// GET /api/jackpot
pub async fn jackpot_handler(State(state): State<Arc<AppState>>) -> Json<JackpotResponse> {
    state.metrics.record_request(true);
    Json(JackpotResponse {
        value: state.service.jackpot_value(),
    })
}
