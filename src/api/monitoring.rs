//! Monitoring & Metrics
//!
//! Lightweight atomic counters for play activity and HTTP traffic,
//! exported in Prometheus text format at `GET /metrics`.

use super::handlers::AppState;
use axum::extract::State;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Prometheus-compatible metrics registry
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// HTTP traffic
    pub http_requests_total: AtomicU64,
    pub http_errors_total: AtomicU64,

    /// Play activity
    pub saw_spins_total: AtomicU64,
    pub jackpot_payouts_total: AtomicU64,
    pub mines_boards_total: AtomicU64,
    pub mines_cashouts_total: AtomicU64,
    pub daily_spins_total: AtomicU64,

    /// Ledger movement
    pub coins_credited_total: AtomicU64,
    pub coins_debited_total: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self, success: bool) {
        self.http_requests_total.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.http_errors_total.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a signed ledger delta under the credit or debit counter.
    pub fn record_delta(&self, amount: i64) {
        if amount >= 0 {
            self.coins_credited_total
                .fetch_add(amount as u64, Ordering::Relaxed);
        } else {
            self.coins_debited_total
                .fetch_add(amount.unsigned_abs(), Ordering::Relaxed);
        }
    }

    /// Generate Prometheus metrics format
    pub fn to_prometheus_format(&self, active_boards: usize, jackpot_value: u64) -> String {
        let mut output = String::new();

        let counters = [
            (
                "scrapyard_http_requests_total",
                "Total number of HTTP requests",
                self.http_requests_total.load(Ordering::Relaxed),
            ),
            (
                "scrapyard_http_errors_total",
                "HTTP requests that returned an error",
                self.http_errors_total.load(Ordering::Relaxed),
            ),
            (
                "scrapyard_saw_spins_total",
                "Saw spins resolved",
                self.saw_spins_total.load(Ordering::Relaxed),
            ),
            (
                "scrapyard_jackpot_payouts_total",
                "Jackpot triggers paid out",
                self.jackpot_payouts_total.load(Ordering::Relaxed),
            ),
            (
                "scrapyard_mines_boards_total",
                "Job site boards opened",
                self.mines_boards_total.load(Ordering::Relaxed),
            ),
            (
                "scrapyard_mines_cashouts_total",
                "Job site boards cashed out",
                self.mines_cashouts_total.load(Ordering::Relaxed),
            ),
            (
                "scrapyard_daily_spins_total",
                "Daily prize wheel spins",
                self.daily_spins_total.load(Ordering::Relaxed),
            ),
            (
                "scrapyard_coins_credited_total",
                "Coins credited across all wallets",
                self.coins_credited_total.load(Ordering::Relaxed),
            ),
            (
                "scrapyard_coins_debited_total",
                "Coins debited across all wallets",
                self.coins_debited_total.load(Ordering::Relaxed),
            ),
        ];

        for (name, help, value) in counters {
            output.push_str(&format!(
                "# HELP {name} {help}\n# TYPE {name} counter\n{name} {value}\n\n"
            ));
        }

        output.push_str(&format!(
            "# HELP scrapyard_active_boards Boards currently in play\n\
             # TYPE scrapyard_active_boards gauge\n\
             scrapyard_active_boards {active_boards}\n\n"
        ));
        output.push_str(&format!(
            "# HELP scrapyard_jackpot_pool Current jackpot pool value\n\
             # TYPE scrapyard_jackpot_pool gauge\n\
             scrapyard_jackpot_pool {jackpot_value}\n"
        ));

        output
    }
}

/// Prometheus scrape endpoint
/// GET /metrics
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> String {
    state.metrics.to_prometheus_format(
        state.service.active_board_count(),
        state.service.jackpot_value(),
    )
}
