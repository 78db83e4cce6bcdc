//! Play service: the orchestrator behind every public operation.
//!
//! Each play request runs the same sequence: decide free-vs-paid through
//! the quota tracker, pre-check funds for paid plays, resolve the game
//! outcome, commit exactly one ledger delta, and only then commit the
//! quota counter and the jackpot tax. The ledger commit is the single
//! point of truth — any failure before it leaves no trace, and the quota
//! commit after it is idempotent per play id so a retried commit can
//! never double-count.

use crate::config::EngineConfig;
use crate::errors::{LedgerError, LedgerResult};
use crate::games::mines::{BoardStatus, MinesBoard, RevealOutcome, BOARD_CELLS};
use crate::games::saw::{SawEngine, SpinLabel};
use crate::games::GameKind;
use crate::jackpot::JackpotPool;
use crate::ledger::{Transaction, TxReason, WalletLedger};
use crate::quota::{current_day, QuotaTracker};
use crate::rng::OutcomeSource;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Result of one Saw spin.
#[derive(Debug, Clone)]
pub struct SawSpinReceipt {
    pub label: SpinLabel,
    /// Gross payout before the spin cost.
    pub payout: i64,
    pub new_balance: u64,
    pub free_play: bool,
    pub free_plays_remaining: u32,
}

/// Result of creating a Job Site board.
#[derive(Debug, Clone)]
pub struct BoardReceipt {
    pub board_id: Uuid,
    pub free_play: bool,
    pub balance: u64,
}

/// Result of one reveal.
#[derive(Debug, Clone)]
pub struct RevealReceipt {
    pub outcome: RevealOutcome,
    pub status: BoardStatus,
    pub pending_winnings: u64,
}

/// Result of cashing a board out.
#[derive(Debug, Clone)]
pub struct CashOutReceipt {
    pub credited_amount: u64,
    pub new_balance: u64,
}

/// Result of the daily spin.
#[derive(Debug, Clone)]
pub struct DailySpinReceipt {
    pub prize: u64,
    pub new_balance: u64,
}

/// Result of a confirmed crate purchase.
#[derive(Debug, Clone)]
pub struct PurchaseReceipt {
    pub credited_amount: u64,
    pub new_balance: u64,
}

/// Composes the ledger, quota tracker, jackpot pool, and game engines
/// into the public play operations. One instance serves every concurrent
/// request.
pub struct PlayService {
    config: EngineConfig,
    ledger: WalletLedger,
    quota: QuotaTracker,
    jackpot: JackpotPool,
    boards: DashMap<Uuid, MinesBoard>,
    rng: Arc<dyn OutcomeSource>,
}

impl PlayService {
    pub fn new(config: EngineConfig, rng: Arc<dyn OutcomeSource>) -> Self {
        let quota = QuotaTracker::new(config.quota.tier_limits.clone());
        let jackpot = JackpotPool::new(config.jackpot.base_value);
        Self {
            config,
            ledger: WalletLedger::new(),
            quota,
            jackpot,
            boards: DashMap::new(),
            rng,
        }
    }

    /// Register a user, creating their wallet with the configured opening
    /// balance.
    pub fn register_user(&self, user_id: &str) -> LedgerResult<u64> {
        self.ledger
            .create_wallet(user_id, self.config.wallet.opening_balance)
    }

    pub fn balance(&self, user_id: &str) -> LedgerResult<u64> {
        self.ledger.balance(user_id)
    }

    pub fn transactions(&self, user_id: &str) -> LedgerResult<Vec<Transaction>> {
        self.ledger.transactions(user_id)
    }

    /// Current jackpot pool value, polled by the presentation layer.
    pub fn jackpot_value(&self) -> u64 {
        self.jackpot.value()
    }

    /// Credit a confirmed crate purchase. The payment gateway interaction
    /// itself belongs to the excluded outer layer; by the time this runs
    /// the purchase is settled.
    pub fn credit_purchase(&self, user_id: &str) -> LedgerResult<PurchaseReceipt> {
        let amount = self.config.wallet.crate_amount;
        let new_balance = self
            .ledger
            .apply_delta(user_id, amount as i64, TxReason::Purchase)?;
        tracing::info!(user_id, amount, new_balance, "crate purchase credited");
        Ok(PurchaseReceipt {
            credited_amount: amount,
            new_balance,
        })
    }

    /// Spin the Saw.
    pub fn spin_saw(&self, user_id: &str, tier: u8) -> LedgerResult<SawSpinReceipt> {
        let today = current_day();
        let play_id = Uuid::new_v4();

        let remaining = self
            .quota
            .free_plays_remaining(user_id, GameKind::Saw, tier, today);
        let free_play = remaining > 0;

        // Read-only funds check up front; the authoritative check is the
        // ledger's own invariant inside apply_delta. This also surfaces
        // UserNotFound before any draw mutates the pool.
        let balance = self.ledger.balance(user_id)?;
        let cost = if free_play { 0 } else { self.config.saw.cost };
        if balance < cost {
            return Err(LedgerError::InsufficientFunds);
        }

        let outcome = SawEngine::resolve_spin(self.rng.as_ref(), &self.jackpot);
        let net = outcome.payout - cost as i64;

        let new_balance = self
            .ledger
            .apply_delta(user_id, net, outcome.label.tx_reason())?;

        // Bookkeeping after the ledger commit: quota for free plays, and
        // the pool tax on every non-jackpot spin regardless of outcome.
        if free_play {
            self.quota
                .consume_free_play(user_id, GameKind::Saw, today, play_id);
        }
        if outcome.label != SpinLabel::JackpotWin {
            self.jackpot.add_tax(self.config.jackpot.spin_tax);
        }

        tracing::info!(
            user_id,
            label = %outcome.label,
            payout = outcome.payout,
            net,
            free_play,
            "saw spin resolved"
        );

        Ok(SawSpinReceipt {
            label: outcome.label,
            payout: outcome.payout,
            new_balance,
            free_play,
            free_plays_remaining: self
                .quota
                .free_plays_remaining(user_id, GameKind::Saw, tier, today),
        })
    }

    /// Open a Job Site board. Free-vs-paid is decided here, once; a paid
    /// board charges its cost immediately and a later bust never refunds
    /// it.
    pub fn create_mines_board(&self, user_id: &str, tier: u8) -> LedgerResult<BoardReceipt> {
        let today = current_day();

        let remaining = self
            .quota
            .free_plays_remaining(user_id, GameKind::Mines, tier, today);
        let free_play = remaining > 0;

        let mut balance = self.ledger.balance(user_id)?;
        if !free_play {
            if balance < self.config.mines.cost {
                return Err(LedgerError::InsufficientFunds);
            }
            balance = self.ledger.apply_delta(
                user_id,
                -(self.config.mines.cost as i64),
                TxReason::MinesStart,
            )?;
        }

        let board = MinesBoard::create(self.rng.as_ref(), user_id, free_play);
        let board_id = board.id;
        if free_play {
            self.quota
                .consume_free_play(user_id, GameKind::Mines, today, board.play_id);
        }
        self.boards.insert(board_id, board);

        tracing::info!(user_id, %board_id, free_play, "job site board opened");
        Ok(BoardReceipt {
            board_id,
            free_play,
            balance,
        })
    }

    /// Reveal one cell on a board. Pure board-state transition; the
    /// wallet is untouched until cash-out.
    pub fn reveal_mines_cell(&self, board_id: Uuid, cell: usize) -> LedgerResult<RevealReceipt> {
        if cell >= BOARD_CELLS {
            return Err(LedgerError::InvalidState(format!(
                "cell index {cell} out of range"
            )));
        }

        let mut board = self
            .boards
            .get_mut(&board_id)
            .ok_or(LedgerError::BoardNotFound { board_id })?;

        let outcome = board.reveal(cell);
        let receipt = RevealReceipt {
            outcome,
            status: board.status,
            pending_winnings: board.pending_winnings,
        };
        let busted = board.status == BoardStatus::Busted;
        drop(board);

        // A busted board is finished; forget it. The start cost stays
        // charged and the pending winnings are already forfeited.
        if busted {
            self.boards.remove(&board_id);
            tracing::info!(%board_id, "board busted");
        }

        Ok(receipt)
    }

    /// Cash a board out, crediting its pending winnings.
    pub fn cash_out_mines(&self, board_id: Uuid) -> LedgerResult<CashOutReceipt> {
        let (user_id, amount) = {
            let mut board = self
                .boards
                .get_mut(&board_id)
                .ok_or(LedgerError::BoardNotFound { board_id })?;
            let amount = board.cash_out()?;
            (board.user_id.clone(), amount)
        };

        let new_balance = self
            .ledger
            .apply_delta(&user_id, amount as i64, TxReason::MinesWin)?;
        self.boards.remove(&board_id);

        tracing::info!(user_id, %board_id, amount, new_balance, "board cashed out");
        Ok(CashOutReceipt {
            credited_amount: amount,
            new_balance,
        })
    }

    /// Spin the daily prize wheel: stake-free, once per canonical day.
    /// Only a non-zero prize writes a ledger row, matching the audit
    /// trail's "no zero-value daily rows" shape.
    pub fn spin_daily(&self, user_id: &str) -> LedgerResult<DailySpinReceipt> {
        let today = current_day();
        let play_id = Uuid::new_v4();

        let balance = self.ledger.balance(user_id)?;
        if self
            .quota
            .free_plays_remaining(user_id, GameKind::Daily, 0, today)
            == 0
        {
            return Err(LedgerError::InvalidState(
                "daily spin already used today".to_string(),
            ));
        }

        let prizes = &self.config.daily.prizes;
        let prize = prizes[self.rng.roll_below(prizes.len() as u32) as usize];

        let new_balance = if prize > 0 {
            self.ledger
                .apply_delta(user_id, prize as i64, TxReason::DailySpinWin)?
        } else {
            balance
        };
        self.quota
            .consume_free_play(user_id, GameKind::Daily, today, play_id);

        tracing::info!(user_id, prize, "daily spin resolved");
        Ok(DailySpinReceipt { prize, new_balance })
    }

    /// Number of boards still in play, for monitoring.
    pub fn active_board_count(&self) -> usize {
        self.boards.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ScriptedOutcomes, SeededOutcomes};

    fn service_with_rng(rng: Arc<dyn OutcomeSource>) -> PlayService {
        PlayService::new(EngineConfig::default(), rng)
    }

    fn reconcile(service: &PlayService, user_id: &str) {
        let total: i64 = service
            .transactions(user_id)
            .expect("history")
            .iter()
            .map(|tx| tx.amount)
            .sum();
        assert_eq!(service.balance(user_id).expect("balance") as i64, total);
    }

    #[test]
    fn test_free_spin_scrap_win_end_to_end() {
        // Tier 0, balance 0, one free spin. Jackpot roll misses, odds
        // roll lands in the scrap interval.
        let rng = Arc::new(ScriptedOutcomes::new(vec![0], vec![0.6]));
        let service = service_with_rng(rng);
        service.register_user("recruit").expect("register");

        let receipt = service.spin_saw("recruit", 0).expect("spin");

        assert_eq!(receipt.label, SpinLabel::ScrapWon);
        assert_eq!(receipt.payout, 15);
        assert!(receipt.free_play);
        assert_eq!(receipt.free_plays_remaining, 0);
        assert_eq!(receipt.new_balance, 15);

        let history = service.transactions("recruit").expect("history");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].reason, TxReason::SawWin);
        assert_eq!(history[0].amount, 15);

        // Tax landed in the pool.
        assert_eq!(service.jackpot_value(), 10_001);
        reconcile(&service, "recruit");
    }

    #[test]
    fn test_paid_spin_nets_cost_against_payout() {
        let rng = Arc::new(ScriptedOutcomes::new(
            vec![0, 0],
            vec![0.6, 0.2], // scrap_won then zero_yield
        ));
        let service = service_with_rng(rng);
        service.register_user("recruit").expect("register");
        service.credit_purchase("recruit").expect("purchase");

        // Burn the single tier-0 free play.
        let free = service.spin_saw("recruit", 0).expect("free spin");
        assert!(free.free_play);
        assert_eq!(free.new_balance, 5_015);

        // The paid zero-yield spin costs the full spin price.
        let paid = service.spin_saw("recruit", 0).expect("paid spin");
        assert!(!paid.free_play);
        assert_eq!(paid.label, SpinLabel::ZeroYield);
        assert_eq!(paid.new_balance, 5_015 - 20);

        let history = service.transactions("recruit").expect("history");
        assert_eq!(history.last().expect("row").amount, -20);
        assert_eq!(history.last().expect("row").reason, TxReason::SawLoss);
        reconcile(&service, "recruit");
    }

    #[test]
    fn test_broke_user_with_no_free_plays_cannot_spin() {
        let rng = Arc::new(ScriptedOutcomes::new(vec![0], vec![0.6]));
        let service = service_with_rng(rng);
        service.register_user("recruit").expect("register");

        service.spin_saw("recruit", 0).expect("free spin");
        let err = service.spin_saw("recruit", 0).expect_err("no funds");
        assert!(matches!(err, LedgerError::InsufficientFunds));

        // The rejected spin changed nothing: no row, no tax.
        assert_eq!(service.transactions("recruit").expect("history").len(), 1);
        assert_eq!(service.jackpot_value(), 10_001);
    }

    #[test]
    fn test_jackpot_spin_pays_pool_and_skips_tax() {
        let rng = Arc::new(ScriptedOutcomes::new(
            vec![crate::games::saw::JACKPOT_TRIGGER],
            vec![],
        ));
        let service = service_with_rng(rng);
        service.register_user("recruit").expect("register");

        let receipt = service.spin_saw("recruit", 0).expect("spin");
        assert_eq!(receipt.label, SpinLabel::JackpotWin);
        assert_eq!(receipt.payout, 10_000);
        assert_eq!(receipt.new_balance, 10_000);
        // Pool reset to base, no tax added on the jackpot spin itself.
        assert_eq!(service.jackpot_value(), 10_000);

        let history = service.transactions("recruit").expect("history");
        assert_eq!(history[0].reason, TxReason::JackpotWin);
        reconcile(&service, "recruit");
    }

    #[test]
    fn test_unknown_user_cannot_play() {
        let rng = Arc::new(ScriptedOutcomes::new(vec![0], vec![0.6]));
        let service = service_with_rng(rng);
        assert!(matches!(
            service.spin_saw("ghost", 0),
            Err(LedgerError::UserNotFound { .. })
        ));
        assert!(matches!(
            service.create_mines_board("ghost", 0),
            Err(LedgerError::UserNotFound { .. })
        ));
        // Nothing was drawn against the pool.
        assert_eq!(service.jackpot_value(), 10_000);
    }

    #[test]
    fn test_mines_full_flow_free_board() {
        // Mines at cells 0 and 1; reveals at 2 and 3 are safe.
        let rng = Arc::new(ScriptedOutcomes::new(vec![0, 1], vec![]));
        let service = service_with_rng(rng);
        service.register_user("recruit").expect("register");

        let board = service.create_mines_board("recruit", 0).expect("board");
        assert!(board.free_play);
        assert_eq!(board.balance, 0);

        let reveal = service
            .reveal_mines_cell(board.board_id, 2)
            .expect("reveal");
        assert_eq!(reveal.outcome, RevealOutcome::Safe);
        assert_eq!(reveal.pending_winnings, 25);

        service.reveal_mines_cell(board.board_id, 3).expect("reveal");
        let cashed = service.cash_out_mines(board.board_id).expect("cash out");
        assert_eq!(cashed.credited_amount, 50);
        assert_eq!(cashed.new_balance, 50);

        // The board is gone; repeat operations fail cleanly.
        assert!(matches!(
            service.cash_out_mines(board.board_id),
            Err(LedgerError::BoardNotFound { .. })
        ));
        assert_eq!(service.active_board_count(), 0);
        reconcile(&service, "recruit");
    }

    #[test]
    fn test_mines_paid_board_charges_once_and_bust_forfeits() {
        let rng = Arc::new(ScriptedOutcomes::new(vec![0, 1, 0, 1], vec![]));
        let service = service_with_rng(rng);
        service.register_user("recruit").expect("register");
        service.credit_purchase("recruit").expect("purchase");

        // Burn the free play on a first board.
        let free = service.create_mines_board("recruit", 0).expect("board");
        assert!(free.free_play);

        // The second board is paid: cost charged at creation.
        let paid = service.create_mines_board("recruit", 0).expect("board");
        assert!(!paid.free_play);
        assert_eq!(paid.balance, 5_000 - 25);

        // Accrue then hit the mine at cell 0: winnings gone, no refund.
        service.reveal_mines_cell(paid.board_id, 2).expect("reveal");
        let bust = service.reveal_mines_cell(paid.board_id, 0).expect("reveal");
        assert_eq!(bust.outcome, RevealOutcome::Mine);
        assert_eq!(bust.status, BoardStatus::Busted);
        assert_eq!(bust.pending_winnings, 0);

        assert_eq!(service.balance("recruit").expect("balance"), 5_000 - 25);
        assert!(matches!(
            service.reveal_mines_cell(paid.board_id, 3),
            Err(LedgerError::BoardNotFound { .. })
        ));
        reconcile(&service, "recruit");
    }

    #[test]
    fn test_mines_board_requires_funds_when_quota_spent() {
        let rng = Arc::new(ScriptedOutcomes::new(vec![0, 1], vec![]));
        let service = service_with_rng(rng);
        service.register_user("recruit").expect("register");

        service.create_mines_board("recruit", 0).expect("free board");
        let err = service
            .create_mines_board("recruit", 0)
            .expect_err("no funds for a paid board");
        assert!(matches!(err, LedgerError::InsufficientFunds));
        assert_eq!(service.transactions("recruit").expect("history").len(), 0);
    }

    #[test]
    fn test_reveal_rejects_out_of_range_cell() {
        let rng = Arc::new(ScriptedOutcomes::new(vec![0, 1], vec![]));
        let service = service_with_rng(rng);
        service.register_user("recruit").expect("register");
        let board = service.create_mines_board("recruit", 0).expect("board");

        assert!(matches!(
            service.reveal_mines_cell(board.board_id, 9),
            Err(LedgerError::InvalidState(_))
        ));
    }

    #[test]
    fn test_daily_spin_once_per_day() {
        // Prize wheel slot 6 pays 100; slot 0 pays nothing.
        let rng = Arc::new(ScriptedOutcomes::new(vec![6], vec![]));
        let service = service_with_rng(rng);
        service.register_user("recruit").expect("register");

        let receipt = service.spin_daily("recruit").expect("daily spin");
        assert_eq!(receipt.prize, 100);
        assert_eq!(receipt.new_balance, 100);

        let err = service.spin_daily("recruit").expect_err("already spun");
        assert!(matches!(err, LedgerError::InvalidState(_)));

        let history = service.transactions("recruit").expect("history");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].reason, TxReason::DailySpinWin);
        reconcile(&service, "recruit");
    }

    #[test]
    fn test_zero_daily_prize_writes_no_row() {
        let rng = Arc::new(ScriptedOutcomes::new(vec![0], vec![]));
        let service = service_with_rng(rng);
        service.register_user("recruit").expect("register");

        let receipt = service.spin_daily("recruit").expect("daily spin");
        assert_eq!(receipt.prize, 0);
        assert_eq!(receipt.new_balance, 0);
        assert!(service.transactions("recruit").expect("history").is_empty());

        // The blank still consumes the day's spin.
        assert!(service.spin_daily("recruit").is_err());
    }

    #[test]
    fn test_purchase_credits_crate_amount() {
        let rng = Arc::new(SeededOutcomes::new(1));
        let service = service_with_rng(rng);
        service.register_user("recruit").expect("register");

        let receipt = service.credit_purchase("recruit").expect("purchase");
        assert_eq!(receipt.credited_amount, 5_000);
        assert_eq!(receipt.new_balance, 5_000);
        let history = service.transactions("recruit").expect("history");
        assert_eq!(history[0].reason, TxReason::Purchase);
        reconcile(&service, "recruit");
    }

    #[test]
    fn test_concurrent_spins_for_one_user_reconcile() {
        let rng = Arc::new(SeededOutcomes::new(99));
        let service = Arc::new(service_with_rng(rng));
        service.register_user("recruit").expect("register");
        // Deep pockets so paid spins never bounce.
        for _ in 0..4 {
            service.credit_purchase("recruit").expect("purchase");
        }

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        service.spin_saw("recruit", 2).expect("spin");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("spin thread panicked");
        }

        let history = service.transactions("recruit").expect("history");
        assert_eq!(history.len(), 4 + 8 * 50);
        reconcile(&service, "recruit");
    }
}
