//! The Job Site: a hidden-mine reveal board.
//!
//! Each board is a nine-cell grid hiding two mines, created per play and
//! dropped once it reaches a terminal state. Winnings accumulate as
//! pending until cash-out and are forfeited on a bust; nothing here
//! touches the wallet — crediting is the play service's job. Whether the
//! play was free is decided once, at creation, and never re-evaluated.

use crate::errors::{LedgerError, LedgerResult};
use crate::rng::OutcomeSource;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cells on a board.
pub const BOARD_CELLS: usize = 9;
/// Mines hidden per board.
pub const BOARD_MINES: usize = 2;
/// Pending winnings added per safe reveal.
pub const SAFE_REVEAL_REWARD: u64 = 25;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CellState {
    Hidden,
    RevealedSafe,
    RevealedMine,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BoardStatus {
    Active,
    Busted,
    CashedOut,
}

/// What a single reveal did.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RevealOutcome {
    Safe,
    Mine,
    /// The board was already finished or the cell already revealed;
    /// nothing changed.
    Ignored,
}

/// One board's reveal state machine.
#[derive(Debug)]
pub struct MinesBoard {
    pub id: Uuid,
    pub user_id: String,
    cells: [CellState; BOARD_CELLS],
    mines: [usize; BOARD_MINES],
    pub pending_winnings: u64,
    pub status: BoardStatus,
    /// Decided once at creation; a free board never owes the start cost.
    pub free_play: bool,
    /// Idempotency key for the quota commit tied to this board.
    pub play_id: Uuid,
}

impl MinesBoard {
    /// Create a board with two distinct mines placed uniformly at random.
    pub fn create(rng: &dyn OutcomeSource, user_id: &str, free_play: bool) -> Self {
        let first = rng.roll_below(BOARD_CELLS as u32) as usize;
        let mut second = rng.roll_below(BOARD_CELLS as u32) as usize;
        while second == first {
            second = rng.roll_below(BOARD_CELLS as u32) as usize;
        }

        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            cells: [CellState::Hidden; BOARD_CELLS],
            mines: [first, second],
            pending_winnings: 0,
            status: BoardStatus::Active,
            free_play,
            play_id: Uuid::new_v4(),
        }
    }

    /// Reveal a cell. Ignored unless the board is active and the cell is
    /// still hidden. A mine busts the board and forfeits all pending
    /// winnings; a safe cell adds to them.
    pub fn reveal(&mut self, index: usize) -> RevealOutcome {
        if index >= BOARD_CELLS {
            return RevealOutcome::Ignored;
        }
        if self.status != BoardStatus::Active || self.cells[index] != CellState::Hidden {
            return RevealOutcome::Ignored;
        }

        if self.mines.contains(&index) {
            self.cells[index] = CellState::RevealedMine;
            self.status = BoardStatus::Busted;
            self.pending_winnings = 0;
            RevealOutcome::Mine
        } else {
            self.cells[index] = CellState::RevealedSafe;
            self.pending_winnings += SAFE_REVEAL_REWARD;
            RevealOutcome::Safe
        }
    }

    /// Finish the board and return the amount the play service must
    /// credit. Fails unless the board is active with winnings pending.
    pub fn cash_out(&mut self) -> LedgerResult<u64> {
        if self.status != BoardStatus::Active {
            return Err(LedgerError::InvalidState(
                "board is already finished".to_string(),
            ));
        }
        if self.pending_winnings == 0 {
            return Err(LedgerError::InvalidState(
                "nothing pending to cash out".to_string(),
            ));
        }
        self.status = BoardStatus::CashedOut;
        Ok(self.pending_winnings)
    }

    pub fn cell(&self, index: usize) -> CellState {
        self.cells[index]
    }

    /// Number of distinct mines on the board.
    pub fn mine_count(&self) -> usize {
        let [a, b] = self.mines;
        if a == b {
            1
        } else {
            BOARD_MINES
        }
    }

    /// First hidden mine cell, used to drive deterministic busts in tests.
    pub fn mine_positions(&self) -> [usize; BOARD_MINES] {
        self.mines
    }
}
