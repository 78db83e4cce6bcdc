//! Game-outcome resolvers for the Saw, the Job Site, and the daily spin.

pub mod mines;
pub mod saw;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Games with their own daily free-play quota.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Saw,
    Mines,
    Daily,
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameKind::Saw => write!(f, "saw"),
            GameKind::Mines => write!(f, "mines"),
            GameKind::Daily => write!(f, "daily"),
        }
    }
}
