//! Daily free-play quota tracking.
//!
//! Records are keyed by (user, game) and reset lazily the first time a
//! request arrives on a new canonical day. The day key is always computed
//! in UTC by the caller — never from client-local time — so quotas cannot
//! drift across time zones or clock skew.
//!
//! Quota commits happen after the associated ledger commit and are
//! idempotent per play id: a retried commit for a play that already
//! counted is a no-op, so a crash-and-retry between ledger commit and
//! quota commit can never double-consume a free play.

use crate::games::GameKind;
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use std::collections::HashSet;
use uuid::Uuid;

/// Canonical day key: the current UTC date.
pub fn current_day() -> NaiveDate {
    Utc::now().date_naive()
}

#[derive(Debug)]
struct QuotaRecord {
    plays_used_today: u32,
    last_play_day: NaiveDate,
    /// Play ids already counted on `last_play_day`. Cleared on day reset,
    /// so the set stays bounded by the daily limit.
    applied_play_ids: HashSet<Uuid>,
}

/// Tracks free plays consumed per user, per game, per canonical day.
pub struct QuotaTracker {
    records: DashMap<(String, GameKind), QuotaRecord>,
    /// Daily free plays per account tier; index clamps to the last entry.
    tier_limits: Vec<u32>,
}

impl QuotaTracker {
    pub fn new(tier_limits: Vec<u32>) -> Self {
        Self {
            records: DashMap::new(),
            tier_limits,
        }
    }

    /// Daily allowance for a tier. Tiers beyond the table get the top
    /// tier's allowance.
    pub fn max_plays_for_tier(&self, game: GameKind, tier: u8) -> u32 {
        // The daily spin is one-per-day for every tier.
        if game == GameKind::Daily {
            return 1;
        }
        let idx = (tier as usize).min(self.tier_limits.len().saturating_sub(1));
        self.tier_limits.get(idx).copied().unwrap_or(0)
    }

    /// Free plays still available today. A missing record, or a record
    /// from a previous day, counts as fresh.
    pub fn free_plays_remaining(
        &self,
        user_id: &str,
        game: GameKind,
        tier: u8,
        today: NaiveDate,
    ) -> u32 {
        let max_plays = self.max_plays_for_tier(game, tier);
        match self.records.get(&(user_id.to_string(), game)) {
            Some(record) if record.last_play_day == today => {
                max_plays.saturating_sub(record.plays_used_today)
            }
            _ => max_plays,
        }
    }

    /// Count one free play, resetting first on a day change. Idempotent
    /// per `play_id`: recommitting an already-counted play changes
    /// nothing. Callers invoke this only after the ledger commit for the
    /// play succeeded.
    pub fn consume_free_play(
        &self,
        user_id: &str,
        game: GameKind,
        today: NaiveDate,
        play_id: Uuid,
    ) {
        let mut record = self
            .records
            .entry((user_id.to_string(), game))
            .or_insert_with(|| QuotaRecord {
                plays_used_today: 0,
                last_play_day: today,
                applied_play_ids: HashSet::new(),
            });

        if record.last_play_day != today {
            record.plays_used_today = 0;
            record.applied_play_ids.clear();
            record.last_play_day = today;
        }

        if !record.applied_play_ids.insert(play_id) {
            tracing::debug!(user_id, ?game, %play_id, "quota commit replayed, ignoring");
            return;
        }
        record.plays_used_today += 1;
    }
}
