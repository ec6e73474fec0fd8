//! The mutable per-player progress record.
//!
//! `PlayerProgress` is owned by exactly one active caller at a time and is
//! mutated exclusively through the engine operations in [`crate::engine`] and
//! the helpers here. All day/streak/reset logic works on local calendar days
//! (midnight boundaries), never rolling 24-hour windows.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::constants::{STARTING_LEVEL, XP_PER_LEVEL_STEP};

/// Per-player progress. Serialized with saturating defaults so records from
/// older builds keep deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProgress {
    pub player_id: String,
    pub display_name: String,
    #[serde(default)]
    pub total_xp: u32,
    #[serde(default)]
    pub total_points: u32,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub locations_visited: HashSet<String>,
    /// Quiz ids answered correctly at least once.
    #[serde(default)]
    pub quizzes_completed: HashSet<String>,
    /// Unlocked achievement ids. Membership is monotonic.
    #[serde(default)]
    pub achievements: HashSet<String>,
    /// Consecutive local calendar days with at least one play action.
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub last_played_day: Option<NaiveDate>,
    #[serde(default)]
    pub total_questions_answered: u32,
    #[serde(default)]
    pub total_correct_answers: u32,
    /// Per-challenge-id counters, cleared lazily at the day boundary.
    #[serde(default)]
    pub daily_challenge_progress: HashMap<String, u32>,
    #[serde(default)]
    pub last_daily_reset_day: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

fn default_level() -> u32 {
    STARTING_LEVEL
}

/// Level reached by a cumulative XP total, recomputed from scratch.
///
/// Must agree with the incremental loop in [`PlayerProgress::add_xp`]: a
/// player is promoted while `total_xp >= level * 100`, so thresholds compound
/// (100 to leave level 1, 200 to leave level 2, and so on).
#[must_use]
pub fn level_for_xp(total_xp: u32) -> u32 {
    let mut level = STARTING_LEVEL;
    while total_xp >= level.saturating_mul(XP_PER_LEVEL_STEP) {
        level += 1;
    }
    level
}

impl PlayerProgress {
    /// Create a zeroed record at level 1.
    #[must_use]
    pub fn new(player_id: &str, display_name: &str, now: DateTime<Utc>) -> Self {
        Self {
            player_id: player_id.to_string(),
            display_name: display_name.to_string(),
            total_xp: 0,
            total_points: 0,
            level: STARTING_LEVEL,
            locations_visited: HashSet::new(),
            quizzes_completed: HashSet::new(),
            achievements: HashSet::new(),
            current_streak: 0,
            last_played_day: None,
            total_questions_answered: 0,
            total_correct_answers: 0,
            daily_challenge_progress: HashMap::new(),
            last_daily_reset_day: None,
            created_at: now,
            last_active: now,
        }
    }

    /// XP required to leave the current level.
    #[must_use]
    pub fn xp_for_next_level(&self) -> u32 {
        self.level.saturating_mul(XP_PER_LEVEL_STEP)
    }

    /// Fraction of the next-level requirement already earned, in
    /// `0.0..=1.0`: XP inside the current level over the full next-level
    /// threshold.
    #[must_use]
    pub fn level_progress(&self) -> f64 {
        let floor = self.level.saturating_sub(1).saturating_mul(XP_PER_LEVEL_STEP);
        let earned = self.total_xp.saturating_sub(floor);
        (f64::from(earned) / f64::from(self.xp_for_next_level())).clamp(0.0, 1.0)
    }

    /// Lifetime answer accuracy as a percentage, 0 when nothing was answered.
    #[must_use]
    pub fn accuracy_percentage(&self) -> f64 {
        if self.total_questions_answered == 0 {
            return 0.0;
        }
        f64::from(self.total_correct_answers) / f64::from(self.total_questions_answered) * 100.0
    }

    #[must_use]
    pub fn locations_visited_count(&self) -> usize {
        self.locations_visited.len()
    }

    #[must_use]
    pub fn quizzes_completed_count(&self) -> usize {
        self.quizzes_completed.len()
    }

    /// Grant XP and promote through every level threshold the new total
    /// crosses. A single grant can cross multiple levels.
    pub fn add_xp(&mut self, xp: u32) {
        self.total_xp = self.total_xp.saturating_add(xp);
        while self.total_xp >= self.xp_for_next_level() {
            self.level += 1;
        }
    }

    pub fn add_points(&mut self, points: u32) {
        self.total_points = self.total_points.saturating_add(points);
    }

    /// Advance the calendar-day streak for a play action on `today`.
    ///
    /// Same day keeps the streak, the day after the last play increments it,
    /// any other gap (including no prior play) resets it to 1.
    pub fn update_streak(&mut self, today: NaiveDate) {
        match self.last_played_day {
            Some(last) if last == today => {}
            Some(last) if today.signed_duration_since(last).num_days() == 1 => {
                self.current_streak = self.current_streak.saturating_add(1);
            }
            _ => self.current_streak = 1,
        }
        self.last_played_day = Some(today);
    }

    /// Lazily clear the daily challenge counters on the first write of a new
    /// calendar day. Staleness self-heals on the next interaction, so no
    /// background timer is involved.
    pub fn check_and_reset_daily_challenges(&mut self, today: NaiveDate) {
        match self.last_daily_reset_day {
            Some(last) if last < today => {
                self.daily_challenge_progress.clear();
                self.last_daily_reset_day = Some(today);
            }
            None => self.last_daily_reset_day = Some(today),
            Some(_) => {}
        }
    }

    /// Current counter for a daily challenge id.
    #[must_use]
    pub fn challenge_progress(&self, challenge_id: &str) -> u32 {
        self.daily_challenge_progress
            .get(challenge_id)
            .copied()
            .unwrap_or(0)
    }

    /// Add to a daily challenge counter, running the day-boundary reset
    /// check first.
    pub fn bump_challenge_progress(&mut self, challenge_id: &str, amount: u32, today: NaiveDate) {
        self.check_and_reset_daily_challenges(today);
        let counter = self
            .daily_challenge_progress
            .entry(challenge_id.to_string())
            .or_insert(0);
        *counter = counter.saturating_add(amount);
    }
}
