//! Daily and weekly challenge definitions, scheduling, and reset windows.
//!
//! The daily set is a pure function of the calendar date and a fixed pool, so
//! every player sees the same rotation with no server coordination. Reset
//! windows are wall-clock date arithmetic (next local midnight, next Monday
//! 00:00) to match the user-perceived "today" and "this week".

use chrono::{DateTime, Datelike, Days, Local, LocalResult, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::catalog::GameCatalog;
use crate::constants::{
    CHALLENGE_DAILY_ANSWER, CHALLENGE_DAILY_VISIT, CHALLENGE_DAILY_XP, CHALLENGE_WEEKLY_COMPLETE,
    CHALLENGE_WEEKLY_STREAK, CHALLENGE_WEEKLY_XP, DAILY_CHALLENGE_SLOTS, DAYS_PER_WEEK,
};
use crate::progress::PlayerProgress;

/// Time box a challenge lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeScope {
    Daily,
    Weekly,
}

/// Where a challenge reads its progress from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressSource {
    /// Per-day counter accumulated under the challenge id, cleared at the
    /// day boundary.
    DailyCounter,
    /// Locations with at least one quiz where every quiz is completed.
    CompletedLocations,
    /// Current consecutive-day streak.
    StreakDays,
    /// Lifetime XP total.
    TotalXp,
}

/// One row of the challenge table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeDef {
    pub id: String,
    pub title: String,
    pub target: u32,
    pub xp_reward: u32,
    pub scope: ChallengeScope,
    pub source: ProgressSource,
}

/// A challenge paired with a player's capped progress, as the presentation
/// layer consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeStatus {
    pub id: String,
    pub title: String,
    pub target: u32,
    pub current: u32,
    pub xp_reward: u32,
}

impl ChallengeStatus {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.current >= self.target
    }
}

fn challenge(
    id: &str,
    title: &str,
    target: u32,
    xp_reward: u32,
    scope: ChallengeScope,
    source: ProgressSource,
) -> ChallengeDef {
    ChallengeDef {
        id: id.to_string(),
        title: title.to_string(),
        target,
        xp_reward,
        scope,
        source,
    }
}

/// The fixed daily challenge pool.
pub fn daily_pool() -> &'static [ChallengeDef] {
    static POOL: OnceLock<Vec<ChallengeDef>> = OnceLock::new();
    POOL.get_or_init(|| {
        vec![
            challenge(
                CHALLENGE_DAILY_ANSWER,
                "Answer 5 questions correctly",
                5,
                50,
                ChallengeScope::Daily,
                ProgressSource::DailyCounter,
            ),
            challenge(
                CHALLENGE_DAILY_VISIT,
                "Visit 3 different locations",
                3,
                30,
                ChallengeScope::Daily,
                ProgressSource::DailyCounter,
            ),
            challenge(
                CHALLENGE_DAILY_XP,
                "Earn 100 XP today",
                100,
                100,
                ChallengeScope::Daily,
                ProgressSource::DailyCounter,
            ),
        ]
    })
}

/// The fixed weekly challenge set.
pub fn weekly_set() -> &'static [ChallengeDef] {
    static SET: OnceLock<Vec<ChallengeDef>> = OnceLock::new();
    SET.get_or_init(|| {
        vec![
            challenge(
                CHALLENGE_WEEKLY_COMPLETE,
                "Complete all quizzes at 2 locations",
                2,
                200,
                ChallengeScope::Weekly,
                ProgressSource::CompletedLocations,
            ),
            challenge(
                CHALLENGE_WEEKLY_STREAK,
                "Maintain a 7-day streak",
                7,
                300,
                ChallengeScope::Weekly,
                ProgressSource::StreakDays,
            ),
            challenge(
                CHALLENGE_WEEKLY_XP,
                "Earn 500 total XP",
                500,
                250,
                ChallengeScope::Weekly,
                ProgressSource::TotalXp,
            ),
        ]
    })
}

/// Select the day's challenge rotation: the day-of-year index into the pool
/// plus the two subsequent offsets, wrapping around. Identical for every
/// player on the same date.
#[must_use]
pub fn daily_set_for(date: NaiveDate) -> Vec<&'static ChallengeDef> {
    let pool = daily_pool();
    let start = date.ordinal() as usize % pool.len();
    (0..DAILY_CHALLENGE_SLOTS)
        .map(|offset| &pool[(start + offset) % pool.len()])
        .collect()
}

/// The day's challenges with the player's per-day counters, capped at target.
///
/// Counters stamped on an earlier day read as zero; the map itself is cleared
/// lazily by the next write.
#[must_use]
pub fn daily_challenges(progress: &PlayerProgress, date: NaiveDate) -> Vec<ChallengeStatus> {
    daily_set_for(date)
        .into_iter()
        .map(|def| {
            let counter = if progress.last_daily_reset_day == Some(date) {
                progress.challenge_progress(&def.id)
            } else {
                0
            };
            status(def, counter)
        })
        .collect()
}

/// The weekly challenges with rolling progress from the owning lifetime
/// metric, capped at target. Never reset mid-week except by the metric's own
/// semantics (a broken streak, for instance).
#[must_use]
pub fn weekly_challenges(progress: &PlayerProgress, catalog: &GameCatalog) -> Vec<ChallengeStatus> {
    weekly_set()
        .iter()
        .map(|def| {
            let metric = match def.source {
                ProgressSource::DailyCounter => progress.challenge_progress(&def.id),
                ProgressSource::CompletedLocations => completed_locations_count(progress, catalog),
                ProgressSource::StreakDays => progress.current_streak,
                ProgressSource::TotalXp => progress.total_xp,
            };
            status(def, metric)
        })
        .collect()
}

fn status(def: &ChallengeDef, metric: u32) -> ChallengeStatus {
    ChallengeStatus {
        id: def.id.clone(),
        title: def.title.clone(),
        target: def.target,
        current: metric.min(def.target),
        xp_reward: def.xp_reward,
    }
}

/// Locations where every attached quiz has been answered correctly at least
/// once. Locations without quizzes never count.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn completed_locations_count(progress: &PlayerProgress, catalog: &GameCatalog) -> u32 {
    catalog
        .locations
        .values()
        .filter(|location| {
            let quizzes = catalog.quizzes_for_location(&location.id);
            !quizzes.is_empty()
                && quizzes
                    .iter()
                    .all(|quiz| progress.quizzes_completed.contains(&quiz.id))
        })
        .count() as u32
}

/// Next local midnight after `now`: when the daily set and counters roll over.
#[must_use]
pub fn next_daily_reset(now: DateTime<Local>) -> DateTime<Local> {
    let today = now.date_naive();
    local_midnight(today.succ_opt().unwrap_or(today))
}

/// Next Monday 00:00 local time: when the weekly window rolls over. From a
/// Monday this is the following Monday, so the result is always in the
/// future.
#[must_use]
pub fn next_weekly_reset(now: DateTime<Local>) -> DateTime<Local> {
    let today = now.date_naive();
    let ahead = u64::from(DAYS_PER_WEEK - today.weekday().num_days_from_monday());
    let target = today.checked_add_days(Days::new(ahead)).unwrap_or(today);
    local_midnight(target)
}

fn local_midnight(date: NaiveDate) -> DateTime<Local> {
    let naive = date.and_time(NaiveTime::MIN);
    match naive.and_local_timezone(Local) {
        LocalResult::Single(instant) | LocalResult::Ambiguous(instant, _) => instant,
        // Midnight skipped by a DST transition; use the UTC reading of the
        // same wall-clock value.
        LocalResult::None => Local.from_utc_datetime(&naive),
    }
}
