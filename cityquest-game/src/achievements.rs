//! Achievement definitions and the unlock evaluator.
//!
//! The built-in table is static, versionable data: all players evaluate the
//! same rows against their own snapshot, so unlocks need no server
//! coordination. Rarity is cosmetic and never affects unlock logic.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::catalog::GameCatalog;
use crate::progress::PlayerProgress;

/// Cosmetic rarity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

/// Unlock condition, always evaluated with an inclusive threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AchievementCondition {
    VisitLocations { count: u32 },
    CompleteQuizzes { count: u32 },
    ReachLevel { level: u32 },
    VisitCategory { category: String, count: u32 },
    MaintainStreak { days: u32 },
}

impl AchievementCondition {
    /// Whether the condition holds for the given snapshot.
    #[must_use]
    pub fn is_satisfied(&self, progress: &PlayerProgress, catalog: &GameCatalog) -> bool {
        match self {
            Self::VisitLocations { count } => {
                progress.locations_visited_count() >= *count as usize
            }
            Self::CompleteQuizzes { count } => {
                progress.quizzes_completed_count() >= *count as usize
            }
            Self::ReachLevel { level } => progress.level >= *level,
            Self::VisitCategory { category, count } => {
                category_visit_count(progress, catalog, category) >= *count as usize
            }
            Self::MaintainStreak { days } => progress.current_streak >= *days,
        }
    }
}

fn category_visit_count(progress: &PlayerProgress, catalog: &GameCatalog, category: &str) -> usize {
    catalog
        .locations_in_category(category)
        .iter()
        .filter(|location| progress.locations_visited.contains(&location.id))
        .count()
}

/// One row of the achievement table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementDef {
    pub id: String,
    pub title: String,
    pub description: String,
    pub rarity: Rarity,
    pub xp_reward: u32,
    pub condition: AchievementCondition,
}

/// Result of an achievement evaluation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct UnlockOutcome {
    pub progress: PlayerProgress,
    /// Ids unlocked by this pass, in table order.
    pub unlocked: Vec<String>,
    pub xp_earned: u32,
}

/// Evaluate every locked definition against the snapshot, unlocking the
/// satisfied ones and granting their XP rewards.
///
/// Unlocks are permanent: an id already in the unlocked set is never
/// re-evaluated, so a later decrease of the underlying metric cannot revoke
/// it. The pass runs once in table order; rewards granted by earlier rows are
/// visible to later rows, but no second pass runs within the call.
#[must_use]
pub fn evaluate_achievements(
    progress: &PlayerProgress,
    definitions: &[AchievementDef],
    catalog: &GameCatalog,
) -> UnlockOutcome {
    let mut next = progress.clone();
    let mut unlocked = Vec::new();
    let mut xp_earned = 0u32;
    for def in definitions {
        if next.achievements.contains(&def.id) {
            continue;
        }
        if def.condition.is_satisfied(&next, catalog) {
            next.achievements.insert(def.id.clone());
            next.add_xp(def.xp_reward);
            xp_earned = xp_earned.saturating_add(def.xp_reward);
            unlocked.push(def.id.clone());
        }
    }
    UnlockOutcome {
        progress: next,
        unlocked,
        xp_earned,
    }
}

/// The built-in achievement table.
///
/// Reproduces the shipped rule table verbatim, proxy conditions included:
/// several rows track a coarser metric than their description suggests, and
/// those pairings are part of the published game balance.
pub fn builtin_achievements() -> &'static [AchievementDef] {
    static TABLE: OnceLock<Vec<AchievementDef>> = OnceLock::new();
    TABLE.get_or_init(|| {
        vec![
            def(
                "first_steps",
                "First Steps",
                "Complete your first quiz",
                Rarity::Common,
                50,
                AchievementCondition::CompleteQuizzes { count: 1 },
            ),
            def(
                "explorer",
                "Explorer",
                "Visit 5 different locations",
                Rarity::Common,
                100,
                AchievementCondition::VisitLocations { count: 5 },
            ),
            def(
                "city_expert",
                "City Expert",
                "Visit 10 different locations",
                Rarity::Rare,
                200,
                AchievementCondition::VisitLocations { count: 10 },
            ),
            // Tracked as a visit count in the shipped rule table.
            def(
                "completionist",
                "Completionist",
                "Complete all quizzes at 3 locations",
                Rarity::Rare,
                250,
                AchievementCondition::VisitLocations { count: 3 },
            ),
            def(
                "quiz_master",
                "Quiz Master",
                "Answer 50 questions",
                Rarity::Uncommon,
                150,
                AchievementCondition::CompleteQuizzes { count: 50 },
            ),
            // Day streak stands in for an answer streak.
            def(
                "perfectionist",
                "Perfectionist",
                "Get 10 questions correct in a row",
                Rarity::Epic,
                300,
                AchievementCondition::MaintainStreak { days: 10 },
            ),
            def(
                "level_up",
                "Level Up",
                "Reach level 5",
                Rarity::Uncommon,
                100,
                AchievementCondition::ReachLevel { level: 5 },
            ),
            def(
                "elite_player",
                "Elite Player",
                "Reach level 10",
                Rarity::Epic,
                500,
                AchievementCondition::ReachLevel { level: 10 },
            ),
            // Quiz count stands in for points.
            def(
                "point_collector",
                "Point Collector",
                "Earn 1000 total points",
                Rarity::Rare,
                200,
                AchievementCondition::CompleteQuizzes { count: 100 },
            ),
            def(
                "history_buff",
                "History Buff",
                "Complete 10 history quizzes",
                Rarity::Uncommon,
                150,
                AchievementCondition::VisitCategory {
                    category: "historic".to_string(),
                    count: 10,
                },
            ),
            def(
                "foodie",
                "Foodie",
                "Complete 10 food & drink quizzes",
                Rarity::Uncommon,
                150,
                AchievementCondition::VisitCategory {
                    category: "food".to_string(),
                    count: 10,
                },
            ),
            def(
                "city_legend",
                "City Legend",
                "Complete ALL locations (100%)",
                Rarity::Legendary,
                1000,
                AchievementCondition::VisitLocations { count: 48 },
            ),
            def(
                "streak_master",
                "Streak Master",
                "Maintain a 7-day playing streak",
                Rarity::Epic,
                300,
                AchievementCondition::MaintainStreak { days: 7 },
            ),
            def(
                "secret_spy",
                "Secret Spy",
                "Discover a secret achievement",
                Rarity::Rare,
                200,
                AchievementCondition::CompleteQuizzes { count: 1 },
            ),
            def(
                "globe_trotter",
                "Globe Trotter",
                "Visit all districts",
                Rarity::Epic,
                400,
                AchievementCondition::VisitLocations { count: 20 },
            ),
            def(
                "tourist_trap",
                "Tourist Trap",
                "Visit only tourist locations first",
                Rarity::Uncommon,
                150,
                AchievementCondition::VisitLocations { count: 3 },
            ),
            def(
                "local_hero",
                "Local Hero",
                "Complete 5 'hidden gem' locations",
                Rarity::Rare,
                250,
                AchievementCondition::VisitLocations { count: 5 },
            ),
        ]
    })
}

fn def(
    id: &str,
    title: &str,
    description: &str,
    rarity: Rarity,
    xp_reward: u32,
    condition: AchievementCondition,
) -> AchievementDef {
    AchievementDef {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        rarity,
        xp_reward,
        condition,
    }
}
