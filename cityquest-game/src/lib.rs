//! CityQuest Game Engine
//!
//! Platform-agnostic core game logic for the CityQuest location trivia game.
//! This crate provides the progress/achievement rules engine and the geofence
//! proximity detector without UI or platform-specific dependencies. All
//! operations are pure snapshot-in/snapshot-out functions; persistence and
//! network replication are collaborator concerns reached through traits, and
//! their failures never roll back computed state.

pub mod achievements;
pub mod catalog;
pub mod challenges;
pub mod constants;
pub mod engine;
pub mod leaderboard;
pub mod progress;
pub mod proximity;

// Re-export commonly used types
pub use achievements::{
    AchievementCondition, AchievementDef, Rarity, UnlockOutcome, builtin_achievements,
    evaluate_achievements,
};
pub use catalog::{CatalogError, Coordinates, GameCatalog, LocationEntry, QuizEntry};
pub use challenges::{
    ChallengeDef, ChallengeScope, ChallengeStatus, ProgressSource, completed_locations_count,
    daily_challenges, daily_pool, daily_set_for, next_daily_reset, next_weekly_reset,
    weekly_challenges, weekly_set,
};
pub use engine::{AnswerOutcome, EngineError, VisitOutcome};
pub use leaderboard::{
    LeaderboardClient, LeaderboardEntry, SortKey, fetch_standings, publish_snapshot,
    rank_snapshots,
};
pub use progress::{PlayerProgress, level_for_xp};
pub use proximity::{EnteredIds, LocationSample, ProximityDetector, haversine_distance_m};

use chrono::{DateTime, Local, Utc};

/// Trait for abstracting static content loading.
/// Platform-specific implementations should provide this.
pub trait CatalogSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the location/quiz catalogue from the platform-specific source.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalogue cannot be loaded.
    fn load_catalog(&self) -> Result<GameCatalog, Self::Error>;
}

/// Trait for abstracting local progress persistence.
/// Platform-specific implementations should provide this.
pub trait ProgressStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch a stored progress record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be read.
    fn get(&self, player_id: &str) -> Result<Option<PlayerProgress>, Self::Error>;

    /// Write a progress record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn put(&self, player_id: &str, progress: &PlayerProgress) -> Result<(), Self::Error>;
}

/// Outcome of a facade visit: the new authoritative snapshot plus everything
/// the presentation layer announces.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitReport {
    pub progress: PlayerProgress,
    pub newly_visited: bool,
    /// Visit bonus only; achievement rewards are folded into `progress`.
    pub xp_earned: u32,
    pub unlocked_achievements: Vec<String>,
    /// False when the local write failed; the snapshot is still
    /// authoritative.
    pub persisted: bool,
}

/// Outcome of a facade quiz submission.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerReport {
    pub progress: PlayerProgress,
    pub is_correct: bool,
    pub newly_completed: bool,
    pub xp_earned: u32,
    pub points_earned: u32,
    pub unlocked_achievements: Vec<String>,
    pub persisted: bool,
}

/// Main game engine front door: owns the validated catalogue and wires rule
/// functions, achievement evaluation, and local persistence together.
pub struct GameEngine<C, S>
where
    C: CatalogSource,
    S: ProgressStore,
{
    source: C,
    store: S,
    catalog: GameCatalog,
    achievements: Vec<AchievementDef>,
}

impl<C, S> GameEngine<C, S>
where
    C: CatalogSource,
    S: ProgressStore,
{
    /// Load and validate the catalogue, then wire up the persistence
    /// collaborator. Catalogue failures here are fatal to the consuming
    /// application.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalogue cannot be loaded or fails
    /// validation.
    pub fn new(source: C, store: S) -> Result<Self, anyhow::Error>
    where
        C::Error: Into<anyhow::Error>,
    {
        let catalog = source.load_catalog().map_err(Into::into)?;
        catalog.validate()?;
        Ok(Self {
            source,
            store,
            catalog,
            achievements: builtin_achievements().to_vec(),
        })
    }

    /// Replace the built-in achievement table (content updates, tests).
    #[must_use]
    pub fn with_achievements(mut self, achievements: Vec<AchievementDef>) -> Self {
        self.achievements = achievements;
        self
    }

    /// Re-read the catalogue from the source, keeping the old one on
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the reload or validation fails.
    pub fn reload_catalog(&mut self) -> Result<(), anyhow::Error>
    where
        C::Error: Into<anyhow::Error>,
    {
        let catalog = self.source.load_catalog().map_err(Into::into)?;
        catalog.validate()?;
        self.catalog = catalog;
        Ok(())
    }

    #[must_use]
    pub fn catalog(&self) -> &GameCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn achievement_table(&self) -> &[AchievementDef] {
        &self.achievements
    }

    /// Fetch a player's progress, creating a zeroed record on first launch.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read. A failed write of a
    /// freshly created record is only a warning.
    pub fn load_or_create_profile(
        &self,
        player_id: &str,
        display_name: &str,
        now: DateTime<Utc>,
    ) -> Result<PlayerProgress, anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        if let Some(progress) = self.store.get(player_id).map_err(Into::into)? {
            return Ok(progress);
        }
        let progress = PlayerProgress::new(player_id, display_name, now);
        self.persist(&progress);
        Ok(progress)
    }

    /// Record a confirmed geofence visit, evaluate achievements, and persist
    /// the result.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownLocation`] for an id the catalogue does
    /// not hold.
    pub fn visit_location(
        &self,
        progress: &PlayerProgress,
        location_id: &str,
        now: DateTime<Local>,
    ) -> Result<VisitReport, EngineError> {
        let outcome = engine::visit_location(&self.catalog, progress, location_id, now)?;
        let unlock = evaluate_achievements(&outcome.progress, &self.achievements, &self.catalog);
        let persisted = self.persist(&unlock.progress);
        Ok(VisitReport {
            progress: unlock.progress,
            newly_visited: outcome.newly_visited,
            xp_earned: outcome.xp_earned,
            unlocked_achievements: unlock.unlocked,
            persisted,
        })
    }

    /// Submit a quiz answer, evaluate achievements, and persist the result.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownQuiz`] or
    /// [`EngineError::InvalidAnswerIndex`] without mutating anything.
    pub fn submit_quiz_answer(
        &self,
        progress: &PlayerProgress,
        quiz_id: &str,
        selected_index: usize,
        now: DateTime<Local>,
    ) -> Result<AnswerReport, EngineError> {
        let outcome =
            engine::submit_quiz_answer(&self.catalog, progress, quiz_id, selected_index, now)?;
        let unlock = evaluate_achievements(&outcome.progress, &self.achievements, &self.catalog);
        let persisted = self.persist(&unlock.progress);
        Ok(AnswerReport {
            progress: unlock.progress,
            is_correct: outcome.is_correct,
            newly_completed: outcome.newly_completed,
            xp_earned: outcome.xp_earned,
            points_earned: outcome.points_earned,
            unlocked_achievements: unlock.unlocked,
            persisted,
        })
    }

    fn persist(&self, progress: &PlayerProgress) -> bool {
        match self.store.put(&progress.player_id, progress) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("progress write failed for {}: {err}", progress.player_id);
                false
            }
        }
    }
}
