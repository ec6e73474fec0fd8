//! Centralized balance and tuning constants for CityQuest game logic.
//!
//! These values define the deterministic math for progression, geofencing,
//! and challenge scheduling. Keeping them together ensures that gameplay can
//! only be adjusted via code changes reviewed in version control, rather than
//! through external JSON assets.

// Progression tuning -------------------------------------------------------
pub(crate) const XP_PER_LEVEL_STEP: u32 = 100;
pub(crate) const LOCATION_VISIT_XP: u32 = 50;
pub(crate) const STARTING_LEVEL: u32 = 1;

// Geofence tuning ----------------------------------------------------------
pub(crate) const DEFAULT_GEOFENCE_RADIUS_M: f64 = 100.0;
pub(crate) const DEFAULT_UNLOCK_LEVEL: u32 = 1;
pub(crate) const EARTH_RADIUS_M: f64 = 6_371_000.0;

// Challenge identifiers ----------------------------------------------------
pub(crate) const CHALLENGE_DAILY_ANSWER: &str = "daily_answer_5";
pub(crate) const CHALLENGE_DAILY_VISIT: &str = "daily_visit_3";
pub(crate) const CHALLENGE_DAILY_XP: &str = "daily_earn_100xp";
pub(crate) const CHALLENGE_WEEKLY_COMPLETE: &str = "weekly_complete_location";
pub(crate) const CHALLENGE_WEEKLY_STREAK: &str = "weekly_maintain_streak";
pub(crate) const CHALLENGE_WEEKLY_XP: &str = "weekly_earn_500xp";

// Scheduler ----------------------------------------------------------------
pub(crate) const DAILY_CHALLENGE_SLOTS: usize = 3;
pub(crate) const DAYS_PER_WEEK: u32 = 7;
