//! Static location and quiz catalogue.
//!
//! The catalogue is immutable reference data loaded once at startup by the
//! consuming application. Validation happens at load time so the rest of the
//! engine can index into it without re-checking cross-references, and the
//! geofence radius default is applied during deserialization rather than at
//! every call site.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::constants::{DEFAULT_GEOFENCE_RADIUS_M, DEFAULT_UNLOCK_LEVEL};

/// Geographic coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A point of interest players can physically visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationEntry {
    pub id: String,
    pub name: String,
    pub coordinates: Coordinates,
    /// Geofence radius in meters.
    #[serde(default = "default_radius")]
    pub radius: f64,
    pub category: String,
    #[serde(default)]
    pub district: Option<String>,
    /// Minimum player level required before the location shows as available.
    #[serde(default = "default_unlock_level")]
    pub unlock_level: u32,
    /// Quizzes attached to this location.
    #[serde(default)]
    pub quiz_ids: Vec<String>,
}

fn default_radius() -> f64 {
    DEFAULT_GEOFENCE_RADIUS_M
}

fn default_unlock_level() -> u32 {
    DEFAULT_UNLOCK_LEVEL
}

/// A single quiz question owned by a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizEntry {
    pub id: String,
    pub location_id: String,
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`.
    pub correct_answer: usize,
    #[serde(default)]
    pub xp_reward: u32,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub category: String,
}

/// Container for all static game content, keyed by id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GameCatalog {
    #[serde(default)]
    pub locations: HashMap<String, LocationEntry>,
    #[serde(default)]
    pub quizzes: HashMap<String, QuizEntry>,
}

/// Errors raised when the static catalogue is missing or malformed.
///
/// These are fatal to the consuming application at startup; the engine never
/// sees an invalid catalogue.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse catalogue JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalogue contains no locations")]
    Empty,
    #[error("location {location_id} has a non-positive radius")]
    InvalidRadius { location_id: String },
    #[error("quiz {quiz_id} references unknown location {location_id}")]
    UnknownQuizLocation {
        quiz_id: String,
        location_id: String,
    },
    #[error("quiz {quiz_id} marks answer {correct_answer} but offers {options} options")]
    CorrectAnswerOutOfRange {
        quiz_id: String,
        correct_answer: usize,
        options: usize,
    },
}

impl GameCatalog {
    /// Create an empty catalogue (useful for tests).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load and validate a catalogue from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or any cross-reference
    /// check in [`GameCatalog::validate`] fails.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check internal consistency: every quiz must belong to a known location
    /// and mark a correct answer inside its option range, and every geofence
    /// must have a usable radius.
    ///
    /// # Errors
    ///
    /// Returns the first violated check.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.locations.is_empty() {
            return Err(CatalogError::Empty);
        }
        for location in self.locations.values() {
            if location.radius <= 0.0 {
                return Err(CatalogError::InvalidRadius {
                    location_id: location.id.clone(),
                });
            }
        }
        for quiz in self.quizzes.values() {
            if !self.locations.contains_key(&quiz.location_id) {
                return Err(CatalogError::UnknownQuizLocation {
                    quiz_id: quiz.id.clone(),
                    location_id: quiz.location_id.clone(),
                });
            }
            if quiz.correct_answer >= quiz.options.len() {
                return Err(CatalogError::CorrectAnswerOutOfRange {
                    quiz_id: quiz.id.clone(),
                    correct_answer: quiz.correct_answer,
                    options: quiz.options.len(),
                });
            }
        }
        Ok(())
    }

    /// Look up a location by id.
    #[must_use]
    pub fn location(&self, location_id: &str) -> Option<&LocationEntry> {
        self.locations.get(location_id)
    }

    /// Look up a quiz by id.
    #[must_use]
    pub fn quiz(&self, quiz_id: &str) -> Option<&QuizEntry> {
        self.quizzes.get(quiz_id)
    }

    /// All quizzes owned by a location, sorted by id for stable presentation.
    #[must_use]
    pub fn quizzes_for_location(&self, location_id: &str) -> Vec<&QuizEntry> {
        let mut quizzes: Vec<&QuizEntry> = self
            .quizzes
            .values()
            .filter(|quiz| quiz.location_id == location_id)
            .collect();
        quizzes.sort_by(|a, b| a.id.cmp(&b.id));
        quizzes
    }

    /// All locations in a category.
    #[must_use]
    pub fn locations_in_category(&self, category: &str) -> Vec<&LocationEntry> {
        self.locations
            .values()
            .filter(|location| location.category == category)
            .collect()
    }

    /// All locations available to a player at the given level.
    #[must_use]
    pub fn locations_unlocked_at(&self, level: u32) -> Vec<&LocationEntry> {
        self.locations
            .values()
            .filter(|location| location.unlock_level <= level)
            .collect()
    }
}
