//! Pure rule functions over a progress snapshot.
//!
//! Every operation takes an immutable [`PlayerProgress`] snapshot and returns
//! a new one inside an outcome struct. Nothing here performs I/O; persistence
//! and replication happen after the call returns and never roll back the
//! computed state. Expected domain conditions (revisit, completed-quiz
//! replay, wrong answer) are reported in the outcome rather than raised as
//! errors.

use chrono::{DateTime, Local, Utc};
use thiserror::Error;

use crate::catalog::GameCatalog;
use crate::constants::{
    CHALLENGE_DAILY_ANSWER, CHALLENGE_DAILY_VISIT, CHALLENGE_DAILY_XP, LOCATION_VISIT_XP,
};
use crate::progress::PlayerProgress;

/// Errors raised when an operation references data the catalogue does not
/// hold, or input outside the quiz's option range. Rejections never mutate
/// the snapshot.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("unknown location id {0:?}")]
    UnknownLocation(String),
    #[error("unknown quiz id {0:?}")]
    UnknownQuiz(String),
    #[error("answer index {selected} out of range for quiz {quiz_id} with {options} options")]
    InvalidAnswerIndex {
        quiz_id: String,
        selected: usize,
        options: usize,
    },
}

/// Result of a visit operation.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitOutcome {
    pub progress: PlayerProgress,
    /// False when the location had already been visited and the call was an
    /// idempotent no-op.
    pub newly_visited: bool,
    pub xp_earned: u32,
}

/// Result of a quiz answer submission.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub progress: PlayerProgress,
    pub is_correct: bool,
    /// True when this answer completed the quiz for the first time and the
    /// rewards were granted.
    pub newly_completed: bool,
    pub xp_earned: u32,
    pub points_earned: u32,
}

/// Record a confirmed visit to a catalogue location.
///
/// The caller is responsible for the distance precondition (the player is
/// inside the geofence, as reported by the proximity detector); the engine
/// does not re-validate it. Revisiting an already-visited location returns
/// the snapshot unchanged.
///
/// # Errors
///
/// Returns [`EngineError::UnknownLocation`] when the id is not in the
/// catalogue.
pub fn visit_location(
    catalog: &GameCatalog,
    progress: &PlayerProgress,
    location_id: &str,
    now: DateTime<Local>,
) -> Result<VisitOutcome, EngineError> {
    if catalog.location(location_id).is_none() {
        return Err(EngineError::UnknownLocation(location_id.to_string()));
    }
    if progress.locations_visited.contains(location_id) {
        return Ok(VisitOutcome {
            progress: progress.clone(),
            newly_visited: false,
            xp_earned: 0,
        });
    }

    let mut next = progress.clone();
    next.locations_visited.insert(location_id.to_string());
    next.add_xp(LOCATION_VISIT_XP);
    next.last_active = now.with_timezone(&Utc);
    next.bump_challenge_progress(CHALLENGE_DAILY_VISIT, 1, now.date_naive());

    Ok(VisitOutcome {
        progress: next,
        newly_visited: true,
        xp_earned: LOCATION_VISIT_XP,
    })
}

/// Submit an answer for a catalogue quiz.
///
/// Accuracy counters advance on every accepted submission. Rewards and daily
/// challenge counters advance only the first time a quiz is answered
/// correctly; a correct replay keeps the telemetry honest without paying
/// twice. Every accepted answer runs the streak update.
///
/// # Errors
///
/// Returns [`EngineError::UnknownQuiz`] for an id the catalogue does not
/// hold, and [`EngineError::InvalidAnswerIndex`] when the selected index is
/// outside the quiz's option range.
pub fn submit_quiz_answer(
    catalog: &GameCatalog,
    progress: &PlayerProgress,
    quiz_id: &str,
    selected_index: usize,
    now: DateTime<Local>,
) -> Result<AnswerOutcome, EngineError> {
    let quiz = catalog
        .quiz(quiz_id)
        .ok_or_else(|| EngineError::UnknownQuiz(quiz_id.to_string()))?;
    if selected_index >= quiz.options.len() {
        return Err(EngineError::InvalidAnswerIndex {
            quiz_id: quiz.id.clone(),
            selected: selected_index,
            options: quiz.options.len(),
        });
    }

    let today = now.date_naive();
    let is_correct = selected_index == quiz.correct_answer;
    let newly_completed = is_correct && !progress.quizzes_completed.contains(quiz_id);

    let mut next = progress.clone();
    next.total_questions_answered = next.total_questions_answered.saturating_add(1);

    let mut xp_earned = 0;
    let mut points_earned = 0;
    if is_correct {
        next.total_correct_answers = next.total_correct_answers.saturating_add(1);
        if newly_completed {
            next.quizzes_completed.insert(quiz.id.clone());
            xp_earned = quiz.xp_reward;
            points_earned = quiz.points;
            next.add_xp(xp_earned);
            next.add_points(points_earned);
            next.bump_challenge_progress(CHALLENGE_DAILY_ANSWER, 1, today);
            next.bump_challenge_progress(CHALLENGE_DAILY_XP, xp_earned, today);
        }
    }

    next.update_streak(today);
    next.last_active = now.with_timezone(&Utc);

    Ok(AnswerOutcome {
        progress: next,
        is_correct,
        newly_completed,
        xp_earned,
        points_earned,
    })
}
