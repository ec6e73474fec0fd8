//! End-to-end walkthrough: geofence events drive visits, visits and quizzes
//! drive progression, and the resulting snapshots feed challenges and the
//! leaderboard.

use chrono::{DateTime, Local, TimeZone, Utc};
use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;

use cityquest_game::{
    CatalogSource, Coordinates, GameCatalog, GameEngine, LocationSample, PlayerProgress,
    ProgressStore, ProximityDetector, daily_challenges, level_for_xp, rank_snapshots,
    weekly_challenges,
};

const CATALOG_JSON: &str = include_str!("fixtures/city_catalog.json");

#[derive(Clone, Copy)]
struct JsonSource;

impl CatalogSource for JsonSource {
    type Error = cityquest_game::CatalogError;

    fn load_catalog(&self) -> Result<GameCatalog, Self::Error> {
        GameCatalog::from_json(CATALOG_JSON)
    }
}

#[derive(Clone, Default)]
struct MemoryStore {
    records: Rc<RefCell<HashMap<String, PlayerProgress>>>,
}

impl ProgressStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, player_id: &str) -> Result<Option<PlayerProgress>, Self::Error> {
        Ok(self.records.borrow().get(player_id).cloned())
    }

    fn put(&self, player_id: &str, progress: &PlayerProgress) -> Result<(), Self::Error> {
        self.records
            .borrow_mut()
            .insert(player_id.to_string(), progress.clone());
        Ok(())
    }
}

fn at(day: u32, hour: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
}

fn sample(lat: f64, lng: f64, day: u32, hour: u32) -> LocationSample {
    LocationSample {
        coordinates: Coordinates { lat, lng },
        timestamp: at(day, hour).with_timezone(&Utc),
    }
}

#[test]
fn walking_tour_progresses_through_every_system() {
    let engine = GameEngine::new(JsonSource, MemoryStore::default()).unwrap();
    let catalog = engine.catalog().clone();
    let mut detector = ProximityDetector::new();
    let mut progress = engine
        .load_or_create_profile("walker", "Walker", at(1, 8).with_timezone(&Utc))
        .unwrap();

    // Day one: walk past every location; the detector fires one entered
    // event per geofence, and each event becomes a visit.
    let stops = [
        ("town_hall", 48.1374, 11.5755),
        ("river_gate", 48.1420, 11.5755),
        ("beer_hall", 48.1374, 11.5820),
        ("art_museum", 48.1330, 11.5700),
        ("green_park", 48.1450, 11.5860),
    ];
    for (hour, (expected_id, lat, lng)) in stops.iter().enumerate() {
        let entered = detector.observe(&sample(*lat, *lng, 1, 9 + hour as u32), &catalog);
        assert_eq!(entered.as_slice(), [(*expected_id).to_string()]);
        let report = engine
            .visit_location(&progress, expected_id, at(1, 9 + hour as u32))
            .unwrap();
        assert!(report.newly_visited);
        progress = report.progress;
    }

    assert_eq!(progress.locations_visited_count(), 5);
    // Visit-count rows fire on their thresholds during the walk.
    for id in ["completionist", "tourist_trap", "explorer", "local_hero"] {
        assert!(progress.achievements.contains(id), "missing {id}");
    }
    assert_eq!(progress.level, level_for_xp(progress.total_xp));

    // The daily visit challenge saturates at its target of 3.
    let daily = daily_challenges(&progress, at(1, 14).date_naive());
    let visits = daily.iter().find(|s| s.id == "daily_visit_3").unwrap();
    assert_eq!(visits.current, 3);
    assert!(visits.is_completed());

    // Standing still must not re-fire the geofence.
    let repeat = detector.observe(&sample(48.1450, 11.5860, 1, 14), &catalog);
    assert!(repeat.is_empty());

    // Answer every quiz at two locations correctly.
    let xp_before_quizzes = progress.total_xp;
    for quiz in catalog.quizzes_for_location("town_hall") {
        let report = engine
            .submit_quiz_answer(&progress, &quiz.id, quiz.correct_answer, at(1, 15))
            .unwrap();
        assert!(report.is_correct);
        progress = report.progress;
    }
    for quiz in catalog.quizzes_for_location("river_gate") {
        let report = engine
            .submit_quiz_answer(&progress, &quiz.id, quiz.correct_answer, at(1, 16))
            .unwrap();
        assert!(report.is_correct);
        progress = report.progress;
    }

    assert!(progress.total_xp > xp_before_quizzes);
    assert!(progress.achievements.contains("first_steps"));
    assert!(progress.achievements.contains("secret_spy"));
    assert_eq!(progress.total_correct_answers, progress.total_questions_answered);
    assert_eq!(progress.level, level_for_xp(progress.total_xp));

    // Two fully answered locations complete the weekly location challenge.
    let weekly = weekly_challenges(&progress, &catalog);
    let complete = weekly
        .iter()
        .find(|s| s.id == "weekly_complete_location")
        .unwrap();
    assert_eq!(complete.current, 2);
    assert!(complete.is_completed());

    // Days two and three: one wrong answer each still keeps the streak
    // alive without granting rewards.
    let q = catalog.quizzes_for_location("beer_hall")[0];
    let wrong = (q.correct_answer + 1) % q.options.len();
    for day in [2, 3] {
        let report = engine
            .submit_quiz_answer(&progress, &q.id, wrong, at(day, 10))
            .unwrap();
        assert!(!report.is_correct);
        assert_eq!(report.xp_earned, 0);
        progress = report.progress;
    }
    assert_eq!(progress.current_streak, 3);

    // Yesterday's daily counters do not leak into day three's view.
    let stale = daily_challenges(&progress, at(3, 11).date_naive());
    let visits = stale.iter().find(|s| s.id == "daily_visit_3").unwrap();
    assert_eq!(visits.current, 0);

    // The persisted record matches the final snapshot.
    let reloaded = engine
        .load_or_create_profile("walker", "Walker", at(3, 12).with_timezone(&Utc))
        .unwrap();
    assert_eq!(reloaded, progress);
}

#[test]
fn leaderboard_ranks_walkers_by_points() {
    let engine = GameEngine::new(JsonSource, MemoryStore::default()).unwrap();
    let catalog = engine.catalog().clone();

    // Three players answer different numbers of quizzes.
    let mut snapshots = Vec::new();
    for (name, quizzes) in [("casual", 1usize), ("regular", 3), ("devoted", 6)] {
        let mut progress = PlayerProgress::new(name, name, at(1, 8).with_timezone(&Utc));
        let mut quiz_ids: Vec<&String> = catalog.quizzes.keys().collect();
        quiz_ids.sort();
        for quiz_id in quiz_ids.into_iter().take(quizzes) {
            let quiz = catalog.quiz(quiz_id).unwrap();
            let report = engine
                .submit_quiz_answer(&progress, quiz_id, quiz.correct_answer, at(1, 9))
                .unwrap();
            assert!(report.is_correct);
            progress = report.progress;
        }
        snapshots.push(progress);
    }

    let board = rank_snapshots(&snapshots);
    let order: Vec<(&str, u32)> = board
        .iter()
        .map(|entry| (entry.player_id.as_str(), entry.rank))
        .collect();
    assert_eq!(order, [("devoted", 1), ("regular", 2), ("casual", 3)]);
}
