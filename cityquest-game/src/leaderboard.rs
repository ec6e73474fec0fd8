//! Leaderboard ranking and the remote snapshot collaborator contract.
//!
//! Ranking is a pure function over a collection of remote progress
//! snapshots. The remote store itself is reached through a trait; its
//! failures are non-fatal warnings because the local in-memory progress is
//! always authoritative.

use serde::{Deserialize, Serialize};

use crate::progress::PlayerProgress;

/// Sort key accepted by the remote top-N query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    TotalXp,
    TotalPoints,
}

/// Remote persistence and leaderboard collaborator. Implementations perform
/// the actual network I/O outside this crate.
pub trait LeaderboardClient {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Publish a player's snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote write fails; the caller treats it as a
    /// warning, never a rollback.
    fn upsert(&self, player_id: &str, snapshot: &PlayerProgress) -> Result<(), Self::Error>;

    /// Fetch the top `limit` snapshots ordered by `sort`.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote query fails.
    fn query_top(&self, limit: usize, sort: SortKey) -> Result<Vec<PlayerProgress>, Self::Error>;
}

/// One ranked row as the presentation layer consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_id: String,
    pub display_name: String,
    pub total_xp: u32,
    pub level: u32,
    pub total_points: u32,
    pub locations_visited: u32,
    pub quizzes_completed: u32,
    /// 1-based position after ranking.
    pub rank: u32,
}

/// Rank snapshots descending by total points. The sort is stable, so ties
/// keep their incoming order; ranks are assigned 1-based by position.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn rank_snapshots(snapshots: &[PlayerProgress]) -> Vec<LeaderboardEntry> {
    let mut ordered: Vec<&PlayerProgress> = snapshots.iter().collect();
    ordered.sort_by(|a, b| b.total_points.cmp(&a.total_points));

    ordered
        .into_iter()
        .enumerate()
        .map(|(index, snapshot)| LeaderboardEntry {
            player_id: snapshot.player_id.clone(),
            display_name: snapshot.display_name.clone(),
            total_xp: snapshot.total_xp,
            level: snapshot.level,
            total_points: snapshot.total_points,
            locations_visited: snapshot.locations_visited_count() as u32,
            quizzes_completed: snapshot.quizzes_completed_count() as u32,
            rank: index as u32 + 1,
        })
        .collect()
}

/// Query the remote store and rank the result. A failed query logs a warning
/// and yields an empty board.
pub fn fetch_standings<C: LeaderboardClient>(client: &C, limit: usize) -> Vec<LeaderboardEntry> {
    match client.query_top(limit, SortKey::TotalXp) {
        Ok(snapshots) => rank_snapshots(&snapshots),
        Err(err) => {
            log::warn!("leaderboard query failed: {err}");
            Vec::new()
        }
    }
}

/// Push a snapshot to the remote store. Returns false (after logging a
/// warning) when the write fails; the in-memory state stays authoritative.
pub fn publish_snapshot<C: LeaderboardClient>(client: &C, progress: &PlayerProgress) -> bool {
    if let Err(err) = client.upsert(&progress.player_id, progress) {
        log::warn!(
            "leaderboard upsert failed for {}: {err}",
            progress.player_id
        );
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::cell::RefCell;
    use std::fmt;

    fn snapshot(player_id: &str, points: u32, xp: u32) -> PlayerProgress {
        let created = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let mut progress = PlayerProgress::new(player_id, player_id, created);
        progress.add_points(points);
        progress.add_xp(xp);
        progress
    }

    #[test]
    fn ranks_descend_by_points_with_one_based_positions() {
        let snapshots = vec![
            snapshot("low", 10, 0),
            snapshot("high", 900, 0),
            snapshot("mid", 400, 0),
        ];
        let board = rank_snapshots(&snapshots);
        let order: Vec<(&str, u32)> = board
            .iter()
            .map(|entry| (entry.player_id.as_str(), entry.rank))
            .collect();
        assert_eq!(order, [("high", 1), ("mid", 2), ("low", 3)]);
    }

    #[test]
    fn ties_keep_incoming_order() {
        let snapshots = vec![
            snapshot("first", 100, 0),
            snapshot("second", 100, 0),
            snapshot("third", 100, 0),
        ];
        let board = rank_snapshots(&snapshots);
        let ids: Vec<&str> = board.iter().map(|e| e.player_id.as_str()).collect();
        assert_eq!(ids, ["first", "second", "third"]);
        assert_eq!(board[2].rank, 3);
    }

    #[test]
    fn empty_input_ranks_to_empty_board() {
        assert!(rank_snapshots(&[]).is_empty());
    }

    #[derive(Debug)]
    struct RemoteDown;

    impl fmt::Display for RemoteDown {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("remote unavailable")
        }
    }

    impl std::error::Error for RemoteDown {}

    struct FlakyClient {
        fail: bool,
        upserts: RefCell<Vec<String>>,
    }

    impl LeaderboardClient for FlakyClient {
        type Error = RemoteDown;

        fn upsert(&self, player_id: &str, _snapshot: &PlayerProgress) -> Result<(), Self::Error> {
            if self.fail {
                return Err(RemoteDown);
            }
            self.upserts.borrow_mut().push(player_id.to_string());
            Ok(())
        }

        fn query_top(
            &self,
            limit: usize,
            _sort: SortKey,
        ) -> Result<Vec<PlayerProgress>, Self::Error> {
            if self.fail {
                return Err(RemoteDown);
            }
            Ok((0..limit.min(2))
                .map(|index| snapshot(&format!("p{index}"), 100 - index as u32, 0))
                .collect())
        }
    }

    #[test]
    fn fetch_standings_degrades_to_empty_on_failure() {
        let client = FlakyClient {
            fail: true,
            upserts: RefCell::new(Vec::new()),
        };
        assert!(fetch_standings(&client, 10).is_empty());
    }

    #[test]
    fn publish_reports_failure_without_panicking() {
        let down = FlakyClient {
            fail: true,
            upserts: RefCell::new(Vec::new()),
        };
        assert!(!publish_snapshot(&down, &snapshot("p1", 5, 5)));

        let up = FlakyClient {
            fail: false,
            upserts: RefCell::new(Vec::new()),
        };
        assert!(publish_snapshot(&up, &snapshot("p1", 5, 5)));
        assert_eq!(up.upserts.borrow().as_slice(), ["p1".to_string()]);
    }
}
