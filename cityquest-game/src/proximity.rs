//! Geofence proximity detection over a location sample stream.
//!
//! The detector keeps a membership set of location ids currently inside their
//! radius and diffs it against each incoming sample. A location fires at most
//! one "entered" event per continuous dwell; leaving and re-entering re-arms
//! it, so a player idling on a geofence boundary does not trigger duplicate
//! pop-ups. Samples may arrive at any rate, including never; membership only
//! changes when a sample is observed.

use chrono::{DateTime, Utc};
use smallvec::SmallVec;
use std::collections::HashSet;

use crate::catalog::{Coordinates, GameCatalog};
use crate::constants::EARTH_RADIUS_M;

/// One GPS fix pushed by the platform location service. Timestamps are
/// assumed non-decreasing across a stream but are not otherwise interpreted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationSample {
    pub coordinates: Coordinates,
    pub timestamp: DateTime<Utc>,
}

/// Ids whose geofence was entered on a single sample. Rarely more than a
/// couple, so they are stored inline.
pub type EnteredIds = SmallVec<[String; 2]>;

/// Geofence membership state machine. Transient: never persisted, rebuilt
/// from the next sample after a restart.
#[derive(Debug, Clone, Default)]
pub struct ProximityDetector {
    inside: HashSet<String>,
}

impl ProximityDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Location ids inside their radius as of the last observed sample.
    #[must_use]
    pub fn inside(&self) -> &HashSet<String> {
        &self.inside
    }

    /// Feed one sample and collect the newly entered location ids, sorted
    /// for a deterministic event order.
    ///
    /// Membership is replaced wholesale by the set of locations within
    /// radius of this sample, so leaving a geofence re-arms its entered
    /// event.
    pub fn observe(&mut self, sample: &LocationSample, catalog: &GameCatalog) -> EnteredIds {
        let mut inside_now = HashSet::with_capacity(self.inside.len());
        let mut entered = EnteredIds::new();

        for location in catalog.locations.values() {
            let distance = haversine_distance_m(sample.coordinates, location.coordinates);
            if distance <= location.radius {
                if !self.inside.contains(&location.id) {
                    entered.push(location.id.clone());
                }
                inside_now.insert(location.id.clone());
            }
        }

        self.inside = inside_now;
        entered.sort_unstable();
        entered
    }

    /// Forget all membership, re-arming every entered event.
    pub fn reset(&mut self) {
        self.inside.clear();
    }
}

/// Great-circle distance between two coordinates in meters (haversine).
#[must_use]
pub fn haversine_distance_m(a: Coordinates, b: Coordinates) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}
