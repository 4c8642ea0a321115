//! Simulated waypoint-to-waypoint motion at constant ground speed.
//!
//! Positions advance on a fixed one-second tick using a local planar
//! approximation: the per-tick travel distance becomes a lat/lng delta
//! scaled by meters-per-degree at the current latitude. Accurate enough for
//! the kilometer-scale hops this service covers; this is not great-circle
//! integration and does not try to be.

use crate::geo::{self, Position};

/// Within this range of the target the vehicle counts as arrived.
pub const ARRIVAL_RADIUS_M: f64 = 5.0;

/// Default simulated ground speed.
pub const DEFAULT_SPEED_KMH: f64 = 15.0;

/// Simulated tick interval the per-tick step distance is derived from.
pub const TICK_INTERVAL_MS: u64 = 1_000;

const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Result of advancing one tick toward a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionUpdate {
    /// Within the arrival radius of the target.
    Arrived,
    /// Advanced one tick toward the target.
    Moved { remaining_m: f64, bearing_deg: f64 },
    /// Distance or bearing came back NaN; nothing moved this tick.
    Indeterminate,
}

#[derive(Debug, Clone, Copy)]
pub struct MotionSimulator {
    speed_kmh: f64,
}

impl MotionSimulator {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    pub fn speed_kmh(&self) -> f64 {
        self.speed_kmh
    }

    fn meters_per_tick(&self) -> f64 {
        self.speed_kmh * 1000.0 / 3600.0
    }

    /// Advance `current` one tick toward `target`.
    ///
    /// The final step is clamped: when one tick's travel would meet or pass
    /// the target, the position snaps to the target exactly instead of
    /// carrying past it and oscillating.
    pub fn advance(&self, current: &mut Position, target: Position) -> MotionUpdate {
        let distance = geo::distance_meters(*current, target);
        if distance.is_nan() {
            return MotionUpdate::Indeterminate;
        }
        if distance <= ARRIVAL_RADIUS_M {
            return MotionUpdate::Arrived;
        }

        let step = self.meters_per_tick();
        if step >= distance {
            *current = target;
            return MotionUpdate::Arrived;
        }

        let bearing = geo::bearing_degrees(*current, target);
        if bearing.is_nan() {
            return MotionUpdate::Indeterminate;
        }

        let bearing_rad = bearing.to_radians();
        let meters_per_degree_lng = METERS_PER_DEGREE_LAT * current.lat.to_radians().cos();
        current.lat += step * bearing_rad.cos() / METERS_PER_DEGREE_LAT;
        current.lng += step * bearing_rad.sin() / meters_per_degree_lng;

        MotionUpdate::Moved {
            remaining_m: geo::distance_meters(*current, target),
            bearing_deg: bearing,
        }
    }
}

impl Default for MotionSimulator {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED_KMH)
    }
}
