//! Vehicle-side navigation unit state machine.
//!
//! The unit polls the backend for pending requests, surfaces offers to the
//! operator, and once a ride is accepted drives the simulated position
//! toward pickup and then destination, gating pickup confirmation and ride
//! completion on the 100 m geofence. Operator commands arrive through the
//! control loop; acceptance is never automatic.

use tracing::{debug, info, warn};

use crate::backend::RideBackend;
use crate::geo::{self, Octant, Position};
use crate::intent::Intent;
use crate::motion::{MotionSimulator, MotionUpdate, TICK_INTERVAL_MS};
use crate::ride::{CompletionStatus, RideId, RideOffer, RideReceipt, VehiclePhase};
use crate::ticker::Ticker;
use crate::waypoint::{Waypoint, WaypointTable};

/// Minimum interval between pending-request polls.
pub const PENDING_POLL_INTERVAL_MS: u64 = 3_000;
/// Minimum interval between position broadcasts.
pub const POSITION_REPORT_INTERVAL_MS: u64 = 5_000;
/// Pickup confirmation and drop-off auto-approval radius.
pub const GEOFENCE_RADIUS_M: f64 = 100.0;

const OUTCOME_HOLD_MS: u64 = 5_000;

/// Explicit operator inputs; one per tick at most.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    Accept,
    Reject,
    ConfirmPickup,
    Complete,
}

/// Coarse point expectation for the navigation readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointBand {
    High,
    Medium,
    Review,
}

impl PointBand {
    pub fn for_distance(distance_m: f64) -> Self {
        if distance_m <= 50.0 {
            PointBand::High
        } else if distance_m <= 100.0 {
            PointBand::Medium
        } else {
            PointBand::Review
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PointBand::High => "8-10",
            PointBand::Medium => "5-8",
            PointBand::Review => "Review",
        }
    }
}

/// What the display shows while en route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavReadout {
    pub remaining_m: f64,
    pub heading: Octant,
    pub elapsed_secs: u64,
    pub band: PointBand,
}

#[derive(Debug, Clone)]
struct ActiveRide {
    ride_id: RideId,
    pickup: Waypoint,
    destination: Waypoint,
    pickup_confirmed: bool,
    started_at: u64,
}

pub struct VehicleMachine {
    phase: VehiclePhase,
    node_id: String,
    position: Position,
    waypoints: WaypointTable,
    motion: MotionSimulator,
    ride: Option<ActiveRide>,
    offer: Option<RideOffer>,
    last_offer_seen: Option<RideId>,
    total_points: i64,
    nav: Option<NavReadout>,
    pending_poll: Ticker,
    motion_tick: Ticker,
    position_report: Ticker,
    hold_until: Option<u64>,
    intents: Vec<Intent>,
}

impl VehicleMachine {
    pub fn new(
        node_id: impl Into<String>,
        start: Position,
        waypoints: WaypointTable,
        motion: MotionSimulator,
    ) -> Self {
        let mut machine = Self {
            phase: VehiclePhase::Available,
            node_id: node_id.into(),
            position: start,
            waypoints,
            motion,
            ride: None,
            offer: None,
            last_offer_seen: None,
            total_points: 0,
            nav: None,
            pending_poll: Ticker::new(PENDING_POLL_INTERVAL_MS),
            motion_tick: Ticker::new(TICK_INTERVAL_MS),
            position_report: Ticker::new(POSITION_REPORT_INTERVAL_MS),
            hold_until: None,
            intents: Vec::new(),
        };
        machine.push_available_screen();
        machine
    }

    pub fn phase(&self) -> VehiclePhase {
        self.phase
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn total_points(&self) -> i64 {
        self.total_points
    }

    pub fn ride_id(&self) -> Option<RideId> {
        self.ride.as_ref().map(|r| r.ride_id)
    }

    pub fn pickup_confirmed(&self) -> bool {
        self.ride.as_ref().map(|r| r.pickup_confirmed).unwrap_or(false)
    }

    pub fn offer(&self) -> Option<&RideOffer> {
        self.offer.as_ref()
    }

    /// Latest navigation readout; present whenever the unit is en route.
    pub fn nav(&self) -> Option<&NavReadout> {
        self.nav.as_ref()
    }

    /// Take every intent queued since the last drain.
    pub fn drain_intents(&mut self) -> Vec<Intent> {
        std::mem::take(&mut self.intents)
    }

    /// Advance the machine one control-loop tick.
    pub fn tick(
        &mut self,
        now_ms: u64,
        command: Option<OperatorCommand>,
        backend: &dyn RideBackend,
    ) {
        // Position broadcasts run in every phase, ride or no ride.
        self.broadcast_position(now_ms, backend);

        if let Some(deadline) = self.hold_until {
            if now_ms < deadline {
                return;
            }
            self.hold_until = None;
            if self.phase == VehiclePhase::Completing {
                self.finish_session();
                return;
            }
        }

        if let Some(cmd) = command {
            self.handle_command(now_ms, cmd, backend);
        }

        match self.phase {
            VehiclePhase::Available => self.poll_offers(now_ms, backend),
            VehiclePhase::EnRouteToPickup | VehiclePhase::EnRouteToDestination => {
                self.advance_motion(now_ms)
            }
            _ => {}
        }
    }

    fn handle_command(&mut self, now_ms: u64, cmd: OperatorCommand, backend: &dyn RideBackend) {
        match (cmd, self.phase) {
            (OperatorCommand::Accept, VehiclePhase::OfferPending) => {
                self.accept_offer(now_ms, backend)
            }
            (OperatorCommand::Reject, VehiclePhase::OfferPending) => self.reject_offer(),
            (
                OperatorCommand::ConfirmPickup,
                VehiclePhase::EnRouteToPickup | VehiclePhase::AtPickup,
            ) => self.confirm_pickup(backend),
            (
                OperatorCommand::Complete,
                VehiclePhase::EnRouteToDestination | VehiclePhase::AtDestination,
            ) => self.complete_ride(now_ms, backend),
            _ => {
                debug!(?cmd, phase = ?self.phase, "command ignored in current phase");
            }
        }
    }

    fn poll_offers(&mut self, now_ms: u64, backend: &dyn RideBackend) {
        if !self.pending_poll.ready(now_ms) {
            return;
        }
        let offers = match backend.poll_pending_requests(&self.node_id) {
            Ok(offers) => offers,
            Err(err) => {
                debug!(?err, "pending poll skipped");
                return;
            }
        };
        let Some(offer) = offers
            .into_iter()
            .find(|o| Some(o.ride_id) != self.last_offer_seen)
        else {
            return;
        };

        info!(
            ride_id = offer.ride_id,
            pickup = %offer.pickup,
            destination = %offer.destination,
            "new ride offer"
        );
        self.last_offer_seen = Some(offer.ride_id);
        self.phase = VehiclePhase::OfferPending;
        self.intents.push(Intent::screen(
            "NEW RIDE REQUEST",
            [
                format!("Pickup: {}", offer.pickup),
                format!("Dest: {}", offer.destination),
                format!("Distance: {:.1} km", offer.distance_km),
                format!("Est.Points: {}", estimate_points(offer.distance_km)),
                "ACCEPT or REJECT?".to_string(),
            ],
        ));
        self.intents.push(Intent::beep(2, 100));
        self.offer = Some(offer);
    }

    fn accept_offer(&mut self, now_ms: u64, backend: &dyn RideBackend) {
        let Some(offer) = self.offer.clone() else {
            return;
        };
        match backend.accept_ride(offer.ride_id, &self.node_id) {
            Ok(true) => {}
            Ok(false) => {
                info!(ride_id = offer.ride_id, "ride already taken");
                self.intents
                    .push(Intent::screen("Ride Taken", ["Try another"]));
                self.offer = None;
                self.phase = VehiclePhase::Available;
                self.push_available_screen();
                return;
            }
            Err(err) => {
                warn!(?err, "accept not acknowledged; offer kept");
                self.intents
                    .push(Intent::screen("Network Error", ["Try again"]));
                return;
            }
        }

        let pickup = self.waypoints.lookup(&offer.pickup).cloned();
        let destination = self.waypoints.lookup(&offer.destination).cloned();
        let (Some(pickup), Some(destination)) = (pickup, destination) else {
            warn!(
                pickup = %offer.pickup,
                destination = %offer.destination,
                "offer references unknown waypoints; abandoning"
            );
            self.intents
                .push(Intent::screen("Unknown Location", ["Cannot navigate"]));
            self.offer = None;
            self.phase = VehiclePhase::Available;
            self.push_available_screen();
            return;
        };

        info!(
            ride_id = offer.ride_id,
            pickup = %pickup.name,
            "ride accepted; heading to pickup"
        );
        self.ride = Some(ActiveRide {
            ride_id: offer.ride_id,
            pickup,
            destination,
            pickup_confirmed: false,
            started_at: now_ms,
        });
        self.offer = None;
        self.phase = VehiclePhase::EnRouteToPickup;
        self.motion_tick.reset();
        self.intents
            .push(Intent::screen("Ride Accepted", ["Going to pickup"]));
        self.intents.push(Intent::beep(1, 150));
    }

    fn reject_offer(&mut self) {
        // The ride id stays remembered so the same offer is not re-surfaced.
        info!("offer rejected");
        self.offer = None;
        self.phase = VehiclePhase::Available;
        self.push_available_screen();
    }

    fn advance_motion(&mut self, now_ms: u64) {
        if !self.motion_tick.ready(now_ms) {
            return;
        }
        let Some(ride) = self.ride.as_ref() else {
            return;
        };
        let (target, target_name) = match self.phase {
            VehiclePhase::EnRouteToPickup => (ride.pickup.position, ride.pickup.name.clone()),
            _ => (ride.destination.position, ride.destination.name.clone()),
        };
        let started_at = ride.started_at;

        match self.motion.advance(&mut self.position, target) {
            MotionUpdate::Arrived => {
                if self.phase == VehiclePhase::EnRouteToPickup {
                    info!(at = %target_name, "arrived at pickup");
                    self.phase = VehiclePhase::AtPickup;
                    self.intents
                        .push(Intent::screen("At Pickup", ["Confirm pickup"]));
                } else {
                    info!(at = %target_name, "arrived at destination");
                    self.phase = VehiclePhase::AtDestination;
                    self.intents
                        .push(Intent::screen("At Destination", ["Complete ride"]));
                }
                self.intents.push(Intent::beep(2, 100));
            }
            MotionUpdate::Moved {
                remaining_m,
                bearing_deg,
            } => {
                let readout = NavReadout {
                    remaining_m,
                    heading: Octant::from_bearing(bearing_deg),
                    elapsed_secs: now_ms.saturating_sub(started_at) / 1000,
                    band: PointBand::for_distance(remaining_m),
                };
                debug!(
                    remaining_m = readout.remaining_m,
                    heading = readout.heading.label(),
                    "moving toward {target_name}"
                );
                self.push_nav_screen(&target_name, &readout);
                self.nav = Some(readout);
            }
            MotionUpdate::Indeterminate => {
                debug!("motion step indeterminate; holding position");
            }
        }
    }

    fn confirm_pickup(&mut self, backend: &dyn RideBackend) {
        let Some(ride) = self.ride.as_mut() else {
            return;
        };
        if ride.pickup_confirmed {
            return;
        }

        let distance = geo::distance_meters(self.position, ride.pickup.position);
        // NaN fails the gate: unknown distance never opens a geofence.
        if !(distance <= GEOFENCE_RADIUS_M) {
            info!(distance_m = distance, "pickup confirm rejected: outside geofence");
            self.intents.push(Intent::screen(
                "Too Far",
                [format!("Distance: {distance:.0}m"), "Move closer".to_string()],
            ));
            return;
        }

        if let Err(err) = backend.confirm_pickup(ride.ride_id) {
            warn!(?err, "pickup confirm not acknowledged");
            self.intents
                .push(Intent::screen("Network Error", ["Try again"]));
            return;
        }

        info!(ride_id = ride.ride_id, "pickup confirmed; heading to destination");
        ride.pickup_confirmed = true;
        self.phase = VehiclePhase::EnRouteToDestination;
        self.motion_tick.reset();
        self.intents
            .push(Intent::screen("Pickup OK", ["Going to dest"]));
        self.intents.push(Intent::beep(1, 150));
    }

    fn complete_ride(&mut self, now_ms: u64, backend: &dyn RideBackend) {
        let Some(ride) = self.ride.as_ref() else {
            return;
        };

        let receipt = match backend.complete_ride(ride.ride_id, self.position) {
            Ok(receipt) => receipt,
            Err(err) => {
                warn!(?err, "completion not acknowledged");
                self.intents
                    .push(Intent::screen("Network Error", ["Try again"]));
                return;
            }
        };

        self.total_points += i64::from(receipt.points_awarded);
        info!(
            ride_id = ride.ride_id,
            points = receipt.points_awarded,
            status = ?receipt.status,
            "ride finished"
        );
        self.push_outcome_screen(&receipt);
        self.nav = None;
        self.phase = VehiclePhase::Completing;
        self.hold_until = Some(now_ms + OUTCOME_HOLD_MS);
    }

    fn finish_session(&mut self) {
        info!("session reset; available for rides");
        self.ride = None;
        self.phase = VehiclePhase::Available;
        self.pending_poll.reset();
        self.push_available_screen();
    }

    fn broadcast_position(&mut self, now_ms: u64, backend: &dyn RideBackend) {
        if !self.position_report.ready(now_ms) {
            return;
        }
        if let Err(err) = backend.report_position(&self.node_id, self.position) {
            debug!(?err, "position report dropped");
        }
    }

    fn push_nav_screen(&mut self, target_name: &str, readout: &NavReadout) {
        let header = if self.pickup_confirmed() {
            ">> TO DESTINATION <<"
        } else {
            ">> TO PICKUP <<"
        };
        self.intents.push(Intent::screen(
            header,
            [
                format!("To: {target_name}"),
                format!(
                    "Dist: {:.0}m {}",
                    readout.remaining_m,
                    readout.heading.label()
                ),
                format!(
                    "Time: {}m {}s",
                    readout.elapsed_secs / 60,
                    readout.elapsed_secs % 60
                ),
                format!("Est.Points: {}", readout.band.label()),
            ],
        ));
    }

    fn push_outcome_screen(&mut self, receipt: &RideReceipt) {
        let verdict = match receipt.status {
            CompletionStatus::PendingReview => "UNDER REVIEW",
            CompletionStatus::Completed if receipt.points_awarded >= 10 => "PERFECT DROP!",
            CompletionStatus::Completed if receipt.points_awarded >= 8 => "GREAT DROP!",
            CompletionStatus::Completed if receipt.points_awarded >= 5 => "GOOD DROP",
            CompletionStatus::Completed => "COMPLETED",
        };
        self.intents.push(Intent::screen(
            "RIDE COMPLETED",
            [
                verdict.to_string(),
                format!("Points: +{}", receipt.points_awarded),
                format!("Distance: {:.0}m", receipt.drop_distance_m),
                format!("Total: {}", self.total_points),
            ],
        ));
        self.intents.push(Intent::beep(2, 150));
    }

    fn push_available_screen(&mut self) {
        self.intents
            .push(Intent::screen("AVAILABLE", ["Waiting for rides"]));
    }
}

/// Point estimate shown with a fresh offer, by trip length.
fn estimate_points(distance_km: f64) -> &'static str {
    if distance_km <= 2.0 {
        "10"
    } else if distance_km <= 5.0 {
        "8-10"
    } else {
        "5-10"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_band_thresholds() {
        assert_eq!(PointBand::for_distance(10.0), PointBand::High);
        assert_eq!(PointBand::for_distance(50.0), PointBand::High);
        assert_eq!(PointBand::for_distance(80.0), PointBand::Medium);
        assert_eq!(PointBand::for_distance(100.0), PointBand::Medium);
        assert_eq!(PointBand::for_distance(100.1), PointBand::Review);
    }

    #[test]
    fn offer_point_estimate_bands() {
        assert_eq!(estimate_points(1.7), "10");
        assert_eq!(estimate_points(2.0), "10");
        assert_eq!(estimate_points(4.2), "8-10");
        assert_eq!(estimate_points(9.0), "5-10");
    }
}
