//! Rider-side kiosk state machine.
//!
//! The kiosk is bound to one waypoint. It watches local signals (presence,
//! authorization, confirm) to build and submit a ride request, then follows
//! the ride through acceptance, pickup, and completion by polling the
//! backend. Every transition emits display/lamp/buzzer intents; none of
//! them block. Backend failures are skipped ticks, never crashes.

use rand::Rng;
use tracing::{debug, info, warn};

use crate::backend::{BackendError, PhaseReport, RideBackend};
use crate::intent::Intent;
use crate::ride::{RideId, RideRequest, RiderPhase};
use crate::ticker::Ticker;

/// Continuous presence required before the kiosk engages.
pub const PRESENCE_HOLD_MS: u64 = 3_000;
/// Debounce window for the confirm input.
pub const CONFIRM_DEBOUNCE_MS: u64 = 200;
/// How long an unacknowledged request may wait before timing out.
pub const REQUEST_TIMEOUT_MS: u64 = 60_000;
/// Minimum interval between ride status polls.
pub const STATUS_POLL_INTERVAL_MS: u64 = 2_000;

const WAIT_REFRESH_INTERVAL_MS: u64 = 1_000;
const TIMEOUT_HOLD_MS: u64 = 5_000;
const COMPLETED_HOLD_MS: u64 = 3_000;
const ERROR_HOLD_MS: u64 = 2_000;

/// Sampled kiosk signals for one tick. Acquisition is external; the machine
/// only consumes the booleans.
#[derive(Debug, Clone, Copy, Default)]
pub struct KioskSignals {
    /// Someone is standing on the block.
    pub presence: bool,
    /// The authorization token reads above threshold.
    pub authorized: bool,
    /// The confirm input reads pressed.
    pub confirm: bool,
}

pub struct RiderMachine {
    phase: RiderPhase,
    block: String,
    destination: String,
    ride_id: Option<RideId>,
    presence_since: Option<u64>,
    presence_latched: bool,
    last_confirm_at: Option<u64>,
    request_sent_at: Option<u64>,
    status_poll: Ticker,
    wait_refresh: Ticker,
    hold_until: Option<u64>,
    intents: Vec<Intent>,
}

impl RiderMachine {
    pub fn new(block: impl Into<String>, destination: impl Into<String>) -> Self {
        let mut machine = Self {
            phase: RiderPhase::Idle,
            block: block.into(),
            destination: destination.into(),
            ride_id: None,
            presence_since: None,
            presence_latched: false,
            last_confirm_at: None,
            request_sent_at: None,
            status_poll: Ticker::new(STATUS_POLL_INTERVAL_MS),
            wait_refresh: Ticker::new(WAIT_REFRESH_INTERVAL_MS),
            hold_until: None,
            intents: Vec::new(),
        };
        machine.push_ready_screen();
        machine
    }

    pub fn phase(&self) -> RiderPhase {
        self.phase
    }

    pub fn ride_id(&self) -> Option<RideId> {
        self.ride_id
    }

    /// Take every intent queued since the last drain.
    pub fn drain_intents(&mut self) -> Vec<Intent> {
        std::mem::take(&mut self.intents)
    }

    /// Advance the machine one control-loop tick.
    pub fn tick(&mut self, now_ms: u64, signals: KioskSignals, backend: &dyn RideBackend) {
        if let Some(deadline) = self.hold_until {
            if now_ms < deadline {
                return;
            }
            self.hold_until = None;
            self.reset();
            return;
        }

        match self.phase {
            RiderPhase::Idle | RiderPhase::Detecting => self.watch_presence(now_ms, signals),
            RiderPhase::PrivilegeCheck => self.check_authorization(signals),
            RiderPhase::WaitingConfirm => self.watch_confirm(now_ms, signals, backend),
            RiderPhase::WaitingAcceptance => {
                self.check_timeout(now_ms);
                if self.phase == RiderPhase::WaitingAcceptance {
                    self.refresh_wait_screen(now_ms);
                    self.poll_ride(now_ms, backend);
                }
            }
            RiderPhase::Accepted | RiderPhase::Active => self.poll_ride(now_ms, backend),
            RiderPhase::TimeoutError => {}
        }
    }

    /// Clear every session field and return to idle. Always succeeds.
    pub fn reset(&mut self) {
        info!("kiosk session reset");
        self.phase = RiderPhase::Idle;
        self.ride_id = None;
        self.presence_since = None;
        self.presence_latched = false;
        self.last_confirm_at = None;
        self.request_sent_at = None;
        self.hold_until = None;
        self.status_poll.reset();
        self.wait_refresh.reset();
        self.intents.push(Intent::lamps(false, false, false));
        self.push_ready_screen();
    }

    fn watch_presence(&mut self, now_ms: u64, signals: KioskSignals) {
        if !signals.presence {
            if self.presence_since.take().is_some() {
                debug!("presence lost before hold elapsed; timer reset");
                self.phase = RiderPhase::Idle;
                self.push_ready_screen();
            }
            return;
        }

        let since = *self.presence_since.get_or_insert(now_ms);
        if self.phase == RiderPhase::Idle {
            self.phase = RiderPhase::Detecting;
            self.intents
                .push(Intent::screen("User Detected", ["Stay for 3 sec"]));
        }

        if now_ms.saturating_sub(since) >= PRESENCE_HOLD_MS && !self.presence_latched {
            self.presence_latched = true;
            self.phase = RiderPhase::PrivilegeCheck;
            info!(
                held_ms = now_ms.saturating_sub(since),
                "presence held; awaiting authorization"
            );
            self.intents.push(Intent::screen(
                "Time Complete",
                ["Show pass card", "to the sensor"],
            ));
            self.intents.push(Intent::beep(1, 150));
        }
    }

    fn check_authorization(&mut self, signals: KioskSignals) {
        if !signals.authorized {
            return;
        }
        self.phase = RiderPhase::WaitingConfirm;
        info!("privilege verified");
        self.intents.push(Intent::screen(
            "Verified",
            ["Press button", "to confirm ride"],
        ));
        self.intents.push(Intent::beep(2, 100));
    }

    fn watch_confirm(&mut self, now_ms: u64, signals: KioskSignals, backend: &dyn RideBackend) {
        if !signals.confirm {
            return;
        }
        if let Some(last) = self.last_confirm_at {
            if now_ms.saturating_sub(last) < CONFIRM_DEBOUNCE_MS {
                return;
            }
        }
        self.last_confirm_at = Some(now_ms);

        let request = RideRequest {
            pickup: self.block.clone(),
            destination: self.destination.clone(),
            requester_id: random_requester_id(),
        };
        match backend.submit_request(&request) {
            Ok(ride_id) => {
                info!(ride_id, destination = %request.destination, "ride request submitted");
                self.ride_id = Some(ride_id);
                self.request_sent_at = Some(now_ms);
                self.phase = RiderPhase::WaitingAcceptance;
                self.status_poll.reset();
                self.wait_refresh.reset();
                self.intents.push(Intent::lamps(false, false, false));
                self.intents.push(Intent::screen(
                    "Request Sent",
                    ["Waiting for", "a vehicle..."],
                ));
                self.intents.push(Intent::beep(3, 80));
            }
            Err(err) => {
                warn!(?err, "ride request failed");
                self.intents
                    .push(Intent::screen("Error", ["Check network", "Try again"]));
                self.intents.push(Intent::beep(1, 500));
                self.hold_until = Some(now_ms + ERROR_HOLD_MS);
            }
        }
    }

    fn check_timeout(&mut self, now_ms: u64) {
        let Some(sent) = self.request_sent_at else {
            return;
        };
        if now_ms.saturating_sub(sent) > REQUEST_TIMEOUT_MS {
            warn!("request unacknowledged after 60s");
            self.phase = RiderPhase::TimeoutError;
            self.intents.push(Intent::lamps(false, true, false));
            self.intents
                .push(Intent::screen("TIMEOUT", ["No vehicle", "available"]));
            self.intents.push(Intent::beep(1, 500));
            self.hold_until = Some(now_ms + TIMEOUT_HOLD_MS);
        }
    }

    fn refresh_wait_screen(&mut self, now_ms: u64) {
        if !self.wait_refresh.ready(now_ms) {
            return;
        }
        let Some(sent) = self.request_sent_at else {
            return;
        };
        let waited_s = now_ms.saturating_sub(sent) / 1000;
        self.intents.push(Intent::screen(
            "Waiting...",
            [format!("Time: {waited_s}s"), "Max: 60s".to_string()],
        ));
    }

    fn poll_ride(&mut self, now_ms: u64, backend: &dyn RideBackend) {
        let Some(ride_id) = self.ride_id else {
            return;
        };
        if !self.status_poll.ready(now_ms) {
            return;
        }

        let report = match backend.poll_status(ride_id) {
            Ok(report) => report,
            Err(BackendError::Connectivity(reason)) => {
                debug!(%reason, "status poll skipped: backend unreachable");
                return;
            }
            Err(BackendError::Protocol(reason)) => {
                debug!(%reason, "status poll ignored: malformed reply");
                return;
            }
        };

        match (self.phase, report) {
            (RiderPhase::WaitingAcceptance, PhaseReport::Accepted) => {
                info!(ride_id, "ride accepted; vehicle en route");
                self.phase = RiderPhase::Accepted;
                self.intents.push(Intent::lamps(true, false, false));
                self.intents.push(Intent::screen(
                    "Ride Accepted",
                    ["Vehicle coming", "Please wait..."],
                ));
                self.intents.push(Intent::beep(2, 100));
            }
            // Tolerate a missed ACCEPTED poll: PICKUP still moves us forward.
            (RiderPhase::WaitingAcceptance | RiderPhase::Accepted, PhaseReport::Pickup) => {
                info!(ride_id, "vehicle arrived at the block");
                self.phase = RiderPhase::Active;
                self.intents.push(Intent::lamps(false, false, true));
                self.intents.push(Intent::screen(
                    "Vehicle Here",
                    ["Have a safe", "journey!"],
                ));
                self.intents.push(Intent::beep(3, 100));
            }
            (RiderPhase::Accepted | RiderPhase::Active, PhaseReport::Completed) => {
                info!(ride_id, "ride completed");
                self.intents.push(Intent::screen(
                    "Ride Complete",
                    ["Thank you!", "Resetting..."],
                ));
                self.intents.push(Intent::beep(2, 150));
                self.hold_until = Some(now_ms + COMPLETED_HOLD_MS);
            }
            _ => {}
        }
    }

    fn push_ready_screen(&mut self) {
        self.intents.push(Intent::screen(
            "System Ready",
            ["Stand on block", "for 3+ seconds"],
        ));
    }
}

fn random_requester_id() -> String {
    format!("USER_{}", rand::thread_rng().gen_range(1000..10000))
}
