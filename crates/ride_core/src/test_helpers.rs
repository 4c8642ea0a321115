//! Scriptable in-memory backend for exercising the state machines.
//!
//! Tests play the role of the backend's matching/storage logic: they push
//! offers, flip the reported ride phase, and set the drop target used to
//! grade completions. Every mutating call is recorded so assertions can
//! check what each node actually sent.

use std::cell::RefCell;

use crate::backend::{BackendError, PhaseReport, RideBackend};
use crate::geo::{self, Position};
use crate::ride::{CompletionStatus, RideId, RideOffer, RideReceipt, RideRequest};

#[derive(Default)]
struct ScriptState {
    ride_seq: RideId,
    status: Option<PhaseReport>,
    pending: Vec<RideOffer>,
    refuse_accept: bool,
    offline: bool,
    drop_target: Option<Position>,
    submitted: Vec<RideRequest>,
    accepted: Vec<(RideId, String)>,
    confirmed_pickups: Vec<RideId>,
    completions: Vec<(RideId, Position)>,
    position_reports: Vec<(String, Position)>,
}

pub struct ScriptedBackend {
    state: RefCell<ScriptState>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(ScriptState::default()),
        }
    }

    /// When offline, every call fails with a connectivity error.
    pub fn set_offline(&self, offline: bool) {
        self.state.borrow_mut().offline = offline;
    }

    /// Phase reported to `poll_status` from now on.
    pub fn set_status(&self, phase: PhaseReport) {
        self.state.borrow_mut().status = Some(phase);
    }

    /// Queue an offer for `poll_pending_requests`.
    pub fn push_offer(&self, offer: RideOffer) {
        self.state.borrow_mut().pending.push(offer);
    }

    /// Make `accept_ride` report the ride as already taken.
    pub fn set_refuse_accept(&self, refuse: bool) {
        self.state.borrow_mut().refuse_accept = refuse;
    }

    /// Grade completions against this drop target: within 50 m awards 10
    /// points, within the 100 m geofence 7, beyond it 0 with pending review.
    pub fn set_drop_target(&self, target: Position) {
        self.state.borrow_mut().drop_target = Some(target);
    }

    pub fn submitted_requests(&self) -> Vec<RideRequest> {
        self.state.borrow().submitted.clone()
    }

    pub fn accepted_rides(&self) -> Vec<(RideId, String)> {
        self.state.borrow().accepted.clone()
    }

    pub fn confirmed_pickups(&self) -> Vec<RideId> {
        self.state.borrow().confirmed_pickups.clone()
    }

    pub fn completions(&self) -> Vec<(RideId, Position)> {
        self.state.borrow().completions.clone()
    }

    pub fn position_report_count(&self) -> usize {
        self.state.borrow().position_reports.len()
    }

    fn check_online(&self) -> Result<(), BackendError> {
        if self.state.borrow().offline {
            Err(BackendError::Connectivity("scripted offline".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RideBackend for ScriptedBackend {
    fn register(
        &self,
        _node_id: &str,
        _display_name: &str,
        _position: Position,
    ) -> Result<(), BackendError> {
        self.check_online()
    }

    fn report_position(&self, node_id: &str, position: Position) -> Result<(), BackendError> {
        self.check_online()?;
        self.state
            .borrow_mut()
            .position_reports
            .push((node_id.to_string(), position));
        Ok(())
    }

    fn submit_request(&self, request: &RideRequest) -> Result<RideId, BackendError> {
        self.check_online()?;
        let mut state = self.state.borrow_mut();
        state.ride_seq += 1;
        state.submitted.push(request.clone());
        Ok(state.ride_seq)
    }

    fn poll_pending_requests(&self, _node_id: &str) -> Result<Vec<RideOffer>, BackendError> {
        self.check_online()?;
        Ok(self.state.borrow().pending.clone())
    }

    fn accept_ride(&self, ride_id: RideId, node_id: &str) -> Result<bool, BackendError> {
        self.check_online()?;
        let mut state = self.state.borrow_mut();
        if state.refuse_accept {
            return Ok(false);
        }
        state.accepted.push((ride_id, node_id.to_string()));
        state.pending.retain(|offer| offer.ride_id != ride_id);
        Ok(true)
    }

    fn confirm_pickup(&self, ride_id: RideId) -> Result<(), BackendError> {
        self.check_online()?;
        self.state.borrow_mut().confirmed_pickups.push(ride_id);
        Ok(())
    }

    fn complete_ride(&self, ride_id: RideId, drop: Position) -> Result<RideReceipt, BackendError> {
        self.check_online()?;
        let mut state = self.state.borrow_mut();
        state.completions.push((ride_id, drop));

        let Some(target) = state.drop_target else {
            return Ok(RideReceipt {
                points_awarded: 10,
                drop_distance_m: 0.0,
                status: CompletionStatus::Completed,
            });
        };
        let distance = geo::distance_meters(drop, target);
        let receipt = if distance <= 50.0 {
            RideReceipt {
                points_awarded: 10,
                drop_distance_m: distance,
                status: CompletionStatus::Completed,
            }
        } else if distance <= 100.0 {
            RideReceipt {
                points_awarded: 7,
                drop_distance_m: distance,
                status: CompletionStatus::Completed,
            }
        } else {
            RideReceipt {
                points_awarded: 0,
                drop_distance_m: distance,
                status: CompletionStatus::PendingReview,
            }
        };
        Ok(receipt)
    }

    fn poll_status(&self, _ride_id: RideId) -> Result<PhaseReport, BackendError> {
        self.check_online()?;
        Ok(self
            .state
            .borrow()
            .status
            .unwrap_or(PhaseReport::Requested))
    }
}
