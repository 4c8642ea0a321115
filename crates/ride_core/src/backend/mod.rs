//! Backend contract: the request/poll surface both nodes share.
//!
//! Rider and vehicle units never talk to each other; the shared ride record
//! behind this contract is the only thing that keeps them consistent. The
//! backend serializes access to that record; callers here only need to
//! honor the at-most-one-acceptance semantics (`accept_ride` returning
//! `false` is expected, not an error).

mod error;
pub mod wire;

#[cfg(feature = "http")]
mod http;

pub use error::BackendError;
#[cfg(feature = "http")]
pub use http::HttpBackend;

use crate::geo::Position;
use crate::ride::{RideId, RideOffer, RideReceipt, RideRequest};

/// Ride phase as the backend reports it to pollers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseReport {
    Requested,
    Accepted,
    Pickup,
    Completed,
    PendingReview,
}

/// The request/poll operations the shared backend exposes.
///
/// All calls are synchronous with a bounded timeout. A failed call never
/// escalates past its [`BackendError`]; callers skip the tick and retry on
/// the next scheduled interval.
pub trait RideBackend {
    fn register(
        &self,
        node_id: &str,
        display_name: &str,
        position: Position,
    ) -> Result<(), BackendError>;

    /// Best-effort, latest-wins location report.
    fn report_position(&self, node_id: &str, position: Position) -> Result<(), BackendError>;

    fn submit_request(&self, request: &RideRequest) -> Result<RideId, BackendError>;

    fn poll_pending_requests(&self, node_id: &str) -> Result<Vec<RideOffer>, BackendError>;

    /// `Ok(false)` means another vehicle took the ride first.
    fn accept_ride(&self, ride_id: RideId, node_id: &str) -> Result<bool, BackendError>;

    fn confirm_pickup(&self, ride_id: RideId) -> Result<(), BackendError>;

    fn complete_ride(&self, ride_id: RideId, drop: Position) -> Result<RideReceipt, BackendError>;

    fn poll_status(&self, ride_id: RideId) -> Result<PhaseReport, BackendError>;
}
