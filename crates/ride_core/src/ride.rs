//! Ride lifecycle domain types shared by both node machines.

pub type RideId = u64;

/// Discrete state of the rider-side kiosk lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiderPhase {
    Idle,
    Detecting,
    PrivilegeCheck,
    WaitingConfirm,
    WaitingAcceptance,
    Accepted,
    Active,
    TimeoutError,
}

/// Discrete state of the vehicle-side unit lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehiclePhase {
    Available,
    OfferPending,
    EnRouteToPickup,
    AtPickup,
    EnRouteToDestination,
    AtDestination,
    Completing,
}

/// A ride request as the kiosk builds it. Immutable once sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RideRequest {
    pub pickup: String,
    pub destination: String,
    pub requester_id: String,
}

/// A pending ride surfaced to a vehicle operator.
#[derive(Debug, Clone, PartialEq)]
pub struct RideOffer {
    pub ride_id: RideId,
    pub pickup: String,
    pub destination: String,
    pub distance_km: f64,
}

/// How the backend graded a completed ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    /// Drop-off landed inside the geofence; points were awarded.
    Completed,
    /// Drop-off landed outside the geofence; held for administrative review.
    PendingReview,
}

/// Outcome of `complete_ride`.
#[derive(Debug, Clone, PartialEq)]
pub struct RideReceipt {
    pub points_awarded: i32,
    pub drop_distance_m: f64,
    pub status: CompletionStatus,
}
