//! Wire schema for the backend HTTP API.
//!
//! One serde type per payload; a field that fails to decode is a protocol
//! error upstream, never a silently mis-parsed value. The only tolerated
//! absence is `points` on a completion reply, which decodes to 0 — the safe
//! default while a ride sits in review.

use serde::{Deserialize, Serialize};

use super::PhaseReport;
use crate::ride::{CompletionStatus, RideOffer, RideReceipt};

#[derive(Debug, Serialize)]
pub struct RegisterBody<'a> {
    #[serde(rename = "nodeID")]
    pub node_id: &'a str,
    #[serde(rename = "displayName")]
    pub display_name: &'a str,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize)]
pub struct LocationBody<'a> {
    #[serde(rename = "nodeID")]
    pub node_id: &'a str,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub struct AckReply {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct RideRequestBody<'a> {
    pub pickup: &'a str,
    pub destination: &'a str,
    #[serde(rename = "requesterID")]
    pub requester_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct RideCreatedReply {
    #[serde(rename = "rideID")]
    pub ride_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct PendingReply {
    pub rides: Vec<PendingRide>,
}

#[derive(Debug, Deserialize)]
pub struct PendingRide {
    #[serde(rename = "rideID")]
    pub ride_id: u64,
    pub pickup: String,
    pub destination: String,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
}

impl From<PendingRide> for RideOffer {
    fn from(ride: PendingRide) -> Self {
        RideOffer {
            ride_id: ride.ride_id,
            pickup: ride.pickup,
            destination: ride.destination,
            distance_km: ride.distance_km,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AcceptBody<'a> {
    #[serde(rename = "rideID")]
    pub ride_id: u64,
    #[serde(rename = "nodeID")]
    pub node_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct AcceptReply {
    pub accepted: bool,
}

#[derive(Debug, Serialize)]
pub struct PickupBody {
    #[serde(rename = "rideID")]
    pub ride_id: u64,
}

#[derive(Debug, Serialize)]
pub struct CompleteBody {
    #[serde(rename = "rideID")]
    pub ride_id: u64,
    #[serde(rename = "dropLat")]
    pub drop_lat: f64,
    #[serde(rename = "dropLng")]
    pub drop_lng: f64,
}

#[derive(Debug, Deserialize)]
pub struct CompleteReply {
    #[serde(default)]
    pub points: i32,
    #[serde(rename = "dropDistanceM", default)]
    pub drop_distance_m: f64,
    pub status: WireStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WireStatus {
    Completed,
    PendingReview,
}

impl From<WireStatus> for CompletionStatus {
    fn from(status: WireStatus) -> Self {
        match status {
            WireStatus::Completed => CompletionStatus::Completed,
            WireStatus::PendingReview => CompletionStatus::PendingReview,
        }
    }
}

impl From<CompleteReply> for RideReceipt {
    fn from(reply: CompleteReply) -> Self {
        RideReceipt {
            points_awarded: reply.points,
            drop_distance_m: reply.drop_distance_m,
            status: reply.status.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusReply {
    pub phase: WirePhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WirePhase {
    Requested,
    Accepted,
    Pickup,
    Completed,
    PendingReview,
}

impl From<WirePhase> for PhaseReport {
    fn from(phase: WirePhase) -> Self {
        match phase {
            WirePhase::Requested => PhaseReport::Requested,
            WirePhase::Accepted => PhaseReport::Accepted,
            WirePhase::Pickup => PhaseReport::Pickup,
            WirePhase::Completed => PhaseReport::Completed,
            WirePhase::PendingReview => PhaseReport::PendingReview,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_reply_decodes_into_offers() {
        let json = r#"{"rides":[{"rideID":7,"pickup":"CUET_CAMPUS","destination":"PAHARTOLI","distanceKm":1.7}]}"#;
        let reply: PendingReply = serde_json::from_str(json).expect("decode");
        let offer: RideOffer = reply.rides.into_iter().next().expect("one ride").into();
        assert_eq!(offer.ride_id, 7);
        assert_eq!(offer.pickup, "CUET_CAMPUS");
        assert_eq!(offer.distance_km, 1.7);
    }

    #[test]
    fn missing_points_defaults_to_zero() {
        let json = r#"{"status":"PENDING_REVIEW","dropDistanceM":212.4}"#;
        let reply: CompleteReply = serde_json::from_str(json).expect("decode");
        let receipt: RideReceipt = reply.into();
        assert_eq!(receipt.points_awarded, 0);
        assert_eq!(receipt.status, CompletionStatus::PendingReview);
    }

    #[test]
    fn status_reply_decodes_known_phases() {
        let reply: StatusReply =
            serde_json::from_str(r#"{"phase":"ACCEPTED"}"#).expect("decode");
        assert_eq!(PhaseReport::from(reply.phase), PhaseReport::Accepted);
    }

    #[test]
    fn unknown_phase_is_a_decode_error() {
        let result: Result<StatusReply, _> = serde_json::from_str(r#"{"phase":"TELEPORTED"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn request_body_uses_contract_field_names() {
        let body = RideRequestBody {
            pickup: "CUET_CAMPUS",
            destination: "PAHARTOLI",
            requester_id: "USER_4821",
        };
        let json = serde_json::to_string(&body).expect("encode");
        assert!(json.contains(r#""requesterID":"USER_4821""#));
        assert!(json.contains(r#""pickup":"CUET_CAMPUS""#));
    }
}
