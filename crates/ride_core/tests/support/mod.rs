#![allow(dead_code)]

use ride_core::geo::Position;
use ride_core::motion::MotionSimulator;
use ride_core::ride::RideOffer;
use ride_core::vehicle::VehicleMachine;
use ride_core::waypoint::WaypointTable;

pub const CUET_CAMPUS: Position = Position {
    lat: 22.4633,
    lng: 91.9714,
};
pub const PAHARTOLI: Position = Position {
    lat: 22.4725,
    lng: 91.9845,
};

/// A point the given number of meters due north of `origin`.
pub fn north_of(origin: Position, meters: f64) -> Position {
    Position::new(origin.lat + meters / 111_320.0, origin.lng)
}

/// The standard campus-to-bazar offer used across scenarios.
pub fn campus_offer(ride_id: u64) -> RideOffer {
    RideOffer {
        ride_id,
        pickup: "CUET_CAMPUS".to_string(),
        destination: "PAHARTOLI".to_string(),
        distance_km: 1.7,
    }
}

/// A vehicle unit parked at `start` with the default simulated speed.
pub fn vehicle_at(start: Position) -> VehicleMachine {
    VehicleMachine::new(
        "RICK001",
        start,
        WaypointTable::campus_defaults(),
        MotionSimulator::default(),
    )
}
