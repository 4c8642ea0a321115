//! Named-location reference table.
//!
//! Waypoints are the fixed pickup/destination candidates of the service
//! area. The table is read-only after construction; ride payloads carry
//! waypoint *names*, and navigation resolves them here.

use crate::geo::Position;

/// A named, fixed geographic reference point.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub name: String,
    pub position: Position,
}

impl Waypoint {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            position: Position::new(lat, lng),
        }
    }
}

/// Last-resort stems for names the exact and substring passes miss.
const ALIASES: &[(&str, &str)] = &[
    ("PAHAR", "PAHARTOLI"),
    ("CUET", "CUET_CAMPUS"),
    ("NOAPARA", "NOAPARA"),
    ("RAOJAN", "RAOJAN"),
];

/// Read-only lookup table of service-area waypoints.
#[derive(Debug, Clone)]
pub struct WaypointTable {
    entries: Vec<Waypoint>,
}

impl WaypointTable {
    pub fn new(entries: Vec<Waypoint>) -> Self {
        Self { entries }
    }

    /// The four reference locations of the pilot service area.
    pub fn campus_defaults() -> Self {
        Self::new(vec![
            Waypoint::new("CUET_CAMPUS", 22.4633, 91.9714),
            Waypoint::new("PAHARTOLI", 22.4725, 91.9845),
            Waypoint::new("NOAPARA", 22.4580, 91.9920),
            Waypoint::new("RAOJAN", 22.4520, 91.9650),
        ])
    }

    pub fn entries(&self) -> &[Waypoint] {
        &self.entries
    }

    /// Resolve a waypoint by name: case-insensitive exact match first, then
    /// substring containment in either direction, then the alias stems.
    pub fn lookup(&self, name: &str) -> Option<&Waypoint> {
        let query = name.trim().to_uppercase();
        if query.is_empty() {
            return None;
        }

        if let Some(found) = self
            .entries
            .iter()
            .find(|w| w.name.to_uppercase() == query)
        {
            return Some(found);
        }

        if let Some(found) = self.entries.iter().find(|w| {
            let known = w.name.to_uppercase();
            known.contains(&query) || query.contains(&known)
        }) {
            return Some(found);
        }

        ALIASES
            .iter()
            .find(|(stem, _)| query.contains(stem))
            .and_then(|(_, canonical)| self.entries.iter().find(|w| w.name == *canonical))
    }
}
