//! Geodesy primitives: great-circle distance, forward azimuth, compass octants.
//!
//! Pure functions over raw degree coordinates. Degenerate input (identical
//! points under floating error, antipodes) can surface as NaN; callers treat
//! NaN as "unknown" and hold their current state instead of transitioning.

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A point on the globe in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl Position {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Haversine distance in meters between two coordinates.
///
/// Symmetric in its arguments and zero for identical points.
pub fn distance_meters(a: Position, b: Position) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlng = (dlng * 0.5).sin();
    let h = sin_dlat * sin_dlat
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * sin_dlng * sin_dlng;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Initial bearing in degrees from `a` toward `b`, normalized into `[0, 360)`.
pub fn bearing_degrees(a: Position, b: Position) -> f64 {
    let dlng = (b.lng - a.lng).to_radians();
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let y = dlng.sin() * lat_b.cos();
    let x = lat_a.cos() * lat_b.sin() - lat_a.sin() * lat_b.cos() * dlng.cos();
    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Compass octant for the navigation readout, 45 degrees per sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Octant {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Octant {
    /// Bucket a bearing into its sector. Boundaries resolve with `>=`, so a
    /// bearing sitting exactly on a sector edge lands in the later sector.
    pub fn from_bearing(bearing_deg: f64) -> Self {
        let b = bearing_deg.rem_euclid(360.0);
        if b >= 337.5 || b < 22.5 {
            Octant::North
        } else if b >= 22.5 && b < 67.5 {
            Octant::NorthEast
        } else if b >= 67.5 && b < 112.5 {
            Octant::East
        } else if b >= 112.5 && b < 157.5 {
            Octant::SouthEast
        } else if b >= 157.5 && b < 202.5 {
            Octant::South
        } else if b >= 202.5 && b < 247.5 {
            Octant::SouthWest
        } else if b >= 247.5 && b < 292.5 {
            Octant::West
        } else {
            Octant::NorthWest
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Octant::North => "N",
            Octant::NorthEast => "NE",
            Octant::East => "E",
            Octant::SouthEast => "SE",
            Octant::South => "S",
            Octant::SouthWest => "SW",
            Octant::West => "W",
            Octant::NorthWest => "NW",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUET_CAMPUS: Position = Position {
        lat: 22.4633,
        lng: 91.9714,
    };
    const PAHARTOLI: Position = Position {
        lat: 22.4725,
        lng: 91.9845,
    };

    #[test]
    fn distance_is_zero_for_identical_points() {
        assert_eq!(distance_meters(CUET_CAMPUS, CUET_CAMPUS), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let forward = distance_meters(CUET_CAMPUS, PAHARTOLI);
        let backward = distance_meters(PAHARTOLI, CUET_CAMPUS);
        assert_eq!(forward, backward);
    }

    #[test]
    fn reference_points_are_between_1500_and_1900_meters_apart() {
        let d = distance_meters(CUET_CAMPUS, PAHARTOLI);
        assert!(d >= 1500.0 && d <= 1900.0, "unexpected distance: {d}");
    }

    #[test]
    fn bearing_stays_in_range() {
        let samples = [
            (CUET_CAMPUS, PAHARTOLI),
            (PAHARTOLI, CUET_CAMPUS),
            (
                Position::new(0.0, 0.0),
                Position::new(0.0, -1.0),
            ),
            (
                Position::new(10.0, 10.0),
                Position::new(-10.0, 10.0),
            ),
        ];
        for (a, b) in samples {
            let bearing = bearing_degrees(a, b);
            assert!(
                (0.0..360.0).contains(&bearing),
                "bearing out of range: {bearing}"
            );
        }
    }

    #[test]
    fn bearing_points_northeast_toward_pahartoli() {
        let bearing = bearing_degrees(CUET_CAMPUS, PAHARTOLI);
        assert_eq!(Octant::from_bearing(bearing), Octant::NorthEast);
    }

    #[test]
    fn octant_sector_edges_resolve_with_gte() {
        assert_eq!(Octant::from_bearing(0.0), Octant::North);
        assert_eq!(Octant::from_bearing(22.5), Octant::NorthEast);
        assert_eq!(Octant::from_bearing(67.5), Octant::East);
        assert_eq!(Octant::from_bearing(157.5), Octant::South);
        assert_eq!(Octant::from_bearing(337.5), Octant::North);
        assert_eq!(Octant::from_bearing(359.9), Octant::North);
        assert_eq!(Octant::from_bearing(360.0), Octant::North);
    }
}
