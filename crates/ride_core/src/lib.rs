pub mod backend;
pub mod geo;
pub mod intent;
pub mod motion;
pub mod ride;
pub mod rider;
pub mod ticker;
pub mod vehicle;
pub mod waypoint;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;
