mod support;

use ride_core::geo;
use ride_core::ride::VehiclePhase;
use ride_core::test_helpers::ScriptedBackend;
use ride_core::vehicle::{OperatorCommand, VehicleMachine};

use support::{campus_offer, north_of, vehicle_at, CUET_CAMPUS, PAHARTOLI};

/// Tick once per simulated second until the phase is reached.
fn run_until_phase(
    machine: &mut VehicleMachine,
    backend: &ScriptedBackend,
    start_ms: u64,
    phase: VehiclePhase,
) -> u64 {
    let mut now = start_ms;
    for _ in 0..2000 {
        machine.tick(now, None, backend);
        if machine.phase() == phase {
            return now;
        }
        now += 1000;
    }
    panic!("never reached {phase:?}, stuck in {:?}", machine.phase());
}

#[test]
fn pending_offer_surfaces_once_per_ride_id() {
    let backend = ScriptedBackend::new();
    let mut machine = vehicle_at(CUET_CAMPUS);

    backend.push_offer(campus_offer(1));
    machine.tick(0, None, &backend);
    assert_eq!(machine.phase(), VehiclePhase::OfferPending);
    assert_eq!(machine.offer().map(|o| o.ride_id), Some(1));

    machine.tick(1000, Some(OperatorCommand::Reject), &backend);
    assert_eq!(machine.phase(), VehiclePhase::Available);
    assert!(machine.offer().is_none());

    // The rejected ride stays seen; polling must not re-surface it.
    machine.tick(4000, None, &backend);
    machine.tick(8000, None, &backend);
    assert_eq!(machine.phase(), VehiclePhase::Available);

    backend.push_offer(campus_offer(2));
    machine.tick(12_000, None, &backend);
    assert_eq!(machine.phase(), VehiclePhase::OfferPending);
    assert_eq!(machine.offer().map(|o| o.ride_id), Some(2));
}

#[test]
fn already_taken_ride_returns_to_available() {
    let backend = ScriptedBackend::new();
    let mut machine = vehicle_at(CUET_CAMPUS);

    backend.push_offer(campus_offer(1));
    machine.tick(0, None, &backend);
    assert_eq!(machine.phase(), VehiclePhase::OfferPending);

    backend.set_refuse_accept(true);
    machine.tick(1000, Some(OperatorCommand::Accept), &backend);
    assert_eq!(machine.phase(), VehiclePhase::Available);
    assert!(machine.offer().is_none());
    assert!(machine.ride_id().is_none());
}

#[test]
fn accept_failure_keeps_the_offer_for_retry() {
    let backend = ScriptedBackend::new();
    let mut machine = vehicle_at(north_of(CUET_CAMPUS, 600.0));

    backend.push_offer(campus_offer(1));
    machine.tick(0, None, &backend);

    backend.set_offline(true);
    machine.tick(1000, Some(OperatorCommand::Accept), &backend);
    assert_eq!(machine.phase(), VehiclePhase::OfferPending);
    assert_eq!(machine.offer().map(|o| o.ride_id), Some(1));

    backend.set_offline(false);
    machine.tick(2000, Some(OperatorCommand::Accept), &backend);
    assert_eq!(machine.phase(), VehiclePhase::EnRouteToPickup);
}

#[test]
fn pickup_confirm_rejected_outside_geofence() {
    let backend = ScriptedBackend::new();
    let mut machine = vehicle_at(north_of(CUET_CAMPUS, 150.0));

    backend.push_offer(campus_offer(1));
    machine.tick(0, None, &backend);
    machine.tick(100, Some(OperatorCommand::Accept), &backend);
    assert_eq!(machine.phase(), VehiclePhase::EnRouteToPickup);

    machine.tick(200, Some(OperatorCommand::ConfirmPickup), &backend);
    assert_eq!(machine.phase(), VehiclePhase::EnRouteToPickup);
    assert!(!machine.pickup_confirmed());
    assert!(backend.confirmed_pickups().is_empty());
}

#[test]
fn pickup_confirm_accepted_inside_geofence() {
    let backend = ScriptedBackend::new();
    let mut machine = vehicle_at(north_of(CUET_CAMPUS, 80.0));

    backend.push_offer(campus_offer(1));
    machine.tick(0, None, &backend);
    machine.tick(100, Some(OperatorCommand::Accept), &backend);
    assert_eq!(machine.phase(), VehiclePhase::EnRouteToPickup);

    machine.tick(200, Some(OperatorCommand::ConfirmPickup), &backend);
    assert_eq!(machine.phase(), VehiclePhase::EnRouteToDestination);
    assert!(machine.pickup_confirmed());
    assert_eq!(backend.confirmed_pickups(), vec![1]);
}

#[test]
fn early_completion_outside_geofence_is_pending_review() {
    let backend = ScriptedBackend::new();
    backend.set_drop_target(PAHARTOLI);
    let mut machine = vehicle_at(north_of(CUET_CAMPUS, 20.0));

    backend.push_offer(campus_offer(1));
    machine.tick(0, None, &backend);
    machine.tick(100, Some(OperatorCommand::Accept), &backend);
    machine.tick(200, Some(OperatorCommand::ConfirmPickup), &backend);
    assert_eq!(machine.phase(), VehiclePhase::EnRouteToDestination);

    // Drive until roughly 200 m short of the destination, then complete.
    let mut now = 1000;
    while geo::distance_meters(machine.position(), PAHARTOLI) > 200.0 {
        machine.tick(now, None, &backend);
        now += 1000;
        assert!(now < 2_000_000, "vehicle never approached the destination");
    }
    machine.tick(now, Some(OperatorCommand::Complete), &backend);

    let completions = backend.completions();
    assert_eq!(completions.len(), 1);
    let drop_distance = geo::distance_meters(completions[0].1, PAHARTOLI);
    assert!(drop_distance > 100.0, "drop landed too close: {drop_distance}");

    // Pending review: no points, but no error either, and the session ends.
    assert_eq!(machine.phase(), VehiclePhase::Completing);
    assert_eq!(machine.total_points(), 0);
    machine.tick(now + 5000, None, &backend);
    assert_eq!(machine.phase(), VehiclePhase::Available);
    assert!(machine.ride_id().is_none());
}

#[test]
fn motion_converges_to_pickup_and_geofenced_completion_awards_points() {
    let backend = ScriptedBackend::new();
    backend.set_drop_target(PAHARTOLI);
    let mut machine = vehicle_at(north_of(CUET_CAMPUS, 600.0));

    backend.push_offer(campus_offer(1));
    machine.tick(0, None, &backend);
    machine.tick(100, Some(OperatorCommand::Accept), &backend);
    assert_eq!(machine.phase(), VehiclePhase::EnRouteToPickup);

    let at_pickup = run_until_phase(&mut machine, &backend, 1000, VehiclePhase::AtPickup);
    assert!(geo::distance_meters(machine.position(), CUET_CAMPUS) <= 5.0);

    machine.tick(at_pickup + 500, Some(OperatorCommand::ConfirmPickup), &backend);
    assert_eq!(machine.phase(), VehiclePhase::EnRouteToDestination);

    let at_dest = run_until_phase(
        &mut machine,
        &backend,
        at_pickup + 1000,
        VehiclePhase::AtDestination,
    );
    assert!(geo::distance_meters(machine.position(), PAHARTOLI) <= 5.0);

    machine.tick(at_dest + 500, Some(OperatorCommand::Complete), &backend);
    assert_eq!(machine.phase(), VehiclePhase::Completing);
    assert_eq!(machine.total_points(), 10);

    let (_, drop) = backend.completions()[0];
    assert_eq!(
        backend
            .completions()
            .iter()
            .map(|(ride_id, _)| *ride_id)
            .collect::<Vec<_>>(),
        vec![1]
    );
    assert!(geo::distance_meters(drop, PAHARTOLI) <= 50.0);

    machine.tick(at_dest + 500 + 5000, None, &backend);
    assert_eq!(machine.phase(), VehiclePhase::Available);
    assert!(machine.ride_id().is_none());
}

#[test]
fn nav_readout_tracks_heading_and_band_while_en_route() {
    let backend = ScriptedBackend::new();
    let mut machine = vehicle_at(north_of(CUET_CAMPUS, 600.0));

    backend.push_offer(campus_offer(1));
    machine.tick(0, None, &backend);
    machine.tick(100, Some(OperatorCommand::Accept), &backend);

    machine.tick(1100, None, &backend);
    let nav = machine.nav().copied().expect("readout while en route");
    assert!(nav.remaining_m > 100.0);
    assert_eq!(nav.band, ride_core::vehicle::PointBand::Review);
    // Pickup is due south of the start point.
    assert_eq!(nav.heading, ride_core::geo::Octant::South);
}

#[test]
fn position_broadcast_fires_on_its_own_interval() {
    let backend = ScriptedBackend::new();
    let mut machine = vehicle_at(CUET_CAMPUS);

    for now in (0..5000).step_by(100) {
        machine.tick(now, None, &backend);
    }
    assert_eq!(backend.position_report_count(), 1);

    machine.tick(5000, None, &backend);
    assert_eq!(backend.position_report_count(), 2);
}
