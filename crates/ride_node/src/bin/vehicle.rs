//! Vehicle-side navigation unit.
//!
//! Operator commands arrive on stdin (`accept`, `reject`, `pickup`,
//! `complete`, `status`); the unit polls the backend for offers, simulates
//! motion toward the active target, and broadcasts its position.

use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ride_core::backend::{HttpBackend, RideBackend};
use ride_core::motion::MotionSimulator;
use ride_core::vehicle::{OperatorCommand, VehicleMachine};
use ride_core::waypoint::WaypointTable;
use ride_node::console::spawn_stdin_reader;
use ride_node::render::render;

const LOOP_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "vehicle", about = "Vehicle-side navigation unit")]
struct Cli {
    /// Backend endpoint
    #[arg(long, env = "RIDE_BACKEND_URL", default_value = "http://localhost:3000/api")]
    backend_url: String,
    /// Node identifier reported to the backend
    #[arg(long, env = "RIDE_NODE_ID", default_value = "RICK001")]
    node_id: String,
    /// Operator name shown to the backend
    #[arg(long, default_value = "Abdul Karim")]
    display_name: String,
    /// Waypoint the vehicle starts from
    #[arg(long, default_value = "CUET_CAMPUS")]
    start: String,
    /// Simulated ground speed
    #[arg(long, default_value_t = 15.0)]
    speed_kmh: f64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    let table = WaypointTable::campus_defaults();
    let Some(start) = table.lookup(&cli.start).cloned() else {
        eprintln!("unknown start waypoint: {}", cli.start);
        std::process::exit(2);
    };

    let backend = HttpBackend::new(&cli.backend_url);
    match backend.register(&cli.node_id, &cli.display_name, start.position) {
        Ok(()) => info!(node_id = %cli.node_id, "registered with backend"),
        Err(err) => warn!(?err, "registration failed; continuing offline"),
    }

    let mut machine = VehicleMachine::new(
        cli.node_id.clone(),
        start.position,
        table,
        MotionSimulator::new(cli.speed_kmh),
    );
    let lines = spawn_stdin_reader();
    let started = Instant::now();

    info!(start = %start.name, speed_kmh = cli.speed_kmh, "vehicle unit ready");
    println!("commands: accept | reject | pickup | complete | status");

    loop {
        let mut command = None;
        while let Ok(line) = lines.try_recv() {
            match parse_command(&line) {
                ParsedLine::Command(cmd) => command = Some(cmd),
                ParsedLine::Status => print_status(&machine),
                ParsedLine::Empty => {}
                ParsedLine::Unknown => warn!(input = line.trim(), "unknown command"),
            }
        }

        let now_ms = started.elapsed().as_millis() as u64;
        machine.tick(now_ms, command, &backend);

        for intent in machine.drain_intents() {
            render(&intent);
        }
        thread::sleep(LOOP_INTERVAL);
    }
}

enum ParsedLine {
    Command(OperatorCommand),
    Status,
    Empty,
    Unknown,
}

fn parse_command(line: &str) -> ParsedLine {
    match line.trim().to_uppercase().as_str() {
        "ACCEPT" => ParsedLine::Command(OperatorCommand::Accept),
        "REJECT" => ParsedLine::Command(OperatorCommand::Reject),
        "PICKUP" => ParsedLine::Command(OperatorCommand::ConfirmPickup),
        "COMPLETE" => ParsedLine::Command(OperatorCommand::Complete),
        "STATUS" => ParsedLine::Status,
        "" => ParsedLine::Empty,
        _ => ParsedLine::Unknown,
    }
}

fn print_status(machine: &VehicleMachine) {
    let position = machine.position();
    println!();
    println!("== STATUS ==");
    println!("Phase: {:?}", machine.phase());
    println!("Location: {:.6}, {:.6}", position.lat, position.lng);
    println!("Points: {}", machine.total_points());
    if let Some(ride_id) = machine.ride_id() {
        println!("Ride: {ride_id}");
        println!("Pickup confirmed: {}", machine.pickup_confirmed());
    }
    if let Some(nav) = machine.nav() {
        println!(
            "Nav: {:.0}m {} ({})",
            nav.remaining_m,
            nav.heading.label(),
            nav.band.label()
        );
    }
}
