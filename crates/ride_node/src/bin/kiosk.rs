//! Rider-side pickup kiosk.
//!
//! Sensor acquisition is external; this binary reads simulated signal lines
//! from stdin (`on`, `off`, `auth`, `confirm`) and drives the rider state
//! machine against the HTTP backend.

use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ride_core::backend::{HttpBackend, RideBackend};
use ride_core::rider::{KioskSignals, RiderMachine};
use ride_core::waypoint::WaypointTable;
use ride_node::console::spawn_stdin_reader;
use ride_node::render::render;

const LOOP_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "kiosk", about = "Rider-side pickup kiosk")]
struct Cli {
    /// Backend endpoint
    #[arg(long, env = "RIDE_BACKEND_URL", default_value = "http://localhost:3000/api")]
    backend_url: String,
    /// Waypoint this kiosk is installed at
    #[arg(long, default_value = "CUET_CAMPUS")]
    block: String,
    /// Destination this kiosk requests rides to
    #[arg(long, default_value = "PAHARTOLI")]
    destination: String,
    /// Node identifier reported to the backend
    #[arg(long, env = "RIDE_NODE_ID", default_value = "BLOCK001")]
    node_id: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    let table = WaypointTable::campus_defaults();
    let Some(block) = table.lookup(&cli.block).cloned() else {
        eprintln!("unknown block waypoint: {}", cli.block);
        std::process::exit(2);
    };

    let backend = HttpBackend::new(&cli.backend_url);
    match backend.register(&cli.node_id, &block.name, block.position) {
        Ok(()) => info!(node_id = %cli.node_id, block = %block.name, "registered with backend"),
        Err(err) => warn!(?err, "registration failed; continuing offline"),
    }

    let mut machine = RiderMachine::new(block.name.clone(), cli.destination.clone());
    let lines = spawn_stdin_reader();
    let started = Instant::now();
    let mut signals = KioskSignals::default();

    info!(block = %block.name, destination = %cli.destination, "kiosk ready");
    println!("signals: on | off | auth | confirm");

    loop {
        while let Ok(line) = lines.try_recv() {
            apply_signal(&mut signals, &line);
        }

        let now_ms = started.elapsed().as_millis() as u64;
        machine.tick(now_ms, signals, &backend);

        // Momentary inputs are consumed by the tick they were sampled in.
        signals.authorized = false;
        signals.confirm = false;

        for intent in machine.drain_intents() {
            render(&intent);
        }
        thread::sleep(LOOP_INTERVAL);
    }
}

fn apply_signal(signals: &mut KioskSignals, line: &str) {
    match line.trim().to_uppercase().as_str() {
        "ON" => signals.presence = true,
        "OFF" => signals.presence = false,
        "AUTH" => signals.authorized = true,
        "CONFIRM" => signals.confirm = true,
        "" => {}
        other => warn!(input = other, "unknown signal"),
    }
}
