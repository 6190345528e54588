//! Live dashboard against a running dispatch server.
//!
//! Demonstrates:
//! - Building a client from `RIDEFLUX_*` environment variables
//! - Opening the push channel (snapshot on every open)
//! - Watching connection state and store sizes
//! - Clean shutdown on Ctrl+C
//!
//! Usage:
//!   RIDEFLUX_ORIGIN=http://localhost:8000 cargo run --example dashboard
//!   RIDEFLUX_ORIGIN=http://localhost:8000 cargo run --example dashboard -- --debug

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use rideflux_sync::{ClientConfig, Result, RideStatus, SyncClient};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Constants
// ============================================================================

const REPORT_INTERVAL: Duration = Duration::from_secs(5);

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let debug = std::env::args().any(|a| a == "--debug");
    init_logging(debug);

    if let Err(e) = run().await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    println!("=== RideFlux Dashboard ===\n");

    let client = SyncClient::builder()
        .config(ClientConfig::from_env()?)
        .build()?;

    println!("[Setup] Push channel: {}", client.push_url());
    println!("[Setup] API:          {}\n", client.api().base_url());

    client.connect().await;

    let mut state = client.subscribe_state();
    let mut report = tokio::time::interval(REPORT_INTERVAL);

    println!("Press Ctrl+C to exit...\n");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                println!("[State] {}", *state.borrow_and_update());
            }
            _ = report.tick() => print_report(&client),
        }
    }

    client.shutdown().await;
    println!("\n[Done] Shut down");
    Ok(())
}

// ============================================================================
// Functions
// ============================================================================

fn init_logging(debug: bool) {
    let filter = if debug {
        "rideflux_sync=debug"
    } else {
        "rideflux_sync=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

fn print_report(client: &SyncClient) {
    let rides = client.rides();
    let drivers = client.drivers();

    println!(
        "[Report] {} | rides: {} ({} matching, {} in progress) | drivers: {}",
        client.connection_state(),
        rides.len(),
        rides.by_status(&RideStatus::Matching).len(),
        rides.by_status(&RideStatus::InProgress).len(),
        drivers.len(),
    );

    for note in client.notifications().list() {
        println!("         [{}] {}", note.severity, note.message);
    }
}
