//! Basic example demonstrating the Workbrew API client.
//!
//! Run with:
//! ```
//! WORKBREW_API_KEY=your-key WORKBREW_WORKSPACE=your-workspace cargo run --example basic
//! ```

use brewapi::{BrewClient, BrewCommand, Device, QueryBuilder};

#[tokio::main]
async fn main() -> brewapi::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    println!("Creating Workbrew client...");
    let client = BrewClient::from_env()?;
    println!("Connected to: {}", client.workspace_url());

    println!("\n--- Listing Devices ---");
    let devices = client
        .get::<Vec<Device>>("devices.json", &QueryBuilder::new())
        .await?;
    println!(
        "Found {} devices in {:?}",
        devices.data.len(),
        devices.meta.elapsed
    );

    for device in &devices.data {
        println!(
            "  - {} (last seen: {}, last command: {})",
            device.serial_number, device.last_seen_at, device.command_last_run_at
        );
    }

    let stale: Vec<&Device> = devices.data.iter().filter(|d| !d.has_been_seen()).collect();
    if !stale.is_empty() {
        println!("{} devices have never checked in", stale.len());
    }

    println!("\n--- Listing Brew Commands ---");
    let commands = client
        .get::<Vec<BrewCommand>>("brew_commands.json", &QueryBuilder::new())
        .await?;

    for command in &commands.data {
        let state = if command.is_complete() {
            "complete"
        } else if command.is_running() {
            "running"
        } else {
            "pending"
        };
        println!("  - {} `{}` ({state})", command.label, command.command);
    }

    if let Some(remaining) = commands.meta.rate_limit_remaining() {
        println!("\nRate limit remaining: {remaining}");
    }

    println!("\n--- Downloading Devices CSV ---");
    let csv = client.get_csv("devices.csv", &QueryBuilder::new()).await?;
    println!("Received {} bytes of CSV", csv.data.len());

    Ok(())
}
