//! FeltSight - Haptic Glove Telemetry Link
//!
//! Bench host for the glove link: wires a simulated fingertip-velocity
//! source and a loopback transport into the link driver, then runs until
//! Ctrl-C. Point the transport at a real radio backend to drive hardware.

mod loopback;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use glam::Vec3;
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use feltsight_core::params::ControlParameters;
use feltsight_link::{event_channel, shared_velocity, LinkConfig, LinkDriver, VelocityPublisher};

use crate::loopback::LoopbackTransport;

/// On-disk configuration: link settings plus mapping parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AppConfig {
    link: LinkConfig,
    params: ControlParameters,
}

fn load_config(path: &str) -> Result<AppConfig> {
    let text = std::fs::read_to_string(Path::new(path))
        .with_context(|| format!("Failed to read config file {}", path))?;
    let mut config: AppConfig =
        serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path))?;
    config.params.sanitize();
    Ok(config)
}

/// Publish a slow sine-swept fingertip velocity so the mapped speed walks
/// the whole 1.0x-4.0x range.
fn spawn_velocity_sweep(publisher: VelocityPublisher) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_millis(50));
        let mut t = 0.0f32;
        loop {
            tick.tick().await;
            t += 0.05;
            let magnitude = 0.15 * (1.0 + (0.4 * t).sin());
            publisher.publish(Vec3::new(magnitude, 0.0, 0.0));
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("FeltSight link host starting");

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from {}", path);
            load_config(&path)?
        }
        None => AppConfig::default(),
    };

    let (event_tx, event_rx) = event_channel();
    let transport = LoopbackTransport::new(event_tx);

    let (publisher, source) = shared_velocity();
    spawn_velocity_sweep(publisher);

    let (handle, task) = LinkDriver::spawn(
        transport,
        event_rx,
        source,
        config.link,
        config.params,
    );

    // Surface status transitions the way the headset UI would
    let mut status = handle.status_watch();
    tokio::spawn(async move {
        while status.changed().await.is_ok() {
            info!("Connection status: {}", status.borrow_and_update().clone());
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutting down");

    if handle.stop().is_err() {
        warn!("Link driver already stopped");
    }
    let _ = task.await;

    Ok(())
}
