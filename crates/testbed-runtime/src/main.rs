//! # Sentinel-Channel Testbed Runtime
//!
//! Entry point wiring every actor onto one in-memory bus:
//!
//! - sc-01 publisher: sensor readings on the raw and encrypted channels
//! - sc-02 subscriber: decrypts the encrypted channel
//! - sc-03 adversaries: eavesdrop, tamper, replay, flood
//! - sc-04 monitor: classifies every delivery, reports at shutdown
//!
//! ## Session Sequence
//!
//! 1. Initialize logging and configuration
//! 2. Start monitor, subscriber, eavesdropper, publisher
//! 3. Let normal traffic flow briefly
//! 4. Run the attack scenario (tamper, tamper, replay, flood)
//! 5. Shut down and print the session report

mod config;
mod scenario;

use anyhow::{Context, Result};
use config::RuntimeConfig;
use sc_01_publisher::{DistanceSensor, PublisherActor, DEFAULT_DEVICE_ID};
use sc_02_subscriber::SubscriberActor;
use sc_03_adversary::{ActiveAdversary, Eavesdropper};
use sc_04_monitor::{MonitorActor, ReplayWindow};
use shared_bus::InMemoryBus;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Normal traffic allowed to flow before the attacks start.
const WARMUP: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = RuntimeConfig::from_env();

    info!("===========================================");
    info!("  Sentinel-Channel Testbed v0.1.0");
    info!("===========================================");

    let bus = Arc::new(InMemoryBus::new());
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    // Observers first, so the first reading is never missed.
    let monitor =
        MonitorActor::new(&bus, shutdown_rx.clone()).with_replay_window(ReplayWindow::new());
    let monitor_task = tokio::spawn(monitor.run());

    let subscriber = SubscriberActor::new(
        &bus,
        config.key.clone(),
        config.nonce.clone(),
        &config.associated_data,
        shutdown_rx.clone(),
    );
    let subscriber_task = tokio::spawn(subscriber.run());

    let eavesdropper = Eavesdropper::new(&bus, &config.associated_data, shutdown_rx.clone());
    let eavesdropper_task = tokio::spawn(eavesdropper.run());

    let adversary = ActiveAdversary::new(Arc::clone(&bus));

    let publisher = PublisherActor::new(
        Arc::clone(&bus),
        DistanceSensor::new(DEFAULT_DEVICE_ID),
        config.key.clone(),
        config.nonce.clone(),
        &config.associated_data,
        shutdown_rx.clone(),
    )
    .with_interval(config.publish_interval);
    let publisher_task = tokio::spawn(publisher.run());

    info!("All actors running; {}s of normal traffic", WARMUP.as_secs());

    // Warmup, scenario, or operator interrupt, whichever comes first.
    let scenario = async {
        tokio::time::sleep(WARMUP).await;
        scenario::run_attacks(&adversary, &config).await
    };
    tokio::select! {
        outcome = scenario => {
            let outcome = outcome?;
            info!(
                forged_distance = outcome.forged_distance,
                replayed_bytes = outcome.replayed_bytes,
                flood_acked = outcome.flood_acked,
                "Scenario complete"
            );
            // Let the last attack deliveries drain before shutdown.
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
        }
    }

    shutdown_tx
        .send(true)
        .context("Failed to send shutdown signal")?;

    let publisher_stats = publisher_task.await.context("Publisher task failed")?;
    let subscriber_stats = subscriber_task.await.context("Subscriber task failed")?;
    let eavesdrop_summary = eavesdropper_task.await.context("Eavesdropper task failed")?;
    let report = monitor_task.await.context("Monitor task failed")?;

    info!(
        readings = publisher_stats.readings,
        publish_errors = publisher_stats.errors,
        avg_encryption_ms = publisher_stats.avg_encryption_ms(),
        "Publisher summary"
    );
    info!(
        decrypted = subscriber_stats.decrypted,
        rejected = subscriber_stats.rejected,
        avg_decryption_ms = subscriber_stats.avg_decryption_ms(),
        "Subscriber summary"
    );
    if eavesdrop_summary.channel_held() {
        info!(
            raw_captured = eavesdrop_summary.raw_captured,
            intercepted = eavesdrop_summary.intercepted,
            "Eavesdropper read the clear channel but recovered no envelope"
        );
    } else {
        warn!(
            exposed = eavesdrop_summary.exposed,
            "Eavesdropper decrypted envelopes without the key"
        );
    }

    println!("{}", report.render());

    if let Some(path) = &config.attack_log_path {
        report
            .write_attack_log(path)
            .with_context(|| format!("Failed to write attack log to {}", path.display()))?;
        info!(path = %path.display(), "Attack log written");
    }

    Ok(())
}
