//! Switch Thermal Monitor
//!
//! Polls a Catalyst switch's inlet temperature sensor over RESTCONF:
//! - asks the operator for a threshold (default 46 Celsius)
//! - samples the sensor until a reading exceeds it
//! - collects hostname, up interfaces and their IPv4 addresses
//! - fetches the outdoor temperature for the site
//! - posts the alert to the configured chat channel

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use switch_thermal_monitor::alerts::build_channel;
use switch_thermal_monitor::ambient::WeatherGovClient;
use switch_thermal_monitor::config::AppConfig;
use switch_thermal_monitor::device::RestconfClient;
use switch_thermal_monitor::monitor::{MonitorSettings, StdinInput, ThresholdMonitor};
use switch_thermal_monitor::telemetry::{init_logging, init_metrics};

/// Switch Thermal Monitor - threshold-triggered temperature alerts
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Log alerts instead of sending them
    #[arg(long)]
    dry_run: bool,

    /// Override log level
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(&args.config)?;
    if let Some(level) = args.log_level {
        config.telemetry.log_level = level;
    }

    let _log_guard = init_logging(&config.telemetry)?;

    info!("Starting Switch Thermal Monitor v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Device: {}:{} user {}, sensor '{}'",
        config.device.address, config.device.port, config.device.username, config.monitor.sensor
    );

    if config.telemetry.enable_metrics {
        init_metrics(config.telemetry.metrics_port)?;
    }

    let device = RestconfClient::new(&config.device)?;
    let ambient = WeatherGovClient::new(&config.ambient)?;
    let channel = build_channel(&config.notification, args.dry_run)?;

    let mut monitor = ThresholdMonitor::new(device, ambient, channel, MonitorSettings::from_config(&config));

    match monitor.run(&mut StdinInput).await {
        Ok(report) => {
            info!(
                "Run complete: {} samples, {}/{} alerts delivered",
                report.crossing.ticks,
                report.delivery.delivered(),
                report.delivery.attempted()
            );
            Ok(())
        }
        Err(e) => {
            error!("Run aborted in {}: {}", monitor.state(), e);
            Err(e.into())
        }
    }
}
