//! Prometheus metrics export

use anyhow::Result;
use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;

pub fn init_metrics(port: u16) -> Result<()> {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    register_metrics();
    info!("Prometheus metrics server started on {}", addr);
    Ok(())
}

fn register_metrics() {
    describe_gauge!("switch_monitor_threshold_celsius", "Effective temperature threshold");
    describe_gauge!("switch_monitor_sensor_reading_celsius", "Last sampled sensor reading");
    describe_counter!("switch_monitor_poll_ticks_total", "Sensor samples taken");
    describe_counter!("switch_monitor_alerts_delivered", "Alert messages delivered");
    describe_counter!("switch_monitor_alerts_failed", "Alert messages that could not be delivered");
    describe_gauge!("switch_monitor_state", "Current monitor state");
}

pub fn record_threshold(celsius: i64) {
    gauge!("switch_monitor_threshold_celsius").set(celsius as f64);
}

pub fn record_sample(reading: i64) {
    counter!("switch_monitor_poll_ticks_total").increment(1);
    gauge!("switch_monitor_sensor_reading_celsius").set(reading as f64);
}

pub fn record_alert_delivered() {
    counter!("switch_monitor_alerts_delivered").increment(1);
}

pub fn record_alert_failed() {
    counter!("switch_monitor_alerts_failed").increment(1);
}

pub fn record_monitor_state(state: u8) {
    gauge!("switch_monitor_state").set(state as f64);
}
