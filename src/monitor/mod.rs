//! Threshold Monitor
//!
//! Drives a single monitoring run:
//! - prompts once for the threshold
//! - samples the sensor until a reading exceeds it
//! - collects the device snapshot and ambient reading once
//! - composes and dispatches the alert messages, best-effort
//!
//! Device query and parse failures are fatal. Notification failures are not.

pub mod prompt;
pub mod state_machine;

pub use prompt::{await_threshold, OperatorInput, StdinInput, ThresholdChoice, ThresholdSource};
pub use state_machine::{MonitorState, MonitorStateMachine, StateTransition};

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::alerts::{dispatch_all, interface_table, AlertComposer, DeliveryReport, NotificationChannel};
use crate::ambient::{AmbientDataService, AmbientLocation};
use crate::config::{AmbientFailurePolicy, AppConfig};
use crate::device::{DeviceQueryService, TelemetryExtractor};
use crate::error::{MonitorError, Result};
use crate::telemetry::metrics::{record_sample, record_threshold};
use crate::utils::types::{AmbientReading, DeviceSnapshot, SensorSample, ThresholdConfig};

/// Per-run parameters resolved from configuration
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub sensor: String,
    pub default_threshold: i64,
    pub prompt_wait: Duration,
    pub poll_interval: Duration,
    pub location: AmbientLocation,
    pub ambient_policy: AmbientFailurePolicy,
}

impl MonitorSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            sensor: config.monitor.sensor.clone(),
            default_threshold: config.monitor.default_threshold,
            prompt_wait: Duration::from_secs(config.monitor.prompt_wait_secs),
            poll_interval: Duration::from_secs(config.monitor.poll_interval_secs),
            location: AmbientLocation::from(&config.ambient),
            ambient_policy: config.ambient.on_failure,
        }
    }
}

/// The first sample that exceeded the threshold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crossing {
    pub sample: SensorSample,
    /// Samples taken, including the crossing one
    pub ticks: u32,
}

/// Everything a completed run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub threshold: ThresholdChoice,
    pub crossing: Crossing,
    pub snapshot: DeviceSnapshot,
    pub ambient: AmbientReading,
    pub messages: Vec<String>,
    pub delivery: DeliveryReport,
    pub transitions: Vec<StateTransition>,
}

pub struct ThresholdMonitor<Q, A, C> {
    extractor: TelemetryExtractor<Q>,
    ambient: A,
    channel: C,
    composer: AlertComposer,
    settings: MonitorSettings,
    state_machine: MonitorStateMachine,
}

impl<Q, A, C> ThresholdMonitor<Q, A, C>
where
    Q: DeviceQueryService,
    A: AmbientDataService,
    C: NotificationChannel,
{
    pub fn new(device: Q, ambient: A, channel: C, settings: MonitorSettings) -> Self {
        Self {
            extractor: TelemetryExtractor::new(device),
            ambient,
            channel,
            composer: AlertComposer::new(settings.location.name.clone()),
            settings,
            state_machine: MonitorStateMachine::new(),
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state_machine.current_state()
    }

    /// One full pass to DONE. Returns an error only for fatal failures before DONE.
    pub async fn run<I>(&mut self, input: &mut I) -> Result<RunReport>
    where
        I: OperatorInput + ?Sized,
    {
        if self.state() != MonitorState::AwaitingThreshold {
            return Err(MonitorError::state(format!(
                "run already started (state {})",
                self.state()
            )));
        }

        let threshold = await_threshold(
            input,
            self.settings.prompt_wait,
            self.settings.default_threshold,
        )
        .await;
        record_threshold(threshold.threshold.celsius);
        self.advance(
            MonitorState::Polling,
            format!("threshold {} Celsius", threshold.threshold.celsius),
        )?;

        let crossing = self.poll_until_crossed(threshold.threshold).await?;
        let (snapshot, ambient) = self.escalate().await?;

        let messages = self.composer.compose(
            &snapshot.hostname,
            &crossing.sample,
            &ambient,
            &snapshot,
        );
        self.advance(MonitorState::Reporting, format!("{} messages", messages.len()))?;

        let delivery = dispatch_all(&self.channel, &messages).await;
        self.advance(
            MonitorState::Done,
            format!("{}/{} delivered", delivery.delivered(), delivery.attempted()),
        )?;

        Ok(RunReport {
            threshold,
            crossing,
            snapshot,
            ambient,
            messages,
            delivery,
            transitions: self.state_machine.history().to_vec(),
        })
    }

    /// Sample every `poll_interval` until a reading is strictly above the threshold.
    pub async fn poll_until_crossed(&mut self, threshold: ThresholdConfig) -> Result<Crossing> {
        let mut ticks = 0u32;

        loop {
            let sample = self.extractor.sensor(&self.settings.sensor).await?;
            ticks += 1;
            record_sample(sample.reading);

            if threshold.is_exceeded_by(sample.reading) {
                warn!(
                    "{} reading {} Celsius exceeds threshold {} (state: {})",
                    self.settings.sensor, sample.reading, threshold.celsius, sample.health
                );
                self.advance(
                    MonitorState::Escalated,
                    format!("reading {} > {}", sample.reading, threshold.celsius),
                )?;
                return Ok(Crossing { sample, ticks });
            }

            if sample.health.is_normal() {
                info!(
                    "{} reading {} Celsius within threshold {}",
                    self.settings.sensor, sample.reading, threshold.celsius
                );
            } else {
                warn!(
                    "{} reading {} Celsius within threshold {} but sensor state is {}",
                    self.settings.sensor, sample.reading, threshold.celsius, sample.health
                );
            }
            tokio::time::sleep(self.settings.poll_interval).await;
        }
    }

    async fn escalate(&mut self) -> Result<(DeviceSnapshot, AmbientReading)> {
        let snapshot = self.extractor.snapshot().await?;
        debug!(
            "{} up interfaces, {} with IPv4 addresses",
            snapshot.up_interface_count(),
            snapshot.addressed().count()
        );
        info!(
            "{} \"up\" interfaces IP addresses:\n{}",
            snapshot.hostname,
            interface_table(&snapshot)
        );

        let ambient = match self.ambient.ambient(&self.settings.location).await {
            Ok(celsius) => AmbientReading::Celsius(celsius),
            Err(e) => match self.settings.ambient_policy {
                AmbientFailurePolicy::Abort => return Err(e.into()),
                AmbientFailurePolicy::Unknown => {
                    warn!("Ambient reading unavailable, continuing with unknown: {}", e);
                    AmbientReading::Unknown
                }
            },
        };

        Ok((snapshot, ambient))
    }

    fn advance(&mut self, target: MonitorState, reason: String) -> Result<()> {
        if self.state_machine.transition_to_with_reason(target, Some(reason)) {
            Ok(())
        } else {
            Err(MonitorError::state(format!(
                "cannot move from {} to {}",
                self.state(),
                target
            )))
        }
    }
}
