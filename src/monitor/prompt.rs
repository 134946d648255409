//! Time-bounded operator prompt for the threshold

use async_trait::async_trait;
use std::io::Write as _;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::utils::helpers::parse_celsius;
use crate::utils::types::ThresholdConfig;

/// Source of one line of operator input with a bounded wait
#[async_trait]
pub trait OperatorInput: Send {
    /// `None` when nothing arrived within `wait`
    async fn read_line(&mut self, prompt: &str, wait: Duration) -> Option<String>;
}

/// Reads from the process's standard input.
///
/// The blocking read runs on its own thread; on timeout that thread is left
/// parked on stdin and goes away with the process.
#[derive(Debug, Default)]
pub struct StdinInput;

#[async_trait]
impl OperatorInput for StdinInput {
    async fn read_line(&mut self, prompt: &str, wait: Duration) -> Option<String> {
        println!("{} in {} seconds", prompt, wait.as_secs());
        let _ = std::io::stdout().flush();

        let (tx, rx) = oneshot::channel();
        std::thread::spawn(move || {
            let mut line = String::new();
            if matches!(std::io::stdin().read_line(&mut line), Ok(n) if n > 0) {
                let _ = tx.send(line);
            }
        });

        match tokio::time::timeout(wait, rx).await {
            Ok(Ok(line)) => Some(line),
            _ => None,
        }
    }
}

/// How the effective threshold was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThresholdSource {
    Operator,
    /// Nothing arrived within the wait window
    Timeout,
    /// Input arrived but was not a whole number
    InvalidInput(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdChoice {
    pub threshold: ThresholdConfig,
    pub source: ThresholdSource,
}

/// Ask once for the threshold, falling back to `default_celsius` on timeout or bad input.
pub async fn await_threshold<I>(input: &mut I, wait: Duration, default_celsius: i64) -> ThresholdChoice
where
    I: OperatorInput + ?Sized,
{
    let prompt = format!(
        "Input temperature threshold, in Celsius, (default is {})",
        default_celsius
    );

    let choice = match input.read_line(&prompt, wait).await {
        None => ThresholdChoice {
            threshold: ThresholdConfig::new(default_celsius),
            source: ThresholdSource::Timeout,
        },
        Some(line) => match parse_celsius(&line) {
            Some(celsius) => ThresholdChoice {
                threshold: ThresholdConfig::new(celsius),
                source: ThresholdSource::Operator,
            },
            None => {
                let raw = line.trim().to_string();
                warn!("Ignoring non-numeric threshold input '{}'", raw);
                ThresholdChoice {
                    threshold: ThresholdConfig::new(default_celsius),
                    source: ThresholdSource::InvalidInput(raw),
                }
            }
        },
    };

    info!(
        "Temperature threshold set to {} Celsius ({:?})",
        choice.threshold.celsius, choice.source
    );
    choice
}
