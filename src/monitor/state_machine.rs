//! Monitor State Machine
//!
//! One-shot escalation lifecycle:
//! - AwaitingThreshold: operator prompt, runs once
//! - Polling: sampling the sensor until the threshold is crossed
//! - Escalated: collecting the device snapshot and ambient reading
//! - Reporting: dispatching alerts
//! - Done: terminal
//!
//! Transitions only move forward; there is no path back into Polling.

use std::time::Instant;
use tracing::{debug, info, warn};

use crate::telemetry::metrics::record_monitor_state;
use crate::utils::helpers::current_timestamp_millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonitorState {
    AwaitingThreshold,
    Polling,
    Escalated,
    Reporting,
    Done,
}

impl MonitorState {
    pub fn code(&self) -> u8 {
        match self {
            MonitorState::AwaitingThreshold => 0,
            MonitorState::Polling => 1,
            MonitorState::Escalated => 2,
            MonitorState::Reporting => 3,
            MonitorState::Done => 4,
        }
    }

    /// The only state reachable from this one
    pub fn successor(&self) -> Option<MonitorState> {
        match self {
            MonitorState::AwaitingThreshold => Some(MonitorState::Polling),
            MonitorState::Polling => Some(MonitorState::Escalated),
            MonitorState::Escalated => Some(MonitorState::Reporting),
            MonitorState::Reporting => Some(MonitorState::Done),
            MonitorState::Done => None,
        }
    }
}

impl std::fmt::Display for MonitorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorState::AwaitingThreshold => write!(f, "AWAITING_THRESHOLD"),
            MonitorState::Polling => write!(f, "POLLING"),
            MonitorState::Escalated => write!(f, "ESCALATED"),
            MonitorState::Reporting => write!(f, "REPORTING"),
            MonitorState::Done => write!(f, "DONE"),
        }
    }
}

/// State transition record
#[derive(Debug, Clone)]
pub struct StateTransition {
    pub from: MonitorState,
    pub to: MonitorState,
    pub timestamp: i64,
    pub reason: Option<String>,
}

pub struct MonitorStateMachine {
    current: MonitorState,
    state_entered_at: Instant,
    history: Vec<StateTransition>,
}

impl MonitorStateMachine {
    pub fn new() -> Self {
        record_monitor_state(MonitorState::AwaitingThreshold.code());
        Self {
            current: MonitorState::AwaitingThreshold,
            state_entered_at: Instant::now(),
            history: Vec::new(),
        }
    }

    pub fn current_state(&self) -> MonitorState {
        self.current
    }

    pub fn time_in_state(&self) -> std::time::Duration {
        self.state_entered_at.elapsed()
    }

    pub fn can_transition_to(&self, target: MonitorState) -> bool {
        self.current.successor() == Some(target)
    }

    pub fn transition_to(&mut self, target: MonitorState) -> bool {
        self.transition_to_with_reason(target, None)
    }

    pub fn transition_to_with_reason(&mut self, target: MonitorState, reason: Option<String>) -> bool {
        if !self.can_transition_to(target) {
            warn!("Invalid state transition: {} -> {}", self.current, target);
            return false;
        }

        info!(
            "State transition: {} -> {}{}",
            self.current,
            target,
            reason.as_ref().map(|r| format!(" ({})", r)).unwrap_or_default()
        );

        debug!("Spent {:?} in {}", self.time_in_state(), self.current);
        self.history.push(StateTransition {
            from: self.current,
            to: target,
            timestamp: current_timestamp_millis(),
            reason,
        });
        self.current = target;
        self.state_entered_at = Instant::now();
        record_monitor_state(target.code());

        true
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }
}

impl Default for MonitorStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let sm = MonitorStateMachine::new();
        assert_eq!(sm.current_state(), MonitorState::AwaitingThreshold);
    }

    #[test]
    fn test_full_lifecycle() {
        let mut sm = MonitorStateMachine::new();
        assert!(sm.transition_to(MonitorState::Polling));
        assert!(sm.transition_to(MonitorState::Escalated));
        assert!(sm.transition_to(MonitorState::Reporting));
        assert!(sm.transition_to(MonitorState::Done));
        assert_eq!(sm.current_state(), MonitorState::Done);
        assert_eq!(sm.history().len(), 4);
    }

    #[test]
    fn test_cannot_skip_states() {
        let mut sm = MonitorStateMachine::new();
        assert!(!sm.transition_to(MonitorState::Escalated));
        assert_eq!(sm.current_state(), MonitorState::AwaitingThreshold);
    }

    #[test]
    fn test_no_return_to_polling() {
        let mut sm = MonitorStateMachine::new();
        sm.transition_to(MonitorState::Polling);
        sm.transition_to(MonitorState::Escalated);
        assert!(!sm.transition_to(MonitorState::Polling));
        assert!(!sm.transition_to(MonitorState::Escalated));

        sm.transition_to(MonitorState::Reporting);
        sm.transition_to(MonitorState::Done);
        assert!(!sm.transition_to(MonitorState::AwaitingThreshold));
        assert_eq!(MonitorState::Done.successor(), None);
    }
}
