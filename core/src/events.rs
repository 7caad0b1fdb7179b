use std::sync::Arc;
use std::sync::Mutex;

use serde::Serialize;

use crate::cdp::EvalValue;
use crate::target::DebugTarget;

/// Progress reported by the scheduler as a run unfolds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum InjectionEvent {
    #[serde(rename = "poll.started")]
    PollStarted { poll: u32 },
    #[serde(rename = "poll.failed")]
    PollFailed { poll: u32, error: String },
    #[serde(rename = "window.discovered")]
    WindowDiscovered { poll: u32, target: DebugTarget },
    #[serde(rename = "script.succeeded")]
    ScriptSucceeded {
        window_id: String,
        script: String,
        result: EvalValue,
    },
    #[serde(rename = "script.failed")]
    ScriptFailed {
        window_id: String,
        script: String,
        error: String,
    },
    #[serde(rename = "window.completed")]
    WindowCompleted {
        window_id: String,
        succeeded: usize,
        failed: usize,
    },
    #[serde(rename = "run.completed")]
    RunCompleted {
        reason: DoneReason,
        summary: RunSummary,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DoneReason {
    Deadline,
    PollBudget,
}

/// Totals for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub polls: u32,
    pub windows_injected: usize,
    pub scripts_succeeded: usize,
    pub scripts_failed: usize,
    pub discovery_failures: u32,
}

/// Sink for [`InjectionEvent`]s, handed to the scheduler at construction.
pub trait InjectionReporter: Send {
    fn report(&mut self, event: &InjectionEvent);
}

/// Keeps every event in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    events: Arc<Mutex<Vec<InjectionEvent>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<InjectionEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Window ids in the order their `window.discovered` events arrived.
    pub fn injected_windows(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                InjectionEvent::WindowDiscovered { target, .. } => Some(target.id),
                _ => None,
            })
            .collect()
    }
}

impl InjectionReporter for RecordingReporter {
    fn report(&mut self, event: &InjectionEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
