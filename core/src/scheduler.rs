//! The discovery -> evaluate loop.
//!
//! Each poll cycle fetches a fresh window snapshot, injects every configured
//! script into each window not seen before, and marks that window visited
//! whatever the outcome. The deadline is checked only after a cycle's windows
//! have been processed, so a window found on the last cycle is still injected.

use std::collections::HashSet;
use std::time::Duration;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::cdp::Evaluator;
use crate::clock::Clock;
use crate::config::InjectConfig;
use crate::discovery::TargetSource;
use crate::events::DoneReason;
use crate::events::InjectionEvent;
use crate::events::InjectionReporter;
use crate::events::RunSummary;
use crate::scripts::ScriptSet;
use crate::target::DebugTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerOptions {
    pub run_timeout: Duration,
    pub poll_interval: Duration,
    pub max_polls: Option<u32>,
}

impl SchedulerOptions {
    pub fn from_config(config: &InjectConfig) -> Self {
        Self {
            run_timeout: config.run_timeout(),
            poll_interval: config.poll_interval(),
            max_polls: config.max_polls,
        }
    }
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self::from_config(&InjectConfig::default())
    }
}

pub struct InjectionScheduler<S, E, C> {
    source: S,
    evaluator: E,
    clock: C,
    scripts: ScriptSet,
    options: SchedulerOptions,
    reporter: Box<dyn InjectionReporter>,
    visited: HashSet<String>,
}

impl<S, E, C> InjectionScheduler<S, E, C>
where
    S: TargetSource,
    E: Evaluator,
    C: Clock,
{
    pub fn new(
        source: S,
        evaluator: E,
        clock: C,
        scripts: ScriptSet,
        options: SchedulerOptions,
        reporter: Box<dyn InjectionReporter>,
    ) -> Self {
        Self {
            source,
            evaluator,
            clock,
            scripts,
            options,
            reporter,
            visited: HashSet::new(),
        }
    }

    /// Poll until the deadline (or poll budget) runs out. Individual discovery
    /// and evaluation failures are reported and never end the run early.
    pub async fn run(mut self) -> RunSummary {
        // A timeout past the clock's range means no deadline at all.
        let deadline = self.clock.now().checked_add(self.options.run_timeout);
        if deadline.is_none() {
            warn!(
                timeout_secs = self.options.run_timeout.as_secs(),
                "run timeout is out of range; polling until the poll budget runs out"
            );
        }
        let mut summary = RunSummary::default();

        let reason = loop {
            summary.polls += 1;
            let poll = summary.polls;
            self.reporter.report(&InjectionEvent::PollStarted { poll });

            match self.source.list_targets().await {
                Ok(targets) => {
                    for target in targets {
                        // Marked before injecting: a window gets one attempt, even if it fails.
                        if !self.visited.insert(target.id.clone()) {
                            continue;
                        }
                        self.inject_window(poll, &target, &mut summary).await;
                    }
                }
                Err(err) => {
                    warn!(poll, error = %err, "window discovery failed");
                    summary.discovery_failures += 1;
                    self.reporter.report(&InjectionEvent::PollFailed {
                        poll,
                        error: err.to_string(),
                    });
                }
            }

            if deadline.is_some_and(|deadline| self.clock.now() >= deadline) {
                break DoneReason::Deadline;
            }
            if matches!(self.options.max_polls, Some(max) if poll >= max) {
                break DoneReason::PollBudget;
            }
            debug!(
                interval_ms = self.options.poll_interval.as_millis() as u64,
                "retrying discovery"
            );
            self.clock.sleep(self.options.poll_interval).await;
        };

        info!(
            polls = summary.polls,
            windows = summary.windows_injected,
            failed = summary.scripts_failed,
            ?reason,
            "injection run finished"
        );
        self.reporter.report(&InjectionEvent::RunCompleted {
            reason,
            summary: summary.clone(),
        });
        summary
    }

    async fn inject_window(&mut self, poll: u32, target: &DebugTarget, summary: &mut RunSummary) {
        info!(window = %target.id, title = %target.title, "injecting scripts into window");
        self.reporter.report(&InjectionEvent::WindowDiscovered {
            poll,
            target: target.clone(),
        });

        let mut succeeded = 0;
        let mut failed = 0;
        for script in &self.scripts {
            match self.evaluator.evaluate(target, &script.source).await {
                Ok(result) => {
                    debug!(window = %target.id, script = %script.name, result = %result.summary(), "script evaluated");
                    succeeded += 1;
                    self.reporter.report(&InjectionEvent::ScriptSucceeded {
                        window_id: target.id.clone(),
                        script: script.name.clone(),
                        result,
                    });
                }
                Err(err) => {
                    warn!(window = %target.id, script = %script.name, error = %err, "script failed");
                    failed += 1;
                    self.reporter.report(&InjectionEvent::ScriptFailed {
                        window_id: target.id.clone(),
                        script: script.name.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }

        summary.windows_injected += 1;
        summary.scripts_succeeded += succeeded;
        summary.scripts_failed += failed;
        self.reporter.report(&InjectionEvent::WindowCompleted {
            window_id: target.id.clone(),
            succeeded,
            failed,
        });
    }
}
