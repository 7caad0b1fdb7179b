//! Remote-debugging client and injection scheduler for Electron/Chromium
//! applications.
//!
//! - [`launcher`]: start the target with `--remote-debugging-port` and wait
//!   for its HTTP endpoint to come up.
//! - [`discovery`]: snapshot the debuggable windows from `/json/list`.
//! - [`cdp`]: evaluate one script in one window over its DevTools WebSocket.
//! - [`scheduler`]: poll for windows and inject every script into each new
//!   window exactly once until the deadline passes.

pub mod cdp;
pub mod clock;
pub mod config;
pub mod discovery;
pub mod error;
pub mod events;
pub mod launcher;
pub mod scheduler;
pub mod scripts;
pub mod target;

pub use cdp::CdpEvaluator;
pub use cdp::EvalValue;
pub use cdp::Evaluator;
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use config::InjectConfig;
pub use discovery::DiscoveryClient;
pub use discovery::TargetSource;
pub use error::AttachTimeoutError;
pub use error::ConfigError;
pub use error::DiscoveryError;
pub use error::EvalError;
pub use error::LaunchError;
pub use error::ResolveError;
pub use events::DoneReason;
pub use events::InjectionEvent;
pub use events::InjectionReporter;
pub use events::RunSummary;
pub use launcher::Launcher;
pub use launcher::TargetCommand;
pub use scheduler::InjectionScheduler;
pub use scheduler::SchedulerOptions;
pub use scripts::InjectionScript;
pub use scripts::ScriptSet;
pub use target::ConnectionParams;
pub use target::DebugTarget;

/// Injection run against an already-resolved endpoint using the real
/// discovery client, WebSocket evaluator, and system clock.
pub async fn inject(
    params: ConnectionParams,
    config: &InjectConfig,
    scripts: ScriptSet,
    reporter: Box<dyn InjectionReporter>,
) -> Result<RunSummary, DiscoveryError> {
    let source = DiscoveryClient::new(params, config.discovery_timeout())?;
    Ok(InjectionScheduler::new(
        source,
        CdpEvaluator::new(config.eval_timeout()),
        SystemClock,
        scripts,
        SchedulerOptions::from_config(config),
        reporter,
    )
    .run()
    .await)
}
