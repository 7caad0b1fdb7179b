mod browser;
mod cli;
mod event_processor;

use std::io::IsTerminal;

pub use cli::Cli;
pub use cli::DELIMITER;
pub use cli::Invocation;
pub use cli::USAGE;
pub use cli::UsageError;

use anyhow::Context;
use electron_inject_core::InjectConfig;
use electron_inject_core::InjectionReporter;
use electron_inject_core::Launcher;
use electron_inject_core::RunSummary;
use electron_inject_core::ScriptSet;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::event_processor::EventProcessorWithHumanOutput;
use crate::event_processor::EventProcessorWithJsonOutput;

pub async fn run_main(invocation: Invocation) -> anyhow::Result<RunSummary> {
    let Invocation { cli, target } = invocation;

    let default_level = if cli.verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        // Fall back to `default_level` when RUST_LOG is unset or invalid.
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();

    let config = resolve_config(&cli)?;

    // Read scripts before launching so a bad path never leaves an app running.
    let scripts = ScriptSet::from_options(cli.enable_devtools_hotkeys, cli.inject.as_deref())?;
    if scripts.is_empty() {
        info!("no scripts selected; windows will be discovered but left untouched");
    }

    let params = Launcher::from_config(&config)
        .launch(&target)
        .await
        .with_context(|| format!("failed to start `{target}`"))?;
    info!(host = %params.host, port = params.port, "remote debugging endpoint is up");

    if cli.browser {
        browser::open_devtools(&params);
    }

    let reporter: Box<dyn InjectionReporter> = if cli.json {
        Box::new(EventProcessorWithJsonOutput::new(std::io::stdout()))
    } else {
        Box::new(EventProcessorWithHumanOutput::new(
            std::io::stdout(),
            std::io::stdout().is_terminal(),
        ))
    };

    let summary = electron_inject_core::inject(params, &config, scripts, reporter).await?;
    Ok(summary)
}

/// File settings first, then explicit flags on top.
fn resolve_config(cli: &Cli) -> anyhow::Result<InjectConfig> {
    let mut config = match &cli.config {
        Some(path) => InjectConfig::load(path)?,
        None => InjectConfig::default(),
    };
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(port) = cli.port {
        config.port = Some(port);
    }
    Ok(config)
}
