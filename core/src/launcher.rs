//! Starting the target with remote debugging enabled and waiting until its
//! debug endpoint answers.

use std::ffi::OsString;
use std::net::TcpListener;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;
use tracing::info;

use crate::config::InjectConfig;
use crate::discovery::DiscoveryClient;
use crate::discovery::TargetSource;
use crate::error::AttachTimeoutError;
use crate::error::LaunchError;
use crate::error::Result;
use crate::target::ConnectionParams;

/// The application invocation: a program followed by its own arguments.
/// Kept as raw OS strings so non-UTF-8 paths reach the child unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetCommand {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl TargetCommand {
    pub fn from_argv<I, T>(argv: I) -> std::result::Result<Self, LaunchError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut argv = argv.into_iter().map(Into::<OsString>::into);
        let program = argv
            .next()
            .filter(|p| !is_blank(p))
            .ok_or(LaunchError::EmptyCommand)?;
        Ok(Self {
            program,
            args: argv.collect(),
        })
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

fn is_blank(arg: &OsString) -> bool {
    arg.is_empty() || arg.to_str().is_some_and(|s| s.trim().is_empty())
}

impl std::fmt::Display for TargetCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

pub fn remote_debugging_flag(port: u16) -> String {
    format!("--remote-debugging-port={port}")
}

/// Ask the OS for a free port on `host`. The listener is dropped right away
/// so the target can bind it.
pub fn reserve_port(host: &str) -> std::result::Result<u16, LaunchError> {
    TcpListener::bind((host, 0))
        .and_then(|listener| listener.local_addr())
        .map(|addr| addr.port())
        .map_err(|source| LaunchError::PortUnavailable {
            host: host.to_string(),
            source,
        })
}

#[derive(Debug, Clone)]
pub struct Launcher {
    host: String,
    port: Option<u16>,
    spawn_settle: Duration,
    discovery_timeout: Duration,
    attach_attempts: u32,
    attach_interval: Duration,
}

impl Launcher {
    pub fn from_config(config: &InjectConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            spawn_settle: config.spawn_settle(),
            discovery_timeout: config.discovery_timeout(),
            attach_attempts: config.attach_attempts.max(1),
            attach_interval: config.attach_interval(),
        }
    }

    /// Spawn `command` with `--remote-debugging-port` appended and return once
    /// `/json/list` answers. The child is left running when this returns.
    pub async fn launch(&self, command: &TargetCommand) -> Result<ConnectionParams> {
        let port = match self.port {
            Some(port) => port,
            None => reserve_port(&self.host)?,
        };
        let params = ConnectionParams::new(self.host.clone(), port);

        info!(command = %command, port, "launching target with remote debugging");
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .arg(remote_debugging_flag(port))
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                program: command.program_name(),
                source,
            })?;

        tokio::time::sleep(self.spawn_settle).await;
        if let Ok(Some(status)) = child.try_wait() {
            return Err(LaunchError::ExitedEarly {
                program: command.program_name(),
                status: status.to_string(),
            }
            .into());
        }

        let probe = DiscoveryClient::new(params.clone(), self.discovery_timeout)?;
        self.wait_for_endpoint(&params, &probe).await?;
        info!(host = %params.host, port, "debug endpoint is up");
        Ok(params)
    }

    /// Probe `source` until it answers or the attempt budget is spent.
    pub async fn wait_for_endpoint(
        &self,
        params: &ConnectionParams,
        source: &dyn TargetSource,
    ) -> std::result::Result<(), AttachTimeoutError> {
        let started = std::time::Instant::now();
        for attempt in 1..=self.attach_attempts {
            match source.list_targets().await {
                Ok(targets) => {
                    debug!(attempt, windows = targets.len(), "debug endpoint answered");
                    return Ok(());
                }
                Err(err) => {
                    debug!(attempt, error = %err, "debug endpoint not ready yet");
                }
            }
            if attempt < self.attach_attempts {
                tokio::time::sleep(self.attach_interval).await;
            }
        }
        Err(AttachTimeoutError {
            host: params.host.clone(),
            port: params.port,
            attempts: self.attach_attempts,
            waited: started.elapsed(),
        })
    }
}
