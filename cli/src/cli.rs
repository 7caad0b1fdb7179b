use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use electron_inject_core::TargetCommand;
use thiserror::Error;

/// The one token that separates our options from the application command.
pub const DELIMITER: &str = "-";

pub const USAGE: &str = "electron-inject [OPTIONS] - <APPLICATION> [APP_ARGS]...";

/// Launch an Electron application with remote debugging enabled and inject
/// scripts into every window it opens.
///
/// Example:
///   electron-inject --enable-devtools-hotkeys - /path/to/app --app-params app-args
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(version, override_usage = USAGE)]
pub struct Cli {
    /// Enable hotkeys F12 (toggle developer tools) and F5 (refresh).
    #[arg(long = "enable-devtools-hotkeys", short = 'd', default_value_t = false)]
    pub enable_devtools_hotkeys: bool,

    /// Open the devtools page of the launched application in the default browser.
    #[arg(long, short = 'b', default_value_t = false)]
    pub browser: bool,

    /// Keep trying to inject into new windows for this many seconds.
    #[arg(long, short = 't', value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Path to a JavaScript file to inject.
    #[arg(long = "inject", short = 'i', value_name = "FILE")]
    pub inject: Option<PathBuf>,

    /// Fixed remote-debugging port (a free port is picked otherwise).
    #[arg(long, short = 'p', value_name = "PORT")]
    pub port: Option<u16>,

    /// TOML file with run settings; explicit flags take precedence.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print progress events as JSON lines on stdout.
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,

    /// Log debug output (overridden by RUST_LOG).
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,
}

#[derive(Error, Debug)]
pub enum UsageError {
    #[error("mandatory delimiter '-' missing")]
    MissingDelimiter,

    #[error("mandatory argument <APPLICATION> missing")]
    MissingApplication,

    #[error(transparent)]
    Args(#[from] clap::Error),
}

impl UsageError {
    /// Help and version requests surface as clap errors but are not failures.
    pub fn is_informational(&self) -> bool {
        matches!(
            self,
            UsageError::Args(e) if matches!(
                e.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            )
        )
    }
}

/// Parsed command line: our options plus the application to launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub cli: Cli,
    pub target: TargetCommand,
}

impl Invocation {
    /// Split `argv` (including the binary name) at the first [`DELIMITER`],
    /// parse everything before it as options, and treat everything after it
    /// as the application command.
    pub fn parse_from<I, T>(argv: I) -> Result<Self, UsageError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();

        let Some(split) = argv.iter().position(|arg| arg == DELIMITER) else {
            // Still let clap answer --help / --version.
            if let Err(err) = Cli::try_parse_from(&argv) {
                let err = UsageError::from(err);
                if err.is_informational() {
                    return Err(err);
                }
            }
            return Err(UsageError::MissingDelimiter);
        };
        let (ours, rest) = argv.split_at(split);
        let cli = Cli::try_parse_from(ours)?;

        let target = TargetCommand::from_argv(rest[1..].to_vec())
            .map_err(|_| UsageError::MissingApplication)?;
        Ok(Self { cli, target })
    }
}
