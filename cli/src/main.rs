//! Entry-point for the `electron-inject` binary.
use electron_inject_cli::Invocation;
use electron_inject_cli::USAGE;
use electron_inject_cli::UsageError;
use electron_inject_cli::run_main;

fn main() {
    let invocation = match Invocation::parse_from(std::env::args_os()) {
        Ok(invocation) => invocation,
        Err(UsageError::Args(err)) => err.exit(),
        Err(err) => {
            eprintln!("error: {err}\n\nUsage: {USAGE}");
            std::process::exit(2);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("error: failed to start the async runtime: {err}");
            std::process::exit(1);
        }
    };
    if let Err(err) = runtime.block_on(run_main(invocation)) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
