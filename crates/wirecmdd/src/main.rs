//! `wirecmdd` entry point: bootstrap, then serve the console handler.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use wirecmdd::{ConsoleHandler, StructuredLifecycleReporter, SystemConfigLoader, bootstrap_with};

fn main() -> ExitCode {
    let reporter = Arc::new(StructuredLifecycleReporter::new());
    let daemon = match bootstrap_with(&SystemConfigLoader, reporter) {
        Ok(daemon) => daemon,
        Err(error) => {
            // Telemetry may not be installed yet; stderr is the only sink.
            let _ = writeln!(io::stderr(), "wirecmdd: {error}");
            return ExitCode::FAILURE;
        }
    };

    match daemon.serve(Arc::new(ConsoleHandler::new())) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(target: "wirecmdd", %error, "dispatcher stopped");
            let _ = writeln!(io::stderr(), "wirecmdd: {error}");
            ExitCode::FAILURE
        }
    }
}
