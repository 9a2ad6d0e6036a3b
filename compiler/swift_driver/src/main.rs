//! The `swift-driver` binary.
//!
//! Thin shell around the library: classify the invocation, forward
//! subcommands, otherwise build a [`Driver`], plan, and run.

use std::process::ExitCode;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use swift_diagnostic::{DiagnosticEngine, StderrDiagnosticConsumer};
use swift_driver::{tracing_setup, Driver, InvocationRunMode, SubprocessExecutor};

fn main() -> ExitCode {
    tracing_setup::init();

    let argv: Vec<String> = std::env::args().collect();
    let env: FxHashMap<String, String> = std::env::vars().collect();

    // Subcommands never reach the driver proper.
    let (run_mode, rewritten) = Driver::invocation_run_mode(&argv);
    if let InvocationRunMode::Subcommand(tool) = run_mode {
        return forward_subcommand(&tool, &rewritten[1..]);
    }

    let diagnostics = DiagnosticEngine::new(Rc::new(StderrDiagnosticConsumer));
    let mut driver = match Driver::new(argv, env, diagnostics, Box::new(SubprocessExecutor::new()))
    {
        Ok(driver) => driver,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let result = driver.plan_build().and_then(|jobs| driver.run(jobs));
    match result {
        Ok(0) => {
            if driver.diagnostics.has_errors() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Ok(code) => ExitCode::from(code.clamp(1, 255) as u8),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Exec the named subcommand, inheriting stdio, and propagate its exit code.
fn forward_subcommand(tool: &str, args: &[String]) -> ExitCode {
    let status = std::process::Command::new(tool).args(args).status();
    match status {
        Ok(status) => ExitCode::from(status.code().unwrap_or(1).clamp(0, 255) as u8),
        Err(err) => {
            eprintln!("error: unable to execute subcommand '{tool}': {err}");
            ExitCode::FAILURE
        }
    }
}
