//! Command-line runtime for relock.
//!
//! The runtime owns configuration bootstrapping, the source-root prompt,
//! telemetry installation, and the report printed after a pass. IO streams
//! are injected so tests can drive it without a terminal.

use std::ffi::OsString;
use std::io::{BufRead, Write};
use std::process::ExitCode;

use relock_config::Config;
use relock_core::{ModuleStatus, PassReport, refactor_root};
use tracing::debug;

mod errors;
mod prompt;
pub mod telemetry;

use errors::AppError;

const CLI_TARGET: &str = "relock_cli";

/// Runs the CLI using the provided arguments and IO handles.
///
/// Help and version requests print to `stdout` and succeed. Any other
/// failure to configure, prompt, or discover is printed to `stderr` and
/// yields [`ExitCode::FAILURE`]. Failures of individual modules are part of
/// the report and do not change the exit code.
#[must_use]
pub fn run<I, R, W, E>(args: I, stdin: &mut R, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: BufRead,
    W: Write,
    E: Write,
{
    let config = match Config::load_from_iter(args) {
        Ok(config) => config,
        Err(error) if error.is_informational() => {
            let _ = write!(stdout, "{error}");
            return ExitCode::SUCCESS;
        }
        Err(error) => return report_failure(stderr, &AppError::from(error)),
    };

    match execute(&config, stdin, stdout, stderr) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => report_failure(stderr, &error),
    }
}

fn execute<R, W, E>(
    config: &Config,
    stdin: &mut R,
    stdout: &mut W,
    stderr: &mut E,
) -> Result<(), AppError>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    telemetry::initialise(config)?;

    let root = match config.root() {
        Some(root) => root.to_path_buf(),
        None => prompt::read_root(stdin, stderr)?,
    };
    debug!(target: CLI_TARGET, root = %root.display(), "starting refactor pass");

    let report = refactor_root(&root, config)?;
    write_report(stdout, &report).map_err(AppError::Report)
}

/// Prints one line per module that changed or failed, then the summary.
fn write_report<W: Write>(stdout: &mut W, report: &PassReport) -> std::io::Result<()> {
    for outcome in &report.outcomes {
        if outcome.status != ModuleStatus::Unchanged {
            writeln!(stdout, "{}: {}", outcome.path.display(), outcome.status)?;
        }
    }
    writeln!(stdout, "{report}")
}

fn report_failure<E: Write>(stderr: &mut E, error: &AppError) -> ExitCode {
    let _ = writeln!(stderr, "relock: {error}");
    ExitCode::FAILURE
}
