//! CLI entrypoint for relock.
//!
//! The binary delegates to [`relock_cli::run`], which loads configuration,
//! asks for the source root when it was not given, and runs one refactor
//! pass over it.

use std::io::{self, StderrLock, StdinLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdin: StdinLock<'_> = io::stdin().lock();
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    relock_cli::run(std::env::args_os(), &mut stdin, &mut stdout, &mut stderr)
}
