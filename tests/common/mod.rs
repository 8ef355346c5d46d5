use std::sync::Mutex;

use rocks_lang::error::{self, SharedBuffer};
use rocks_lang::Lox;

/// `error`'s two flags and its stderr sink are process-global, so only one
/// test may drive the library at a time. The CLI-argument and bad-file-path
/// cases in `misc.rs` spawn the built binary instead and don't need this
/// lock since they never touch in-process state.
static LOCK: Mutex<()> = Mutex::new(());

pub struct Run {
    pub stdout: String,
    pub stderr: String,
    pub status: i32,
}

/// Runs `source` through the library's `run` entry point directly, in the
/// same process, capturing its stdout/stderr and deriving the exit code
/// `run_file` would have produced from the two diagnostic flags.
pub fn run(source: &str) -> Run {
    let _guard = LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    error::reset_error();
    let stdout_buf = SharedBuffer::new();
    let stderr_buf = SharedBuffer::new();
    error::set_sink(Some(Box::new(stderr_buf.clone())));

    let mut lox = Lox::with_writer(Box::new(stdout_buf.clone()));
    lox.run(source);

    let status = if error::did_error() {
        65
    } else if error::did_runtime_error() {
        70
    } else {
        0
    };

    error::set_sink(None);

    Run { stdout: stdout_buf.contents(), stderr: stderr_buf.contents(), status }
}

pub fn stdout(source: &str) -> String {
    run(source).stdout
}

pub fn stderr(source: &str) -> String {
    run(source).stderr
}

pub fn status(source: &str) -> i32 {
    run(source).status
}
