//! C1: uniform, timeout-bounded execution of external VCS commands.

use crate::error::{Result, ScmError};
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Default soft timeout for a subprocess invocation, matching the
/// reference implementation's default.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(40);

/// Outcome of a single command invocation. `stdout`/`stderr` have trailing
/// newlines stripped.
#[derive(Debug, Clone)]
pub struct Output {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl Output {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Read the subprocess timeout override from `<prefix>_SUBPROCESS_TIMEOUT`
/// (seconds), falling back to [`DEFAULT_TIMEOUT`]. The prefix follows
/// [`crate::context::tool_prefix`], so an embedder's registered prefix
/// applies here too.
pub fn configured_timeout() -> Duration {
    std::env::var(format!("{}_SUBPROCESS_TIMEOUT", crate::context::tool_prefix()))
        .ok()
        .and_then(|raw| raw.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT)
}

/// Run `argv` in `cwd`, never through a shell, with a soft timeout.
///
/// Never propagates a non-zero exit as an error itself — callers decide
/// whether a failing command means "absent" or "broken".
pub fn run(argv: &[&str], cwd: &Path) -> Result<Output> {
    run_with_timeout(argv, cwd, configured_timeout())
}

pub fn run_with_timeout(argv: &[&str], cwd: &Path, timeout: Duration) -> Result<Output> {
    run_with_timeout_env(argv, cwd, timeout, &[])
}

/// As [`run`], with extra environment variables set on the child (used by
/// the hg-git bridge to point `git` at an alternate `--git-dir`).
pub fn run_with_env(argv: &[&str], cwd: &Path, envs: &[(&str, &str)]) -> Result<Output> {
    run_with_timeout_env(argv, cwd, configured_timeout(), envs)
}

pub fn run_with_timeout_env(
    argv: &[&str],
    cwd: &Path,
    timeout: Duration,
    envs: &[(&str, &str)],
) -> Result<Output> {
    let Some((program, args)) = argv.split_first() else {
        return Err(ScmError::VcsCommand("empty command vector".into()));
    };

    let mut command = Command::new(program);
    command
        .args(args)
        .envs(envs.iter().copied())
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    // Run the child in its own process group so a timeout can kill
    // everything it spawned, not just the direct child.
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command
        .spawn()
        .map_err(|e| ScmError::VcsCommand(format!("failed to spawn {program}: {e}")))?;

    let pid = child.id();
    let stdout_handle = child.stdout.take();
    let stderr_handle = child.stderr.take();

    let (tx, rx) = mpsc::channel();
    let waiter = thread::spawn(move || {
        use std::io::Read;
        let mut stdout = String::new();
        let mut stderr = String::new();
        if let Some(mut s) = stdout_handle {
            let _ = s.read_to_string(&mut stdout);
        }
        if let Some(mut s) = stderr_handle {
            let _ = s.read_to_string(&mut stderr);
        }
        let status = child.wait();
        let _ = tx.send((status, stdout, stderr));
    });

    match rx.recv_timeout(timeout) {
        Ok((status, stdout, stderr)) => {
            let _ = waiter.join();
            let status = status
                .map_err(|e| ScmError::VcsCommand(format!("failed to wait on {program}: {e}")))?;
            Ok(Output {
                status: status.code().unwrap_or(-1),
                stdout: stdout.trim_end_matches(['\r', '\n']).to_string(),
                stderr: stderr.trim_end_matches(['\r', '\n']).to_string(),
            })
        }
        Err(_) => {
            kill_process_group(pid);
            Err(ScmError::VcsCommand(format!(
                "command {program} timed out after {timeout:?}"
            )))
        }
    }
}

/// Kill the process group rooted at `pid` (set up via `process_group(0)` at
/// spawn time) so a timed-out VCS invocation doesn't leave the command, or
/// anything it forked, running in the background.
#[cfg(unix)]
fn kill_process_group(pid: u32) {
    unsafe {
        libc::killpg(pid as libc::pid_t, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {}
