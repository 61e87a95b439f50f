//! Single-instance enforcement via a PID file (spec.md §4.G):
//! 1. absent or unparsable PID → acquire it.
//! 2. a PID that is alive and whose executable matches ours → refuse with
//!    `AlreadyRunning`.
//! 3. otherwise (stale) → overwrite.

use std::path::Path;

use tracing::{info, warn};
use uc_core::ports::errors::{CoreError, ErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidLockOutcome {
    Acquired,
    OverwroteStale,
}

pub fn acquire_pid_lock(pid_file: &Path) -> Result<PidLockOutcome, CoreError> {
    if let Some(parent) = pid_file.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| CoreError::new(ErrorKind::Fatal, "daemon", format!("cannot create run dir: {e}")))?;
    }

    let outcome = match std::fs::read_to_string(pid_file) {
        Ok(contents) => match contents.trim().parse::<u32>() {
            Ok(pid) if process_is_alive_and_matches(pid) => {
                return Err(CoreError::new(
                    ErrorKind::AlreadyExists,
                    "daemon",
                    format!("daemon already running with pid {pid}"),
                ));
            }
            Ok(stale_pid) => {
                warn!(stale_pid, "overwriting stale PID file");
                PidLockOutcome::OverwroteStale
            }
            Err(_) => {
                warn!("PID file contained an unparsable value; acquiring");
                PidLockOutcome::Acquired
            }
        },
        Err(_) => PidLockOutcome::Acquired,
    };

    std::fs::write(pid_file, std::process::id().to_string())
        .map_err(|e| CoreError::new(ErrorKind::Fatal, "daemon", format!("cannot write pid file: {e}")))?;
    info!(pid_file = %pid_file.display(), "acquired pid lock");
    Ok(outcome)
}

pub fn release_pid_lock(pid_file: &Path) {
    if let Err(e) = std::fs::remove_file(pid_file) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(error = %e, "failed to remove pid file on shutdown");
        }
    }
}

#[cfg(unix)]
fn process_is_alive_and_matches(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let alive = kill(Pid::from_raw(pid as i32), None).is_ok();
    if !alive {
        return false;
    }
    executable_matches_current_process(pid)
}

#[cfg(unix)]
fn executable_matches_current_process(pid: u32) -> bool {
    let other_exe = std::fs::read_link(format!("/proc/{pid}/exe"));
    let current_exe = std::env::current_exe();
    match (other_exe, current_exe) {
        (Ok(a), Ok(b)) => a == b,
        // If /proc is unavailable (non-Linux Unix), err on the side of
        // refusing to start rather than risking two daemons racing.
        _ => true,
    }
}

#[cfg(windows)]
fn process_is_alive_and_matches(pid: u32) -> bool {
    use winapi::um::handleapi::CloseHandle;
    use winapi::um::processthreadsapi::OpenProcess;
    use winapi::um::winnt::PROCESS_QUERY_LIMITED_INFORMATION;

    unsafe {
        let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid);
        if handle.is_null() {
            return false;
        }
        CloseHandle(handle);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn absent_file_is_acquired() {
        let dir = TempDir::new().unwrap();
        let pid_file = dir.path().join("clipman.pid");
        assert_eq!(acquire_pid_lock(&pid_file).unwrap(), PidLockOutcome::Acquired);
        assert_eq!(std::fs::read_to_string(&pid_file).unwrap(), std::process::id().to_string());
    }

    #[test]
    fn garbage_contents_is_overwritten() {
        let dir = TempDir::new().unwrap();
        let pid_file = dir.path().join("clipman.pid");
        std::fs::write(&pid_file, "not-a-pid").unwrap();
        assert_eq!(acquire_pid_lock(&pid_file).unwrap(), PidLockOutcome::Acquired);
    }

    #[test]
    fn stale_unreachable_pid_is_overwritten() {
        let dir = TempDir::new().unwrap();
        let pid_file = dir.path().join("clipman.pid");
        // PID 4294967295 cannot be alive.
        std::fs::write(&pid_file, "4294967295").unwrap();
        assert_eq!(acquire_pid_lock(&pid_file).unwrap(), PidLockOutcome::OverwroteStale);
    }
}
