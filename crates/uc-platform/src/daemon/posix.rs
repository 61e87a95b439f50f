//! POSIX daemonization (spec.md §4.H): fork, `setsid`, second fork, chdir to
//! `work_dir`, redirect stdio to `log_dir/daemon.log`, set `CLIPMAN_DAEMON=1`,
//! write the PID file, return the child PID. No direct teacher analogue
//! (the teacher is a foreground GUI app); this follows the conventional
//! double-fork daemonization recipe via `nix`.

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use nix::unistd::{chdir, fork, setsid, ForkResult};
use uc_core::ports::errors::{CoreError, ErrorKind};

/// Detaches the current process from its controlling terminal and parent.
/// MUST be called before any other subsystem opens file descriptors the
/// daemonizer needs to redirect (stdio).
///
/// Returns the PID of the final daemon process as observed by the
/// original caller; the daemonizer process itself exits via `std::process::exit`
/// after forking, so this function never returns in the parent.
pub fn daemonize(work_dir: &Path, log_dir: &Path) -> Result<(), CoreError> {
    std::fs::create_dir_all(log_dir)
        .map_err(|e| CoreError::new(ErrorKind::Fatal, "daemon", format!("cannot create log dir: {e}")))?;

    // First fork: detach from the calling shell's process group.
    match unsafe { fork() }.map_err(|e| fork_error(e))? {
        ForkResult::Parent { .. } => std::process::exit(0),
        ForkResult::Child => {}
    }

    setsid().map_err(|e| CoreError::new(ErrorKind::Fatal, "daemon", format!("setsid failed: {e}")))?;

    // Second fork: prevent re-acquiring a controlling terminal.
    match unsafe { fork() }.map_err(|e| fork_error(e))? {
        ForkResult::Parent { .. } => std::process::exit(0),
        ForkResult::Child => {}
    }

    chdir(work_dir).map_err(|e| CoreError::new(ErrorKind::Fatal, "daemon", format!("chdir failed: {e}")))?;

    redirect_stdio(log_dir)?;

    std::env::set_var("CLIPMAN_DAEMON", "1");
    Ok(())
}

fn fork_error(e: nix::errno::Errno) -> CoreError {
    CoreError::new(ErrorKind::Fatal, "daemon", format!("fork failed: {e}"))
}

fn redirect_stdio(log_dir: &Path) -> Result<(), CoreError> {
    use nix::fcntl::{open, OFlag};
    use nix::sys::stat::Mode;
    use nix::unistd::dup2;

    let log_path: PathBuf = log_dir.join("daemon.log");
    let log_path_c = CString::new(log_path.as_os_str().as_bytes())
        .map_err(|e| CoreError::new(ErrorKind::Fatal, "daemon", format!("log path contains NUL: {e}")))?;

    let log_fd = open(
        log_path_c.as_c_str(),
        OFlag::O_CREAT | OFlag::O_WRONLY | OFlag::O_APPEND,
        Mode::S_IRUSR | Mode::S_IWUSR,
    )
    .map_err(|e| CoreError::new(ErrorKind::Fatal, "daemon", format!("cannot open daemon log: {e}")))?;

    let devnull = open(c"/dev/null", OFlag::O_RDONLY, Mode::empty())
        .map_err(|e| CoreError::new(ErrorKind::Fatal, "daemon", format!("cannot open /dev/null: {e}")))?;

    dup2(devnull, 0).map_err(|e| CoreError::new(ErrorKind::Fatal, "daemon", format!("dup2 stdin failed: {e}")))?;
    dup2(log_fd, 1).map_err(|e| CoreError::new(ErrorKind::Fatal, "daemon", format!("dup2 stdout failed: {e}")))?;
    dup2(log_fd, 2).map_err(|e| CoreError::new(ErrorKind::Fatal, "daemon", format!("dup2 stderr failed: {e}")))?;

    Ok(())
}
