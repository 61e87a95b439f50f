//! Windows daemonization (spec.md §4.H): spawn a detached process with
//! `CREATE_NEW_PROCESS_GROUP | DETACHED_PROCESS`, no console window, and a
//! named-mutex single-instance check.

use std::path::Path;
use std::process::{Command, Stdio};

use uc_core::ports::errors::{CoreError, ErrorKind};

const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
const DETACHED_PROCESS: u32 = 0x0000_0008;
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Spawns a detached copy of the current executable with `CLIPMAN_DAEMON=1`
/// set, then exits the foreground process. Single-instance enforcement for
/// the detached process itself still goes through [`super::pid_lock`]; the
/// named mutex here only prevents two *launchers* racing to spawn it.
pub fn daemonize(work_dir: &Path, _log_dir: &Path) -> Result<(), CoreError> {
    use std::os::windows::process::CommandExt;

    acquire_launch_mutex()?;

    let exe = std::env::current_exe()
        .map_err(|e| CoreError::new(ErrorKind::Fatal, "daemon", format!("cannot resolve current exe: {e}")))?;

    Command::new(exe)
        .args(std::env::args_os().skip(1))
        .current_dir(work_dir)
        .env("CLIPMAN_DAEMON", "1")
        .creation_flags(CREATE_NEW_PROCESS_GROUP | DETACHED_PROCESS | CREATE_NO_WINDOW)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| CoreError::new(ErrorKind::Fatal, "daemon", format!("failed to spawn detached process: {e}")))?;

    std::process::exit(0);
}

fn acquire_launch_mutex() -> Result<(), CoreError> {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;

    use winapi::shared::winerror::ERROR_ALREADY_EXISTS;
    use winapi::um::errhandlingapi::GetLastError;
    use winapi::um::synchapi::CreateMutexW;

    let name: Vec<u16> = OsStr::new("Global\\clipman-daemon-launch")
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();

    unsafe {
        let handle = CreateMutexW(std::ptr::null_mut(), 1, name.as_ptr());
        if handle.is_null() {
            return Err(CoreError::new(ErrorKind::Fatal, "daemon", "CreateMutexW failed"));
        }
        if GetLastError() == ERROR_ALREADY_EXISTS {
            return Err(CoreError::new(
                ErrorKind::AlreadyExists,
                "daemon",
                "another launch is already in progress",
            ));
        }
    }
    Ok(())
}
