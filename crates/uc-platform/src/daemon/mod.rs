pub mod pid_lock;

#[cfg(unix)]
pub mod posix;
#[cfg(windows)]
pub mod windows;

#[cfg(unix)]
pub use posix::daemonize;
#[cfg(windows)]
pub use windows::daemonize;

pub use pid_lock::{acquire_pid_lock, release_pid_lock, PidLockOutcome};
