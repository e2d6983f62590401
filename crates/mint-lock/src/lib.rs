//! Single-instance guard for the auto-minter, backed by `flock(2)`.
//!
//! Two minters sharing an account would race each other's cooldown, so a
//! run or daemon takes `{state_dir}/locks/{name}.lock` before its first
//! cycle. The kernel drops the lock when the process dies, so a stale file
//! never blocks a restart.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use mint_core::AppError;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

/// Contents of a held lock file.
#[derive(Debug, Serialize, Deserialize)]
struct LockDiagnostic {
    pid: u32,
    name: String,
    acquired_at: DateTime<Utc>,
    reason: String,
}

/// Held instance lock. Released on drop.
pub struct InstanceLock {
    file: File,
    lock_path: PathBuf,
}

impl std::fmt::Debug for InstanceLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceLock")
            .field("lock_path", &self.lock_path)
            .finish()
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let fd = self.file.as_raw_fd();
        // SAFETY: `fd` is a valid descriptor owned by `self.file`. A failed
        // unlock is harmless since closing the fd releases the lock anyway.
        unsafe {
            libc::flock(fd, libc::LOCK_UN);
        }
    }
}

impl InstanceLock {
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}

/// Take the non-blocking exclusive lock `{state_dir}/locks/{name}.lock`.
///
/// On contention the error wraps [`AppError::InstanceLocked`] with the
/// holder's PID when the diagnostic JSON is readable.
pub fn acquire_instance_lock(state_dir: &Path, name: &str, reason: &str) -> Result<InstanceLock> {
    let locks_dir = state_dir.join("locks");
    fs::create_dir_all(&locks_dir)
        .with_context(|| format!("Failed to create locks directory: {}", locks_dir.display()))?;

    let lock_path = locks_dir.join(format!("{name}.lock"));
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .with_context(|| format!("Failed to open lock file: {}", lock_path.display()))?;

    // SAFETY: `fd` comes from the `File` opened above; the return value is
    // checked.
    let ret = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if ret != 0 {
        return Err(contention_error(&lock_path));
    }

    let mut lock = InstanceLock { file, lock_path };
    let diagnostic = LockDiagnostic {
        pid: std::process::id(),
        name: name.to_string(),
        acquired_at: Utc::now(),
        reason: reason.to_string(),
    };
    let json = serde_json::to_string(&diagnostic).context("Failed to serialize lock diagnostic")?;
    lock.file.set_len(0).context("Failed to truncate lock file")?;
    lock.file
        .write_all(json.as_bytes())
        .context("Failed to write lock diagnostic")?;
    lock.file.flush().context("Failed to flush lock file")?;
    Ok(lock)
}

fn contention_error(lock_path: &Path) -> anyhow::Error {
    let diagnostic = fs::read_to_string(lock_path)
        .ok()
        .and_then(|contents| serde_json::from_str::<LockDiagnostic>(&contents).ok());
    match diagnostic {
        Some(diag) => anyhow::Error::new(AppError::InstanceLocked(diag.pid)).context(format!(
            "Lock {} held since {} ({})",
            lock_path.display(),
            diag.acquired_at,
            diag.reason
        )),
        None => anyhow::anyhow!(
            "Lock {} is held (unable to read diagnostic info)",
            lock_path.display()
        ),
    }
}

/// Whether `pid` names a live process.
///
/// Reads `/proc/{pid}/stat` and treats zombies (`Z`) and dead (`X`) entries
/// as gone. Falls back to `kill(pid, 0)` when `/proc` is unavailable.
pub fn is_pid_alive(pid: u32) -> bool {
    if pid == 0 {
        return false;
    }
    if let Ok(content) = fs::read_to_string(format!("/proc/{pid}/stat"))
        && let Some(close_paren) = content.rfind(')')
    {
        let state = content[close_paren + 1..]
            .trim_start()
            .chars()
            .next()
            .unwrap_or('X');
        return !matches!(state, 'Z' | 'X' | 'x');
    }
    let Ok(raw) = libc::pid_t::try_from(pid) else {
        return false;
    };
    // SAFETY: signal 0 is an existence/permission probe only.
    let ret = unsafe { libc::kill(raw, 0) };
    ret == 0 || std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}
