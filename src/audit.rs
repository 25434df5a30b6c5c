//! Append-only audit log with size-triggered rotation.
//!
//! This is deliberately separate from the ambient `tracing` output: `tracing`
//! is for operator/developer diagnostics, this module is the durable record
//! the spec's rotation and ordering guarantees apply to.
use std::{
    fs::{self, OpenOptions},
    io::Write as _,
    sync::atomic::{AtomicBool, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use crate::{constants::MAX_LOG_SIZE, runtime};

/// Severity of an audit log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

/// Set when a write or rotation failed, so callers (and tests) can observe
/// that the audit log has fallen behind without `emit` ever panicking.
static LOG_DEGRADED: AtomicBool = AtomicBool::new(false);

/// Returns whether the audit log has dropped a record since the flag was
/// last cleared.
pub fn log_degraded() -> bool {
    LOG_DEGRADED.load(Ordering::SeqCst)
}

/// Clears the degraded flag. Exposed for tests that assert recovery.
pub fn clear_degraded() {
    LOG_DEGRADED.store(false, Ordering::SeqCst);
}

/// Appends a single record to the audit log, rotating first if the current
/// file has grown to at least [`MAX_LOG_SIZE`].
///
/// Never panics and never returns an error: a failure to open, rotate, or
/// write is recorded via [`log_degraded`] and the call otherwise does
/// nothing.
pub fn emit(level: Level, message: &str) {
    let path = runtime::audit_log_path();

    if let Ok(meta) = fs::metadata(&path)
        && meta.len() >= MAX_LOG_SIZE
        && let Err(_err) = rotate(&path)
    {
        LOG_DEGRADED.store(true, Ordering::SeqCst);
        return;
    }

    let file = OpenOptions::new().create(true).append(true).open(&path);
    let mut file = match file {
        Ok(f) => f,
        Err(_err) => {
            LOG_DEGRADED.store(true, Ordering::SeqCst);
            return;
        }
    };

    let line = format!("[{}] {} {}\n", level.as_str(), timestamp(), message);
    if file.write_all(line.as_bytes()).is_err() {
        LOG_DEGRADED.store(true, Ordering::SeqCst);
    }
}

fn rotate(path: &std::path::Path) -> std::io::Result<()> {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let rotated = path.with_file_name(format!(
        "{}.{secs}",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("init.log")
    ));
    fs::rename(path, rotated)
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}
