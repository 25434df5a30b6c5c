//! Overridable runtime paths for the supervisor.
//!
//! Production code always resolves the fixed paths from §6 of the spec
//! (`/etc/inittab`, `/var/log/init.log`, `/run/init.ctl`). Tests redirect all
//! three into a `tempfile::tempdir()` so the suite never touches the real
//! filesystem, the same way the reference process manager's `runtime` module
//! lets tests redirect `HOME` instead of writing into the invoking user's
//! actual state directories.
use std::{
    path::{Path, PathBuf},
    sync::{OnceLock, RwLock},
};

use crate::constants::{DEFAULT_CONTROL_PATH, DEFAULT_INITTAB_PATH, DEFAULT_LOG_PATH};

#[derive(Debug, Clone)]
struct RuntimePaths {
    inittab: PathBuf,
    audit_log: PathBuf,
    control: PathBuf,
}

impl Default for RuntimePaths {
    fn default() -> Self {
        Self {
            inittab: PathBuf::from(DEFAULT_INITTAB_PATH),
            audit_log: PathBuf::from(DEFAULT_LOG_PATH),
            control: PathBuf::from(DEFAULT_CONTROL_PATH),
        }
    }
}

static PATHS: OnceLock<RwLock<RuntimePaths>> = OnceLock::new();

fn paths() -> &'static RwLock<RuntimePaths> {
    PATHS.get_or_init(|| RwLock::new(RuntimePaths::default()))
}

/// Returns the currently configured inittab path.
pub fn inittab_path() -> PathBuf {
    paths()
        .read()
        .expect("runtime paths poisoned")
        .inittab
        .clone()
}

/// Returns the currently configured audit log path.
pub fn audit_log_path() -> PathBuf {
    paths()
        .read()
        .expect("runtime paths poisoned")
        .audit_log
        .clone()
}

/// Returns the currently configured control-socket (named pipe) path.
pub fn control_path() -> PathBuf {
    paths()
        .read()
        .expect("runtime paths poisoned")
        .control
        .clone()
}

/// Redirects every runtime path under `root`, the way tests stand up an
/// isolated supervisor instance without requiring root or a real `/etc`.
pub fn init_under_root(root: &Path) {
    let mut guard = paths().write().expect("runtime paths poisoned");
    guard.inittab = root.join("inittab");
    guard.audit_log = root.join("init.log");
    guard.control = root.join("init.ctl");
}

/// Restores the production defaults. Exposed for tests that want to assert
/// the out-of-the-box paths without leaking overrides into later tests.
pub fn reset_to_defaults() {
    let mut guard = paths().write().expect("runtime paths poisoned");
    *guard = RuntimePaths::default();
}
