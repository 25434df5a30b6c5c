//! Reaper: translates child-exit notifications into registry transitions.
use crate::{
    audit::{self, Level},
    registry::{Registry, ServiceState},
};

/// Applies a `ChildExit(pid, status)` event to `registry`.
///
/// If `pid` is not owned by any record (already reaped, or never ours), the
/// event is dropped silently, per §4.6. The Reaper never restarts a
/// service; that is the Health Scanner's job via `HealthTick`.
pub fn handle_child_exit(registry: &mut Registry, pid: i32, status: i32) {
    let Some(command) = registry.by_pid(pid).map(str::to_string) else {
        return;
    };

    if registry.set_state(&command, ServiceState::Exited(status)).is_ok() {
        audit::emit(Level::Info, &format!("'{command}' exited with status {status}"));
    }
}
