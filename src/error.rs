//! Error handling for the init supervisor.
use thiserror::Error;

/// Top-level errors the supervisor core can produce.
///
/// Per the propagation policy, these never unwind across an event-handler
/// boundary: each handler in [`crate::supervisor`] catches and logs them
/// through the audit log rather than letting them escape the loop.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// A registry mutation was rejected because the table is full.
    #[error("registry is full (capacity {capacity})")]
    CapacityExceeded {
        /// The configured capacity that was reached.
        capacity: usize,
    },

    /// A service record already exists for this command.
    #[error("service '{command}' is already registered")]
    Duplicate {
        /// The command string that collided.
        command: String,
    },

    /// No record exists for the requested command.
    #[error("service '{command}' is not registered")]
    NotFound {
        /// The command string that was looked up.
        command: String,
    },

    /// A requested state transition is not legal from the record's current state.
    #[error("illegal transition for '{command}': {from:?} -> {to:?}")]
    IllegalTransition {
        /// The command whose record rejected the transition.
        command: String,
        /// The state the record was in.
        from: String,
        /// The state that was rejected.
        to: String,
    },

    /// A service could not start because a declared dependency is not yet running.
    #[error("service '{command}' is waiting on dependency '{dependency}'")]
    DependenciesUnmet {
        /// The service that cannot start yet.
        command: String,
        /// The first unmet dependency encountered.
        dependency: String,
    },

    /// `fork()` failed.
    #[error("fork failed for '{command}': {source}")]
    ForkFailed {
        /// The command that could not be forked.
        command: String,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The child process could not `exec()` the configured command.
    #[error("exec failed for '{command}': {source}")]
    ExecFailed {
        /// The command that could not be exec'd.
        command: String,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A runlevel value outside `[0, MAX_RUNLEVELS)` was requested.
    #[error("invalid runlevel {runlevel}")]
    InvalidRunlevel {
        /// The out-of-range runlevel that was requested.
        runlevel: i64,
    },

    /// The config file could not be read.
    #[error("failed to read inittab: {0}")]
    ConfigReadError(#[from] std::io::Error),
}

/// Narrow error type returned by the Spawner's `start` operation, mirrored into
/// [`SupervisorError`] or registry state by its caller.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StartError {
    /// A declared dependency is not `Running`.
    #[error("dependencies unmet")]
    DependenciesUnmet,
    /// The registry has no free slot.
    #[error("capacity exceeded")]
    CapacityExceeded,
    /// `fork()` returned an error.
    #[error("fork failed")]
    ForkFailed,
    /// The child could not `exec()` the command (observed via exit status 127).
    #[error("exec failed")]
    ExecFailed,
}

/// Errors raised while writing to the append-only audit log.
#[derive(Debug, Error)]
pub enum AuditLogError {
    /// The log file or its rotated predecessor could not be opened.
    #[error("failed to open audit log at {path}: {source}")]
    Open {
        /// Path that failed to open.
        path: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
    /// A write to the open log file failed.
    #[error("failed to write audit log: {0}")]
    Write(#[source] std::io::Error),
    /// Rotation (rename to the timestamped backup) failed.
    #[error("failed to rotate audit log: {0}")]
    Rotate(#[source] std::io::Error),
}

/// Errors raised while applying cgroup-backed resource caps to a child.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// A write to a cgroup control file failed.
    #[error("failed to write cgroup file {path}: {source}")]
    CgroupWriteFailed {
        /// The cgroup control file that rejected the write.
        path: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },
}
