//! Constants and configuration values for the init supervisor.
//!
//! This module centralizes the magic numbers and fixed paths used throughout the
//! daemon so they are defined exactly once.
use std::time::Duration;

// ============================================================================
// Registry bounds
// ============================================================================

/// Number of distinct runlevels; valid runlevels are `0..MAX_RUNLEVELS`.
pub const MAX_RUNLEVELS: u32 = 7;

/// Maximum number of service records the registry may hold at once.
pub const MAX_PROCESSES: usize = 512;

// ============================================================================
// Timing
// ============================================================================

/// Interval between health scans of the process table.
pub const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(5);

/// Fixed back-off applied by `start_with_retry` between dependency-unmet attempts.
pub const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Default number of retries `HealthTick` allows a not-running service before giving up.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Grace period between SIGTERM and SIGKILL during a drain.
pub const DRAIN_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Poll interval used while waiting out the drain grace period.
pub const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

// ============================================================================
// Audit log
// ============================================================================

/// Size, in bytes, at which the audit log is rotated.
pub const MAX_LOG_SIZE: u64 = 1024 * 1024;

/// Default path of the supervisor's audit log.
pub const DEFAULT_LOG_PATH: &str = "/var/log/init.log";

// ============================================================================
// Config
// ============================================================================

/// Default path of the inittab configuration file.
pub const DEFAULT_INITTAB_PATH: &str = "/etc/inittab";

// ============================================================================
// Control surface
// ============================================================================

/// Default path of the named-pipe sidechannel used by `init switch`/`init manage`.
pub const DEFAULT_CONTROL_PATH: &str = "/run/init.ctl";

/// Depth of the in-process pending-event queue.
pub const EVENT_QUEUE_CAPACITY: usize = 256;

// ============================================================================
// Cgroup paths
// ============================================================================

/// Root of the memory cgroup hierarchy this supervisor writes into.
pub const CGROUP_MEMORY_ROOT: &str = "/sys/fs/cgroup/memory/my_cgroup";

/// Root of the CPU cgroup hierarchy this supervisor writes into.
pub const CGROUP_CPU_ROOT: &str = "/sys/fs/cgroup/cpu/my_cgroup";

/// Microseconds of CPU time granted per 100ms accounting period at 1% quota.
pub const CPU_QUOTA_US_PER_PERCENT: i64 = 10_000;
