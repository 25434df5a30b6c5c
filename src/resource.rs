//! Resource Controller: applies memory and CPU caps to a freshly spawned
//! child via cgroup writes.
//!
//! Cgroup availability is environment-dependent, so every write here is
//! best-effort: a failed write is logged at WARN and `apply` still reports
//! success, leaving the child uncapped rather than blocking boot.
use std::{fs::OpenOptions, io::Write as _, path::Path};

use crate::{
    audit::{self, Level},
    constants::{CGROUP_CPU_ROOT, CGROUP_MEMORY_ROOT, CPU_QUOTA_US_PER_PERCENT},
};

/// Applies memory and CPU caps to `pid` and joins it to the cgroup.
///
/// Never fails outright; failures are swallowed after being logged, per the
/// permissive default described for the Resource Controller.
pub fn apply(pid: i32, memory_bytes: u64, cpu_percent: u32) {
    if memory_bytes > 0 {
        write_best_effort(
            &Path::new(CGROUP_MEMORY_ROOT).join("memory.limit_in_bytes"),
            &memory_bytes.to_string(),
        );
    }

    if cpu_percent > 0 {
        let quota = i64::from(cpu_percent) * CPU_QUOTA_US_PER_PERCENT;
        write_best_effort(&Path::new(CGROUP_CPU_ROOT).join("cpu.cfs_quota_us"), &quota.to_string());
    }

    write_best_effort(&Path::new(CGROUP_MEMORY_ROOT).join("cgroup.procs"), &pid.to_string());
}

fn write_best_effort(path: &Path, value: &str) {
    let result = OpenOptions::new()
        .write(true)
        .open(path)
        .and_then(|mut f| f.write_all(value.as_bytes()));

    if let Err(err) = result {
        audit::emit(
            Level::Warn,
            &format!("cgroup write to {} failed: {err}", path.display()),
        );
    }
}
