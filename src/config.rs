//! Inittab configuration loading.
//!
//! This loader is pure with respect to the [`crate::registry::Registry`]: it
//! only turns a file on disk into an ordered list of [`ServiceDecl`] values.
//! Deciding what to install, start, or tear down from that list is the
//! Supervisor Loop's job.
use std::{fs, path::Path};

use tracing::warn;

use crate::constants::MAX_RUNLEVELS;

/// A single parsed line of the inittab file (§6 of the spec).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDecl {
    /// Absolute path of the executable; the identity key for this service.
    pub command: String,
    /// Runlevel at which the service should be active.
    pub runlevel: u32,
    /// Command strings of services that must be `Running` before this one starts.
    pub dependencies: Vec<String>,
    /// Memory cap in bytes; `0` means uncapped.
    pub memory_limit_bytes: u64,
    /// CPU quota as a percentage of one core; `0` means uncapped.
    pub cpu_quota_percent: u32,
}

/// Reads and parses the inittab file at `path`.
///
/// Malformed lines are skipped with a `WARN` log line rather than aborting
/// the load; only an I/O failure reading the file itself is propagated.
pub fn load_inittab(path: &Path) -> std::io::Result<Vec<ServiceDecl>> {
    let content = fs::read_to_string(path)?;
    Ok(parse_inittab(&content))
}

/// Parses inittab file contents into an ordered list of declarations,
/// preserving the file's line order.
pub fn parse_inittab(content: &str) -> Vec<ServiceDecl> {
    let mut decls = Vec::new();
    for (lineno, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match parse_line(line) {
            Some(decl) => decls.push(decl),
            None => warn!("inittab:{}: malformed line, skipping: {raw_line}", lineno + 1),
        }
    }
    decls
}

/// Parses a single non-comment, non-blank inittab line.
///
/// Schema: `<runlevel:int> <command:abs-path> <deps:comma-list-or-"-"> <mem_bytes:int> <cpu_pct:int>`
fn parse_line(line: &str) -> Option<ServiceDecl> {
    let mut fields = line.split_whitespace();

    let runlevel: u32 = fields.next()?.parse().ok()?;
    if runlevel >= MAX_RUNLEVELS {
        return None;
    }

    let command = fields.next()?;
    if !command.starts_with('/') {
        return None;
    }

    let deps_field = fields.next()?;
    let dependencies = if deps_field == "-" {
        Vec::new()
    } else {
        deps_field
            .split(',')
            .map(str::to_string)
            .filter(|s| !s.is_empty())
            .collect()
    };

    let memory_limit_bytes: u64 = fields.next()?.parse().ok()?;
    let cpu_quota_percent: u32 = fields.next()?.parse().ok()?;
    if cpu_quota_percent > 100 {
        return None;
    }

    // No trailing garbage fields.
    if fields.next().is_some() {
        return None;
    }

    Some(ServiceDecl {
        command: command.to_string(),
        runlevel,
        dependencies,
        memory_limit_bytes,
        cpu_quota_percent,
    })
}
