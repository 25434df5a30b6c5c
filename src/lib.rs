//! UNIX-style init supervisor.

#![warn(unused_crate_dependencies)]
// Test-only dependencies, silenced outside of #[cfg(test)] builds.
#[cfg(test)]
use assert_cmd as _;
#[cfg(test)]
use predicates as _;
#[cfg(test)]
use tempfile as _;

/// Append-only audit log with size-triggered rotation.
pub mod audit;

/// CLI parsing.
pub mod cli;

/// Inittab config loading.
pub mod config;

/// Constants.
pub mod constants;

/// Control surface: named-pipe sidechannel for `switch`/`manage`.
pub mod control;

/// Errors.
pub mod error;

/// Pending-event queue and async-signal-safe producers.
pub mod events;

/// Child-exit handling.
pub mod reaper;

/// Service registry.
pub mod registry;

/// Dependency satisfaction checks.
pub mod resolver;

/// Cgroup-backed resource caps.
pub mod resource;

/// Runtime paths.
pub mod runtime;

/// Fork/exec of a single service.
pub mod spawner;

/// Supervisor Loop.
pub mod supervisor;

/// Test utils.
#[doc(hidden)]
pub mod test_utils;
