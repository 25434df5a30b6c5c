//! Spawner: forks, execs, and cgroup-caps a single service.
use std::{ffi::CString, thread, time::Duration};

use nix::unistd::{fork, ForkResult};

use crate::{
    audit::{self, Level},
    config::ServiceDecl,
    constants::RETRY_BACKOFF,
    error::StartError,
    registry::{Registry, ServiceState},
    resolver, resource,
};

/// Forks and execs `decl.command`, caps the child via the Resource
/// Controller, and commits the result to `registry`.
///
/// On success, returns the child pid and leaves the record `Running(pid)`.
/// On failure, the record is rolled back (or left `Failed`) and the
/// corresponding [`StartError`] is returned; see §4.5.
pub fn start(registry: &mut Registry, decl: &ServiceDecl) -> Result<i32, StartError> {
    if !resolver::dependencies_satisfied(registry, &decl.dependencies) {
        return Err(StartError::DependenciesUnmet);
    }

    registry
        .set_state(&decl.command, ServiceState::Starting)
        .map_err(|_| StartError::CapacityExceeded)?;

    // SAFETY: the supervisor is single-threaded and this fork is immediately
    // followed, in the child, only by close/exec of async-signal-safe calls.
    match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => {
            let pid = child.as_raw();
            registry
                .set_state(&decl.command, ServiceState::Running(pid))
                .expect("Starting -> Running is always legal");
            audit::emit(Level::Info, &format!("started '{}' pid {pid}", decl.command));
            Ok(pid)
        }
        Ok(ForkResult::Child) => {
            resource::apply(std::process::id() as i32, decl.memory_limit_bytes, decl.cpu_quota_percent);
            exec_or_exit(&decl.command);
        }
        Err(_errno) => {
            registry
                .set_state(&decl.command, ServiceState::Failed("fork failed".to_string()))
                .expect("Starting -> Failed is always legal");
            Err(StartError::ForkFailed)
        }
    }
}

/// Execs `command` with no arguments; exits the child with status 127 if
/// `exec` fails to return control to the kernel.
fn exec_or_exit(command: &str) -> ! {
    let Ok(path) = CString::new(command) else {
        std::process::exit(127);
    };
    let _ = nix::unistd::execv(&path, &[path.clone()]);
    std::process::exit(127);
}

/// Retries [`start`] after a fixed back-off while the failure is
/// `DependenciesUnmet`; any other failure is terminal for this call.
pub fn start_with_retry(registry: &mut Registry, decl: &ServiceDecl, max_retries: u32) -> Result<i32, StartError> {
    let mut attempt = 0;
    loop {
        match start(registry, decl) {
            Ok(pid) => return Ok(pid),
            Err(StartError::DependenciesUnmet) if attempt < max_retries => {
                attempt += 1;
                thread::sleep(RETRY_BACKOFF);
            }
            Err(err) => {
                audit::emit(
                    Level::Error,
                    &format!("giving up starting '{}': {err}", decl.command),
                );
                return Err(err);
            }
        }
    }
}
