//! Supervisor Loop: the single component that mutates registry state.
use std::{collections::HashSet, sync::Arc, sync::Mutex, thread};

use nix::{
    sys::signal::{self, Signal},
    unistd::Pid,
};

use crate::{
    audit::{self, Level},
    config::{self, ServiceDecl},
    constants::{DEFAULT_MAX_RETRIES, DRAIN_GRACE_PERIOD, DRAIN_POLL_INTERVAL, MAX_RUNLEVELS},
    control::{self, StatusCache},
    events::{Event, EventQueue},
    reaper, registry::{Registry, RestartPolicy, ServiceState},
    runtime, spawner,
};

/// Owns the registry and drives the event-dispatch loop described in §4.8.
pub struct Supervisor {
    registry: Registry,
    status_cache: StatusCache,
}

impl Supervisor {
    /// Builds a supervisor with an empty registry at runlevel 0.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            status_cache: Arc::new(Mutex::new(std::collections::HashMap::new())),
        }
    }

    /// Seeds the registry from the inittab file, installing only
    /// declarations whose `runlevel` matches `level`.
    pub fn boot(&mut self, level: u32) {
        self.registry.current_runlevel = level;
        self.reseed(level);
    }

    fn reseed(&mut self, level: u32) {
        let decls = load_decls();
        for decl in decls.into_iter().filter(|d| d.runlevel == level) {
            let command = decl.command.clone();
            if let Err(err) = self.registry.insert(decl) {
                audit::emit(Level::Error, &format!("failed to seed '{command}': {err}"));
            }
        }
    }

    /// Runs the event-dispatch loop until a `Shutdown` event is processed.
    /// Returns the process exit code.
    pub fn run(mut self) -> i32 {
        let (queue, tx) = EventQueue::spawn();
        control::spawn_listener(tx, Arc::clone(&self.status_cache));
        loop {
            let Some(event) = queue.recv() else {
                return 0;
            };
            if let Some(code) = self.dispatch(event, &queue) {
                return code;
            }
            self.refresh_status_cache();
        }
    }

    fn refresh_status_cache(&self) {
        let mut cache = self
            .status_cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cache.clear();
        for (command, record) in self.registry.iter() {
            cache.insert(command.to_string(), matches!(record.state, ServiceState::Running(_)));
        }
    }

    /// Applies a single event to the registry. Returns `Some(exit_code)` if
    /// the loop should terminate.
    fn dispatch(&mut self, event: Event, queue: &EventQueue) -> Option<i32> {
        match event {
            Event::HealthTick => {
                self.handle_health_tick();
                None
            }
            Event::ChildExit(pid, status) => {
                reaper::handle_child_exit(&mut self.registry, pid, status);
                None
            }
            Event::Reload => {
                self.handle_reload();
                None
            }
            Event::RunlevelSwitch(n) => {
                self.handle_runlevel_switch(n);
                None
            }
            Event::ManageStart(name) => {
                self.handle_manage_start(&name);
                None
            }
            Event::ManageStop(name) => {
                self.handle_manage_stop(&name);
                None
            }
            Event::Shutdown => {
                // Drop any events that could start work we are about to
                // kill, per the cancellation policy in §5, then drain.
                let _ = queue.drain_non_child_exit();
                self.drain_all();
                audit::emit(Level::Info, "shutdown complete");
                Some(0)
            }
        }
    }

    fn handle_health_tick(&mut self) {
        let current = self.registry.current_runlevel;
        let candidates: Vec<ServiceDecl> = self
            .registry
            .iter()
            .filter(|(_, rec)| {
                rec.restart_policy == RestartPolicy::Always
                    && rec.decl.runlevel == current
                    && !matches!(rec.state, ServiceState::Running(_) | ServiceState::Starting)
            })
            .map(|(_, rec)| rec.decl.clone())
            .collect();

        for decl in candidates {
            let _ = spawner::start_with_retry(&mut self.registry, &decl, DEFAULT_MAX_RETRIES);
        }
    }

    fn handle_reload(&mut self) {
        let current = self.registry.current_runlevel;
        let fresh: Vec<ServiceDecl> = load_decls().into_iter().filter(|d| d.runlevel == current).collect();
        let fresh_commands: HashSet<&str> = fresh.iter().map(|d| d.command.as_str()).collect();

        let stale: Vec<String> = self
            .registry
            .commands()
            .filter(|c| !fresh_commands.contains(c))
            .map(str::to_string)
            .collect();
        for command in stale {
            self.stop_service(&command);
            self.registry.remove(&command);
        }

        for decl in fresh {
            match self.registry.lookup(&decl.command) {
                // Unchanged declaration, running or not: leave it alone.
                Some(existing) if existing.decl == decl => {}
                Some(_) => {
                    let command = decl.command.clone();
                    self.stop_service(&command);
                    self.registry.remove(&command);
                    if let Err(err) = self.registry.insert(decl) {
                        audit::emit(Level::Error, &format!("reload failed to reinstall '{command}': {err}"));
                    }
                }
                None => {
                    let command = decl.command.clone();
                    if let Err(err) = self.registry.insert(decl) {
                        audit::emit(Level::Error, &format!("reload failed to install '{command}': {err}"));
                    }
                }
            }
        }
    }

    fn handle_runlevel_switch(&mut self, n: u32) {
        if n >= MAX_RUNLEVELS {
            audit::emit(Level::Warn, &format!("ignoring switch to invalid runlevel {n}"));
            return;
        }
        self.drain_all();
        self.registry.clear();
        self.boot(n);
        audit::emit(Level::Info, &format!("switched to runlevel {n}"));
    }

    fn handle_manage_start(&mut self, command: &str) {
        let Some(record) = self.registry.lookup_mut(command) else {
            audit::emit(Level::Warn, &format!("manage start: '{command}' not found"));
            return;
        };
        record.restart_policy = RestartPolicy::Always;
        if record.state != ServiceState::Stopped {
            return;
        }
        let decl = record.decl.clone();
        let _ = spawner::start(&mut self.registry, &decl);
    }

    fn handle_manage_stop(&mut self, command: &str) {
        let Some(record) = self.registry.lookup_mut(command) else {
            audit::emit(Level::Warn, &format!("manage stop: '{command}' not found"));
            return;
        };
        // Suppress HealthTick restarts until the next ManageStart, reload,
        // or runlevel switch reinstates this service.
        record.restart_policy = RestartPolicy::Never;
        self.stop_service(command);
    }

    /// Sends SIGTERM to a single live service and waits out the drain grace
    /// period, escalating to SIGKILL if it has not exited.
    fn stop_service(&mut self, command: &str) {
        let Some(pid) = self.registry.lookup(command).and_then(|r| r.state.pid()) else {
            return;
        };
        if self.registry.set_state(command, ServiceState::Stopping(pid)).is_err() {
            return;
        }
        terminate_and_wait(pid);
        let _ = self.registry.set_state(command, ServiceState::Exited(0));
    }

    /// Drains every live service: SIGTERM, grace period, SIGKILL, per §4.8's
    /// shared sequence for runlevel switch and shutdown.
    fn drain_all(&mut self) {
        let live = self.registry.drain();
        for (_, pid) in &live {
            terminate_and_wait(*pid);
        }
        for (command, _) in live {
            let _ = self.registry.set_state(&command, ServiceState::Exited(0));
        }
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

fn load_decls() -> Vec<ServiceDecl> {
    match config::load_inittab(&runtime::inittab_path()) {
        Ok(decls) => decls,
        Err(err) => {
            audit::emit(Level::Error, &format!("failed to read inittab: {err}"));
            Vec::new()
        }
    }
}

/// Returns whether `pid` still exists, via a signal-0 probe.
fn is_alive(pid: i32) -> bool {
    signal::kill(Pid::from_raw(pid), None).is_ok()
}

fn terminate_and_wait(pid: i32) {
    let target = Pid::from_raw(pid);
    if signal::kill(target, Signal::SIGTERM).is_err() {
        return;
    }

    let deadline = std::time::Instant::now() + DRAIN_GRACE_PERIOD;
    while std::time::Instant::now() < deadline {
        if !is_alive(pid) {
            return;
        }
        thread::sleep(DRAIN_POLL_INTERVAL);
    }

    if is_alive(pid) {
        let _ = signal::kill(target, Signal::SIGKILL);
    }
}
