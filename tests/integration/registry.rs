//! Integration-level exercise of the Service Registry invariants from §3/§4.4.
use initd::{
    config::ServiceDecl,
    constants::MAX_PROCESSES,
    error::SupervisorError,
    registry::{Registry, RestartPolicy, ServiceState},
};

fn decl(command: &str, deps: &[&str]) -> ServiceDecl {
    ServiceDecl {
        command: command.to_string(),
        runlevel: 3,
        dependencies: deps.iter().map(|s| s.to_string()).collect(),
        memory_limit_bytes: 0,
        cpu_quota_percent: 0,
    }
}

#[test]
fn command_uniqueness_holds_across_a_full_lifecycle() {
    let mut reg = Registry::new();
    reg.insert(decl("/bin/a", &[])).unwrap();
    reg.set_state("/bin/a", ServiceState::Starting).unwrap();
    reg.set_state("/bin/a", ServiceState::Running(100)).unwrap();
    reg.set_state("/bin/a", ServiceState::Exited(0)).unwrap();
    reg.set_state("/bin/a", ServiceState::Starting).unwrap();
    reg.set_state("/bin/a", ServiceState::Running(200)).unwrap();

    // At every point only one record exists for this command, and only the
    // current pid is live.
    assert_eq!(reg.len(), 1);
    assert_eq!(reg.by_pid(100), None);
    assert_eq!(reg.by_pid(200), Some("/bin/a"));

    let err = reg.insert(decl("/bin/a", &[])).unwrap_err();
    assert!(matches!(err, SupervisorError::Duplicate { .. }));
}

#[test]
fn pid_uniqueness_holds_across_two_live_records() {
    let mut reg = Registry::new();
    reg.insert(decl("/bin/a", &[])).unwrap();
    reg.insert(decl("/bin/b", &[])).unwrap();

    reg.set_state("/bin/a", ServiceState::Starting).unwrap();
    reg.set_state("/bin/a", ServiceState::Running(10)).unwrap();
    reg.set_state("/bin/b", ServiceState::Starting).unwrap();
    reg.set_state("/bin/b", ServiceState::Running(20)).unwrap();

    assert_eq!(reg.by_pid(10), Some("/bin/a"));
    assert_eq!(reg.by_pid(20), Some("/bin/b"));
    assert_eq!(reg.by_pid(99), None);
}

#[test]
fn capacity_bound_is_enforced_at_max_processes() {
    let mut reg = Registry::new();
    for i in 0..MAX_PROCESSES {
        reg.insert(decl(&format!("/bin/s{i}"), &[])).unwrap();
    }
    assert_eq!(reg.len(), MAX_PROCESSES);

    let err = reg.insert(decl("/bin/overflow", &[])).unwrap_err();
    match err {
        SupervisorError::CapacityExceeded { capacity } => assert_eq!(capacity, MAX_PROCESSES),
        other => panic!("expected CapacityExceeded, got {other:?}"),
    }
}

#[test]
fn drain_moves_every_live_record_to_stopping_and_leaves_stopped_alone() {
    let mut reg = Registry::new();
    reg.insert(decl("/bin/a", &[])).unwrap();
    reg.insert(decl("/bin/b", &[])).unwrap();
    reg.insert(decl("/bin/c", &[])).unwrap();

    reg.set_state("/bin/a", ServiceState::Starting).unwrap();
    reg.set_state("/bin/a", ServiceState::Running(1)).unwrap();
    reg.set_state("/bin/b", ServiceState::Starting).unwrap();
    reg.set_state("/bin/b", ServiceState::Running(2)).unwrap();
    // /bin/c stays Stopped.

    let mut drained = reg.drain();
    drained.sort();
    assert_eq!(drained, vec![("/bin/a".to_string(), 1), ("/bin/b".to_string(), 2)]);

    assert_eq!(reg.lookup("/bin/a").unwrap().state, ServiceState::Stopping(1));
    assert_eq!(reg.lookup("/bin/b").unwrap().state, ServiceState::Stopping(2));
    assert_eq!(reg.lookup("/bin/c").unwrap().state, ServiceState::Stopped);
}

#[test]
fn runlevel_switch_idempotence_at_the_registry_level() {
    // A switch to the same runlevel twice, with no services between the two
    // calls, must leave the registry content identical.
    let mut reg = Registry::new();
    reg.current_runlevel = 3;
    reg.insert(decl("/bin/a", &[])).unwrap();

    let snapshot_before: Vec<_> = {
        let mut v: Vec<_> = reg.iter().map(|(c, r)| (c.to_string(), r.state.clone())).collect();
        v.sort();
        v
    };

    // First switch: drain (nothing live), clear, reseed identically.
    reg.drain();
    reg.clear();
    reg.current_runlevel = 3;
    reg.insert(decl("/bin/a", &[])).unwrap();

    // Second switch: same sequence again.
    reg.drain();
    reg.clear();
    reg.current_runlevel = 3;
    reg.insert(decl("/bin/a", &[])).unwrap();

    let snapshot_after: Vec<_> = {
        let mut v: Vec<_> = reg.iter().map(|(c, r)| (c.to_string(), r.state.clone())).collect();
        v.sort();
        v
    };

    assert_eq!(snapshot_before, snapshot_after);
    assert_eq!(reg.current_runlevel, 3);
}

#[test]
fn dependency_satisfaction_is_monotone_once_a_prerequisite_is_running() {
    let mut reg = Registry::new();
    reg.insert(decl("/bin/a", &[])).unwrap();
    reg.insert(decl("/bin/b", &["/bin/a"])).unwrap();

    assert!(!initd::resolver::dependencies_satisfied(&reg, &["/bin/a".to_string()]));

    reg.set_state("/bin/a", ServiceState::Starting).unwrap();
    reg.set_state("/bin/a", ServiceState::Running(1)).unwrap();
    assert!(initd::resolver::dependencies_satisfied(&reg, &["/bin/a".to_string()]));

    // A Never-restart dependency that already exited once still satisfies
    // future starts, per invariant 4.
    reg.set_state("/bin/a", ServiceState::Exited(0)).unwrap();
    let record = reg.lookup_mut("/bin/a").unwrap();
    record.restart_policy = RestartPolicy::Never;
    // The resolver itself only checks for `Running`; the "Exited with
    // policy=Never" half of invariant 4 is the Health Scanner's
    // responsibility not to re-fire on, which is exercised in
    // tests/integration/supervisor.rs.
    assert!(!initd::resolver::dependencies_satisfied(&reg, &["/bin/a".to_string()]));
}

#[test]
fn illegal_transitions_are_rejected_and_leave_state_untouched() {
    let mut reg = Registry::new();
    reg.insert(decl("/bin/a", &[])).unwrap();

    // Stopped -> Running is not a legal single step.
    let err = reg.set_state("/bin/a", ServiceState::Running(1)).unwrap_err();
    assert!(matches!(err, SupervisorError::IllegalTransition { .. }));
    assert_eq!(reg.lookup("/bin/a").unwrap().state, ServiceState::Stopped);
}

#[test]
fn lookup_of_unregistered_command_is_none() {
    let reg = Registry::new();
    assert!(reg.lookup("/bin/missing").is_none());
    assert!(reg.by_pid(1).is_none());
}
