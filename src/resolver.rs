//! Dependency Resolver: decides whether a service's prerequisites are
//! satisfied.
use crate::registry::{Registry, ServiceState};

/// Returns true iff every command in `dependencies` is present in `registry`
/// and currently `Running`.
///
/// Dependencies are checked in declaration order; no topological sort is
/// performed. A cyclic configuration simply leaves every member of the
/// cycle perpetually unsatisfied.
pub fn dependencies_satisfied(registry: &Registry, dependencies: &[String]) -> bool {
    dependencies.iter().all(|dep| {
        matches!(
            registry.lookup(dep).map(|rec| &rec.state),
            Some(ServiceState::Running(_))
        )
    })
}
