//! The pending-event queue and the async-signal-safe producers that feed it.
//!
//! Producers — the signal thread and the periodic tick thread — only ever
//! enqueue; all registry mutation happens on the Supervisor Loop thread that
//! drains the queue. This keeps every reentrancy hazard on this side of the
//! enqueue boundary.
use std::{
    sync::mpsc::{sync_channel, Receiver, RecvTimeoutError, SyncSender},
    thread,
};

use signal_hook::{consts::signal::*, iterator::Signals};

use crate::constants::{EVENT_QUEUE_CAPACITY, HEALTH_CHECK_INTERVAL};

/// A unit of work for the Supervisor Loop, per §3 and §4.8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ChildExit(i32, i32),
    Reload,
    Shutdown,
    RunlevelSwitch(u32),
    ManageStart(String),
    ManageStop(String),
    HealthTick,
}

/// Sending half of the pending-event queue, cloned into every producer.
pub type EventSender = SyncSender<Event>;

/// The Supervisor Loop's receiving half of the pending-event queue.
pub struct EventQueue {
    receiver: Receiver<Event>,
}

impl EventQueue {
    /// Creates a bounded queue and starts the signal producer thread that
    /// feeds it. `HealthTick` has no producer thread of its own: the loop's
    /// blocking dequeue times out at `HEALTH_CHECK_INTERVAL` and synthesizes
    /// the tick itself, per §5.
    pub fn spawn() -> (Self, EventSender) {
        let (tx, rx) = sync_channel(EVENT_QUEUE_CAPACITY);
        spawn_signal_producer(tx.clone());
        (Self { receiver: rx }, tx)
    }

    /// Builds a queue with no background producers, for tests that drive
    /// events by hand.
    pub fn manual() -> (Self, EventSender) {
        let (tx, rx) = sync_channel(EVENT_QUEUE_CAPACITY);
        (Self { receiver: rx }, tx)
    }

    /// Blocks for the next event, waking up at least every
    /// `HEALTH_CHECK_INTERVAL` even if nothing was enqueued (the loop's only
    /// suspension point, per §5).
    pub fn recv(&self) -> Option<Event> {
        match self.receiver.recv_timeout(HEALTH_CHECK_INTERVAL) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) => Some(Event::HealthTick),
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drains every currently-queued event that is not `ChildExit`, per the
    /// `Shutdown` cancellation policy in §5: a shutdown must not let a
    /// pending `ManageStart`/`RunlevelSwitch` begin services we are about to
    /// kill. `ChildExit` events are kept so the drain sequence still reaps
    /// normally.
    pub fn drain_non_child_exit(&self) -> Vec<Event> {
        let mut kept = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            if matches!(event, Event::ChildExit(_, _)) {
                kept.push(event);
            }
        }
        kept
    }
}

fn spawn_signal_producer(tx: EventSender) {
    let mut signals = Signals::new([SIGCHLD, SIGHUP, SIGTERM]).expect("failed to register signal handlers");
    thread::spawn(move || {
        for signal in signals.forever() {
            let event = match signal {
                SIGCHLD => reap_ready_children(),
                SIGHUP => vec![Event::Reload],
                SIGTERM => vec![Event::Shutdown],
                _ => continue,
            };
            for event in event {
                if tx.send(event).is_err() {
                    return;
                }
            }
        }
    });
}

/// Drains every currently-reapable child via non-blocking `waitpid`, turning
/// each into a `ChildExit` event, per §4.9.
fn reap_ready_children() -> Vec<Event> {
    use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
    use nix::unistd::Pid;

    let mut events = Vec::new();
    loop {
        match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::Exited(pid, code)) => events.push(Event::ChildExit(pid.as_raw(), code)),
            Ok(WaitStatus::Signaled(pid, signal, _)) => {
                events.push(Event::ChildExit(pid.as_raw(), 128 + signal as i32))
            }
            Ok(WaitStatus::StillAlive) | Err(nix::errno::Errno::ECHILD) => break,
            Ok(_) => continue,
            Err(_) => break,
        }
    }
    events
}
