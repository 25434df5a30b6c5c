//! Control Surface: turns one-shot CLI subcommands into events delivered to
//! a running supervisor over a named-pipe sidechannel (§4.9, §6).
//!
//! The listener side runs inside the supervisor process and forwards parsed
//! commands onto the same [`EventSender`] the signal producers use. `status`
//! queries are answered out-of-band on a second, reply-only FIFO next to the
//! control path, since the primary pipe only carries requests.
use std::{
    collections::HashMap,
    fs,
    io::{BufRead, BufReader, Write as _},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    thread,
};

use nix::{sys::stat::Mode, unistd::mkfifo};

use crate::{
    audit::{self, Level},
    events::{Event, EventSender},
    runtime,
};

/// Snapshot of `command -> is_running`, refreshed by the Supervisor Loop
/// after every dispatched event. The control listener only ever reads this
/// cache; it never touches the live registry, so the registry keeps its
/// single owner.
pub type StatusCache = Arc<Mutex<HashMap<String, bool>>>;

fn reply_path(control: &Path) -> PathBuf {
    let mut name = control.as_os_str().to_owned();
    name.push(".reply");
    PathBuf::from(name)
}

/// Ensures the control FIFO (and its reply FIFO) exist at `path`.
fn ensure_fifo(path: &Path) -> std::io::Result<()> {
    if path.exists() {
        return Ok(());
    }
    mkfifo(path, Mode::from_bits_truncate(0o600)).map_err(std::io::Error::from)
}

/// A parsed control-surface command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Switch(u32),
    ManageStart(String),
    ManageStop(String),
    ManageStatus(String),
}

fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    match parts.next()? {
        "switch" => Some(Command::Switch(parts.next()?.parse().ok()?)),
        "manage" => {
            let action = parts.next()?;
            let name = parts.next()?.to_string();
            match action {
                "start" => Some(Command::ManageStart(name)),
                "stop" => Some(Command::ManageStop(name)),
                "status" => Some(Command::ManageStatus(name)),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Starts the background thread that reads control-surface requests and
/// turns them into events, replying to status queries on the reply FIFO
/// from `status`.
pub fn spawn_listener(tx: EventSender, status: StatusCache) {
    let control = runtime::control_path();
    let reply = reply_path(&control);

    if let Err(err) = ensure_fifo(&control).and_then(|_| ensure_fifo(&reply)) {
        audit::emit(Level::Warn, &format!("control surface disabled: {err}"));
        return;
    }

    thread::spawn(move || loop {
        let Ok(file) = fs::File::open(&control) else {
            return;
        };
        for line in BufReader::new(file).lines().map_while(Result::ok) {
            match parse_command(&line) {
                Some(Command::Switch(n)) => {
                    let _ = tx.send(Event::RunlevelSwitch(n));
                }
                Some(Command::ManageStart(name)) => {
                    let _ = tx.send(Event::ManageStart(name));
                }
                Some(Command::ManageStop(name)) => {
                    let _ = tx.send(Event::ManageStop(name));
                }
                Some(Command::ManageStatus(name)) => {
                    let found = status.lock().unwrap_or_else(|p| p.into_inner()).get(&name).copied();
                    let line = match found {
                        Some(true) => "running\n",
                        Some(false) => "stopped\n",
                        None => "not found\n",
                    };
                    if let Ok(mut reply_file) = fs::OpenOptions::new().write(true).open(&reply) {
                        let _ = reply_file.write_all(line.as_bytes());
                    }
                }
                None => audit::emit(Level::Warn, &format!("ignoring malformed control command: {line}")),
            }
        }
    });
}
