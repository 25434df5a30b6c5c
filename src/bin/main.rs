use std::{
    fs,
    io::{Read, Write as _},
    process,
};

use tracing::error;
use tracing_subscriber::EnvFilter;

use initd::{
    cli::{Cli, Commands, ManageAction, parse_args},
    constants::MAX_RUNLEVELS,
    runtime,
    supervisor::Supervisor,
};

fn main() {
    let args = parse_args();
    init_logging(&args);

    let code = match args.command {
        None => {
            let mut supervisor = Supervisor::new();
            supervisor.boot(3);
            supervisor.run()
        }
        Some(Commands::Switch { runlevel }) => switch(runlevel),
        Some(Commands::Manage { action }) => manage(action),
    };

    process::exit(code);
}

fn switch(runlevel: u32) -> i32 {
    if runlevel >= MAX_RUNLEVELS {
        eprintln!("invalid runlevel {runlevel}");
        return 2;
    }
    if send_command(&format!("switch {runlevel}\n")).is_err() {
        eprintln!("could not reach supervisor control surface");
        return 2;
    }
    0
}

fn manage(action: ManageAction) -> i32 {
    match action {
        ManageAction::Start { name } => {
            if send_command(&format!("manage start {name}\n")).is_err() {
                eprintln!("could not reach supervisor control surface");
                return 1;
            }
            0
        }
        ManageAction::Stop { name } => {
            if send_command(&format!("manage stop {name}\n")).is_err() {
                eprintln!("could not reach supervisor control surface");
                return 1;
            }
            0
        }
        ManageAction::Status { name } => manage_status(&name),
    }
}

fn manage_status(name: &str) -> i32 {
    if send_command(&format!("manage status {name}\n")).is_err() {
        eprintln!("could not reach supervisor control surface");
        return 1;
    }

    let reply_path = {
        let mut path = runtime::control_path().into_os_string();
        path.push(".reply");
        std::path::PathBuf::from(path)
    };

    let mut response = String::new();
    let Ok(mut reply) = fs::File::open(&reply_path) else {
        eprintln!("could not read supervisor reply");
        return 1;
    };
    if reply.read_to_string(&mut response).is_err() {
        eprintln!("could not read supervisor reply");
        return 1;
    }

    let response = response.trim();
    println!("{response}");
    if response == "not found" {
        1
    } else {
        0
    }
}

fn send_command(line: &str) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new().write(true).open(runtime::control_path())?;
    file.write_all(line.as_bytes())
}

fn init_logging(args: &Cli) {
    let filter = if let Some(level) = args.log_level {
        EnvFilter::new(level.as_str())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_err() {
        error!("tracing subscriber already initialized");
    }
}
