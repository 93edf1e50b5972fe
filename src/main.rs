use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use supervise::commands::{control, start, status};
use supervise::config::{self, Action, Config, ENV_CMD, ENV_STATUS_DIR};
use supervise::error::{exit_code_for, EXIT_OK};
use supervise::fs::RunDir;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "supervise")]
#[command(about = "Keep one child process alive and control it through a named pipe", long_about = None)]
#[command(version)]
struct Cli {
    /// Run directory holding the lock, control pipe and status files
    /// (default: <prefix>/run next to the bin/ directory of this executable)
    #[arg(short = 'd', long = "status-dir", env = ENV_STATUS_DIR)]
    status_dir: Option<PathBuf>,

    /// Command line to supervise, run through /bin/sh -c
    #[arg(short = 'c', long = "cmd", env = ENV_CMD, default_value = "")]
    cmd: String,

    /// Operation to perform
    #[arg(short = 's', long = "control", value_enum, default_value_t = Action::Start)]
    control: Action,

    /// Run as a daemon in the background
    #[arg(short = 'D', long = "daemon")]
    daemon: bool,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            run_dir: self.status_dir.unwrap_or_else(config::default_run_dir),
            command_line: self.cmd,
            action: self.control,
            daemonize: self.daemon,
            background: config::background_from_env(),
        }
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(config: &Config) -> Result<i32> {
    config.validate()?;
    let run_dir = RunDir::new(&config.run_dir);

    if let Some(command) = config.action.command() {
        return control::execute(&run_dir, command).map(|_| EXIT_OK);
    }

    match config.action {
        Action::Status => status::execute(&run_dir).map(|_| EXIT_OK),
        _ => start::execute(config),
    }
}

fn main() {
    setup_logging();

    let config = Cli::parse().into_config();

    let code = match run(&config) {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            exit_code_for(&e)
        }
    };

    std::process::exit(code);
}
