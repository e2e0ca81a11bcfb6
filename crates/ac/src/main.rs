//! ac - autoclick CLI
//!
//! Gather left clicks into a config file, then replay them in cycles.
//! Press `q` anywhere (or Ctrl+C here) to stop a run.

use anyhow::Result;
use clap::{Parser, Subcommand};
use crossbeam_channel::Receiver;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use autoclick::prelude::*;
use autoclick::recorder::controller::{DEFAULT_CONFIG_NAME, DEFAULT_MIN_INTERVAL_MS};
use autoclick::recorder::storage::DEFAULT_CONFIG_DIR;
use autoclick::{ReplayStats, SessionReport};

#[derive(Parser)]
#[command(name = "ac")]
#[command(about = "autoclick - record mouse clicks and replay them")]
#[command(version)]
struct Cli {
    /// Directory holding the click configs
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_DIR)]
    config_dir: PathBuf,
    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepare the config directory and print the startup data
    Init,
    /// Record left clicks until q is pressed
    Gather {
        #[arg(short, long, default_value = DEFAULT_CONFIG_NAME)]
        name: String,
        /// Shortest interval written between two clicks, in ms
        #[arg(long, default_value_t = DEFAULT_MIN_INTERVAL_MS, allow_negative_numbers = true)]
        min_interval: i64,
        /// Overwrite an existing config without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// Replay a config
    Exec {
        #[arg(short, long, default_value = DEFAULT_CONFIG_NAME)]
        name: String,
        /// Wait after steps that have no recorded interval, in ms
        #[arg(long, default_value_t = DEFAULT_MIN_INTERVAL_MS, allow_negative_numbers = true)]
        min_interval: i64,
        /// Number of cycles, 0 repeats until q
        #[arg(short, long, default_value = "0")]
        cycle: u32,
    },
    /// List saved configs
    List,
    /// Show config info
    Show {
        name: String,
        #[arg(long)]
        all: bool,
    },
    /// Delete a config
    Delete {
        name: String,
    },
}

#[derive(Serialize)]
struct Output<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Error>,
}

impl<T: Serialize> Output<T> {
    fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }
    fn err(e: Error) -> Output<()> {
        Output { success: false, data: None, error: Some(e) }
    }
}

fn print_json<T: Serialize>(output: &T) {
    match serde_json::to_string_pretty(output) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: cannot encode output: {}", e),
    }
}

// ── Logging ─────────────────────────────────────────────────────────────────

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "autoclick=info,autoclick_core=info,autoclick_recorder=info,ac=info".into());

    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .try_init();
        }
    }
    Ok(())
}

// ── Terminal host ───────────────────────────────────────────────────────────

/// Alerts go to stdout, errors to stderr, confirmations read stdin
struct CliHost {
    assume_yes: bool,
}

impl Host for CliHost {
    fn emit(&self, event: HostEvent) {
        match event {
            HostEvent::AlertMsg(msg) => println!("{}", msg),
            HostEvent::Init(payload) => print_json(&Output::ok(payload)),
        }
    }

    fn error(&self, message: &str) {
        eprintln!("Error: {}", message);
    }

    fn confirm(&self, title: &str, message: &str) -> autoclick::Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        print!("{}: {} [y/N] ", title, message);
        io::stdout().flush().map_err(Error::host_failed)?;
        let mut answer = String::new();
        io::stdin().read_line(&mut answer).map_err(Error::host_failed)?;
        Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
    }

    fn show_window(&self) {
        // no window to raise in a terminal
        debug!("run finished");
    }
}

// ── Input ports ─────────────────────────────────────────────────────────────

/// Ports for commands that never touch global input
struct Detached;

impl InputHook for Detached {
    fn subscribe(&self) -> autoclick::Result<Receiver<InputEvent>> {
        Err(Error::not_implemented("Global input for this command"))
    }

    fn unsubscribe(&self) {}
}

impl InputInjector for Detached {
    fn move_smooth(&mut self, _x: i32, _y: i32) -> autoclick::Result<()> {
        Err(Error::not_implemented("Pointer movement for this command"))
    }

    fn click(&mut self, _button: MouseButton) -> autoclick::Result<()> {
        Err(Error::not_implemented("Clicking for this command"))
    }

    fn key_tap(&mut self, _key: char) -> autoclick::Result<()> {
        Err(Error::not_implemented("Key taps for this command"))
    }
}

#[cfg(feature = "native")]
fn input_ports() -> autoclick::Result<(Arc<dyn InputHook>, Box<dyn InputInjector>)> {
    let injector = EnigoInjector::new()?;
    Ok((Arc::new(RdevHook::new()), Box::new(injector)))
}

#[cfg(not(feature = "native"))]
fn input_ports() -> autoclick::Result<(Arc<dyn InputHook>, Box<dyn InputInjector>)> {
    Err(Error::not_implemented("Global input (rebuild with --features native)"))
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_file.as_deref()) {
        eprintln!("Error: cannot open log file: {}", e);
        std::process::exit(1);
    }

    let store = ConfigStore::new(&cli.config_dir);
    let result: Result<(), anyhow::Error> = match cli.command {
        Commands::Init => init(&cli.config_dir).map(|_| ()),
        Commands::Gather { name, min_interval, yes } => run_session(
            &cli.config_dir,
            RunParams { mode: Mode::Gather.key().to_string(), config_name: name, min_interval, cycle: 0 },
            yes,
        ),
        Commands::Exec { name, min_interval, cycle } => run_session(
            &cli.config_dir,
            RunParams { mode: Mode::Exec.key().to_string(), config_name: name, min_interval, cycle },
            false,
        ),
        Commands::List => list(&store),
        Commands::Show { name, all } => show(&store, &name, all),
        Commands::Delete { name } => delete(&store, &name),
    };

    if let Err(e) = result {
        if let Some(err) = e.downcast_ref::<Error>() {
            print_json(&Output::<()>::err(err.clone()));
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

/// Prepare the config directory; the payload is printed through the host
fn init(config_dir: &Path) -> Result<InitPayload> {
    let config = ControllerConfig { config_dir: config_dir.to_path_buf(), ..Default::default() };
    let host = Arc::new(CliHost { assume_yes: false });
    let controller = SessionController::new(config, Arc::new(Detached), Box::new(Detached), host);
    Ok(controller.ready()?)
}

fn run_session(config_dir: &Path, params: RunParams, assume_yes: bool) -> Result<()> {
    let (hook, injector) = input_ports()?;
    let config = ControllerConfig { config_dir: config_dir.to_path_buf(), ..Default::default() };
    let host = Arc::new(CliHost { assume_yes });
    let mut controller = SessionController::new(config, hook, injector, host);
    controller.store().ensure_dir()?;

    let cancel = controller.cancel_token();
    ctrlc::set_handler(move || {
        cancel.cancel();
    })?;

    let outcome = controller.start(params)?;
    info!(?outcome, "session finished");
    match outcome {
        RunOutcome::Declined => print_json(&Output::ok(serde_json::json!({"declined": true}))),
        RunOutcome::Cancelled(report) => print_json(&Output::ok(report_json("cancelled", &report))),
        RunOutcome::Completed(report) => print_json(&Output::ok(report_json("completed", &report))),
        RunOutcome::Failed(e) => return Err(e.into()),
    }
    Ok(())
}

fn report_json(status: &str, report: &SessionReport) -> serde_json::Value {
    match report {
        SessionReport::NotStarted => serde_json::json!({"status": status, "started": false}),
        SessionReport::Gathered(stats) => serde_json::json!({
            "status": status,
            "positions": stats.positions,
            "intervals": stats.intervals,
        }),
        SessionReport::Replayed(ReplayStats { cycles, clicks, .. }) => serde_json::json!({
            "status": status,
            "cycles": cycles,
            "clicks": clicks,
        }),
    }
}

fn list(store: &ConfigStore) -> Result<()> {
    let files = store.list()?;
    if files.is_empty() { println!("No configs saved."); } else { for f in files { println!("{}", f); } }
    Ok(())
}

fn show(store: &ConfigStore, name: &str, all: bool) -> Result<()> {
    let seq = store.load(&store.path(name))?;
    let total_ms = seq.total_wait_ms();
    println!("Name: {}", name);
    println!("Positions: {}", seq.positions.len());
    println!("Intervals: {} ({} ms recorded)", seq.intervals.len(), total_ms);
    if all { for (i, r) in seq.records().iter().enumerate() { println!("{}: {}", i + 1, r); } }
    Ok(())
}

fn delete(store: &ConfigStore, name: &str) -> Result<()> {
    store.delete(&store.path(name))?;
    println!("Deleted: {}", name);
    Ok(())
}
