use std::path::PathBuf;

use chrono::Local;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use bootstrap_lib::core::config::LauncherConfig;
use bootstrap_lib::core::error::{LauncherError, LauncherResult};
use bootstrap_lib::core::events::{EventSink, LauncherEvent, LogLevel};
use bootstrap_lib::core::state::AppState;

#[derive(Parser, Debug)]
#[clap(
    name = "bootstrap",
    about = "Resolve, cache and launch game versions offline",
    version
)]
pub struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// JSON configuration file
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Game directory (defaults to the platform location)
    #[clap(long, global = true)]
    game_dir: Option<PathBuf>,

    /// Java executable
    #[clap(long, global = true)]
    java: Option<PathBuf>,

    /// Maximum heap in megabytes
    #[clap(long, global = true)]
    ram: Option<u32>,

    /// Offline player name
    #[clap(long, global = true)]
    username: Option<String>,

    /// Layer the Fabric loader over the version
    #[clap(long, global = true)]
    loader: bool,

    /// Log where the Fabulously Optimized pack goes (needs --loader)
    #[clap(long, global = true)]
    optimized: bool,

    /// Start the game fullscreen
    #[clap(long, global = true)]
    fullscreen: bool,

    /// Include snapshots and old versions
    #[clap(long, global = true)]
    snapshots: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Refresh and list available versions
    Versions,
    /// Resolve and launch a version
    Launch {
        /// Version id, e.g. 1.20.1
        version: String,
    },
}

impl Cli {
    fn load_config(&self) -> LauncherResult<LauncherConfig> {
        let mut config = match &self.config {
            Some(path) => LauncherConfig::from_file(path)?,
            None => LauncherConfig::default(),
        };

        if let Some(dir) = &self.game_dir {
            config.game_directory = dir.clone();
        }
        if let Some(java) = &self.java {
            config.java_path = Some(java.clone());
        }
        if let Some(ram) = self.ram {
            config.ram_megabytes = ram;
        }
        if let Some(username) = &self.username {
            config.username = username.clone();
        }
        config.loader_enabled |= self.loader;
        config.optimized_modpack |= self.optimized;
        config.fullscreen |= self.fullscreen;
        config.show_snapshots |= self.snapshots;

        Ok(config.sanitized())
    }
}

/// Returns the process exit code.
pub async fn run(cli: Cli) -> i32 {
    let (events, rx) = EventSink::channel();
    let printer = spawn_printer(rx);

    let result = execute(cli, events).await;
    // All senders are gone once `execute` returns, so the printer drains and stops.
    let _ = printer.await;

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            1
        }
    }
}

async fn execute(cli: Cli, events: EventSink) -> LauncherResult<i32> {
    let config = cli.load_config()?;
    let state = AppState::new(config, events)?;

    state
        .refresh_catalog()
        .await
        .map_err(|e| LauncherError::Other(format!("Catalog task failed: {}", e)))?;

    match cli.command {
        Command::Versions => {
            let records = state
                .catalog()
                .filter(state.config().show_snapshots)
                .await;
            for record in records {
                println!("{:<24} {}", record.id, record.kind.label());
            }
            Ok(0)
        }
        Command::Launch { version } => {
            let record = state
                .catalog()
                .find(&version)
                .await
                .ok_or(LauncherError::VersionNotFound(version))?;

            let handle = state
                .request_launch(record)
                .ok_or_else(|| LauncherError::Launch("an attempt is already running".into()))?;
            handle
                .await
                .map_err(|e| LauncherError::Other(format!("Launch task failed: {}", e)))?
        }
    }
}

fn spawn_printer(mut rx: UnboundedReceiver<LauncherEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                LauncherEvent::Log { at, level, message } => {
                    let stamp = at.with_timezone(&Local).format("%H:%M:%S");
                    match level {
                        LogLevel::Error => eprintln!("[{}] [ERR] {}", stamp, message),
                        _ => println!("[{}] {}", stamp, message),
                    }
                }
                LauncherEvent::Status { message } => {
                    println!("[{}] {}", Local::now().format("%H:%M:%S"), message)
                }
                LauncherEvent::Progress { label, done, total } => {
                    println!("    {} {}/{}", label, done, total)
                }
                LauncherEvent::GameOutput { line } => println!("{}", line),
                LauncherEvent::Percent { .. } | LauncherEvent::State { .. } => {}
            }
        }
    })
}
