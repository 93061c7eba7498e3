// ─── Process Supervisor ───
// Spawns the composed plan and relays its merged output line by line.

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::events::EventSink;
use crate::core::platform::Platform;

use super::classpath::safe_path_str;
use super::plan::LaunchPlan;

pub const OUTPUT_PREFIX: &str = "[MC] ";

pub struct ProcessSupervisor<'a> {
    events: &'a EventSink,
}

impl<'a> ProcessSupervisor<'a> {
    pub fn new(events: &'a EventSink) -> Self {
        Self { events }
    }

    /// Spawn the plan and block until the game exits. Returns the exit code,
    /// `-1` when the process was killed by a signal.
    pub async fn run(&self, plan: &LaunchPlan) -> LauncherResult<i32> {
        info!("Launching with Java: {:?}", plan.interpreter);
        self.supervise(build_command(plan)).await
    }

    async fn supervise(&self, mut cmd: Command) -> LauncherResult<i32> {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| LauncherError::JavaExecution(e.to_string()))?;
        if let Some(pid) = child.id() {
            self.events.info(format!("Game started (pid {})", pid));
        }

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, tx.clone()));
        }
        drop(tx);

        // Ends once both pipes are closed.
        while let Some(line) = rx.recv().await {
            self.events
                .game_output(format!("{}{}", OUTPUT_PREFIX, line));
        }

        let status = child
            .wait()
            .await
            .map_err(|e| LauncherError::Launch(format!("waiting for game process: {}", e)))?;
        let code = status.code().unwrap_or(-1);
        self.events
            .info(format!("Game exited with code {}", code));
        Ok(code)
    }
}

async fn forward_lines<R>(reader: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if tx.send(line).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!("Output stream closed: {}", e);
                break;
            }
        }
    }
}

pub fn build_command(plan: &LaunchPlan) -> Command {
    let mut cmd = Command::new(&plan.interpreter);
    cmd.args(plan.command_args());
    cmd.current_dir(&plan.working_dir);

    let var = plan.platform.library_path_var();
    let existing = std::env::var(var).ok();
    cmd.env(
        var,
        prepend_search_path(
            &safe_path_str(&plan.natives_dir),
            existing.as_deref(),
            plan.platform,
        ),
    );
    cmd
}

fn prepend_search_path(value: &str, existing: Option<&str>, platform: Platform) -> String {
    match existing {
        Some(existing) if !existing.trim().is_empty() => {
            format!("{}{}{}", value, platform.classpath_separator(), existing)
        }
        _ => value.to_string(),
    }
}
