// ─── Event Stream ───
// Progress, status and log updates produced on the worker. Delivery never
// blocks the producer: the channel is unbounded and a closed receiver is
// silently ignored.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::core::state::AttemptState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LauncherEvent {
    Log {
        at: DateTime<Utc>,
        level: LogLevel,
        message: String,
    },
    Status {
        message: String,
    },
    Progress {
        label: String,
        done: usize,
        total: usize,
    },
    /// Byte-level progress of the current download, 0–100.
    Percent {
        value: u8,
    },
    /// One line of merged game output, already prefixed.
    GameOutput {
        line: String,
    },
    State {
        state: AttemptState,
    },
}

#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<LauncherEvent>>,
}

impl EventSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<LauncherEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that only mirrors to tracing.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    fn send(&self, event: LauncherEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }

    fn log(&self, level: LogLevel, message: String) {
        self.send(LauncherEvent::Log {
            at: Utc::now(),
            level,
            message,
        });
    }

    pub fn info(&self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        error!("{}", message);
        self.log(LogLevel::Error, message);
    }

    pub fn status(&self, message: impl Into<String>) {
        self.send(LauncherEvent::Status {
            message: message.into(),
        });
    }

    pub fn progress(&self, label: &str, done: usize, total: usize) {
        self.send(LauncherEvent::Progress {
            label: label.to_string(),
            done,
            total,
        });
    }

    pub fn percent(&self, value: u8) {
        self.send(LauncherEvent::Percent {
            value: value.min(100),
        });
    }

    pub fn game_output(&self, line: String) {
        self.send(LauncherEvent::GameOutput { line });
    }

    pub fn state(&self, state: AttemptState) {
        self.send(LauncherEvent::State { state });
    }
}

/// Test helper: everything currently buffered in the receiver.
#[cfg(test)]
pub(crate) fn drain(rx: &mut mpsc::UnboundedReceiver<LauncherEvent>) -> Vec<LauncherEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Test helper: messages of all log events at `level`.
#[cfg(test)]
pub(crate) fn messages(events: &[LauncherEvent], level: LogLevel) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            LauncherEvent::Log {
                level: l, message, ..
            } if *l == level => Some(message.clone()),
            _ => None,
        })
        .collect()
}
