//! Diagnostic sink injected into agents and the simulator.
//!
//! The state, evolution and metrics code never logs; agents and the
//! simulator report through a [`Logger`]. Swapping in [`NullLogger`] must
//! never change simulation outcomes.

use std::fmt;
use std::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Severity of a diagnostic line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    /// Progress information.
    Info,
    /// Recoverable data problems (a basis decoded to its default, a skipped character).
    Warn,
    /// Failures that aborted a run.
    Error,
    /// A run met its expectations.
    Success,
    /// Per-basis detail, only emitted in verbose mode.
    Debug,
    /// Lifecycle events of agents and scenarios.
    System,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Success => "success",
            LogLevel::Debug => "debug",
            LogLevel::System => "system",
        };
        write!(f, "{}", name)
    }
}

/// Logging collaborator.
pub trait Logger: Send + Sync {
    /// Records one message.
    fn log(&self, level: LogLevel, message: &str);
}

/// Forwards to the `tracing` macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Info => info!("{}", message),
            LogLevel::Warn => warn!("{}", message),
            LogLevel::Error => error!("{}", message),
            LogLevel::Success => info!(kind = "success", "{}", message),
            LogLevel::Debug => debug!("{}", message),
            LogLevel::System => info!(kind = "system", "{}", message),
        }
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: LogLevel, _message: &str) {}
}

/// Keeps every entry in memory so callers can inspect what was reported.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLogger {
    /// Creates an empty logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded entries.
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        match self.entries.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of entries recorded at `level`.
    pub fn count(&self, level: LogLevel) -> usize {
        self.entries().iter().filter(|(l, _)| *l == level).count()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: LogLevel, message: &str) {
        let mut guard = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push((level, message.to_string()));
    }
}
