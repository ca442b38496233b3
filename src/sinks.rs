//! Ready-made sink implementations.
//!
//! `MemoryHealth` and `MemoryActivity` keep everything written to them and
//! are what the tests (and local tooling) inspect. `TracingActivity` forwards
//! activity entries to `tracing` for deployments without an activity store.

use parking_lot::Mutex;
use serde::Serialize;

use crate::error::SinkError;
use crate::registration::{ActivitySink, HealthSink, Severity};

// ─── Health ───────────────────────────────────────────────────

/// Last reported health of a registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum HealthState {
    Unknown,
    Up { detail: Option<String> },
    Down { cause: String },
}

impl HealthState {
    pub fn is_up(&self) -> bool {
        matches!(self, Self::Up { .. })
    }

    pub fn is_down(&self) -> bool {
        matches!(self, Self::Down { .. })
    }

    /// Down cause, if the state is `Down`.
    pub fn cause(&self) -> Option<&str> {
        match self {
            Self::Down { cause } => Some(cause),
            _ => None,
        }
    }
}

/// In-memory health sink that records every write.
pub struct MemoryHealth {
    history: Mutex<Vec<HealthState>>,
}

impl MemoryHealth {
    pub fn new() -> Self {
        Self {
            history: Mutex::new(Vec::new()),
        }
    }

    /// Most recent state, `Unknown` if nothing was written yet.
    pub fn current(&self) -> HealthState {
        self.history
            .lock()
            .last()
            .cloned()
            .unwrap_or(HealthState::Unknown)
    }

    pub fn history(&self) -> Vec<HealthState> {
        self.history.lock().clone()
    }

    pub fn write_count(&self) -> usize {
        self.history.lock().len()
    }
}

impl Default for MemoryHealth {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthSink for MemoryHealth {
    fn up(&self, detail: Option<&str>) -> Result<(), SinkError> {
        self.history.lock().push(HealthState::Up {
            detail: detail.map(str::to_string),
        });
        Ok(())
    }

    fn down(&self, cause: &str) -> Result<(), SinkError> {
        self.history.lock().push(HealthState::Down {
            cause: cause.to_string(),
        });
        Ok(())
    }
}

// ─── Activity ─────────────────────────────────────────────────

/// One activity log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    pub severity: Severity,
    pub tag: String,
    pub message: String,
}

/// In-memory activity sink that records every entry.
pub struct MemoryActivity {
    entries: Mutex<Vec<ActivityEntry>>,
}

impl MemoryActivity {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.entries.lock().clone()
    }

    /// Tags in the order they were logged.
    pub fn tags(&self) -> Vec<String> {
        self.entries.lock().iter().map(|e| e.tag.clone()).collect()
    }
}

impl Default for MemoryActivity {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivitySink for MemoryActivity {
    fn log(&self, severity: Severity, tag: &str, message: &str) -> Result<(), SinkError> {
        self.entries.lock().push(ActivityEntry {
            severity,
            tag: tag.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}

/// Activity sink that emits each entry as a `tracing` event.
#[derive(Debug, Clone, Default)]
pub struct TracingActivity {
    source: String,
}

impl TracingActivity {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl ActivitySink for TracingActivity {
    fn log(&self, severity: Severity, tag: &str, message: &str) -> Result<(), SinkError> {
        let source = self.source.as_str();
        match severity {
            Severity::Debug => tracing::debug!(source, tag, "{}", message),
            Severity::Info => tracing::info!(source, tag, "{}", message),
            Severity::Warning => tracing::warn!(source, tag, "{}", message),
            Severity::Error => tracing::error!(source, tag, "{}", message),
        }
        Ok(())
    }
}
