//! Inbound context arbitration.
//!
//! Several connector registrations (different versions of a process, or
//! different processes) can declare the same inbound webhook context path.
//! [`ContextArbiter`] lets exactly one of them serve the path at a time,
//! keeps the rest in a bounded FIFO standby queue, promotes the oldest
//! standby when the owner leaves, and reports ownership through each
//! registration's health and activity sinks.
//!
//! ```text
//! register(A) → A active          health(A) = Up
//! register(B) → B queued #1       health(B) = Down("Context: … already in use by: …")
//! register(C) → C queued #2
//! deregister(A) → B active        health(B) = Up, health(C) = Down(… B …)
//! ```
//!
//! State is in-memory only and rebuilt by the lifecycle manager replaying
//! activations on start.

pub mod arbiter;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod path;
pub mod registration;
pub mod sinks;
pub mod slot;
pub mod standby;

pub use arbiter::{ContextArbiter, RegistrationOutcome};
pub use config::ArbiterConfig;
pub use error::{ArbiterError, ConfigError, PathError, SinkError};
pub use path::ContextPath;
pub use registration::{
    ActivitySink, ElementRef, HealthSink, Registration, RegistrationIdentity, Severity,
};
pub use sinks::{ActivityEntry, HealthState, MemoryActivity, MemoryHealth, TracingActivity};
pub use slot::SlotSnapshot;
pub use standby::MAX_QUEUE_SIZE;
