//! Registrations and the capability handles they carry.
//!
//! A [`Registration`] is one connector instance's claim on a context path.
//! The lifecycle manager builds it and owns it; the arbiter only keeps
//! `Arc` handles and writes ownership state through the two sinks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::SinkError;

// ─── Identity ─────────────────────────────────────────────────

/// One BPMN element declaring a context path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementRef {
    pub process_id: String,
    pub element_id: String,
}

impl ElementRef {
    pub fn new(process_id: impl Into<String>, element_id: impl Into<String>) -> Self {
        Self {
            process_id: process_id.into(),
            element_id: element_id.into(),
        }
    }
}

/// Identity of a registration.
///
/// A deduplicated connector definition can cover several elements, possibly
/// across processes. The first element is the primary one and backs the
/// `process_id()` / `element_id()` accessors. Registrations compare equal
/// when their identities do.
///
/// Serialize-only: identities are built through [`RegistrationIdentity::new`]
/// so the element list is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RegistrationIdentity {
    deduplication_id: String,
    elements: Vec<ElementRef>,
}

impl RegistrationIdentity {
    pub fn new(
        process_id: impl Into<String>,
        element_id: impl Into<String>,
        deduplication_id: impl Into<String>,
    ) -> Self {
        Self {
            deduplication_id: deduplication_id.into(),
            elements: vec![ElementRef::new(process_id, element_id)],
        }
    }

    /// Add another element covered by the same deduplicated definition.
    pub fn with_element(
        mut self,
        process_id: impl Into<String>,
        element_id: impl Into<String>,
    ) -> Self {
        self.elements.push(ElementRef::new(process_id, element_id));
        self
    }

    pub fn process_id(&self) -> &str {
        &self.elements[0].process_id
    }

    pub fn element_id(&self) -> &str {
        &self.elements[0].element_id
    }

    pub fn deduplication_id(&self) -> &str {
        &self.deduplication_id
    }

    pub fn elements(&self) -> &[ElementRef] {
        &self.elements
    }
}

impl fmt::Display for RegistrationIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) [{}]",
            self.process_id(),
            self.element_id(),
            self.deduplication_id
        )
    }
}

// ─── Sinks ────────────────────────────────────────────────────

/// Activity log severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Externally observable health channel of a registration.
///
/// Shared with the registration's owner, which may write unrelated health
/// updates through the same channel. Last write wins.
pub trait HealthSink: Send + Sync {
    fn up(&self, detail: Option<&str>) -> Result<(), SinkError>;
    fn down(&self, cause: &str) -> Result<(), SinkError>;
}

/// Activity log of a registration.
pub trait ActivitySink: Send + Sync {
    fn log(&self, severity: Severity, tag: &str, message: &str) -> Result<(), SinkError>;
}

// ─── Registration ─────────────────────────────────────────────

/// One connector instance's claim on a context path.
#[derive(Clone)]
pub struct Registration {
    identity: RegistrationIdentity,
    health: Arc<dyn HealthSink>,
    activity: Arc<dyn ActivitySink>,
}

impl Registration {
    pub fn new(
        identity: RegistrationIdentity,
        health: Arc<dyn HealthSink>,
        activity: Arc<dyn ActivitySink>,
    ) -> Self {
        Self {
            identity,
            health,
            activity,
        }
    }

    pub fn identity(&self) -> &RegistrationIdentity {
        &self.identity
    }

    pub fn health(&self) -> &dyn HealthSink {
        self.health.as_ref()
    }

    pub fn activity(&self) -> &dyn ActivitySink {
        self.activity.as_ref()
    }
}

impl PartialEq for Registration {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for Registration {}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}
