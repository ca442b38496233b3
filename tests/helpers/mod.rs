//! Shared fixtures for arbiter integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use inbound_context_arbiter::{
    ContextArbiter, ContextPath, MemoryActivity, MemoryHealth, Registration, RegistrationIdentity,
};

/// A registration plus handles on its recording sinks.
pub struct Connector {
    pub registration: Arc<Registration>,
    pub health: Arc<MemoryHealth>,
    pub activity: Arc<MemoryActivity>,
}

impl Connector {
    pub fn new(process_id: &str, element_id: &str) -> Self {
        Self::with_identity(RegistrationIdentity::new(
            process_id,
            element_id,
            format!("{}::{}", process_id, element_id),
        ))
    }

    pub fn with_identity(identity: RegistrationIdentity) -> Self {
        let health = Arc::new(MemoryHealth::new());
        let activity = Arc::new(MemoryActivity::new());
        let registration = Arc::new(Registration::new(
            identity,
            health.clone(),
            activity.clone(),
        ));
        Self {
            registration,
            health,
            activity,
        }
    }

    pub fn dedup_id(&self) -> &str {
        self.registration.identity().deduplication_id()
    }
}

pub fn path(raw: &str) -> ContextPath {
    ContextPath::new(raw).expect("test paths are non-empty")
}

/// Deduplication id of the current owner of `path`.
pub fn owner(arbiter: &ContextArbiter, path: &ContextPath) -> Option<String> {
    arbiter
        .get_active(path)
        .map(|r| r.identity().deduplication_id().to_string())
}

/// Deduplication ids in the standby queue of `path`, head first.
pub fn standby(arbiter: &ContextArbiter, path: &ContextPath) -> Vec<String> {
    arbiter
        .snapshot(path)
        .map(|snap| {
            snap.standby
                .iter()
                .map(|id| id.deduplication_id().to_string())
                .collect()
        })
        .unwrap_or_default()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,inbound_context_arbiter=debug".into()),
        )
        .with_test_writer()
        .try_init();
}
