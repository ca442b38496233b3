//! Ownership diagnostics written to registration sinks.
//!
//! Every write here is best-effort: a failing sink is logged at `warn` and
//! never interrupts a registration or promotion.

use std::collections::BTreeMap;

use crate::path::ContextPath;
use crate::registration::{Registration, Severity};

pub const TAG_ACTIVATION: &str = "Activation";
pub const TAG_QUEUEING: &str = "Queueing";

/// Down cause attached to every standby registration.
///
/// ```text
/// Context: <path> already in use by: process <processId>(<elementId>)[, ...]
/// ```
///
/// Pairs come from the active registration's elements, sorted by process id.
/// Elements of the same process collapse to one entry and the last one wins,
/// so a process competing with several elements is only named once.
pub fn already_in_use_message(path: &ContextPath, active: &Registration) -> String {
    let mut element_by_process: BTreeMap<&str, &str> = BTreeMap::new();
    for element in active.identity().elements() {
        element_by_process.insert(&element.process_id, &element.element_id);
    }

    let owners = element_by_process
        .iter()
        .map(|(process_id, element_id)| format!("process {}({})", process_id, element_id))
        .collect::<Vec<_>>()
        .join(", ");

    format!("Context: {} already in use by: {}", path, owners)
}

pub fn activation_message(path: &ContextPath) -> String {
    format!(
        "Path \"{}\" is now available. Registration has been activated.",
        path
    )
}

pub fn queueing_message(path: &ContextPath) -> String {
    format!(
        "Context path \"{}\" is already in use. Registration queued in standby and will be \
         activated when the path becomes available.",
        path
    )
}

/// Mark a registration as the active owner: activity entry, then health Up.
pub(crate) fn announce_activation(path: &ContextPath, registration: &Registration) {
    log_activity(path, registration, TAG_ACTIVATION, &activation_message(path));
    if let Err(e) = registration.health().up(None) {
        tracing::warn!(
            path = %path,
            registration = %registration.identity(),
            error = %e,
            "Failed to report health up"
        );
    }
}

/// Mark a registration as standby behind `active`: activity entry, then health Down.
pub(crate) fn announce_queued(path: &ContextPath, registration: &Registration, active: &Registration) {
    log_activity(path, registration, TAG_QUEUEING, &queueing_message(path));
    report_down(path, registration, &already_in_use_message(path, active));
}

/// Point every standby registration's Down cause at the current owner.
pub(crate) fn refresh_standby<'a>(
    path: &ContextPath,
    active: &Registration,
    standby: impl IntoIterator<Item = &'a std::sync::Arc<Registration>>,
) {
    let cause = already_in_use_message(path, active);
    for registration in standby {
        report_down(path, registration, &cause);
    }
}

fn report_down(path: &ContextPath, registration: &Registration, cause: &str) {
    if let Err(e) = registration.health().down(cause) {
        tracing::warn!(
            path = %path,
            registration = %registration.identity(),
            error = %e,
            "Failed to report health down"
        );
    }
}

fn log_activity(path: &ContextPath, registration: &Registration, tag: &str, message: &str) {
    if let Err(e) = registration.activity().log(Severity::Info, tag, message) {
        tracing::warn!(
            path = %path,
            registration = %registration.identity(),
            tag,
            error = %e,
            "Failed to write activity entry"
        );
    }
}
