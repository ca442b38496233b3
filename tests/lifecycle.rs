//! End-to-end registration lifecycles on a single arbiter.

mod helpers;

use helpers::{init_tracing, owner, path, standby, Connector};
use inbound_context_arbiter::diagnostics::{TAG_ACTIVATION, TAG_QUEUEING};
use inbound_context_arbiter::{
    ArbiterConfig, ArbiterError, ContextArbiter, HealthState, RegistrationIdentity,
    RegistrationOutcome, MAX_QUEUE_SIZE,
};

/// register A, B → A active, B down naming A; deregister A → B up; second
/// deregister A is a no-op.
#[test]
fn test_promotion_hands_path_to_waiting_registration() {
    init_tracing();
    let arbiter = ContextArbiter::default();
    let orders = path("/orders");
    let a = Connector::new("order-process", "Webhook_A");
    let b = Connector::new("order-process-v2", "Webhook_B");

    assert_eq!(
        arbiter.register(&orders, a.registration.clone()).unwrap(),
        RegistrationOutcome::Active
    );
    assert_eq!(
        arbiter.register(&orders, b.registration.clone()).unwrap(),
        RegistrationOutcome::Queued { position: 1 }
    );
    let cause = b.health.current();
    assert!(cause.is_down());
    assert!(cause
        .cause()
        .unwrap()
        .contains("process order-process(Webhook_A)"));

    arbiter.deregister(&orders, &a.registration);

    assert_eq!(owner(&arbiter, &orders).as_deref(), Some(b.dedup_id()));
    assert!(b.health.current().is_up());
    assert!(standby(&arbiter, &orders).is_empty());

    let snapshot_before = arbiter.snapshot(&orders);
    arbiter.deregister(&orders, &a.registration);
    assert_eq!(arbiter.snapshot(&orders), snapshot_before);
    assert_eq!(owner(&arbiter, &orders).as_deref(), Some(b.dedup_id()));
}

/// A, B, C → withdraw B (standby) → A still owns, C untouched → withdraw A →
/// C promoted → withdraw C → path free.
#[test]
fn test_full_lifecycle_with_early_standby_withdrawal() {
    init_tracing();
    let arbiter = ContextArbiter::default();
    let orders = path("/orders");
    let a = Connector::new("alpha", "A");
    let b = Connector::new("beta", "B");
    let c = Connector::new("gamma", "C");
    for conn in [&a, &b, &c] {
        arbiter.register(&orders, conn.registration.clone()).unwrap();
    }
    assert_eq!(standby(&arbiter, &orders), vec![b.dedup_id(), c.dedup_id()]);
    let c_writes = c.health.write_count();

    arbiter.deregister(&orders, &b.registration);

    assert_eq!(owner(&arbiter, &orders).as_deref(), Some(a.dedup_id()));
    assert_eq!(standby(&arbiter, &orders), vec![c.dedup_id()]);
    assert_eq!(c.health.write_count(), c_writes);

    arbiter.deregister(&orders, &a.registration);

    assert_eq!(owner(&arbiter, &orders).as_deref(), Some(c.dedup_id()));
    assert!(standby(&arbiter, &orders).is_empty());
    assert!(c.health.current().is_up());
    assert_eq!(c.activity.tags(), vec![TAG_QUEUEING, TAG_ACTIVATION]);

    arbiter.deregister(&orders, &c.registration);

    assert!(owner(&arbiter, &orders).is_none());
    assert!(arbiter.paths().is_empty());
    assert!(arbiter.snapshots().is_empty());
}

#[test]
fn test_eleventh_registration_is_rejected() {
    init_tracing();
    let arbiter = ContextArbiter::default();
    let orders = path("/orders");
    let connectors: Vec<_> = (0..=MAX_QUEUE_SIZE)
        .map(|i| Connector::new("order-process", &format!("Webhook_{}", i)))
        .collect();
    for conn in &connectors {
        arbiter.register(&orders, conn.registration.clone()).unwrap();
    }
    assert_eq!(standby(&arbiter, &orders).len(), MAX_QUEUE_SIZE);

    let late = Connector::new("order-process", "Webhook_late");
    let err = arbiter
        .register(&orders, late.registration.clone())
        .unwrap_err();

    assert!(matches!(
        err,
        ArbiterError::RegistrationRejected { capacity: 10, .. }
    ));
    assert_eq!(late.health.current(), HealthState::Unknown);
    assert_eq!(standby(&arbiter, &orders).len(), MAX_QUEUE_SIZE);

    // Capacity frees up once someone leaves; the caller may then re-register.
    arbiter.deregister(&orders, &connectors[0].registration);
    assert_eq!(
        arbiter.register(&orders, late.registration.clone()).unwrap(),
        RegistrationOutcome::Queued {
            position: MAX_QUEUE_SIZE
        }
    );
}

#[test]
fn test_configured_capacity_is_honoured() {
    let arbiter = ContextArbiter::new(ArbiterConfig::from_yaml_str("max_queue_size: 2").unwrap());
    let orders = path("/orders");
    let outcomes: Vec<_> = (0..4)
        .map(|i| {
            let conn = Connector::new("p", &format!("E{}", i));
            arbiter.register(&orders, conn.registration.clone())
        })
        .collect();

    assert_eq!(outcomes[0], Ok(RegistrationOutcome::Active));
    assert!(outcomes[0].as_ref().is_ok_and(RegistrationOutcome::is_active));
    assert!(!outcomes[1].as_ref().is_ok_and(RegistrationOutcome::is_active));
    assert_eq!(outcomes[2], Ok(RegistrationOutcome::Queued { position: 2 }));
    assert!(outcomes[3].is_err());
}

/// Every standby entry's Down cause follows the owner across promotions.
#[test]
fn test_down_causes_track_each_new_owner() {
    let arbiter = ContextArbiter::default();
    let orders = path("/orders");
    let conns: Vec<_> = ["one", "two", "three", "four"]
        .iter()
        .map(|p| Connector::new(p, "Start"))
        .collect();
    for conn in &conns {
        arbiter.register(&orders, conn.registration.clone()).unwrap();
    }

    arbiter.deregister(&orders, &conns[0].registration);
    for conn in &conns[2..] {
        assert_eq!(
            conn.health.current().cause(),
            Some("Context: /orders already in use by: process two(Start)")
        );
    }

    arbiter.deregister(&orders, &conns[1].registration);
    assert!(conns[2].health.current().is_up());
    assert_eq!(
        conns[3].health.current().cause(),
        Some("Context: /orders already in use by: process three(Start)")
    );
}

/// A deduplicated definition spanning several processes names each process
/// once; two elements of one process collapse to one entry.
#[test]
fn test_down_cause_for_multi_element_owner() {
    let arbiter = ContextArbiter::default();
    let orders = path("/orders");
    let owner_conn = Connector::with_identity(
        RegistrationIdentity::new("billing", "Catch_1", "shared-hook")
            .with_element("audit", "Catch_9")
            .with_element("billing", "Catch_2"),
    );
    let waiting = Connector::new("crm", "Start");

    arbiter
        .register(&orders, owner_conn.registration.clone())
        .unwrap();
    arbiter.register(&orders, waiting.registration.clone()).unwrap();

    assert_eq!(
        waiting.health.current().cause(),
        Some("Context: /orders already in use by: process audit(Catch_9), process billing(Catch_2)")
    );
}

#[test]
fn test_lookup_helpers_reflect_state() {
    let arbiter = ContextArbiter::default();
    let orders = path("/orders");
    let a = Connector::new("alpha", "A");
    let b = Connector::new("beta", "B");
    arbiter.register(&orders, a.registration.clone()).unwrap();
    arbiter.register(&orders, b.registration.clone()).unwrap();

    assert!(arbiter.is_registered(&orders, a.registration.identity()));
    assert_eq!(
        arbiter.status(&orders, b.registration.identity()),
        Some(RegistrationOutcome::Queued { position: 1 })
    );
    assert!(!arbiter.is_registered(&path("/ORDERS"), a.registration.identity()));

    let json = serde_json::to_value(arbiter.snapshot(&orders).unwrap()).unwrap();
    assert_eq!(json["path"], "/orders");
    assert_eq!(json["active"]["deduplication_id"], a.dedup_id());
    assert_eq!(json["standby"][0]["elements"][0]["process_id"], "beta");
}
