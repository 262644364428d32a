//! Form schema activation invariant tests
//!
//! Test Categories:
//! 1. Single active version under sequences of create/activate/remove
//! 2. Activation idempotence
//! 3. Concurrent activation from separate connections
//! 4. Create/get round-trip and get_active boundaries

use std::sync::{Arc, Barrier};
use std::thread;

use serde_json::json;
use tempfile::TempDir;

use entrydesk::db::Database;
use entrydesk::form_schema::{ActiveVersionStore, FormSchemaError, FormSchemaPatch, NewFormSchema};

fn open_store() -> (TempDir, ActiveVersionStore) {
    let temp = TempDir::new().unwrap();
    let db = Database::open(temp.path().join("entrydesk.db")).unwrap();
    (temp, ActiveVersionStore::new(db))
}

fn new_schema(name: &str) -> NewFormSchema {
    NewFormSchema {
        name: name.to_string(),
        description: format!("{} description", name),
        schema: json!({ "fields": [{ "name": "team", "type": "text" }] }),
    }
}

// =============================================================================
// SINGLE ACTIVE VERSION
// =============================================================================

/// The v1/v2 scenario: activating v2 deactivates v1.
#[test]
fn test_activating_second_version_replaces_first() {
    let (_temp, store) = open_store();

    let v1 = store.create(new_schema("v1")).unwrap();
    let v2 = store.create(new_schema("v2")).unwrap();
    assert!(!v1.active);
    assert!(!v2.active);

    store.activate(v1.id).unwrap();
    assert_eq!(store.get_active().unwrap().id, v1.id);

    let activated = store.activate(v2.id).unwrap();
    assert!(activated.active);
    assert_eq!(store.get_active().unwrap().id, v2.id);
    assert!(!store.get(v1.id).unwrap().active);
    assert_eq!(store.active_count().unwrap(), 1);
}

/// At most one active row after any mixed sequence of operations.
#[test]
fn test_zero_or_one_active_across_sequence() {
    let (_temp, store) = open_store();
    let mut ids = Vec::new();

    for round in 0..12 {
        match round % 4 {
            0 | 1 => ids.push(store.create(new_schema(&format!("s{}", round))).unwrap().id),
            2 => {
                let target = ids[round % ids.len()];
                store.activate(target).unwrap();
            }
            _ => {
                let victim = ids.remove(0);
                store.remove(victim).unwrap();
            }
        }
        assert!(store.active_count().unwrap() <= 1, "round {}", round);
    }
}

#[test]
fn test_removing_active_leaves_none() {
    let (_temp, store) = open_store();
    let v1 = store.create(new_schema("v1")).unwrap();
    store.activate(v1.id).unwrap();

    store.remove(v1.id).unwrap();

    assert!(matches!(store.get_active(), Err(FormSchemaError::NoActiveVersion)));
    assert_eq!(store.active_count().unwrap(), 0);
}

#[test]
fn test_activate_missing_keeps_current() {
    let (_temp, store) = open_store();
    let v1 = store.create(new_schema("v1")).unwrap();
    store.activate(v1.id).unwrap();

    assert!(matches!(store.activate(999), Err(FormSchemaError::NotFound(999))));
    assert_eq!(store.get_active().unwrap().id, v1.id);
}

// =============================================================================
// IDEMPOTENCE
// =============================================================================

#[test]
fn test_activate_is_idempotent() {
    let (_temp, store) = open_store();
    let v1 = store.create(new_schema("v1")).unwrap();
    let _v2 = store.create(new_schema("v2")).unwrap();

    let first = store.activate(v1.id).unwrap();
    let second = store.activate(v1.id).unwrap();

    assert!(first.active && second.active);
    assert_eq!(store.get_active().unwrap().id, v1.id);
    assert_eq!(store.active_count().unwrap(), 1);
}

/// Content updates never change which version is active.
#[test]
fn test_update_does_not_touch_active_flag() {
    let (_temp, store) = open_store();
    let v1 = store.create(new_schema("v1")).unwrap();
    let v2 = store.create(new_schema("v2")).unwrap();
    store.activate(v1.id).unwrap();

    let patch: FormSchemaPatch =
        serde_json::from_value(json!({ "name": "v2-renamed", "active": true })).unwrap();
    let updated = store.update(v2.id, patch).unwrap();

    assert_eq!(updated.name, "v2-renamed");
    assert!(!updated.active);
    assert_eq!(store.get_active().unwrap().id, v1.id);
}

// =============================================================================
// CONCURRENCY
// =============================================================================

/// Two threads, two connections, activating different versions at once.
#[test]
fn test_concurrent_activation_leaves_exactly_one() {
    let (_temp, store) = open_store();
    let a = store.create(new_schema("a")).unwrap().id;
    let b = store.create(new_schema("b")).unwrap().id;

    for _ in 0..10 {
        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = [a, b]
            .into_iter()
            .map(|id| {
                let store = store.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    store.activate(id)
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let active = store.get_active().unwrap();
        assert!(active.id == a || active.id == b);
        assert_eq!(store.active_count().unwrap(), 1);
    }
}

// =============================================================================
// ROUND-TRIP AND BOUNDARIES
// =============================================================================

#[test]
fn test_create_get_round_trip() {
    let (_temp, store) = open_store();
    let created = store.create(new_schema("entry-form")).unwrap();

    let fetched = store.get(created.id).unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.schema["fields"][0]["name"], "team");
}

#[test]
fn test_get_active_on_empty_store() {
    let (_temp, store) = open_store();
    assert!(matches!(store.get_active(), Err(FormSchemaError::NoActiveVersion)));

    store.create(new_schema("inactive")).unwrap();
    assert!(matches!(store.get_active(), Err(FormSchemaError::NoActiveVersion)));
}

#[test]
fn test_ids_not_reused_after_remove() {
    let (_temp, store) = open_store();
    let first = store.create(new_schema("one")).unwrap().id;
    store.remove(first).unwrap();
    let second = store.create(new_schema("two")).unwrap().id;
    assert!(second > first);
}

#[test]
fn test_list_ordered_by_id() {
    let (_temp, store) = open_store();
    for name in ["a", "b", "c"] {
        store.create(new_schema(name)).unwrap();
    }
    let names: Vec<_> = store.list().unwrap().into_iter().map(|v| v.name).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}
