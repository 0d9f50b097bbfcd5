// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::Utc;
use flipledger::db;
use flipledger::engine::{new_partner, new_sale};
use flipledger::models::{LedgerSnapshot, Settlement};
use flipledger::store::{LedgerStore, MemoryStore, SqliteStore, StoreError};
use rusqlite::Connection;
use rust_decimal::Decimal;
use uuid::Uuid;

fn dec(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn sample_snapshot() -> LedgerSnapshot {
    let a = new_partner(&[], "Ana", dec("60")).unwrap();
    let b = new_partner(&[a.clone()], "Ben", dec("40")).unwrap();
    let sale1 = new_sale(
        "Console",
        Some("mint in box".into()),
        dec("110"),
        dec("210.50"),
        vec![a.id, b.id],
    )
    .unwrap();
    let sale2 = new_sale("Lamp", None, dec("4"), dec("9"), vec![a.id]).unwrap();
    let settlement = Settlement {
        id: Uuid::new_v4(),
        partner_id: a.id,
        amount: dec("12.34"),
        created_at: Utc::now(),
    };
    LedgerSnapshot {
        sales: vec![sale1, sale2],
        partners: vec![a, b],
        settlements: vec![settlement],
    }
}

#[test]
fn load_unknown_owner_is_not_found() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let err = store.load("nobody").unwrap_err();
    assert!(matches!(err, StoreError::NotFound(owner) if owner == "nobody"));
}

#[test]
fn save_then_load_round_trips() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    let snapshot = sample_snapshot();

    store.save("alice", &snapshot).unwrap();
    let loaded = store.load("alice").unwrap();

    assert_eq!(loaded.sales.len(), 2);
    assert_eq!(loaded.partners.len(), 2);
    assert_eq!(loaded.settlements.len(), 1);

    // insertion order and every field survive the trip
    for (loaded, original) in loaded.sales.iter().zip(&snapshot.sales) {
        assert_eq!(loaded.id, original.id);
        assert_eq!(loaded.name, original.name);
        assert_eq!(loaded.description, original.description);
        assert_eq!(loaded.purchase_price, original.purchase_price);
        assert_eq!(loaded.sold_price, original.sold_price);
        assert_eq!(loaded.profit, original.profit);
        assert_eq!(loaded.partner_ids, original.partner_ids);
    }
    for (loaded, original) in loaded.partners.iter().zip(&snapshot.partners) {
        assert_eq!(loaded.id, original.id);
        assert_eq!(loaded.name, original.name);
        assert_eq!(loaded.percentage, original.percentage);
    }
    assert_eq!(loaded.settlements[0].id, snapshot.settlements[0].id);
    assert_eq!(loaded.settlements[0].partner_id, snapshot.settlements[0].partner_id);
    assert_eq!(loaded.settlements[0].amount, dec("12.34"));
}

#[test]
fn save_replaces_prior_collections() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    store.save("alice", &sample_snapshot()).unwrap();

    let smaller = LedgerSnapshot {
        sales: vec![],
        partners: vec![new_partner(&[], "Cara", dec("10")).unwrap()],
        settlements: vec![],
    };
    store.save("alice", &smaller).unwrap();

    let loaded = store.load("alice").unwrap();
    assert!(loaded.sales.is_empty());
    assert!(loaded.settlements.is_empty());
    assert_eq!(loaded.partners.len(), 1);
    assert_eq!(loaded.partners[0].name, "Cara");

    // no stale sale/partner link rows survive the replace
    let links: i64 = conn
        .query_row("SELECT COUNT(*) FROM sale_partners", [], |r| r.get(0))
        .unwrap();
    assert_eq!(links, 0);
}

#[test]
fn owners_are_isolated() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    store.save("alice", &sample_snapshot()).unwrap();
    store.save("bob", &LedgerSnapshot::default()).unwrap();

    let alice = store.load("alice").unwrap();
    let bob = store.load("bob").unwrap();
    assert_eq!(alice.partners.len(), 2);
    assert!(bob.partners.is_empty());
    assert!(bob.sales.is_empty());
}

#[test]
fn saving_empty_snapshot_registers_owner() {
    let conn = setup();
    let store = SqliteStore::new(&conn);
    store.save("fresh", &LedgerSnapshot::default()).unwrap();
    let loaded = store.load("fresh").unwrap();
    assert_eq!(loaded, LedgerSnapshot::default());
}

#[test]
fn memory_store_round_trips_and_isolates() {
    let store = MemoryStore::new();
    assert!(matches!(
        store.load("alice").unwrap_err(),
        StoreError::NotFound(_)
    ));

    let snapshot = sample_snapshot();
    store.save("alice", &snapshot).unwrap();
    let loaded = store.load("alice").unwrap();
    assert_eq!(loaded, snapshot);

    assert!(matches!(
        store.load("bob").unwrap_err(),
        StoreError::NotFound(_)
    ));
}
