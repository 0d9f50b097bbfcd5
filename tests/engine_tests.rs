// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::Utc;
use flipledger::engine::{
    ValidationError, apply_partner_deletion, compute_balances, new_partner, new_sale,
    new_settlement,
};
use flipledger::models::{Partner, Sale, Settlement};
use rust_decimal::Decimal;
use uuid::Uuid;

fn dec(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

fn partner(name: &str, percent: &str) -> Partner {
    Partner {
        id: Uuid::new_v4(),
        name: name.into(),
        percentage: dec(percent),
    }
}

fn sale(name: &str, bought: &str, sold: &str, partner_ids: Vec<Uuid>) -> Sale {
    new_sale(name, None, dec(bought), dec(sold), partner_ids).unwrap()
}

fn settlement(partner_id: Uuid, amount: &str) -> Settlement {
    Settlement {
        id: Uuid::new_v4(),
        partner_id,
        amount: dec(amount),
        created_at: Utc::now(),
    }
}

#[test]
fn balances_split_profit_by_percentage() {
    let a = partner("A", "60");
    let b = partner("B", "40");
    let s = sale("Console", "0", "100", vec![a.id, b.id]);

    let balances = compute_balances(&[s], &[a.clone(), b.clone()], &[]);
    assert_eq!(balances[&a.id], dec("60"));
    assert_eq!(balances[&b.id], dec("40"));
}

#[test]
fn partners_without_activity_appear_at_zero() {
    let a = partner("A", "25");
    let balances = compute_balances(&[], &[a.clone()], &[]);
    assert_eq!(balances.len(), 1);
    assert_eq!(balances[&a.id], Decimal::ZERO);
}

#[test]
fn balances_ignore_references_to_missing_partners() {
    let a = partner("A", "50");
    let gone = Uuid::new_v4();
    let s = sale("Lamp", "10", "30", vec![a.id, gone]);
    // settlement for a partner that no longer exists is a defined no-op
    let stray = settlement(gone, "5");

    let balances = compute_balances(&[s], &[a.clone()], &[stray]);
    assert_eq!(balances.len(), 1);
    assert_eq!(balances[&a.id], dec("10"));
}

#[test]
fn balances_are_invariant_under_input_permutation() {
    let a = partner("A", "60");
    let b = partner("B", "40");
    let sales = vec![
        sale("One", "0", "100", vec![a.id, b.id]),
        sale("Two", "10", "40", vec![a.id]),
        sale("Three", "5", "10", vec![b.id]),
    ];
    let settlements = vec![
        settlement(a.id, "20"),
        settlement(b.id, "10"),
        settlement(a.id, "1.50"),
    ];
    let partners = vec![a, b];

    let forward = compute_balances(&sales, &partners, &settlements);

    let mut sales_rev = sales.clone();
    sales_rev.reverse();
    let mut settlements_rev = settlements.clone();
    settlements_rev.reverse();
    let mut partners_rev = partners.clone();
    partners_rev.reverse();

    let backward = compute_balances(&sales_rev, &partners_rev, &settlements_rev);
    assert_eq!(forward, backward);

    let mut sales_rot = sales.clone();
    sales_rot.rotate_left(1);
    let rotated = compute_balances(&sales_rot, &partners, &settlements);
    assert_eq!(forward, rotated);
}

#[test]
fn partner_validation_rejects_bad_input() {
    assert_eq!(new_partner(&[], "", dec("10")), Err(ValidationError::InvalidName));
    assert_eq!(new_partner(&[], "   ", dec("10")), Err(ValidationError::InvalidName));
    assert_eq!(
        new_partner(&[], "A", Decimal::ZERO),
        Err(ValidationError::InvalidPercentage)
    );
    assert_eq!(
        new_partner(&[], "A", dec("-5")),
        Err(ValidationError::InvalidPercentage)
    );
    assert_eq!(
        new_partner(&[], "A", dec("100.01")),
        Err(ValidationError::InvalidPercentage)
    );
}

#[test]
fn partner_allocation_boundary() {
    let a = new_partner(&[], "A", dec("60")).unwrap();
    let existing = vec![a];

    // exactly filling the ceiling is fine
    let b = new_partner(&existing, "B", dec("40")).unwrap();
    assert_eq!(b.percentage, dec("40"));
    let existing = vec![existing[0].clone(), b];

    // one basis point over is not
    let err = new_partner(&existing, "C", dec("0.01")).unwrap_err();
    assert_eq!(
        err,
        ValidationError::AllocationExceeded { current: dec("100") }
    );
    // the rejection reports the current total so callers can show it
    assert!(err.to_string().contains("100"));
}

#[test]
fn adding_partner_over_full_allocation_fails() {
    let a = new_partner(&[], "A", dec("60")).unwrap();
    let b = new_partner(&[a.clone()], "B", dec("40")).unwrap();
    let err = new_partner(&[a, b], "C", dec("50")).unwrap_err();
    assert!(matches!(err, ValidationError::AllocationExceeded { .. }));
}

#[test]
fn sale_profit_is_derived_from_prices() {
    let s = new_sale("Bike", Some("road bike".into()), dec("110"), dec("150.50"), vec![]).unwrap();
    assert_eq!(s.profit, dec("40.50"));
    assert_eq!(s.description.as_deref(), Some("road bike"));
}

#[test]
fn sale_validation_rejects_bad_input() {
    assert_eq!(
        new_sale("", None, dec("1"), dec("2"), vec![]),
        Err(ValidationError::InvalidName)
    );
    assert_eq!(
        new_sale("X", None, dec("-1"), dec("2"), vec![]),
        Err(ValidationError::InvalidPrice)
    );
    assert_eq!(
        new_sale("X", None, dec("1"), dec("-2"), vec![]),
        Err(ValidationError::InvalidPrice)
    );
    // finer than minor-unit precision
    assert_eq!(
        new_sale("X", None, dec("1.005"), dec("2"), vec![]),
        Err(ValidationError::InvalidPrice)
    );
    assert_eq!(
        new_sale("X", None, dec("10"), dec("9.99"), vec![]),
        Err(ValidationError::InvalidMargin)
    );
}

#[test]
fn sale_deduplicates_partner_ids() {
    let id = Uuid::new_v4();
    let other = Uuid::new_v4();
    let s = new_sale("X", None, dec("0"), dec("10"), vec![id, other, id]).unwrap();
    assert_eq!(s.partner_ids, vec![id, other]);
}

#[test]
fn zero_margin_sale_is_allowed() {
    let s = new_sale("Breakeven", None, dec("25"), dec("25"), vec![]).unwrap();
    assert_eq!(s.profit, Decimal::ZERO);
}

#[test]
fn settlement_validation_enforces_amount_and_ceiling() {
    let a = partner("A", "60");

    assert_eq!(
        new_settlement(&a, dec("60"), Decimal::ZERO),
        Err(ValidationError::InvalidAmount)
    );
    assert_eq!(
        new_settlement(&a, dec("60"), dec("-3")),
        Err(ValidationError::InvalidAmount)
    );
    assert_eq!(
        new_settlement(&a, dec("60"), dec("1.999")),
        Err(ValidationError::InvalidAmount)
    );

    let err = new_settlement(&a, dec("60"), dec("60.01")).unwrap_err();
    assert_eq!(err, ValidationError::ExceedsOwed { owed: dec("60.00") });
    assert!(err.to_string().contains("60.00"));

    // settling the full balance is allowed
    let s = new_settlement(&a, dec("60"), dec("60")).unwrap();
    assert_eq!(s.amount, dec("60"));
    assert_eq!(s.partner_id, a.id);
}

#[test]
fn settlement_decreases_balance_by_exactly_its_amount() {
    let a = partner("A", "60");
    let b = partner("B", "40");
    let s = sale("Console", "0", "100", vec![a.id, b.id]);
    let partners = vec![a.clone(), b.clone()];

    let before = compute_balances(std::slice::from_ref(&s), &partners, &[]);
    let paid = new_settlement(&a, before[&a.id], dec("30")).unwrap();
    let after = compute_balances(&[s], &partners, &[paid]);

    assert_eq!(after[&a.id], before[&a.id] - dec("30"));
    assert_eq!(after[&b.id], before[&b.id]);
}

#[test]
fn deletion_cascades_and_is_idempotent() {
    let a = partner("A", "60");
    let b = partner("B", "40");
    let shared = sale("Console", "0", "100", vec![a.id, b.id]);
    let solo = sale("Lamp", "5", "20", vec![a.id]);
    let sales = vec![shared.clone(), solo.clone()];
    let settlements = vec![settlement(a.id, "10"), settlement(b.id, "15")];
    let partners = vec![a.clone(), b.clone()];

    let (sales, settlements, partners) =
        apply_partner_deletion(sales, settlements, partners, b.id);

    assert_eq!(partners.len(), 1);
    assert_eq!(partners[0].id, a.id);
    assert_eq!(settlements.len(), 1);
    assert_eq!(settlements[0].partner_id, a.id);
    assert_eq!(sales[0].partner_ids, vec![a.id]);
    // the untouched sale keeps all of its fields
    assert_eq!(sales[1], solo);

    // deleting an already-deleted id is a no-op, not an error
    let (sales2, settlements2, partners2) =
        apply_partner_deletion(sales.clone(), settlements.clone(), partners.clone(), b.id);
    assert_eq!(sales2, sales);
    assert_eq!(settlements2, settlements);
    assert_eq!(partners2, partners);
}

#[test]
fn worked_example_settles_and_cascades() {
    // partner A (60%), partner B (40%); $100 profit assigned to both
    let a = new_partner(&[], "A", dec("60")).unwrap();
    let b = new_partner(&[a.clone()], "B", dec("40")).unwrap();
    let partners = vec![a.clone(), b.clone()];
    let s = sale("Flip", "50", "150", vec![a.id, b.id]);
    let sales = vec![s];

    let balances = compute_balances(&sales, &partners, &[]);
    assert_eq!(balances[&a.id], dec("60"));
    assert_eq!(balances[&b.id], dec("40"));

    // $30 settlement to A
    let paid = new_settlement(&a, balances[&a.id], dec("30")).unwrap();
    let settlements = vec![paid];
    let balances = compute_balances(&sales, &partners, &settlements);
    assert_eq!(balances[&a.id], dec("30"));
    assert_eq!(balances[&b.id], dec("40"));

    // settling $50 to A now exceeds what is owed
    let err = new_settlement(&a, balances[&a.id], dec("50")).unwrap_err();
    assert!(matches!(err, ValidationError::ExceedsOwed { .. }));

    // deleting B removes B's settlements and B's id from the sale
    let (sales, settlements, partners) =
        apply_partner_deletion(sales, settlements, partners, b.id);
    assert_eq!(sales[0].partner_ids, vec![a.id]);
    let balances = compute_balances(&sales, &partners, &settlements);
    assert_eq!(balances.len(), 1);
    assert_eq!(balances[&a.id], dec("30"));
}
