// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Settlement engine: pure computation and validation over one owner's
//! snapshot. No I/O happens here; callers load a snapshot, run these
//! functions, and persist the result.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Partner, Sale, Settlement};

/// Partner percentages for one owner may never sum past this.
pub const MAX_ALLOCATION: Decimal = Decimal::ONE_HUNDRED;

/// Validation failures returned to the caller as values. None of these leave
/// any state mutated.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("name must not be empty")]
    InvalidName,
    #[error("percentage must be greater than 0 and at most 100")]
    InvalidPercentage,
    #[error("allocation would exceed 100% (partners currently total {current}%)")]
    AllocationExceeded { current: Decimal },
    #[error("price must be non-negative with at most two decimal places")]
    InvalidPrice,
    #[error("sold price must not be below purchase price")]
    InvalidMargin,
    #[error("amount must be positive with at most two decimal places")]
    InvalidAmount,
    #[error("amount exceeds owed balance of {owed:.2}")]
    ExceedsOwed { owed: Decimal },
}

/// Sum of all partner percentages.
pub fn total_allocation(partners: &[Partner]) -> Decimal {
    partners.iter().map(|p| p.percentage).sum()
}

// Money enters the system at minor-unit precision; anything finer is a
// caller mistake, not something to round away silently.
fn minor_unit_scale(amount: Decimal) -> bool {
    amount.normalize().scale() <= 2
}

/// Computes every partner's owed balance: their percentage of each sale they
/// are assigned to, minus everything already settled to them.
///
/// Partners with no activity appear with a zero balance. Sale references to
/// partners that no longer exist contribute nothing, and settlements whose
/// partner is gone are a defined no-op. Input order does not affect the
/// result.
pub fn compute_balances(
    sales: &[Sale],
    partners: &[Partner],
    settlements: &[Settlement],
) -> HashMap<Uuid, Decimal> {
    let mut balances: HashMap<Uuid, Decimal> =
        partners.iter().map(|p| (p.id, Decimal::ZERO)).collect();
    let shares: HashMap<Uuid, Decimal> =
        partners.iter().map(|p| (p.id, p.percentage)).collect();

    for sale in sales {
        for partner_id in &sale.partner_ids {
            if let Some(percentage) = shares.get(partner_id).copied() {
                if let Some(balance) = balances.get_mut(partner_id) {
                    *balance += sale.profit * percentage / Decimal::ONE_HUNDRED;
                }
            }
        }
    }
    for settlement in settlements {
        if let Some(balance) = balances.get_mut(&settlement.partner_id) {
            *balance -= settlement.amount;
        }
    }
    balances
}

/// Validates and builds a new partner against the existing set.
///
/// The 100% allocation ceiling is enforced here and only here; it is not
/// re-validated when deletions later free room.
pub fn new_partner(
    existing: &[Partner],
    name: &str,
    percentage: Decimal,
) -> Result<Partner, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::InvalidName);
    }
    if percentage <= Decimal::ZERO || percentage > MAX_ALLOCATION {
        return Err(ValidationError::InvalidPercentage);
    }
    let current = total_allocation(existing);
    if current + percentage > MAX_ALLOCATION {
        return Err(ValidationError::AllocationExceeded { current });
    }
    Ok(Partner {
        id: Uuid::new_v4(),
        name: name.to_string(),
        percentage,
    })
}

/// Validates and builds a new sale. Profit is derived here, once, and is
/// non-negative by construction.
pub fn new_sale(
    name: &str,
    description: Option<String>,
    purchase_price: Decimal,
    sold_price: Decimal,
    partner_ids: Vec<Uuid>,
) -> Result<Sale, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::InvalidName);
    }
    if purchase_price < Decimal::ZERO
        || sold_price < Decimal::ZERO
        || !minor_unit_scale(purchase_price)
        || !minor_unit_scale(sold_price)
    {
        return Err(ValidationError::InvalidPrice);
    }
    if sold_price < purchase_price {
        return Err(ValidationError::InvalidMargin);
    }

    let mut ids = Vec::with_capacity(partner_ids.len());
    for id in partner_ids {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    let description = description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    Ok(Sale {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description,
        purchase_price,
        sold_price,
        profit: sold_price - purchase_price,
        created_at: Utc::now(),
        partner_ids: ids,
    })
}

/// Validates and builds a settlement against the partner's current balance.
/// The amount is recorded exactly as validated.
pub fn new_settlement(
    partner: &Partner,
    current_balance: Decimal,
    amount: Decimal,
) -> Result<Settlement, ValidationError> {
    if amount <= Decimal::ZERO || !minor_unit_scale(amount) {
        return Err(ValidationError::InvalidAmount);
    }
    if amount > current_balance {
        return Err(ValidationError::ExceedsOwed {
            owed: current_balance.round_dp(2),
        });
    }
    Ok(Settlement {
        id: Uuid::new_v4(),
        partner_id: partner.id,
        amount,
        created_at: Utc::now(),
    })
}

/// Removes a partner and everything that references them: their settlements
/// are dropped, and their id is stripped from each sale's partner list.
///
/// The whole cascade is one value-level step, so callers persist either all
/// of it or none of it. Sales that never referenced the partner pass through
/// untouched. Deleting an id that is already gone changes nothing.
pub fn apply_partner_deletion(
    mut sales: Vec<Sale>,
    mut settlements: Vec<Settlement>,
    mut partners: Vec<Partner>,
    partner_id: Uuid,
) -> (Vec<Sale>, Vec<Settlement>, Vec<Partner>) {
    partners.retain(|p| p.id != partner_id);
    settlements.retain(|s| s.partner_id != partner_id);
    for sale in sales.iter_mut() {
        if sale.partner_ids.contains(&partner_id) {
            sale.partner_ids.retain(|id| *id != partner_id);
        }
    }
    (sales, settlements, partners)
}
