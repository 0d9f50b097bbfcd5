// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A resale record. Immutable once created, except that `partner_ids`
/// shrinks when a referenced partner is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub purchase_price: Decimal,
    pub sold_price: Decimal,
    /// Derived as `sold_price - purchase_price` at creation and stored;
    /// never recomputed afterwards.
    pub profit: Decimal,
    pub created_at: DateTime<Utc>,
    /// Partners sharing this sale's profit. Duplicate-free; order irrelevant.
    #[serde(default)]
    pub partner_ids: Vec<Uuid>,
}

/// A revenue-share participant. `percentage` is their share of profit on any
/// sale they are assigned to, in (0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: Uuid,
    pub name: String,
    pub percentage: Decimal,
}

/// A payout made to a partner, reducing their owed balance. Append-only;
/// removed only when the referenced partner is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: Uuid,
    pub partner_id: Uuid,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// One owner's full ledger as the store loads and saves it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub sales: Vec<Sale>,
    #[serde(default)]
    pub partners: Vec<Partner>,
    #[serde(default)]
    pub settlements: Vec<Settlement>,
}
