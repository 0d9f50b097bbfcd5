// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashSet;

use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::engine::{MAX_ALLOCATION, compute_balances, total_allocation};
use crate::service::LedgerService;
use crate::store::SqliteStore;
use crate::utils::{fmt_money, fmt_percent, owner_arg, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let owner = owner_arg(m);
    let service = LedgerService::new(SqliteStore::new(conn));
    let snapshot = service.snapshot(owner)?;
    let partner_ids: HashSet<Uuid> = snapshot.partners.iter().map(|p| p.id).collect();

    let mut rows = Vec::new();

    // 1) Percentage allocation past the ceiling
    let allocated = total_allocation(&snapshot.partners);
    if allocated > MAX_ALLOCATION {
        rows.push(vec![
            "allocation_exceeded".into(),
            format!("partners total {}", fmt_percent(&allocated)),
        ]);
    }

    // 2) Sales still referencing partners that no longer exist
    for sale in &snapshot.sales {
        for id in &sale.partner_ids {
            if !partner_ids.contains(id) {
                rows.push(vec![
                    "orphan_sale_partner".into(),
                    format!("sale '{}' references unknown partner {}", sale.name, id),
                ]);
            }
        }
    }

    // 3) Settlements pointing at unknown partners (ignored by balance math)
    for settlement in &snapshot.settlements {
        if !partner_ids.contains(&settlement.partner_id) {
            rows.push(vec![
                "orphan_settlement".into(),
                format!(
                    "{} paid to unknown partner {}",
                    fmt_money(&settlement.amount),
                    settlement.partner_id
                ),
            ]);
        }
    }

    // 4) Stored profit disagreeing with the prices it was derived from
    for sale in &snapshot.sales {
        if sale.profit != sale.sold_price - sale.purchase_price {
            rows.push(vec![
                "profit_mismatch".into(),
                format!(
                    "sale '{}' stores profit {}, prices give {}",
                    sale.name,
                    fmt_money(&sale.profit),
                    fmt_money(&(sale.sold_price - sale.purchase_price))
                ),
            ]);
        }
    }

    // 5) Over-settled partners
    let balances = compute_balances(&snapshot.sales, &snapshot.partners, &snapshot.settlements);
    for partner in &snapshot.partners {
        let owed = balances.get(&partner.id).copied().unwrap_or_default();
        if owed < Decimal::ZERO {
            rows.push(vec![
                "negative_balance".into(),
                format!("partner '{}' owed {}", partner.name, fmt_money(&owed)),
            ]);
        }
    }

    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
