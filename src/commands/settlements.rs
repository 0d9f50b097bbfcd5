// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

use crate::service::{LedgerService, partner_name};
use crate::store::SqliteStore;
use crate::utils::{fmt_money, maybe_print_json, owner_arg, parse_money, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub),
        Some(("list", sub)) => list(conn, sub),
        _ => Ok(()),
    }
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let owner = owner_arg(sub);
    let partner = sub.get_one::<String>("partner").unwrap();
    let amount = parse_money(sub.get_one::<String>("amount").unwrap())?;

    let service = LedgerService::new(SqliteStore::new(conn));
    let settlement = service.add_settlement(owner, partner, amount)?;
    let remaining = service
        .balance_for(owner, partner)?
        .unwrap_or_default();
    println!(
        "Settled {} to '{}' ({} still owed)",
        fmt_money(&settlement.amount),
        partner.trim(),
        fmt_money(&remaining)
    );
    Ok(())
}

#[derive(Serialize)]
pub struct SettlementRow {
    pub date: String,
    pub partner: String,
    pub amount: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let owner = owner_arg(sub);
    let filter = sub.get_one::<String>("partner").map(|s| s.trim().to_string());

    let service = LedgerService::new(SqliteStore::new(conn));
    let snapshot = service.snapshot(owner)?;

    let mut data = Vec::new();
    for settlement in snapshot.settlements.iter().rev() {
        let partner = partner_name(&snapshot.partners, settlement.partner_id);
        if let Some(ref f) = filter {
            if partner != *f {
                continue;
            }
        }
        data.push(SettlementRow {
            date: settlement.created_at.format("%Y-%m-%d").to_string(),
            partner,
            amount: fmt_money(&settlement.amount),
        });
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| vec![r.date.clone(), r.partner.clone(), r.amount.clone()])
            .collect();
        println!("{}", pretty_table(&["Date", "Partner", "Amount"], rows));
    }
    Ok(())
}
