// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::service::LedgerService;
use crate::store::SqliteStore;
use crate::utils::{fmt_money, fmt_percent, maybe_print_json, owner_arg, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("balances", sub)) => balances(conn, sub)?,
        Some(("summary", sub)) => summary(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn balances(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let owner = owner_arg(sub);

    let service = LedgerService::new(SqliteStore::new(conn));
    let rows = service.balances(owner)?;
    if !maybe_print_json(json_flag, jsonl_flag, &rows)? {
        let data: Vec<Vec<String>> = rows
            .iter()
            .map(|r| {
                vec![
                    r.name.clone(),
                    fmt_percent(&r.percentage),
                    fmt_money(&r.earned),
                    fmt_money(&r.settled),
                    fmt_money(&r.owed),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Partner", "Share", "Earned", "Settled", "Owed"], data)
        );
    }
    Ok(())
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let months: usize = *sub.get_one::<usize>("months").unwrap_or(&12);
    let owner = owner_arg(sub);

    let service = LedgerService::new(SqliteStore::new(conn));
    let snapshot = service.snapshot(owner)?;

    use std::collections::BTreeMap;
    let mut map: BTreeMap<String, (usize, Decimal, Decimal, Decimal)> = BTreeMap::new();
    for sale in &snapshot.sales {
        let month = sale.created_at.format("%Y-%m").to_string();
        let entry = map
            .entry(month)
            .or_insert((0, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += sale.purchase_price;
        entry.2 += sale.sold_price;
        entry.3 += sale.profit;
    }

    let mut data = Vec::new();
    for (month, (count, cost, revenue, profit)) in map.iter().rev().take(months) {
        data.push(vec![
            month.clone(),
            count.to_string(),
            fmt_money(cost),
            fmt_money(revenue),
            fmt_money(profit),
        ]);
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!(
            "{}",
            pretty_table(&["Month", "Sales", "Cost", "Revenue", "Profit"], data)
        );
    }
    Ok(())
}
