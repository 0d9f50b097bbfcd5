// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

use crate::service::{LedgerService, NewSale, partner_name};
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
    let name = sub.get_one::<String>("name").unwrap();
    let bought = parse_money(sub.get_one::<String>("bought").unwrap())?;
    let sold = parse_money(sub.get_one::<String>("sold").unwrap())?;
    let desc = sub.get_one::<String>("desc").map(|s| s.to_string());
    let partners: Vec<String> = sub
        .get_one::<String>("partners")
        .map(|s| {
            s.split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let service = LedgerService::new(SqliteStore::new(conn));
    let sale = service.add_sale(
        owner,
        NewSale {
            name: name.to_string(),
            description: desc,
            purchase_price: bought,
            sold_price: sold,
            partners,
        },
    )?;
    println!(
        "Recorded sale '{}' ({} -> {}, profit {})",
        sale.name,
        fmt_money(&sale.purchase_price),
        fmt_money(&sale.sold_price),
        fmt_money(&sale.profit)
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.name.clone(),
                    r.bought.clone(),
                    r.sold.clone(),
                    r.profit.clone(),
                    r.partners.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Item", "Bought", "Sold", "Profit", "Partners"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct SaleRow {
    pub date: String,
    pub name: String,
    pub description: String,
    pub bought: String,
    pub sold: String,
    pub profit: String,
    pub partners: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<SaleRow>> {
    let owner = owner_arg(sub);
    let month = sub.get_one::<String>("month").map(|s| s.trim().to_string());
    let limit = sub.get_one::<usize>("limit").copied();

    let service = LedgerService::new(SqliteStore::new(conn));
    let snapshot = service.snapshot(owner)?;

    // Most recent first, like every listing in this tool.
    let mut data = Vec::new();
    for sale in snapshot.sales.iter().rev() {
        if let Some(ref m) = month {
            if sale.created_at.format("%Y-%m").to_string() != *m {
                continue;
            }
        }
        let partners = sale
            .partner_ids
            .iter()
            .map(|id| partner_name(&snapshot.partners, *id))
            .collect::<Vec<_>>()
            .join(", ");
        data.push(SaleRow {
            date: sale.created_at.format("%Y-%m-%d").to_string(),
            name: sale.name.clone(),
            description: sale.description.clone().unwrap_or_default(),
            bought: fmt_money(&sale.purchase_price),
            sold: fmt_money(&sale.sold_price),
            profit: fmt_money(&sale.profit),
            partners,
        });
        if let Some(limit) = limit {
            if data.len() >= limit {
                break;
            }
        }
    }
    Ok(data)
}
