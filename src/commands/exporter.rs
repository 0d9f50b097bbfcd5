// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;

use crate::service::{LedgerService, partner_name};
use crate::store::SqliteStore;
use crate::utils::{fmt_money, owner_arg};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("sales", sub)) => export_sales(conn, sub),
        Some(("settlements", sub)) => export_settlements(conn, sub),
        _ => Ok(()),
    }
}

fn export_sales(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    let owner = owner_arg(sub);

    let service = LedgerService::new(SqliteStore::new(conn));
    let snapshot = service.snapshot(owner)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "date", "name", "description", "bought", "sold", "profit", "partners",
            ])?;
            for sale in &snapshot.sales {
                let partners = sale
                    .partner_ids
                    .iter()
                    .map(|id| partner_name(&snapshot.partners, *id))
                    .collect::<Vec<_>>()
                    .join("; ");
                wtr.write_record([
                    sale.created_at.format("%Y-%m-%d").to_string(),
                    sale.name.clone(),
                    sale.description.clone().unwrap_or_default(),
                    fmt_money(&sale.purchase_price),
                    fmt_money(&sale.sold_price),
                    fmt_money(&sale.profit),
                    partners,
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut items = Vec::new();
            for sale in &snapshot.sales {
                let partners: Vec<String> = sale
                    .partner_ids
                    .iter()
                    .map(|id| partner_name(&snapshot.partners, *id))
                    .collect();
                items.push(json!({
                    "date": sale.created_at.format("%Y-%m-%d").to_string(),
                    "name": sale.name,
                    "description": sale.description,
                    "bought": fmt_money(&sale.purchase_price),
                    "sold": fmt_money(&sale.sold_price),
                    "profit": fmt_money(&sale.profit),
                    "partners": partners,
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => bail!("Unknown format: {} (use csv|json)", fmt),
    }
    println!("Exported sales to {}", out);
    Ok(())
}

fn export_settlements(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    let owner = owner_arg(sub);

    let service = LedgerService::new(SqliteStore::new(conn));
    let snapshot = service.snapshot(owner)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["date", "partner", "amount"])?;
            for settlement in &snapshot.settlements {
                wtr.write_record([
                    settlement.created_at.format("%Y-%m-%d").to_string(),
                    partner_name(&snapshot.partners, settlement.partner_id),
                    fmt_money(&settlement.amount),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut items = Vec::new();
            for settlement in &snapshot.settlements {
                items.push(json!({
                    "date": settlement.created_at.format("%Y-%m-%d").to_string(),
                    "partner": partner_name(&snapshot.partners, settlement.partner_id),
                    "amount": fmt_money(&settlement.amount),
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => bail!("Unknown format: {} (use csv|json)", fmt),
    }
    println!("Exported settlements to {}", out);
    Ok(())
}
