// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::engine::total_allocation;
use crate::service::LedgerService;
use crate::store::SqliteStore;
use crate::utils::{fmt_percent, maybe_print_json, owner_arg, parse_decimal, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let owner = owner_arg(sub);
            let name = sub.get_one::<String>("name").unwrap();
            let percent = parse_decimal(sub.get_one::<String>("percent").unwrap())?;

            let service = LedgerService::new(SqliteStore::new(conn));
            let partner = service.add_partner(owner, name, percent)?;
            let allocated = total_allocation(&service.snapshot(owner)?.partners);
            println!(
                "Added partner '{}' at {} ({} allocated)",
                partner.name,
                fmt_percent(&partner.percentage),
                fmt_percent(&allocated)
            );
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let owner = owner_arg(sub);
            let name = sub.get_one::<String>("name").unwrap();
            let service = LedgerService::new(SqliteStore::new(conn));
            match service.delete_partner(owner, name)? {
                Some(partner) => println!(
                    "Removed partner '{}' (settlements and sale assignments dropped)",
                    partner.name
                ),
                None => println!("No partner named '{}', nothing to do", name.trim()),
            }
        }
        _ => {}
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
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
                    crate::utils::fmt_money(&r.owed),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Partner", "Share", "Owed"], data));
    }
    Ok(())
}
