// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Flipledger", "flipledger"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("flipledger.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS owners(
        name TEXT PRIMARY KEY,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS sales(
        id TEXT PRIMARY KEY,
        owner TEXT NOT NULL,
        name TEXT NOT NULL,
        description TEXT,
        purchase_price TEXT NOT NULL,
        sold_price TEXT NOT NULL,
        profit TEXT NOT NULL,
        created_at TEXT NOT NULL,
        FOREIGN KEY(owner) REFERENCES owners(name) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_sales_owner ON sales(owner);

    -- Which partners share a sale's profit. partner_id carries no FK: the
    -- engine owns referential cleanup when partners are deleted.
    CREATE TABLE IF NOT EXISTS sale_partners(
        sale_id TEXT NOT NULL,
        partner_id TEXT NOT NULL,
        UNIQUE(sale_id, partner_id),
        FOREIGN KEY(sale_id) REFERENCES sales(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS partners(
        id TEXT PRIMARY KEY,
        owner TEXT NOT NULL,
        name TEXT NOT NULL,
        percentage TEXT NOT NULL,
        UNIQUE(owner, name),
        FOREIGN KEY(owner) REFERENCES owners(name) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_partners_owner ON partners(owner);

    CREATE TABLE IF NOT EXISTS settlements(
        id TEXT PRIMARY KEY,
        owner TEXT NOT NULL,
        partner_id TEXT NOT NULL,
        amount TEXT NOT NULL,
        created_at TEXT NOT NULL,
        FOREIGN KEY(owner) REFERENCES owners(name) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_settlements_owner ON settlements(owner);
    "#,
    )?;
    Ok(())
}
