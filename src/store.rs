// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Ledger store: owner-keyed persistence of the three collections. The
//! SQLite backend is the real one; the in-memory backend exists for tests
//! and embedding.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{LedgerSnapshot, Partner, Sale, Settlement};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The owner has never saved a ledger. Callers usually treat this as
    /// empty collections rather than a failure.
    #[error("no ledger found for owner '{0}'")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

/// Persistence contract for one owner's ledger. `save` must replace the
/// owner's full collections atomically; `load` must return them in insertion
/// order.
pub trait LedgerStore {
    fn load(&self, owner: &str) -> Result<LedgerSnapshot, StoreError>;
    fn save(&self, owner: &str, snapshot: &LedgerSnapshot) -> Result<(), StoreError>;
}

/// SQLite-backed store over the schema created by [`crate::db`].
pub struct SqliteStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        SqliteStore { conn }
    }
}

fn decimal_column(idx: usize, raw: String) -> rusqlite::Result<Decimal> {
    Decimal::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn uuid_column(idx: usize, raw: String) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl LedgerStore for SqliteStore<'_> {
    fn load(&self, owner: &str) -> Result<LedgerSnapshot, StoreError> {
        let known: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM owners WHERE name=?1",
                params![owner],
                |r| r.get(0),
            )
            .optional()?;
        if known.is_none() {
            return Err(StoreError::NotFound(owner.to_string()));
        }

        // partner_ids per sale, keyed by sale id
        let mut assignments: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        let mut stmt = self.conn.prepare(
            "SELECT sp.sale_id, sp.partner_id FROM sale_partners sp
             JOIN sales s ON s.id = sp.sale_id
             WHERE s.owner=?1 ORDER BY sp.rowid",
        )?;
        let refs = stmt.query_map(params![owner], |r| {
            Ok((
                uuid_column(0, r.get::<_, String>(0)?)?,
                uuid_column(1, r.get::<_, String>(1)?)?,
            ))
        })?;
        for row in refs {
            let (sale_id, partner_id) = row?;
            assignments.entry(sale_id).or_default().push(partner_id);
        }

        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, purchase_price, sold_price, profit, created_at
             FROM sales WHERE owner=?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![owner], |r| {
            Ok(Sale {
                id: uuid_column(0, r.get::<_, String>(0)?)?,
                name: r.get(1)?,
                description: r.get(2)?,
                purchase_price: decimal_column(3, r.get::<_, String>(3)?)?,
                sold_price: decimal_column(4, r.get::<_, String>(4)?)?,
                profit: decimal_column(5, r.get::<_, String>(5)?)?,
                created_at: r.get::<_, DateTime<Utc>>(6)?,
                partner_ids: Vec::new(),
            })
        })?;
        let mut sales = Vec::new();
        for row in rows {
            let mut sale = row?;
            if let Some(ids) = assignments.remove(&sale.id) {
                sale.partner_ids = ids;
            }
            sales.push(sale);
        }

        let mut stmt = self.conn.prepare(
            "SELECT id, name, percentage FROM partners WHERE owner=?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![owner], |r| {
            Ok(Partner {
                id: uuid_column(0, r.get::<_, String>(0)?)?,
                name: r.get(1)?,
                percentage: decimal_column(2, r.get::<_, String>(2)?)?,
            })
        })?;
        let mut partners = Vec::new();
        for row in rows {
            partners.push(row?);
        }

        let mut stmt = self.conn.prepare(
            "SELECT id, partner_id, amount, created_at
             FROM settlements WHERE owner=?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![owner], |r| {
            Ok(Settlement {
                id: uuid_column(0, r.get::<_, String>(0)?)?,
                partner_id: uuid_column(1, r.get::<_, String>(1)?)?,
                amount: decimal_column(2, r.get::<_, String>(2)?)?,
                created_at: r.get::<_, DateTime<Utc>>(3)?,
            })
        })?;
        let mut settlements = Vec::new();
        for row in rows {
            settlements.push(row?);
        }

        Ok(LedgerSnapshot {
            sales,
            partners,
            settlements,
        })
    }

    fn save(&self, owner: &str, snapshot: &LedgerSnapshot) -> Result<(), StoreError> {
        // Full replace of the owner's collections in one transaction; no
        // intermediate state is observable.
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO owners(name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
            params![owner],
        )?;
        tx.execute(
            "DELETE FROM sale_partners WHERE sale_id IN (SELECT id FROM sales WHERE owner=?1)",
            params![owner],
        )?;
        tx.execute("DELETE FROM sales WHERE owner=?1", params![owner])?;
        tx.execute("DELETE FROM partners WHERE owner=?1", params![owner])?;
        tx.execute("DELETE FROM settlements WHERE owner=?1", params![owner])?;

        for sale in &snapshot.sales {
            tx.execute(
                "INSERT INTO sales(id, owner, name, description, purchase_price, sold_price, profit, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    sale.id.to_string(),
                    owner,
                    sale.name,
                    sale.description,
                    sale.purchase_price.to_string(),
                    sale.sold_price.to_string(),
                    sale.profit.to_string(),
                    sale.created_at,
                ],
            )?;
            for partner_id in &sale.partner_ids {
                tx.execute(
                    "INSERT INTO sale_partners(sale_id, partner_id) VALUES (?1, ?2)",
                    params![sale.id.to_string(), partner_id.to_string()],
                )?;
            }
        }
        for partner in &snapshot.partners {
            tx.execute(
                "INSERT INTO partners(id, owner, name, percentage) VALUES (?1, ?2, ?3, ?4)",
                params![
                    partner.id.to_string(),
                    owner,
                    partner.name,
                    partner.percentage.to_string(),
                ],
            )?;
        }
        for settlement in &snapshot.settlements {
            tx.execute(
                "INSERT INTO settlements(id, owner, partner_id, amount, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    settlement.id.to_string(),
                    owner,
                    settlement.partner_id.to_string(),
                    settlement.amount.to_string(),
                    settlement.created_at,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}

/// In-memory store keyed by owner. Used by the service tests; also handy for
/// embedding the engine without SQLite.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, LedgerSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self, owner: &str) -> Result<LedgerSnapshot, StoreError> {
        let ledgers = self.inner.read().unwrap_or_else(|e| e.into_inner());
        ledgers
            .get(owner)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(owner.to_string()))
    }

    fn save(&self, owner: &str, snapshot: &LedgerSnapshot) -> Result<(), StoreError> {
        let mut ledgers = self.inner.write().unwrap_or_else(|e| e.into_inner());
        ledgers.insert(owner.to_string(), snapshot.clone());
        Ok(())
    }
}
