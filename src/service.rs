// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Ledger service: the write path. Each mutation is one read-modify-write
//! against a single owner's snapshot; the engine validates before anything
//! is saved, so a rejection never leaves partial state behind.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::engine::{self, ValidationError};
use crate::models::{LedgerSnapshot, Partner, Sale, Settlement};
use crate::store::{LedgerStore, StoreError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("unknown partner '{0}'")]
    UnknownPartner(String),
    #[error("partner '{0}' already exists")]
    DuplicatePartner(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Request payload for recording a sale. Partners are referenced by name,
/// as they are everywhere on the CLI.
#[derive(Debug, Clone, Default)]
pub struct NewSale {
    pub name: String,
    pub description: Option<String>,
    pub purchase_price: Decimal,
    pub sold_price: Decimal,
    pub partners: Vec<String>,
}

/// One row of the balances report.
#[derive(Debug, Clone, Serialize)]
pub struct PartnerBalance {
    pub name: String,
    pub percentage: Decimal,
    pub earned: Decimal,
    pub settled: Decimal,
    pub owed: Decimal,
}

pub struct LedgerService<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> LedgerService<S> {
    pub fn new(store: S) -> Self {
        LedgerService { store }
    }

    /// Loads the owner's ledger; an owner the store has never seen gets
    /// empty collections.
    pub fn snapshot(&self, owner: &str) -> Result<LedgerSnapshot, ServiceError> {
        match self.store.load(owner) {
            Ok(snapshot) => Ok(snapshot),
            Err(StoreError::NotFound(_)) => Ok(LedgerSnapshot::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn add_partner(
        &self,
        owner: &str,
        name: &str,
        percentage: Decimal,
    ) -> Result<Partner, ServiceError> {
        let mut snapshot = self.snapshot(owner)?;
        let name = name.trim();
        if snapshot.partners.iter().any(|p| p.name == name) {
            return Err(ServiceError::DuplicatePartner(name.to_string()));
        }
        let partner = engine::new_partner(&snapshot.partners, name, percentage)?;
        snapshot.partners.push(partner.clone());
        self.store.save(owner, &snapshot)?;
        Ok(partner)
    }

    pub fn add_sale(&self, owner: &str, request: NewSale) -> Result<Sale, ServiceError> {
        let mut snapshot = self.snapshot(owner)?;
        let mut partner_ids = Vec::with_capacity(request.partners.len());
        for name in &request.partners {
            let partner = find_partner(&snapshot.partners, name)
                .ok_or_else(|| ServiceError::UnknownPartner(name.trim().to_string()))?;
            partner_ids.push(partner.id);
        }
        let sale = engine::new_sale(
            &request.name,
            request.description,
            request.purchase_price,
            request.sold_price,
            partner_ids,
        )?;
        snapshot.sales.push(sale.clone());
        self.store.save(owner, &snapshot)?;
        Ok(sale)
    }

    /// Records a payout to a partner. The amount is validated against the
    /// balance computed from the snapshot being mutated, so the owed ceiling
    /// holds at the moment of commit.
    pub fn add_settlement(
        &self,
        owner: &str,
        partner_name: &str,
        amount: Decimal,
    ) -> Result<Settlement, ServiceError> {
        let mut snapshot = self.snapshot(owner)?;
        let partner = find_partner(&snapshot.partners, partner_name)
            .ok_or_else(|| ServiceError::UnknownPartner(partner_name.trim().to_string()))?
            .clone();
        let balances =
            engine::compute_balances(&snapshot.sales, &snapshot.partners, &snapshot.settlements);
        let balance = balances.get(&partner.id).copied().unwrap_or_default();
        let settlement = engine::new_settlement(&partner, balance, amount)?;
        snapshot.settlements.push(settlement.clone());
        self.store.save(owner, &snapshot)?;
        Ok(settlement)
    }

    /// Deletes a partner and cascades: their settlements go, and their id is
    /// stripped from every sale. Unknown names are a no-op, not an error.
    pub fn delete_partner(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Option<Partner>, ServiceError> {
        let snapshot = self.snapshot(owner)?;
        let Some(partner) = find_partner(&snapshot.partners, name).cloned() else {
            return Ok(None);
        };
        let (sales, settlements, partners) = engine::apply_partner_deletion(
            snapshot.sales,
            snapshot.settlements,
            snapshot.partners,
            partner.id,
        );
        self.store.save(
            owner,
            &LedgerSnapshot {
                sales,
                partners,
                settlements,
            },
        )?;
        Ok(Some(partner))
    }

    /// Per-partner earned / settled / owed, sorted by partner name.
    pub fn balances(&self, owner: &str) -> Result<Vec<PartnerBalance>, ServiceError> {
        let snapshot = self.snapshot(owner)?;
        let owed =
            engine::compute_balances(&snapshot.sales, &snapshot.partners, &snapshot.settlements);

        let mut rows = Vec::with_capacity(snapshot.partners.len());
        for partner in &snapshot.partners {
            let settled: Decimal = snapshot
                .settlements
                .iter()
                .filter(|s| s.partner_id == partner.id)
                .map(|s| s.amount)
                .sum();
            let balance = owed.get(&partner.id).copied().unwrap_or_default();
            rows.push(PartnerBalance {
                name: partner.name.clone(),
                percentage: partner.percentage,
                earned: balance + settled,
                settled,
                owed: balance,
            });
        }
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    /// Current balance for one partner, if they exist.
    pub fn balance_for(&self, owner: &str, name: &str) -> Result<Option<Decimal>, ServiceError> {
        let snapshot = self.snapshot(owner)?;
        let Some(partner) = find_partner(&snapshot.partners, name) else {
            return Ok(None);
        };
        let balances =
            engine::compute_balances(&snapshot.sales, &snapshot.partners, &snapshot.settlements);
        Ok(Some(balances.get(&partner.id).copied().unwrap_or_default()))
    }
}

fn find_partner<'a>(partners: &'a [Partner], name: &str) -> Option<&'a Partner> {
    let name = name.trim();
    partners.iter().find(|p| p.name == name)
}

/// Resolves a partner id to its name for display; deleted partners show as
/// their raw id.
pub fn partner_name(partners: &[Partner], id: Uuid) -> String {
    partners
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| id.to_string())
}
