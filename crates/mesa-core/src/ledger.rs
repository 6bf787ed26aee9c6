//! # Inventory Ledger
//!
//! Read-only client-side cache of product stock and barcode-batch
//! quantities, refreshed from the backend on demand.
//!
//! The backend owns every number in here; the ledger only holds the last
//! values it was handed. Stale entries are expected between refreshes - the
//! availability ceiling built on top of them is best-effort by design.
//!
//! ## SKU Fallback
//! A product whose batches were never recorded would otherwise block the
//! sales UI entirely. Instead, `batches_or_fallback` synthesizes a single
//! temporary batch from the product's SKU carrying its whole `stock` as
//! quantity. This is a documented fallback, not an error; the reconciliation
//! audit still flags such products for operator attention.

use std::collections::HashMap;

use chrono::Utc;

use crate::cart::Cart;
use crate::types::{BarcodeBatch, Product};

// =============================================================================
// Inventory Ledger
// =============================================================================

/// Client-side cache of stock levels and barcode batches.
#[derive(Debug, Clone, Default)]
pub struct InventoryLedger {
    /// Last known authoritative stock per product.
    stocks: HashMap<String, i64>,
    /// Last known batches per product.
    batches: HashMap<String, Vec<BarcodeBatch>>,
}

impl InventoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        InventoryLedger::default()
    }

    /// Last known authoritative stock for a product, 0 if never seen.
    pub fn stock(&self, product_id: &str) -> i64 {
        self.stocks.get(product_id).copied().unwrap_or(0)
    }

    /// Last known batches for a product (possibly empty).
    pub fn batches(&self, product_id: &str) -> &[BarcodeBatch] {
        self.batches
            .get(product_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Batches for a product, synthesizing the SKU-fallback batch when none
    /// are recorded so callers are never blocked on missing barcode data.
    pub fn batches_or_fallback(&self, product: &Product) -> Vec<BarcodeBatch> {
        let known = self.batches(&product.id);
        if !known.is_empty() {
            return known.to_vec();
        }

        vec![BarcodeBatch {
            id: format!("fallback-{}", product.id),
            product_id: product.id.clone(),
            code: product.sku.clone(),
            quantity: self.stocks.get(&product.id).copied().unwrap_or(product.stock),
            created_at: Utc::now(),
        }]
    }

    /// Caches a product's stock level.
    pub fn apply_product(&mut self, product: &Product) {
        self.stocks.insert(product.id.clone(), product.stock);
    }

    /// Caches stock levels for a batch of products.
    pub fn apply_products<'a>(&mut self, products: impl IntoIterator<Item = &'a Product>) {
        for product in products {
            self.apply_product(product);
        }
    }

    /// Replaces the cached batches for one product with freshly fetched
    /// rows (stale quantity fields included).
    pub fn apply_batches(&mut self, product_id: &str, batches: Vec<BarcodeBatch>) {
        self.batches.insert(product_id.to_string(), batches);
    }

    /// Products referenced by the active cart that a refresh should cover.
    pub fn products_to_refresh(cart: &Cart) -> Vec<String> {
        let mut ids: Vec<String> = cart.lines.iter().map(|l| l.product_id.clone()).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Pushes refreshed batch quantities into the cart lines whose barcode
    /// map matches the refreshed codes.
    ///
    /// This is the one place the ledger reaches into cart state: the
    /// availability ceiling must follow the backend, so the per-line
    /// `batch_qty` copies cannot be left stale after a refresh.
    pub fn refresh_lines(&self, cart: &mut Cart) {
        for line in &mut cart.lines {
            if let Some(batches) = self.batches.get(&line.product_id) {
                for barcode in &mut line.codes {
                    if let Some(batch) = batches.iter().find(|b| b.code == barcode.code) {
                        barcode.batch_qty = batch.quantity;
                    }
                }
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
