//! # Sale Repository
//!
//! Transactional sale insertion. A sale commits the cart's snapshot to the
//! `sales`/`sale_items` tables and applies the stock decrements in the same
//! transaction, so a crash can never record a sale without its inventory
//! effect (or vice versa).
//!
//! ## Decrement Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  For each sale line:                                                    │
//! │                                                                         │
//! │  1. INSERT sale_items row (snapshot of price at sale time)             │
//! │  2. Walk line.codes in order, draining each batch's on-hand quantity   │
//! │     before spilling to the next; the last code absorbs any shortfall.  │
//! │     Fallback codes (SKU, no batch row) match nothing and are skipped.  │
//! │  3. UPDATE products: stock -= line.quantity                            │
//! │                                                                         │
//! │  All inside one transaction with the sales INSERT.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! If the last batch in the walk is undersupplied, its row goes negative
//! rather than failing the sale; the mismatch then shows up in the stock
//! audit instead of blocking the till.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreResult;
use mesa_core::{DocumentKind, PaymentMethod, SaleRequest};

/// A persisted sale header.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SaleRecord {
    pub id: String,
    pub payment_method: PaymentMethod,
    pub document_kind: DocumentKind,
    pub customer_doc: Option<String>,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
    pub subtotal_base_cents: i64,
    pub discount_base_cents: i64,
    pub igv_cents: i64,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// A persisted sale line.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SaleItemRecord {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub code: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
    pub wholesale: bool,
    pub manual_price_cents: Option<i64>,
}

/// Repository for sale operations.
///
/// ## Usage
/// ```rust,ignore
/// let request = SaleRequest::from_cart(&cart)?;
/// let sale = store.sales().create(&request).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a sale and applies its stock decrements, transactionally.
    ///
    /// ## What This Does
    /// 1. Inserts the `sales` header with the client-computed totals
    /// 2. Inserts one `sale_items` row per cart line
    /// 3. Decrements the primary batch quantity and product stock per line
    /// 4. Commits
    pub async fn create(&self, request: &SaleRequest) -> StoreResult<SaleRecord> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now();

        let document_kind = request
            .document
            .as_ref()
            .map(|d| d.kind)
            .unwrap_or(DocumentKind::Ticket);
        let customer = request.document.as_ref().and_then(|d| d.customer.as_ref());
        let customer_doc = customer.map(|c| c.doc_number.clone());
        let customer_name = customer.map(|c| c.name.clone());

        debug!(
            id = %id,
            lines = request.lines.len(),
            total_cents = request.totals.total_cents,
            "Creating sale"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, payment_method, document_kind, customer_doc, customer_name,
                notes, subtotal_base_cents, discount_base_cents, igv_cents,
                total_cents, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&id)
        .bind(request.payment_method)
        .bind(document_kind)
        .bind(&customer_doc)
        .bind(&customer_name)
        .bind(&request.notes)
        .bind(request.totals.subtotal_base_cents)
        .bind(request.totals.discount_base_cents)
        .bind(request.totals.igv_cents)
        .bind(request.totals.total_cents)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;

        for line in &request.lines {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, code, quantity, unit_price_cents,
                    line_total_cents, wholesale, manual_price_cents
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&id)
            .bind(&line.product_id)
            .bind(&line.code)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(line.line_total_cents)
            .bind(line.wholesale)
            .bind(line.manual_price_cents)
            .execute(&mut *tx)
            .await?;

            // Drain the line's batches in code order; the last code absorbs
            // any shortfall so the total decrement equals the quantity sold.
            let mut remaining = line.quantity;
            let last_code = line.codes.len().saturating_sub(1);
            for (idx, code) in line.codes.iter().enumerate() {
                if remaining == 0 {
                    break;
                }

                // Fallback codes (SKU, no batch row) match nothing here.
                let on_hand: Option<i64> =
                    sqlx::query_scalar("SELECT quantity FROM barcode_batches WHERE code = ?1")
                        .bind(code)
                        .fetch_optional(&mut *tx)
                        .await?;
                let Some(on_hand) = on_hand else { continue };

                let take = if idx == last_code {
                    remaining
                } else {
                    remaining.min(on_hand.max(0))
                };
                if take == 0 {
                    continue;
                }

                sqlx::query(
                    "UPDATE barcode_batches SET quantity = quantity - ?1 WHERE code = ?2",
                )
                .bind(take)
                .bind(code)
                .execute(&mut *tx)
                .await?;

                remaining -= take;
            }

            sqlx::query(
                "UPDATE products SET stock = stock - ?1, updated_at = ?2 WHERE id = ?3",
            )
            .bind(line.quantity)
            .bind(created_at)
            .bind(&line.product_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            id = %id,
            total_cents = request.totals.total_cents,
            "Sale recorded"
        );

        Ok(SaleRecord {
            id,
            payment_method: request.payment_method,
            document_kind,
            customer_doc,
            customer_name,
            notes: request.notes.clone(),
            subtotal_base_cents: request.totals.subtotal_base_cents,
            discount_base_cents: request.totals.discount_base_cents,
            igv_cents: request.totals.igv_cents,
            total_cents: request.totals.total_cents,
            created_at,
        })
    }

    /// Fetches a sale header by ID.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<SaleRecord>> {
        let sale = sqlx::query_as::<_, SaleRecord>(
            r#"
            SELECT id, payment_method, document_kind, customer_doc, customer_name,
                   notes, subtotal_base_cents, discount_base_cents, igv_cents,
                   total_cents, created_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Lists recent sales, newest first.
    pub async fn list_recent(&self, limit: u32) -> StoreResult<Vec<SaleRecord>> {
        let sales = sqlx::query_as::<_, SaleRecord>(
            r#"
            SELECT id, payment_method, document_kind, customer_doc, customer_name,
                   notes, subtotal_base_cents, discount_base_cents, igv_cents,
                   total_cents, created_at
            FROM sales
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Lists a sale's line items.
    pub async fn items_for(&self, sale_id: &str) -> StoreResult<Vec<SaleItemRecord>> {
        let items = sqlx::query_as::<_, SaleItemRecord>(
            r#"
            SELECT id, sale_id, product_id, code, quantity, unit_price_cents,
                   line_total_cents, wholesale, manual_price_cents
            FROM sale_items
            WHERE sale_id = ?1
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
