//! # Product Repository
//!
//! Database operations for the product catalog and its barcode batches.
//!
//! ## Key Operations
//! - Catalog reads for the sales grid
//! - Barcode batch CRUD (codes are globally unique)
//! - Stock deltas (applied by sale/void flows, never by cart edits)
//!
//! ## Stock vs Batches
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products.stock        barcode_batches.quantity                        │
//! │       │                        │                                        │
//! │       │   should agree, but    │                                        │
//! │       │   nothing enforces it  │                                        │
//! │       ▼                        ▼                                        │
//! │  stock = 12            B1 qty 10, B2 qty 2   → consistent              │
//! │  stock = 12            B1 qty 10             → audit flags -2          │
//! │                                                                         │
//! │  The gap is surfaced by mesa_core::reconcile::audit, read-only.        │
//! │  This repository reports the rows; it never "fixes" them.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use mesa_core::{BarcodeBatch, Product};

const PRODUCT_COLUMNS: &str = "id, sku, name, unit_price_cents, wholesale_price_cents, \
     promo_price_cents, stock, category_id, image_ref, is_active, created_at, updated_at";

/// Repository for product and barcode-batch operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = store.products();
///
/// let catalog = repo.list_active().await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Lists active products, sorted by name.
    ///
    /// This is the read the sales grid and the ledger refresh use.
    pub async fn list_active(&self) -> StoreResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 ORDER BY name"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed active products");
        Ok(products)
    }

    /// Counts all products (active and inactive).
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Fetches a product by its UUID.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Product> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Product", id))
    }

    /// Fetches a product by SKU.
    pub async fn get_by_sku(&self, sku: &str) -> StoreResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> StoreResult<()> {
        debug!(id = %product.id, sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, name, unit_price_cents, wholesale_price_cents,
                promo_price_cents, stock, category_id, image_ref, is_active,
                created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.unit_price_cents)
        .bind(product.wholesale_price_cents)
        .bind(product.promo_price_cents)
        .bind(product.stock)
        .bind(&product.category_id)
        .bind(&product.image_ref)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Applies a stock delta (negative for a sale, positive for a void).
    ///
    /// Stock is server-owned: this is the *only* mutation path, and it is
    /// called from sale/void flows, never from cart edits.
    pub async fn update_stock(&self, id: &str, delta: i64) -> StoreResult<()> {
        debug!(id = %id, delta = delta, "Applying stock delta");

        let result = sqlx::query(
            "UPDATE products SET stock = stock + ?1, updated_at = ?2 WHERE id = ?3",
        )
        .bind(delta)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Product", id));
        }
        Ok(())
    }

    // =========================================================================
    // Barcode Batches
    // =========================================================================

    /// Lists a product's barcode batches, oldest first.
    pub async fn batches_for(&self, product_id: &str) -> StoreResult<Vec<BarcodeBatch>> {
        let batches = sqlx::query_as::<_, BarcodeBatch>(
            r#"
            SELECT id, product_id, code, quantity, created_at
            FROM barcode_batches
            WHERE product_id = ?1
            ORDER BY created_at, id
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(batches)
    }

    /// Registers a new barcode batch.
    ///
    /// ## Errors
    /// * `UniqueViolation` - the code is already attached to any product
    pub async fn insert_batch(&self, batch: &BarcodeBatch) -> StoreResult<()> {
        debug!(
            product_id = %batch.product_id,
            code = %batch.code,
            quantity = batch.quantity,
            "Inserting barcode batch"
        );

        sqlx::query(
            r#"
            INSERT INTO barcode_batches (id, product_id, code, quantity, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&batch.id)
        .bind(&batch.product_id)
        .bind(&batch.code)
        .bind(batch.quantity)
        .bind(batch.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Sets a batch's quantity (receiving or correction).
    pub async fn update_batch_quantity(&self, batch_id: &str, quantity: i64) -> StoreResult<()> {
        let result = sqlx::query("UPDATE barcode_batches SET quantity = ?1 WHERE id = ?2")
            .bind(quantity)
            .bind(batch_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("BarcodeBatch", batch_id));
        }
        Ok(())
    }

    /// Deletes a batch (its code becomes reusable).
    pub async fn delete_batch(&self, batch_id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM barcode_batches WHERE id = ?1")
            .bind(batch_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("BarcodeBatch", batch_id));
        }
        Ok(())
    }

    /// Looks up a batch by its scannable code (scan resolution).
    pub async fn find_batch_by_code(&self, code: &str) -> StoreResult<Option<BarcodeBatch>> {
        let batch = sqlx::query_as::<_, BarcodeBatch>(
            r#"
            SELECT id, product_id, code, quantity, created_at
            FROM barcode_batches
            WHERE code = ?1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(batch)
    }

    /// Whether a code is already registered (pre-insert UI check; the UNIQUE
    /// index remains the authority).
    pub async fn code_exists(&self, code: &str) -> StoreResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM barcode_batches WHERE code = ?1")
                .bind(code)
                .fetch_one(&self.pool)
                .await?;

        Ok(count > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Store, StoreConfig};
    use uuid::Uuid;

    async fn test_store() -> Store {
        Store::new(StoreConfig::in_memory()).await.unwrap()
    }

    fn test_product(sku: &str) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            sku: sku.to_string(),
            name: format!("Product {sku}"),
            unit_price_cents: 1180,
            wholesale_price_cents: None,
            promo_price_cents: None,
            stock: 10,
            category_id: None,
            image_ref: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn test_batch(product_id: &str, code: &str, quantity: i64) -> BarcodeBatch {
        BarcodeBatch {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            code: code.to_string(),
            quantity,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch_product() {
        let store = test_store().await;
        let repo = store.products();

        let product = test_product("SKU-1");
        repo.insert(&product).await.unwrap();

        let fetched = repo.get_by_id(&product.id).await.unwrap();
        assert_eq!(fetched.sku, "SKU-1");
        assert_eq!(fetched.unit_price_cents, 1180);
        assert!(fetched.is_active);

        let listed = repo.list_active().await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_barcode_rejected() {
        let store = test_store().await;
        let repo = store.products();

        let a = test_product("SKU-A");
        let b = test_product("SKU-B");
        repo.insert(&a).await.unwrap();
        repo.insert(&b).await.unwrap();

        repo.insert_batch(&test_batch(&a.id, "CODE-1", 5)).await.unwrap();

        // Same code on a different product must be refused
        let err = repo
            .insert_batch(&test_batch(&b.id, "CODE-1", 3))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_stock_delta() {
        let store = test_store().await;
        let repo = store.products();

        let product = test_product("SKU-1");
        repo.insert(&product).await.unwrap();

        repo.update_stock(&product.id, -3).await.unwrap();
        let fetched = repo.get_by_id(&product.id).await.unwrap();
        assert_eq!(fetched.stock, 7);
    }

    #[tokio::test]
    async fn test_batch_lookup_and_delete() {
        let store = test_store().await;
        let repo = store.products();

        let product = test_product("SKU-1");
        repo.insert(&product).await.unwrap();

        let batch = test_batch(&product.id, "CODE-9", 4);
        repo.insert_batch(&batch).await.unwrap();

        assert!(repo.code_exists("CODE-9").await.unwrap());
        let found = repo.find_batch_by_code("CODE-9").await.unwrap().unwrap();
        assert_eq!(found.product_id, product.id);

        repo.update_batch_quantity(&batch.id, 12).await.unwrap();
        let listed = repo.batches_for(&product.id).await.unwrap();
        assert_eq!(listed[0].quantity, 12);

        repo.delete_batch(&batch.id).await.unwrap();
        assert!(!repo.code_exists("CODE-9").await.unwrap());
    }
}
