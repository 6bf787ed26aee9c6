//! # Table-Cart Repository
//!
//! Versioned per-mesa cart snapshots. This is the server side of the
//! Multi-Cart Store: one row per dining table, holding the full cart as a
//! JSON payload plus an optimistic-concurrency version.
//!
//! ## Versioning Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Optimistic Save Protocol                                │
//! │                                                                         │
//! │  Terminal A                          Terminal B                        │
//! │  load(7) → version 3                 load(7) → version 3               │
//! │       │                                   │                             │
//! │  save(7, cart, expected=3)                │                             │
//! │       │                                   │                             │
//! │       ▼                                   │                             │
//! │  stored(3) == expected(3) ✓               │                             │
//! │  write payload, version → 4               │                             │
//! │       │                                   ▼                             │
//! │       │                          save(7, cart', expected=3)            │
//! │       │                                   │                             │
//! │       │                          stored(4) != expected(3) ✗            │
//! │       │                          → VersionConflict                     │
//! │       │                                   │                             │
//! │       │                          reload, merge/discard, retry          │
//! │                                                                         │
//! │  A fresh table has no row; its version token is 0.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Last-write-wins is exactly the lost-update bug this protocol exists to
//! prevent, so there is no "force" save; callers that want to overwrite
//! reload first and present the fresh token.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::events::StoreEvent;
use mesa_core::{Cart, CartId, SavedCart, TableNumber};

/// Raw row shape for `table_carts`.
#[derive(Debug, sqlx::FromRow)]
struct TableCartRow {
    table_number: i64,
    payload: String,
    version: i64,
    saved_at: DateTime<Utc>,
}

impl TableCartRow {
    fn into_saved_cart(self) -> StoreResult<SavedCart> {
        let table = TableNumber::new(self.table_number as u8)?;
        let cart: Cart = serde_json::from_str(&self.payload).map_err(|e| {
            StoreError::PayloadCorrupt {
                table: table.get(),
                message: e.to_string(),
            }
        })?;

        Ok(SavedCart {
            id: CartId::Table(table),
            cart,
            version: self.version,
            saved_at: self.saved_at,
        })
    }
}

/// Repository for per-table cart snapshots.
///
/// ## Usage
/// ```rust,ignore
/// let repo = store.tables();
///
/// let mesa7 = TableNumber::new(7)?;
/// let saved = repo.save(mesa7, &cart, 0).await?;   // fresh table
/// let saved = repo.save(mesa7, &cart, saved.version).await?;
/// ```
#[derive(Debug, Clone)]
pub struct TableCartRepository {
    pool: SqlitePool,
    events: broadcast::Sender<StoreEvent>,
}

impl TableCartRepository {
    /// Creates a new TableCartRepository.
    pub fn new(pool: SqlitePool, events: broadcast::Sender<StoreEvent>) -> Self {
        TableCartRepository { pool, events }
    }

    /// Saves a cart snapshot for a table.
    ///
    /// ## Arguments
    /// * `table` - The mesa the snapshot belongs to
    /// * `cart` - Full cart payload, stored as JSON
    /// * `expected_version` - The version the caller loaded (0 for a fresh
    ///   table)
    ///
    /// ## Errors
    /// * `VersionConflict` - another terminal saved this table since the
    ///   caller loaded it; reload and retry with the stored version
    ///
    /// ## Events
    /// Emits [`StoreEvent::TableSaved`] after the write lands.
    ///
    /// The version check rides inside the write statement itself (guarded
    /// `UPDATE ... WHERE version = ?`, or `INSERT ... DO NOTHING` for a
    /// fresh table), so two terminals racing on the same token cannot both
    /// pass a pre-check: exactly one write lands and the loser gets a
    /// `VersionConflict`.
    pub async fn save(
        &self,
        table: TableNumber,
        cart: &Cart,
        expected_version: i64,
    ) -> StoreResult<SavedCart> {
        let payload = serde_json::to_string(cart).map_err(|e| StoreError::PayloadCorrupt {
            table: table.get(),
            message: e.to_string(),
        })?;
        let saved_at = Utc::now();
        let version = expected_version + 1;

        let result = if expected_version == 0 {
            // Fresh table: the row must not exist yet. DO NOTHING (rather
            // than a bare INSERT) keeps a lost race a version conflict
            // instead of a constraint error.
            sqlx::query(
                r#"
                INSERT INTO table_carts (table_number, payload, version, saved_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(table_number) DO NOTHING
                "#,
            )
            .bind(table.get() as i64)
            .bind(&payload)
            .bind(version)
            .bind(saved_at)
            .execute(&self.pool)
            .await?
        } else {
            sqlx::query(
                r#"
                UPDATE table_carts
                SET payload = ?2, version = ?3, saved_at = ?4
                WHERE table_number = ?1 AND version = ?5
                "#,
            )
            .bind(table.get() as i64)
            .bind(&payload)
            .bind(version)
            .bind(saved_at)
            .bind(expected_version)
            .execute(&self.pool)
            .await?
        };

        if result.rows_affected() == 0 {
            let stored: Option<i64> =
                sqlx::query_scalar("SELECT version FROM table_carts WHERE table_number = ?1")
                    .bind(table.get() as i64)
                    .fetch_optional(&self.pool)
                    .await?;
            let stored = stored.unwrap_or(0);

            warn!(
                table = table.get(),
                stored = stored,
                presented = expected_version,
                "Rejecting stale table-cart write"
            );
            return Err(StoreError::VersionConflict {
                table: table.get(),
                stored,
                presented: expected_version,
            });
        }

        info!(table = table.get(), version = version, "Table cart saved");

        // Send after the write so a subscriber that reloads sees the new state.
        // No receivers is fine (send returns Err, which we ignore).
        let _ = self.events.send(StoreEvent::TableSaved {
            table: table.get(),
            version,
        });

        Ok(SavedCart {
            id: CartId::Table(table),
            cart: cart.clone(),
            version,
            saved_at,
        })
    }

    /// Loads a table's snapshot, `None` for a fresh table.
    pub async fn load(&self, table: TableNumber) -> StoreResult<Option<SavedCart>> {
        let row = sqlx::query_as::<_, TableCartRow>(
            r#"
            SELECT table_number, payload, version, saved_at
            FROM table_carts
            WHERE table_number = ?1
            "#,
        )
        .bind(table.get() as i64)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TableCartRow::into_saved_cart).transpose()
    }

    /// Loads every saved snapshot (shelf refresh / app startup).
    pub async fn load_all(&self) -> StoreResult<Vec<SavedCart>> {
        let rows = sqlx::query_as::<_, TableCartRow>(
            r#"
            SELECT table_number, payload, version, saved_at
            FROM table_carts
            ORDER BY table_number
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Loaded table-cart snapshots");

        rows.into_iter()
            .map(TableCartRow::into_saved_cart)
            .collect()
    }

    /// Clears a table's snapshot (table served, or its cart was submitted).
    ///
    /// Returns whether a snapshot existed. Clearing a fresh table is a
    /// no-op, not an error.
    ///
    /// ## Events
    /// Emits [`StoreEvent::TableCleared`] when a row was actually deleted.
    pub async fn clear(&self, table: TableNumber) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM table_carts WHERE table_number = ?1")
            .bind(table.get() as i64)
            .execute(&self.pool)
            .await?;

        let existed = result.rows_affected() > 0;
        if existed {
            info!(table = table.get(), "Table cart cleared");
            let _ = self.events.send(StoreEvent::TableCleared {
                table: table.get(),
            });
        }

        Ok(existed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Store, StoreConfig};
    use mesa_core::PaymentMethod;

    async fn test_store() -> Store {
        Store::new(StoreConfig::in_memory()).await.unwrap()
    }

    fn mesa(n: u8) -> TableNumber {
        TableNumber::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let store = test_store().await;
        let repo = store.tables();

        let mut cart = Cart::new();
        cart.notes = Some("sin ají".to_string());
        cart.payment_method = PaymentMethod::Yape;

        let saved = repo.save(mesa(7), &cart, 0).await.unwrap();
        assert_eq!(saved.version, 1);

        let loaded = repo.load(mesa(7)).await.unwrap().unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.cart.notes.as_deref(), Some("sin ají"));
        assert_eq!(loaded.cart.payment_method, PaymentMethod::Yape);

        // A fresh table loads as None
        assert!(repo.load(mesa(8)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_version_increments_per_save() {
        let store = test_store().await;
        let repo = store.tables();
        let cart = Cart::new();

        let v1 = repo.save(mesa(3), &cart, 0).await.unwrap();
        let v2 = repo.save(mesa(3), &cart, v1.version).await.unwrap();
        let v3 = repo.save(mesa(3), &cart, v2.version).await.unwrap();
        assert_eq!((v1.version, v2.version, v3.version), (1, 2, 3));
    }

    #[tokio::test]
    async fn test_stale_write_rejected() {
        let store = test_store().await;
        let repo = store.tables();
        let cart = Cart::new();

        // Both terminals load version 1
        repo.save(mesa(5), &cart, 0).await.unwrap();

        // Terminal A saves first
        repo.save(mesa(5), &cart, 1).await.unwrap();

        // Terminal B still presents version 1
        let err = repo.save(mesa(5), &cart, 1).await.unwrap_err();
        match err {
            StoreError::VersionConflict {
                table,
                stored,
                presented,
            } => {
                assert_eq!(table, 5);
                assert_eq!(stored, 2);
                assert_eq!(presented, 1);
            }
            other => panic!("expected VersionConflict, got {other:?}"),
        }

        // The stored snapshot is untouched by the rejected write
        let loaded = repo.load(mesa(5)).await.unwrap().unwrap();
        assert_eq!(loaded.version, 2);
    }

    #[tokio::test]
    async fn test_racing_saves_one_wins() {
        let store = test_store().await;
        let repo = store.tables();
        let cart = Cart::new();

        // Both terminals loaded version 1 and race their saves.
        repo.save(mesa(6), &cart, 0).await.unwrap();
        let (a, b) = tokio::join!(repo.save(mesa(6), &cart, 1), repo.save(mesa(6), &cart, 1));

        let (winner, loser) = match (a, b) {
            (Ok(w), Err(l)) | (Err(l), Ok(w)) => (w, l),
            other => panic!("expected exactly one save to land, got {other:?}"),
        };
        assert_eq!(winner.version, 2);
        assert!(matches!(
            loser,
            StoreError::VersionConflict {
                table: 6,
                stored: 2,
                presented: 1,
            }
        ));

        let loaded = repo.load(mesa(6)).await.unwrap().unwrap();
        assert_eq!(loaded.version, 2);
    }

    #[tokio::test]
    async fn test_fresh_table_requires_zero_token() {
        let store = test_store().await;
        let repo = store.tables();

        let err = repo.save(mesa(2), &Cart::new(), 4).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::VersionConflict {
                stored: 0,
                presented: 4,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_clear_and_events() {
        let store = test_store().await;
        let repo = store.tables();
        let mut rx = store.subscribe();

        repo.save(mesa(9), &Cart::new(), 0).await.unwrap();
        assert_eq!(
            rx.recv().await.unwrap(),
            StoreEvent::TableSaved {
                table: 9,
                version: 1
            }
        );

        assert!(repo.clear(mesa(9)).await.unwrap());
        assert_eq!(
            rx.recv().await.unwrap(),
            StoreEvent::TableCleared { table: 9 }
        );

        // Clearing a fresh table is a no-op and emits nothing
        assert!(!repo.clear(mesa(9)).await.unwrap());
        assert!(rx.try_recv().is_err());

        assert!(repo.load(mesa(9)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_all_sorted_by_table() {
        let store = test_store().await;
        let repo = store.tables();

        repo.save(mesa(12), &Cart::new(), 0).await.unwrap();
        repo.save(mesa(4), &Cart::new(), 0).await.unwrap();

        let all = repo.load_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, CartId::Table(mesa(4)));
        assert_eq!(all[1].id, CartId::Table(mesa(12)));
    }
}
