//! # mesa-store: Persistence Layer for Mesa POS
//!
//! This crate provides database access for the Mesa POS system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Mesa POS Data Flow                               │
//! │                                                                         │
//! │  Caller (API handler / terminal glue)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     mesa-store (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐ │   │
//! │  │   │     Store     │    │  Repositories  │    │  Migrations  │ │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │ │   │
//! │  │   │               │    │ ProductRepo    │    │              │ │   │
//! │  │   │ SqlitePool    │◄───│ TableCartRepo  │    │ 001_init.sql │ │   │
//! │  │   │ StoreEvent    │    │ SaleRepo       │    │ ...          │ │   │
//! │  │   │ broadcast     │    │                │    │              │ │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘ │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (mesa.db, WAL mode)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`events`] - Committed-change notifications (cache invalidation)
//! - [`error`] - Store error types
//! - [`repository`] - Repository implementations (product, table cart, sale)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mesa_store::{Store, StoreConfig};
//!
//! let store = Store::new(StoreConfig::new("path/to/mesa.db")).await?;
//!
//! // Versioned table-cart snapshots
//! let mesa7 = TableNumber::new(7)?;
//! let saved = store.tables().save(mesa7, &cart, 0).await?;
//!
//! // Change notifications
//! let mut rx = store.subscribe();
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod events;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use events::StoreEvent;
pub use pool::{Store, StoreConfig};

// Repository re-exports for convenience
pub use repository::product::ProductRepository;
pub use repository::sale::{SaleItemRecord, SaleRecord, SaleRepository};
pub use repository::table_cart::TableCartRepository;
