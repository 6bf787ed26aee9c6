//! # Repository Module
//!
//! Database repository implementations for the Mesa POS store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Caller                                                                │
//! │       │                                                                 │
//! │       │  store.tables().save(table, &cart, version)                    │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  TableCartRepository                                                   │
//! │  ├── save(&self, table, cart, expected_version)                        │
//! │  ├── load(&self, table)                                                │
//! │  ├── load_all(&self)                                                   │
//! │  └── clear(&self, table)                                               │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • Easy to test against an in-memory store                             │
//! │  • SQL is isolated in one place                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product catalog and barcode batches
//! - [`table_cart::TableCartRepository`] - Versioned per-mesa cart snapshots
//! - [`sale::SaleRepository`] - Sale insertion with stock decrement

pub mod product;
pub mod sale;
pub mod table_cart;
