//! # Seed Data Generator
//!
//! Populates the store with demo products and barcode batches for
//! development.
//!
//! ## Usage
//! ```bash
//! # Seed with defaults
//! cargo run -p mesa-store --bin seed
//!
//! # Specify database path
//! cargo run -p mesa-store --bin seed -- --db ./data/mesa.db
//! ```
//!
//! ## Generated Data
//! A small Peruvian restaurant/bodega catalog:
//! - Drinks (Inca Kola, chicha morada, ...)
//! - Dishes (lomo saltado, ají de gallina, ...)
//! - Packaged goods with wholesale prices
//!
//! Most products get one or two barcode batches whose quantities add up to
//! the product's stock; one product is deliberately seeded with a batch gap
//! so the stock audit has something to flag, and one has stock but no
//! batches so the fallback-batch path is exercised.

use chrono::Utc;
use std::env;
use tracing::info;
use uuid::Uuid;

use mesa_core::{reconcile, BarcodeBatch, Product};
use mesa_store::{Store, StoreConfig};

/// (sku, name, unit price, wholesale price, stock, batch quantities)
///
/// Prices are IGV-inclusive céntimos. A batch-quantity list that does not
/// sum to the stock is intentional; see module docs.
const CATALOG: &[(&str, &str, i64, Option<i64>, i64, &[i64])] = &[
    ("BEB-001", "Inca Kola 500ml", 350, Some(300), 48, &[24, 24]),
    ("BEB-002", "Chicha Morada 1L", 800, None, 20, &[20]),
    ("BEB-003", "Agua San Luis 625ml", 200, Some(150), 60, &[30, 30]),
    ("BEB-004", "Cusqueña Dorada 330ml", 750, Some(650), 36, &[36]),
    ("PLT-001", "Lomo Saltado", 2800, None, 15, &[15]),
    ("PLT-002", "Ají de Gallina", 2500, None, 12, &[12]),
    ("PLT-003", "Ceviche de Pescado", 3200, None, 10, &[10]),
    ("PLT-004", "Arroz Chaufa", 2200, None, 18, &[18]),
    // Batch gap: stock 25, batches sum to 22 (audit flags -3)
    ("ABA-001", "Arroz Costeño 5kg", 2590, Some(2300), 25, &[10, 12]),
    ("ABA-002", "Aceite Primor 1L", 1180, Some(1050), 30, &[30]),
    // Stock but no batches: sold through the SKU fallback batch
    ("ABA-003", "Leche Gloria Tarro", 450, Some(400), 24, &[]),
    ("ABA-004", "Fideos Don Vittorio 500g", 320, Some(280), 40, &[20, 20]),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./mesa_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Mesa POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./mesa_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Mesa POS Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let store = Store::new(StoreConfig::new(&db_path)).await?;

    println!("✓ Connected to store");
    println!("✓ Migrations applied");

    let products = store.products();

    let existing = products.count().await?;
    if existing > 0 {
        println!("⚠ Store already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding catalog...");

    let mut audits_flagged = 0;

    for &(sku, name, unit_price, wholesale, stock, batch_quantities) in CATALOG {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            sku: sku.to_string(),
            name: name.to_string(),
            unit_price_cents: unit_price,
            wholesale_price_cents: wholesale,
            promo_price_cents: None,
            stock,
            category_id: None,
            image_ref: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        products.insert(&product).await?;

        let mut batches = Vec::new();
        for (idx, &quantity) in batch_quantities.iter().enumerate() {
            let batch = BarcodeBatch {
                id: Uuid::new_v4().to_string(),
                product_id: product.id.clone(),
                code: format!("{}-L{}", sku, idx + 1),
                quantity,
                created_at: now,
            };
            products.insert_batch(&batch).await?;
            batches.push(batch);
        }

        let audit = reconcile::audit(&product, &batches);
        if audit.inconsistent {
            audits_flagged += 1;
            info!(
                sku = sku,
                difference = audit.difference,
                "Seeded product with a stock/batch gap"
            );
        }

        println!("  {} — {} (stock {})", sku, name, stock);
    }

    println!();
    println!("✓ Seeded {} products", CATALOG.len());
    println!("  {} flagged by the stock audit (intentional)", audits_flagged);
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
