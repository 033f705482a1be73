//! # Seed Data Generator
//!
//! Populates a development database with products and a week of sales, so
//! the dashboard and trend endpoints have something to show.
//!
//! ## Usage
//! ```bash
//! # Default database, 40 sales spread over the last 7 days
//! cargo run -p stockroom-db --bin seed
//!
//! # Custom amount of sales
//! cargo run -p stockroom-db --bin seed -- --sales 200
//!
//! # Specify database path
//! cargo run -p stockroom-db --bin seed -- --db ./data/stockroom.db
//! ```
//!
//! Every product goes through `ProductRepository::create` and every sale
//! through `SaleProcessor::process_at`, so stock, audit log and totals are
//! consistent with what the API would have produced.

use anyhow::Context;
use chrono::{Duration, Utc};
use std::env;
use stockroom_core::{Money, NewProduct, PaymentMethod, SaleLineRequest, SaleRequest};
use stockroom_db::{Database, DbConfig, DbError};

/// (category, [(name, cost cents, price cents, stock)])
const CATEGORIES: &[(&str, &[(&str, i64, i64, i64)])] = &[
    (
        "Beverages",
        &[
            ("Espresso Beans 1kg", 1400, 2400, 40),
            ("Green Tea 50 bags", 250, 499, 60),
            ("Orange Juice 1L", 120, 289, 35),
            ("Sparkling Water 6-pack", 180, 399, 8),
        ],
    ),
    (
        "Snacks",
        &[
            ("Salted Almonds 200g", 210, 450, 25),
            ("Dark Chocolate Bar", 95, 249, 70),
            ("Oat Cookies", 130, 299, 6),
        ],
    ),
    (
        "Dairy",
        &[
            ("Whole Milk 1L", 70, 149, 50),
            ("Greek Yogurt 500g", 160, 349, 3),
            ("Cheddar 250g", 240, 525, 20),
        ],
    ),
    (
        "Household",
        &[
            ("Dish Soap 750ml", 110, 275, 30),
            ("Paper Towels 4-pack", 300, 650, 12),
            ("Trash Bags 30ct", 260, 599, 0),
        ],
    ),
];

const DEFAULT_DB_PATH: &str = "./stockroom_dev.db";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut sale_count: usize = 40;
    let mut db_path = String::from(DEFAULT_DB_PATH);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--sales" | "-s" => {
                if i + 1 < args.len() {
                    sale_count = args[i + 1]
                        .parse()
                        .with_context(|| format!("invalid --sales value: {}", args[i + 1]))?;
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockroom Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --sales <N>    Number of sales to generate (default: 40)");
                println!("  -d, --db <PATH>    Database file path (default: {DEFAULT_DB_PATH})");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => eprintln!("Ignoring unknown argument: {other}"),
        }
        i += 1;
    }

    println!("Stockroom Seed Data Generator");
    println!("=============================");
    println!("Database: {db_path}");
    println!("Sales:    {sale_count}");
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening {db_path}"))?;
    println!("✓ Connected to database, migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {existing} products");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Products
    let mut product_ids = Vec::new();
    for (category, items) in CATEGORIES {
        for (index, (name, cost, price, stock)) in items.iter().enumerate() {
            let sku = format!("{}-{:03}", &category[..3].to_uppercase(), index + 1);
            let product = db
                .products()
                .create(NewProduct {
                    name: name.to_string(),
                    category: category.to_string(),
                    sku: Some(sku),
                    cost: Money::from_cents(*cost),
                    price: Money::from_cents(*price),
                    stock: *stock,
                })
                .await
                .with_context(|| format!("creating {name}"))?;
            product_ids.push(product.id);
        }
    }
    println!("✓ Created {} products", product_ids.len());

    // Sales, spread backwards over the last 7 days
    let now = Utc::now();
    let mut recorded = 0;
    let mut skipped = 0;
    for n in 0..sale_count {
        let first = &product_ids[(n * 7) % product_ids.len()];
        let second = &product_ids[(n * 3 + 1) % product_ids.len()];
        let mut items = vec![SaleLineRequest {
            product_id: first.clone(),
            quantity: (n % 3 + 1) as i64,
        }];
        if n % 2 == 0 {
            items.push(SaleLineRequest {
                product_id: second.clone(),
                quantity: 1,
            });
        }

        let request = SaleRequest {
            items,
            payment_method: PaymentMethod::ALL[n % PaymentMethod::ALL.len()],
        };
        let at = now - Duration::minutes((n as i64 * 7 * 24 * 60) / sale_count.max(1) as i64);

        match db.sale_processor().process_at(request, at).await {
            Ok(_) => recorded += 1,
            // Seeded stock runs out for some products; that is expected.
            Err(DbError::Domain(e)) => {
                skipped += 1;
                println!("  skipped sale {n}: {e}");
            }
            Err(e) => return Err(e.into()),
        }
    }
    println!("✓ Recorded {recorded} sales ({skipped} rejected)");

    let stats = db.dashboard().stats(now).await?;
    println!();
    println!(
        "Today: {} revenue, {} profit, {} transactions",
        stats.total_sales_today, stats.total_profit_today, stats.transaction_count
    );
    println!("Low stock products: {}", stats.low_stock_products.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
