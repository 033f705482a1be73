//! # Sale Processor
//!
//! Records a sale as one atomic unit: stock decrements, the sale with its
//! items, and one SALE audit entry per product.
//!
//! ## Transaction Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  consolidate_lines(request.items)          pure, before any I/O         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  let mut tx = pool.begin()   ───────────────────────────────┐           │
//! │       │                                                     │           │
//! │       ├── for each line:                                    │           │
//! │       │     decrement_stock(&mut tx, id, qty)?  ── Err ──►  │ tx drops  │
//! │       │     builder.add_line(&product, qty)                 │ = ROLLBACK│
//! │       │                                                     │           │
//! │       ├── SaleRepository::insert(&mut tx, &sale)?  ── Err ─►│           │
//! │       ├── ProductLogRepository::record(..)?        ── Err ─►│           │
//! │       │                                                     │           │
//! │       ▼                                                     │           │
//! │  tx.commit()  ← the only point where anything becomes visible           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failing line (unknown product, short stock) aborts the whole sale: no
//! line's decrement survives, no sale row, no log entry.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use stockroom_core::sale::{consolidate_lines, SaleBuilder};
use stockroom_core::{LogAction, Sale, SaleRequest};
use tracing::{debug, info, warn};

use crate::error::DbResult;
use crate::repository::product::{commit, ProductRepository};
use crate::repository::product_log::ProductLogRepository;
use crate::repository::sale::{generate_sale_id, generate_sale_item_id, SaleRepository};

/// Records sales against the inventory.
#[derive(Debug, Clone)]
pub struct SaleProcessor {
    pool: SqlitePool,
}

impl SaleProcessor {
    pub fn new(pool: SqlitePool) -> Self {
        SaleProcessor { pool }
    }

    /// Records a sale timestamped now.
    ///
    /// ## Returns
    /// * `Ok(Sale)` - Committed sale with its items
    /// * `Err(Domain(EmptySale | TooManyLines | Validation | AmountOverflow))` - Bad request
    /// * `Err(Domain(ProductNotFound))` - A line names an unknown or inactive product
    /// * `Err(Domain(InsufficientStock))` - A line asks for more than is on hand
    pub async fn process(&self, request: SaleRequest) -> DbResult<Sale> {
        self.process_at(request, Utc::now()).await
    }

    /// Records a sale with an explicit timestamp.
    pub async fn process_at(&self, request: SaleRequest, at: DateTime<Utc>) -> DbResult<Sale> {
        let lines = consolidate_lines(&request.items)?;
        let sale_id = generate_sale_id();

        debug!(sale_id = %sale_id, lines = lines.len(), "Processing sale");

        let mut tx = self.pool.begin().await?;
        let mut builder = SaleBuilder::new(sale_id.as_str(), request.payment_method, at);
        let mut remaining = Vec::with_capacity(lines.len());

        for line in &lines {
            let product = match ProductRepository::decrement_stock(&mut tx, &line.product_id, line.quantity).await {
                Ok(product) => product,
                Err(e) => {
                    warn!(
                        sale_id = %sale_id,
                        product_id = %line.product_id,
                        quantity = line.quantity,
                        error = %e,
                        "Sale rejected"
                    );
                    return Err(e);
                }
            };
            remaining.push(product.stock);
            builder.add_line(generate_sale_item_id(), &product, line.quantity)?;
        }

        let sale = builder.finish();
        debug_assert!(sale.reconciles());

        SaleRepository::insert(&mut tx, &sale).await?;

        for (item, stock_after) in sale.items.iter().zip(&remaining) {
            ProductLogRepository::record(
                &mut tx,
                &item.product_id,
                LogAction::Sale,
                &format!(
                    "Sold {} units via {}. Stock: {} -> {}",
                    item.quantity,
                    sale.payment_method,
                    stock_after + item.quantity,
                    stock_after
                ),
            )
            .await?;
        }

        commit(tx).await?;

        info!(
            sale_id = %sale.id,
            items = sale.items.len(),
            total = %sale.total_amount,
            profit = %sale.total_profit,
            payment_method = %sale.payment_method,
            "Sale recorded"
        );
        Ok(sale)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig, DbError};
    use std::time::Duration;
    use stockroom_core::{CoreError, Money, NewProduct, PaymentMethod, ProductUpdate, SaleLineRequest};
    use tempfile::TempDir;

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn product(db: &Database, name: &str, price: i64, cost: i64, stock: i64) -> String {
        db.products()
            .create(NewProduct {
                name: name.to_string(),
                category: "General".to_string(),
                sku: None,
                cost: Money::from_cents(cost),
                price: Money::from_cents(price),
                stock,
            })
            .await
            .unwrap()
            .id
    }

    fn request(lines: &[(&str, i64)], payment_method: PaymentMethod) -> SaleRequest {
        SaleRequest {
            items: lines
                .iter()
                .map(|(id, qty)| SaleLineRequest {
                    product_id: id.to_string(),
                    quantity: *qty,
                })
                .collect(),
            payment_method,
        }
    }

    async fn stock_of(db: &Database, id: &str) -> i64 {
        db.products().get_by_id(id).await.unwrap().unwrap().stock
    }

    #[tokio::test]
    async fn test_sell_three_of_ten() {
        let db = setup().await;
        let id = product(&db, "Coffee Beans", 500, 200, 10).await;

        let sale = db
            .sale_processor()
            .process(request(&[(id.as_str(), 3)], PaymentMethod::Cash))
            .await
            .unwrap();

        assert_eq!(stock_of(&db, &id).await, 7);
        assert_eq!(sale.total_amount.to_string(), "15.00");
        assert_eq!(sale.total_profit.to_string(), "9.00");
        assert_eq!(sale.items.len(), 1);
        assert_eq!(sale.items[0].price_at_sale.cents(), 500);
        assert_eq!(sale.items[0].cost_at_sale.cents(), 200);

        let logs = db.product_logs().list_for_product(&id).await.unwrap();
        assert_eq!(logs[0].action, LogAction::Sale);
        assert_eq!(logs[0].details, "Sold 3 units via Cash. Stock: 10 -> 7");

        let stored = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(stored.items, sale.items);
        assert_eq!(stored.total_amount, sale.total_amount);
        assert!(stored.reconciles());
    }

    #[tokio::test]
    async fn test_oversell_is_rejected_and_nothing_persists() {
        let db = setup().await;
        let id = product(&db, "Coffee Beans", 500, 200, 2).await;

        let result = db
            .sale_processor()
            .process(request(&[(id.as_str(), 5)], PaymentMethod::Cash))
            .await;

        match result {
            Err(DbError::Domain(CoreError::InsufficientStock {
                available, requested, ..
            })) => {
                assert_eq!(available, 2);
                assert_eq!(requested, 5);
            }
            other => panic!("expected insufficient stock, got {other:?}"),
        }
        assert_eq!(stock_of(&db, &id).await, 2);
        assert_eq!(db.sales().count().await.unwrap(), 0);
        let logs = db.product_logs().list_for_product(&id).await.unwrap();
        assert!(logs.iter().all(|l| l.action != LogAction::Sale));
    }

    #[tokio::test]
    async fn test_failing_later_line_rolls_back_earlier_lines() {
        let db = setup().await;
        let tea = product(&db, "Tea", 300, 100, 10).await;
        let milk = product(&db, "Milk", 150, 90, 1).await;

        let result = db
            .sale_processor()
            .process(request(&[(tea.as_str(), 4), (milk.as_str(), 2)], PaymentMethod::Card))
            .await;

        assert!(matches!(
            result,
            Err(DbError::Domain(CoreError::InsufficientStock { .. }))
        ));
        assert_eq!(stock_of(&db, &tea).await, 10);
        assert_eq!(stock_of(&db, &milk).await, 1);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_product_rejects_whole_sale() {
        let db = setup().await;
        let tea = product(&db, "Tea", 300, 100, 10).await;

        let result = db
            .sale_processor()
            .process(request(&[(tea.as_str(), 1), ("no-such-product", 1)], PaymentMethod::Cash))
            .await;

        assert!(matches!(
            result,
            Err(DbError::Domain(CoreError::ProductNotFound(_)))
        ));
        assert_eq!(stock_of(&db, &tea).await, 10);
    }

    #[tokio::test]
    async fn test_inactive_product_cannot_be_sold() {
        let db = setup().await;
        let tea = product(&db, "Tea", 300, 100, 10).await;
        db.products().deactivate(&tea).await.unwrap();

        let result = db
            .sale_processor()
            .process(request(&[(tea.as_str(), 1)], PaymentMethod::Cash))
            .await;
        assert!(matches!(
            result,
            Err(DbError::Domain(CoreError::ProductNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_multi_line_totals_reconcile() {
        let db = setup().await;
        let tea = product(&db, "Tea", 299, 120, 50).await;
        let cake = product(&db, "Cake", 1050, 1100, 5).await;

        let sale = db
            .sale_processor()
            .process(request(&[(tea.as_str(), 7), (cake.as_str(), 2), (tea.as_str(), 1)], PaymentMethod::Transfer))
            .await
            .unwrap();

        assert_eq!(sale.items.len(), 2, "repeated product merged into one line");
        assert_eq!(sale.items[0].quantity, 8);
        assert_eq!(sale.total_amount.cents(), 299 * 8 + 1050 * 2);
        assert_eq!(sale.total_profit.cents(), 179 * 8 - 50 * 2);
        assert!(sale.reconciles());
        assert_eq!(stock_of(&db, &tea).await, 42);
        assert_eq!(stock_of(&db, &cake).await, 3);
    }

    #[tokio::test]
    async fn test_price_change_after_sale_keeps_snapshot() {
        let db = setup().await;
        let id = product(&db, "Coffee Beans", 500, 200, 10).await;
        let sale = db
            .sale_processor()
            .process(request(&[(id.as_str(), 1)], PaymentMethod::Cash))
            .await
            .unwrap();

        db.products()
            .update(
                &id,
                ProductUpdate {
                    price: Some(Money::from_cents(999)),
                    cost: Some(Money::from_cents(600)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let stored = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(stored.items[0].price_at_sale.cents(), 500);
        assert_eq!(stored.items[0].cost_at_sale.cents(), 200);
        assert_eq!(stored.total_amount.cents(), 500);
    }

    #[tokio::test]
    async fn test_concurrent_sales_cannot_oversell() {
        let db = setup().await;
        let id = product(&db, "Coffee Beans", 500, 200, 10).await;

        let first = {
            let processor = db.sale_processor();
            let req = request(&[(id.as_str(), 6)], PaymentMethod::Cash);
            tokio::spawn(async move { processor.process(req).await })
        };
        let second = {
            let processor = db.sale_processor();
            let req = request(&[(id.as_str(), 6)], PaymentMethod::Card);
            tokio::spawn(async move { processor.process(req).await })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let short = results
            .iter()
            .filter(|r| matches!(r, Err(DbError::Domain(CoreError::InsufficientStock { .. }))))
            .count();

        assert_eq!(successes, 1);
        assert_eq!(short, 1);
        assert_eq!(stock_of(&db, &id).await, 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_connections_racing_for_last_units() {
        let dir = TempDir::new().unwrap();
        let config = DbConfig::new(dir.path().join("stockroom.db"))
            .max_connections(16)
            .busy_timeout(Duration::from_secs(30));
        let db = Database::new(config).await.unwrap();
        let id = product(&db, "Coffee Beans", 500, 200, 10).await;

        let handles: Vec<_> = (0..30)
            .map(|_| {
                let processor = db.sale_processor();
                let req = request(&[(id.as_str(), 1)], PaymentMethod::Cash);
                tokio::spawn(async move { processor.process(req).await })
            })
            .collect();

        let mut sold = 0;
        let mut short = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => sold += 1,
                Err(DbError::Domain(CoreError::InsufficientStock { available, .. })) => {
                    assert_eq!(available, 0);
                    short += 1;
                }
                Err(other) => panic!("unexpected sale error: {other}"),
            }
        }

        assert_eq!(sold, 10);
        assert_eq!(short, 20);
        assert_eq!(stock_of(&db, &id).await, 0);
        assert_eq!(db.sales().count().await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_list_recent_is_newest_first_with_items() {
        let db = setup().await;
        let id = product(&db, "Tea", 300, 100, 10).await;
        let processor = db.sale_processor();

        let older = processor
            .process_at(
                request(&[(id.as_str(), 1)], PaymentMethod::Cash),
                Utc::now() - chrono::Duration::hours(2),
            )
            .await
            .unwrap();
        let newer = processor
            .process(request(&[(id.as_str(), 2)], PaymentMethod::Card))
            .await
            .unwrap();

        let sales = db.sales().list_recent(None).await.unwrap();
        assert_eq!(sales.len(), 2);
        assert_eq!(sales[0].id, newer.id);
        assert_eq!(sales[1].id, older.id);
        assert_eq!(sales[0].items[0].quantity, 2);
        assert_eq!(sales[1].items[0].quantity, 1);

        let limited = db.sales().list_recent(Some(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].items.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_sale_is_rejected_before_touching_the_database() {
        let db = setup().await;
        let result = db
            .sale_processor()
            .process(request(&[], PaymentMethod::Cash))
            .await;
        assert!(matches!(result, Err(DbError::Domain(CoreError::EmptySale))));
    }
}
