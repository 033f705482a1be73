//! # Sale Repository
//!
//! Storage and retrieval of committed sales and their line items.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. RECORD (SaleProcessor, one transaction)                            │
//! │     └── insert(conn, &sale) → sales row + one sale_items row per line  │
//! │                                                                         │
//! │  2. READ (this repository, pool-scoped)                                │
//! │     └── get_by_id(id)       → Sale with items in line order            │
//! │     └── list_recent(limit)  → newest first, items attached             │
//! │                                                                         │
//! │  There is no update or delete: a sale is immutable once recorded.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use stockroom_core::{Money, PaymentMethod, Sale, SaleItem};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    date_time: DateTime<Utc>,
    total_amount_cents: i64,
    total_profit_cents: i64,
    payment_method: PaymentMethod,
}

impl SaleRow {
    fn into_sale(self, items: Vec<SaleItem>) -> Sale {
        Sale {
            id: self.id,
            date_time: self.date_time,
            total_amount: Money::from_cents(self.total_amount_cents),
            total_profit: Money::from_cents(self.total_profit_cents),
            payment_method: self.payment_method,
            items,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SaleItemRow {
    id: String,
    sale_id: String,
    product_id: String,
    product_name: String,
    quantity: i64,
    price_at_sale_cents: i64,
    cost_at_sale_cents: i64,
}

impl From<SaleItemRow> for SaleItem {
    fn from(row: SaleItemRow) -> Self {
        SaleItem {
            id: row.id,
            sale_id: row.sale_id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            price_at_sale: Money::from_cents(row.price_at_sale_cents),
            cost_at_sale: Money::from_cents(row.cost_at_sale_cents),
        }
    }
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale with its items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let row = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, date_time, total_amount_cents, total_profit_cents, payment_method
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, SaleItemRow>(
            r#"
            SELECT id, sale_id, product_id, product_name, quantity,
                   price_at_sale_cents, cost_at_sale_cents
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(row.into_sale(items.into_iter().map(SaleItem::from).collect())))
    }

    /// Lists sales newest first, each with its items.
    ///
    /// `limit = None` returns every sale.
    pub async fn list_recent(&self, limit: Option<u32>) -> DbResult<Vec<Sale>> {
        // SQLite treats a negative LIMIT as "no limit".
        let limit = limit.map(i64::from).unwrap_or(-1);
        debug!(limit, "Listing sales");

        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, date_time, total_amount_cents, total_profit_cents, payment_method
            FROM sales
            ORDER BY date_time DESC, id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let item_rows = sqlx::query_as::<_, SaleItemRow>(
            r#"
            SELECT id, sale_id, product_id, product_name, quantity,
                   price_at_sale_cents, cost_at_sale_cents
            FROM sale_items
            WHERE sale_id IN (
                SELECT id FROM sales ORDER BY date_time DESC, id DESC LIMIT ?1
            )
            ORDER BY sale_id, line_no
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut items_by_sale: HashMap<String, Vec<SaleItem>> = HashMap::new();
        for row in item_rows {
            items_by_sale
                .entry(row.sale_id.clone())
                .or_default()
                .push(row.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = items_by_sale.remove(&row.id).unwrap_or_default();
                row.into_sale(items)
            })
            .collect())
    }

    /// Inserts a sale header and all of its items on the given connection.
    pub async fn insert(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
        debug!(sale_id = %sale.id, items = sale.items.len(), "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (id, date_time, total_amount_cents, total_profit_cents, payment_method)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&sale.id)
        .bind(sale.date_time)
        .bind(sale.total_amount.cents())
        .bind(sale.total_profit.cents())
        .bind(sale.payment_method)
        .execute(&mut *conn)
        .await?;

        for (line_no, item) in sale.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, line_no, product_id, product_name, quantity,
                    price_at_sale_cents, cost_at_sale_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(&item.sale_id)
            .bind(line_no as i64)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.price_at_sale.cents())
            .bind(item.cost_at_sale.cents())
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Counts recorded sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Generates a new sale ID.
pub fn generate_sale_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new sale item ID.
pub fn generate_sale_item_id() -> String {
    Uuid::new_v4().to_string()
}
