//! # Product Log Repository
//!
//! Append-only audit trail of everything that happens to a product.
//!
//! ## Transactional Logging
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  let mut tx = pool.begin().await?;                                      │
//! │                                                                         │
//! │  ProductRepository::decrement_stock(&mut tx, ..)   ─┐                   │
//! │  ProductLogRepository::record(&mut tx, ..)         ─┤ same transaction  │
//! │                                                     │                   │
//! │  tx.commit().await?;  ← both visible, or neither   ─┘                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `record` never opens its own transaction. A log entry therefore cannot
//! outlive a rolled-back change, and a committed change always has its entry.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use stockroom_core::{LogAction, ProductLog};
use tracing::debug;

use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct ProductLogRow {
    id: i64,
    product_id: String,
    action: LogAction,
    details: String,
    timestamp: DateTime<Utc>,
}

impl From<ProductLogRow> for ProductLog {
    fn from(row: ProductLogRow) -> Self {
        ProductLog {
            id: row.id,
            product_id: row.product_id,
            action: row.action,
            details: row.details,
            timestamp: row.timestamp,
        }
    }
}

/// Repository for the product audit log.
#[derive(Debug, Clone)]
pub struct ProductLogRepository {
    pool: SqlitePool,
}

impl ProductLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductLogRepository { pool }
    }

    /// Appends an entry on the caller's connection or transaction.
    pub async fn record(
        conn: &mut SqliteConnection,
        product_id: &str,
        action: LogAction,
        details: &str,
    ) -> DbResult<()> {
        debug!(product_id = %product_id, action = %action, "Recording product log");

        sqlx::query(
            r#"
            INSERT INTO product_logs (product_id, action, details, timestamp)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(product_id)
        .bind(action)
        .bind(details)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Lists a product's history, newest first.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No product with this id, active or not
    pub async fn list_for_product(&self, product_id: &str) -> DbResult<Vec<ProductLog>> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE id = ?1)")
                .bind(product_id)
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(DbError::not_found("Product", product_id));
        }

        let rows = sqlx::query_as::<_, ProductLogRow>(
            r#"
            SELECT id, product_id, action, details, timestamp
            FROM product_logs
            WHERE product_id = ?1
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductLog::from).collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
