//! # Product Repository
//!
//! The inventory store: product records and every change to their stock.
//!
//! ## Two Kinds of Methods
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  &self methods (own the transaction)    associated fns (borrow one)     │
//! │  ───────────────────────────────────    ─────────────────────────────   │
//! │  get_by_id, list_active, count          find(conn, id)                  │
//! │  create   → insert + CREATE log         lock_for_update(conn, id)       │
//! │  update   → lock + write + UPDATE log   insert(conn, product)           │
//! │  restock  → increment + RESTOCK log     decrement_stock(conn, id, qty)  │
//! │  deactivate → lock + DELETE log         increment_stock(conn, id, qty)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarded Decrement
//! ```text
//! UPDATE products SET stock = stock - 6
//! WHERE id = ? AND is_active = 1 AND stock >= 6      ← check and write are
//! RETURNING ...                                         one statement
//!
//!   stock=10, two sales of 6 race:
//!   sale A: 10 >= 6 ✓ → stock 4   (holds the write lock until commit)
//!   sale B: waits, then 4 >= 6 ✗ → no row → InsufficientStock
//! ```
//! Every multi-step write starts with a write statement, so its transaction
//! owns SQLite's write lock before it reads anything it later acts on.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use stockroom_core::validation::{
    normalize_sku, validate_new_product, validate_product_update, validate_restock_quantity,
};
use stockroom_core::{
    CoreError, LogAction, Money, NewProduct, Product, ProductUpdate, ValidationError, MAX_STOCK,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::product_log::ProductLogRepository;

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    category: String,
    sku: Option<String>,
    cost_cents: i64,
    price_cents: i64,
    stock: i64,
    is_active: bool,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            category: row.category,
            sku: row.sku,
            cost: Money::from_cents(row.cost_cents),
            price: Money::from_cents(row.price_cents),
            stock: row.stock,
            is_active: row.is_active,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for product database operations.
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
    // Reads
    // =========================================================================

    /// Gets a product by its ID, active or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        Self::find(&mut conn, id).await
    }

    /// Lists active products ordered by name.
    pub async fn list_active(&self) -> DbResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, category, sku, cost_cents, price_cents, stock,
                   is_active, version, created_at, updated_at
            FROM products
            WHERE is_active = 1
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Counts active products (for diagnostics and the seeder).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Audited writes (one transaction each)
    // =========================================================================

    /// Creates a product and its CREATE log entry.
    ///
    /// ## Returns
    /// * `Err(DbError::Domain(Validation))` - Bad input
    /// * `Err(DbError::UniqueViolation)` - SKU already taken
    pub async fn create(&self, input: NewProduct) -> DbResult<Product> {
        let input = validate_new_product(input)?;
        let now = Utc::now();
        let product = Product {
            id: generate_product_id(),
            name: input.name,
            category: input.category,
            sku: input.sku,
            cost: input.cost,
            price: input.price,
            stock: input.stock,
            is_active: true,
            version: 1,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;
        Self::insert(&mut tx, &product).await?;
        ProductLogRepository::record(
            &mut tx,
            &product.id,
            LogAction::Create,
            &format!("Created product: {}, Stock: {}", product.name, product.stock),
        )
        .await?;
        commit(tx).await?;

        info!(product_id = %product.id, name = %product.name, stock = product.stock, "Product created");
        Ok(product)
    }

    /// Applies a partial update.
    ///
    /// An UPDATE log entry is written only when price, cost or stock change.
    pub async fn update(&self, id: &str, changes: ProductUpdate) -> DbResult<Product> {
        validate_product_update(&changes)?;

        let mut tx = self.pool.begin().await?;
        let current = Self::lock_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        let sku = match changes.sku.as_deref() {
            Some(sku) => normalize_sku(Some(sku))?,
            None => current.sku.clone(),
        };

        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE products SET
                name = ?2,
                category = ?3,
                sku = ?4,
                cost_cents = ?5,
                price_cents = ?6,
                stock = ?7,
                updated_at = ?8,
                version = version + 1
            WHERE id = ?1
            RETURNING id, name, category, sku, cost_cents, price_cents, stock,
                      is_active, version, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref().map(str::trim).unwrap_or(current.name.as_str()))
        .bind(changes.category.as_deref().map(str::trim).unwrap_or(current.category.as_str()))
        .bind(&sku)
        .bind(changes.cost.unwrap_or(current.cost).cents())
        .bind(changes.price.unwrap_or(current.price).cents())
        .bind(changes.stock.unwrap_or(current.stock))
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| with_sku(e.into(), sku.as_deref()))?;

        if let Some(details) = changes.audit_details(&current) {
            ProductLogRepository::record(&mut tx, id, LogAction::Update, &details).await?;
        }
        commit(tx).await?;

        debug!(product_id = %id, "Product updated");
        Ok(row.into())
    }

    /// Adds stock to an active product and logs RESTOCK.
    pub async fn restock(&self, id: &str, quantity: i64) -> DbResult<Product> {
        validate_restock_quantity(quantity)?;

        let mut tx = self.pool.begin().await?;
        let product = Self::increment_stock(&mut tx, id, quantity).await?;
        ProductLogRepository::record(
            &mut tx,
            id,
            LogAction::Restock,
            &format!(
                "Restocked {} units. Stock: {} -> {}",
                quantity,
                product.stock - quantity,
                product.stock
            ),
        )
        .await?;
        commit(tx).await?;

        info!(product_id = %id, quantity, stock = product.stock, "Product restocked");
        Ok(product)
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// Sale history keeps referencing the row. Deactivating an already
    /// inactive product succeeds without writing a second DELETE entry.
    pub async fn deactivate(&self, id: &str) -> DbResult<Product> {
        let mut tx = self.pool.begin().await?;
        let current = Self::lock_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        if !current.is_active {
            tx.rollback().await?;
            return Ok(current);
        }

        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE products
            SET is_active = 0, updated_at = ?2
            WHERE id = ?1
            RETURNING id, name, category, sku, cost_cents, price_cents, stock,
                      is_active, version, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        ProductLogRepository::record(
            &mut tx,
            id,
            LogAction::Delete,
            "Product marked as inactive (soft delete)",
        )
        .await?;
        commit(tx).await?;

        info!(product_id = %id, "Product deactivated");
        Ok(row.into())
    }

    // =========================================================================
    // Transaction-scoped primitives
    // =========================================================================

    /// Reads a product on the given connection.
    pub async fn find(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, category, sku, cost_cents, price_cents, stock,
                   is_active, version, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Takes the write lock on a product's row and returns its current state.
    ///
    /// Bumps `version` as its write. Must be the first statement a
    /// read-modify-write transaction issues for this product.
    pub async fn lock_for_update(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE products SET version = version + 1
            WHERE id = ?1
            RETURNING id, name, category, sku, cost_cents, price_cents, stock,
                      is_active, version, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Inserts a fully built product.
    pub async fn insert(conn: &mut SqliteConnection, product: &Product) -> DbResult<()> {
        debug!(product_id = %product.id, sku = ?product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, category, sku, cost_cents, price_cents, stock,
                is_active, version, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.sku)
        .bind(product.cost.cents())
        .bind(product.price.cents())
        .bind(product.stock)
        .bind(product.is_active)
        .bind(product.version)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| with_sku(e.into(), product.sku.as_deref()))?;

        Ok(())
    }

    /// Removes `quantity` units from an active product, atomically checking
    /// that enough stock remains.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The row after the decrement
    /// * `Err(Domain(ProductNotFound))` - Unknown or inactive product
    /// * `Err(Domain(InsufficientStock))` - `stock < quantity`; nothing written
    pub async fn decrement_stock(
        conn: &mut SqliteConnection,
        id: &str,
        quantity: i64,
    ) -> DbResult<Product> {
        debug!(product_id = %id, quantity, "Decrementing stock");

        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE products
            SET stock = stock - ?2, updated_at = ?3, version = version + 1
            WHERE id = ?1 AND is_active = 1 AND stock >= ?2
            RETURNING id, name, category, sku, cost_cents, price_cents, stock,
                      is_active, version, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(row) = row {
            return Ok(row.into());
        }

        // No row matched: tell a missing product from a short one.
        match Self::find(conn, id).await? {
            Some(product) if product.is_active => Err(CoreError::InsufficientStock {
                product_id: product.id,
                product_name: product.name,
                available: product.stock,
                requested: quantity,
            }
            .into()),
            _ => Err(CoreError::ProductNotFound(id.to_string()).into()),
        }
    }

    /// Adds `quantity` units to an active product, keeping stock within
    /// `MAX_STOCK`.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The row after the increment
    /// * `Err(Domain(ProductNotFound))` - Unknown or inactive product
    /// * `Err(Domain(Validation(OutOfRange)))` - Result would exceed `MAX_STOCK`; nothing written
    pub async fn increment_stock(
        conn: &mut SqliteConnection,
        id: &str,
        quantity: i64,
    ) -> DbResult<Product> {
        debug!(product_id = %id, quantity, "Incrementing stock");

        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE products
            SET stock = stock + ?2, updated_at = ?3, version = version + 1
            WHERE id = ?1 AND is_active = 1 AND stock <= ?4 - ?2
            RETURNING id, name, category, sku, cost_cents, price_cents, stock,
                      is_active, version, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .bind(MAX_STOCK)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(row) = row {
            return Ok(row.into());
        }

        match Self::find(conn, id).await? {
            Some(product) if product.is_active => Err(ValidationError::OutOfRange {
                field: "stock".to_string(),
                min: 0,
                max: MAX_STOCK,
            }
            .into()),
            _ => Err(CoreError::ProductNotFound(id.to_string()).into()),
        }
    }
}

/// Commits, reporting failure as `TransactionFailed`.
pub(crate) async fn commit(tx: sqlx::Transaction<'_, sqlx::Sqlite>) -> DbResult<()> {
    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))
}

/// Fills in the offending SKU on a unique violation.
fn with_sku(err: DbError, sku: Option<&str>) -> DbError {
    match (err, sku) {
        (DbError::UniqueViolation { field, .. }, Some(sku)) => DbError::duplicate(field, sku),
        (err, _) => err,
    }
}

/// Generates a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
