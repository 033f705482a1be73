//! # Dashboard Repository
//!
//! Read-only aggregation over products and sales for the dashboard screen.
//!
//! ```text
//! stats(now)
//!   ├── today's totals      SUM/COUNT over sales in [00:00 today, 00:00 tomorrow)
//!   ├── low stock           active, stock < LOW_STOCK_THRESHOLD, lowest first
//!   ├── top sellers         SUM(quantity) GROUP BY product_id, highest first
//!   └── payment breakdown   all-time, one entry per method, zero-filled
//!
//! trend(today)
//!   └── (date_time, total) rows in the window → analytics::daily_trend
//! ```
//!
//! Timestamps are stored as RFC 3339 text in UTC, so range filters compare
//! strings and stay index-friendly.

use chrono::{DateTime, Days, NaiveDate, Utc};
use sqlx::SqlitePool;
use stockroom_core::analytics::{daily_trend, trend_start};
use stockroom_core::{
    DailySales, DashboardStats, LowStockProduct, Money, PaymentMethod, PaymentMethodTotal,
    TopSeller, DASHBOARD_LIST_LIMIT, LOW_STOCK_THRESHOLD,
};
use tracing::debug;

use crate::error::DbResult;

#[derive(Debug, sqlx::FromRow)]
struct LowStockRow {
    id: String,
    name: String,
    stock: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct TopSellerRow {
    product_id: String,
    name: String,
    quantity: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentMethodRow {
    payment_method: PaymentMethod,
    count: i64,
    total_cents: i64,
}

/// Read-side aggregates for the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
}

impl DashboardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DashboardRepository { pool }
    }

    /// Computes dashboard figures as of `now`.
    pub async fn stats(&self, now: DateTime<Utc>) -> DbResult<DashboardStats> {
        let today = now.date_naive();
        let (from, until) = (start_of(today), start_of(next_day(today)));
        debug!(%today, "Computing dashboard stats");

        let (total_cents, profit_cents, transaction_count): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_amount_cents), 0),
                   COALESCE(SUM(total_profit_cents), 0),
                   COUNT(*)
            FROM sales
            WHERE date_time >= ?1 AND date_time < ?2
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_one(&self.pool)
        .await?;

        let low_stock = sqlx::query_as::<_, LowStockRow>(
            r#"
            SELECT id, name, stock
            FROM products
            WHERE is_active = 1 AND stock < ?1
            ORDER BY stock ASC, name ASC
            LIMIT ?2
            "#,
        )
        .bind(LOW_STOCK_THRESHOLD)
        .bind(DASHBOARD_LIST_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        let top_sellers = sqlx::query_as::<_, TopSellerRow>(
            r#"
            SELECT si.product_id AS product_id,
                   p.name AS name,
                   SUM(si.quantity) AS quantity
            FROM sale_items si
            JOIN products p ON p.id = si.product_id
            GROUP BY si.product_id, p.name
            ORDER BY quantity DESC, p.name ASC
            LIMIT ?1
            "#,
        )
        .bind(DASHBOARD_LIST_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        let by_method = sqlx::query_as::<_, PaymentMethodRow>(
            r#"
            SELECT payment_method,
                   COUNT(*) AS count,
                   COALESCE(SUM(total_amount_cents), 0) AS total_cents
            FROM sales
            GROUP BY payment_method
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let sales_by_payment_method = PaymentMethod::ALL
            .iter()
            .map(|method| {
                let row = by_method.iter().find(|r| r.payment_method == *method);
                PaymentMethodTotal {
                    payment_method: *method,
                    count: row.map_or(0, |r| r.count),
                    total: Money::from_cents(row.map_or(0, |r| r.total_cents)),
                }
            })
            .collect();

        Ok(DashboardStats {
            total_sales_today: Money::from_cents(total_cents),
            total_profit_today: Money::from_cents(profit_cents),
            transaction_count,
            low_stock_products: low_stock
                .into_iter()
                .map(|r| LowStockProduct {
                    id: r.id,
                    name: r.name,
                    stock: r.stock,
                })
                .collect(),
            top_selling_products: top_sellers
                .into_iter()
                .map(|r| TopSeller {
                    product_id: r.product_id,
                    name: r.name,
                    quantity: r.quantity,
                })
                .collect(),
            sales_by_payment_method,
        })
    }

    /// Daily revenue for the week ending on `today`, oldest day first.
    pub async fn trend(&self, today: NaiveDate) -> DbResult<Vec<DailySales>> {
        let rows: Vec<(DateTime<Utc>, i64)> = sqlx::query_as(
            r#"
            SELECT date_time, total_amount_cents
            FROM sales
            WHERE date_time >= ?1 AND date_time < ?2
            "#,
        )
        .bind(start_of(trend_start(today)))
        .bind(start_of(next_day(today)))
        .fetch_all(&self.pool)
        .await?;

        let sales: Vec<_> = rows
            .into_iter()
            .map(|(at, cents)| (at, Money::from_cents(cents)))
            .collect();
        Ok(daily_trend(today, &sales))
    }
}

fn start_of(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(chrono::NaiveTime::MIN).and_utc()
}

fn next_day(day: NaiveDate) -> NaiveDate {
    day.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::TimeZone;
    use stockroom_core::{NewProduct, SaleLineRequest, SaleRequest};

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

    async fn sell(db: &Database, id: &str, qty: i64, method: PaymentMethod, at: DateTime<Utc>) {
        db.sale_processor()
            .process_at(
                SaleRequest {
                    items: vec![SaleLineRequest {
                        product_id: id.to_string(),
                        quantity: qty,
                    }],
                    payment_method: method,
                },
                at,
            )
            .await
            .unwrap();
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, day, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_empty_store() {
        let db = setup().await;
        let stats = db.dashboard().stats(at(15, 12)).await.unwrap();

        assert!(stats.total_sales_today.is_zero());
        assert!(stats.total_profit_today.is_zero());
        assert_eq!(stats.transaction_count, 0);
        assert!(stats.low_stock_products.is_empty());
        assert!(stats.top_selling_products.is_empty());
        let methods: Vec<_> = stats
            .sales_by_payment_method
            .iter()
            .map(|m| (m.payment_method, m.count))
            .collect();
        assert_eq!(
            methods,
            [
                (PaymentMethod::Cash, 0),
                (PaymentMethod::Card, 0),
                (PaymentMethod::Transfer, 0)
            ]
        );
    }

    #[tokio::test]
    async fn test_today_totals_exclude_other_days() {
        let db = setup().await;
        let tea = product(&db, "Tea", 500, 200, 100).await;

        sell(&db, &tea, 3, PaymentMethod::Cash, at(15, 9)).await;
        sell(&db, &tea, 1, PaymentMethod::Card, at(15, 23)).await;
        sell(&db, &tea, 10, PaymentMethod::Cash, at(14, 23)).await;

        let stats = db.dashboard().stats(at(15, 23)).await.unwrap();
        assert_eq!(stats.total_sales_today.cents(), 2000);
        assert_eq!(stats.total_profit_today.cents(), 1200);
        assert_eq!(stats.transaction_count, 2);

        let cash = &stats.sales_by_payment_method[0];
        assert_eq!(cash.count, 2, "breakdown covers all days");
        assert_eq!(cash.total.cents(), 6500);
    }

    #[tokio::test]
    async fn test_low_stock_lowest_first_and_capped() {
        let db = setup().await;
        for (name, stock) in [("A", 9), ("B", 0), ("C", 4), ("D", 10), ("E", 2), ("F", 7), ("G", 1)] {
            product(&db, name, 100, 50, stock).await;
        }
        let hidden = product(&db, "H", 100, 50, 0).await;
        db.products().deactivate(&hidden).await.unwrap();

        let stats = db.dashboard().stats(Utc::now()).await.unwrap();
        let listed: Vec<_> = stats
            .low_stock_products
            .iter()
            .map(|p| (p.name.as_str(), p.stock))
            .collect();
        assert_eq!(listed, [("B", 0), ("G", 1), ("E", 2), ("C", 4), ("F", 7)]);
    }

    #[tokio::test]
    async fn test_top_sellers_grouped_by_product() {
        let db = setup().await;
        let first = product(&db, "Mug", 800, 300, 50).await;
        let second = product(&db, "Mug", 900, 300, 50).await;
        let tea = product(&db, "Tea", 500, 200, 50).await;

        sell(&db, &first, 2, PaymentMethod::Cash, at(15, 9)).await;
        sell(&db, &second, 2, PaymentMethod::Cash, at(15, 10)).await;
        sell(&db, &tea, 4, PaymentMethod::Cash, at(15, 11)).await;
        sell(&db, &first, 1, PaymentMethod::Cash, at(15, 12)).await;

        let stats = db.dashboard().stats(at(15, 13)).await.unwrap();
        let top: Vec<_> = stats
            .top_selling_products
            .iter()
            .map(|t| (t.product_id.as_str(), t.quantity))
            .collect();
        assert_eq!(top, [(tea.as_str(), 4), (first.as_str(), 3), (second.as_str(), 2)]);
    }

    #[tokio::test]
    async fn test_trend_zero_fills_quiet_days() {
        let db = setup().await;
        let tea = product(&db, "Tea", 500, 200, 100).await;

        sell(&db, &tea, 1, PaymentMethod::Cash, at(11, 10)).await;
        sell(&db, &tea, 2, PaymentMethod::Card, at(11, 15)).await;
        sell(&db, &tea, 4, PaymentMethod::Cash, at(13, 8)).await;
        // Outside the window.
        sell(&db, &tea, 9, PaymentMethod::Cash, at(8, 8)).await;

        let today = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        let trend = db.dashboard().trend(today).await.unwrap();

        assert_eq!(trend.len(), 7);
        assert_eq!(trend[0].date, NaiveDate::from_ymd_opt(2026, 10, 9).unwrap());
        assert_eq!(trend[6].date, today);
        assert_eq!(trend[2].total.cents(), 1500);
        assert_eq!(trend[2].count, 2);
        assert_eq!(trend[4].total.cents(), 2000);
        assert_eq!(trend.iter().filter(|d| d.total.is_zero()).count(), 5);
    }
}
