//! # Domain Types
//!
//! Core domain types used throughout Stockroom.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │   ProductLog    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (serial)    │       │
//! │  │  sku (optional) │◄──│  items: Vec<    │   │  product_id     │       │
//! │  │  cost, price    │   │    SaleItem>    │   │  action         │       │
//! │  │  stock >= 0     │   │  total_amount   │   │  details        │       │
//! │  │  is_active      │   │  total_profit   │   │  timestamp      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │ PaymentMethod   │   │   LogAction     │                             │
//! │  │  Cash (default) │   │  CREATE UPDATE  │                             │
//! │  │  Card Transfer  │   │  DELETE SALE    │                             │
//! │  └─────────────────┘   │  RESTOCK        │                             │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `SaleItem` copies the product's name, price and cost at the moment of
//! sale. Editing the product afterwards never rewrites sales history.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product held in inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Free-form grouping ("Beverages", "Snacks", ...).
    pub category: String,

    /// Stock Keeping Unit - unique when present.
    pub sku: Option<String>,

    /// Unit cost paid to the supplier.
    pub cost: Money,

    /// Unit selling price.
    pub price: Money,

    /// Units on hand. Never negative once a transaction commits.
    pub stock: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// Incremented on every mutation.
    pub version: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Profit earned on one unit at the current price and cost.
    #[inline]
    pub fn unit_margin(&self) -> Money {
        self.price - self.cost
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub sku: Option<String>,
    pub cost: Money,
    pub price: Money,
    #[serde(default)]
    pub stock: i64,
}

/// Partial update of a product. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    /// An empty string clears the SKU.
    pub sku: Option<String>,
    pub cost: Option<Money>,
    pub price: Option<Money>,
    pub stock: Option<i64>,
}

impl ProductUpdate {
    /// Describes the audited changes (price, cost, stock) this update makes
    /// to `current`, e.g. `"Price: 5.00 -> 6.00, Stock: 10 -> 12"`.
    ///
    /// Returns `None` when none of the audited fields actually change.
    pub fn audit_details(&self, current: &Product) -> Option<String> {
        let mut changes = Vec::new();

        if let Some(price) = self.price.filter(|p| *p != current.price) {
            changes.push(format!("Price: {} -> {}", current.price, price));
        }
        if let Some(cost) = self.cost.filter(|c| *c != current.cost) {
            changes.push(format!("Cost: {} -> {}", current.cost, cost));
        }
        if let Some(stock) = self.stock.filter(|s| *s != current.stock) {
            changes.push(format!("Stock: {} -> {}", current.stock, stock));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join(", "))
        }
    }
}

// =============================================================================
// Product Log
// =============================================================================

/// What happened to a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum LogAction {
    Create,
    Update,
    Delete,
    Sale,
    Restock,
}

impl LogAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LogAction::Create => "CREATE",
            LogAction::Update => "UPDATE",
            LogAction::Delete => "DELETE",
            LogAction::Sale => "SALE",
            LogAction::Restock => "RESTOCK",
        }
    }
}

impl fmt::Display for LogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only audit entry. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLog {
    pub id: i64,
    pub product_id: String,
    pub action: LogAction,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Payment Method
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Physical cash payment.
    #[default]
    #[serde(alias = "cash")]
    Cash,
    /// Card payment on an external terminal.
    #[serde(alias = "card")]
    Card,
    /// Bank transfer.
    #[serde(alias = "transfer")]
    Transfer,
}

impl PaymentMethod {
    /// Every method, in dashboard display order.
    pub const ALL: [PaymentMethod; 3] =
        [PaymentMethod::Cash, PaymentMethod::Card, PaymentMethod::Transfer];
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::Transfer => "Transfer",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale. Owns its line items and is immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    pub date_time: DateTime<Utc>,
    pub total_amount: Money,
    pub total_profit: Money,
    pub payment_method: PaymentMethod,
    pub items: Vec<SaleItem>,
}

impl Sale {
    /// Checks that the header totals equal the sums over the line items.
    pub fn reconciles(&self) -> bool {
        let amount: Money = self.items.iter().map(SaleItem::line_total).sum();
        let profit: Money = self.items.iter().map(SaleItem::line_profit).sum();
        amount == self.total_amount && profit == self.total_profit
    }
}

/// A line item in a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Unit price at time of sale (frozen).
    pub price_at_sale: Money,
    /// Unit cost at time of sale (frozen).
    pub cost_at_sale: Money,
}

impl SaleItem {
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price_at_sale.multiply_quantity(self.quantity)
    }

    #[inline]
    pub fn line_profit(&self) -> Money {
        (self.price_at_sale - self.cost_at_sale).multiply_quantity(self.quantity)
    }
}

/// One requested line of a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLineRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// Input for recording a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRequest {
    pub items: Vec<SaleLineRequest>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

// =============================================================================
// Dashboard
// =============================================================================

/// A product ranked by cumulative units sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopSeller {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
}

/// A low-stock product, as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockProduct {
    pub id: String,
    pub name: String,
    pub stock: i64,
}

/// Sales count and revenue for one payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodTotal {
    pub payment_method: PaymentMethod,
    pub count: i64,
    pub total: Money,
}

/// Aggregated figures for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_sales_today: Money,
    pub total_profit_today: Money,
    pub transaction_count: i64,
    pub low_stock_products: Vec<LowStockProduct>,
    pub top_selling_products: Vec<TopSeller>,
    pub sales_by_payment_method: Vec<PaymentMethodTotal>,
}

/// One calendar day of the sales trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySales {
    pub date: NaiveDate,
    /// Abbreviated weekday ("Mon").
    pub label: String,
    pub total: Money,
    pub count: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: i64, cost: i64, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: "p-1".to_string(),
            name: "Coffee Beans".to_string(),
            category: "Pantry".to_string(),
            sku: None,
            cost: Money::from_cents(cost),
            price: Money::from_cents(price),
            stock,
            is_active: true,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_audit_details_lists_only_real_changes() {
        let current = product(500, 200, 10);
        let update = ProductUpdate {
            price: Some(Money::from_cents(600)),
            cost: Some(Money::from_cents(200)),
            stock: Some(12),
            name: Some("Dark Roast".to_string()),
            ..Default::default()
        };

        assert_eq!(
            update.audit_details(&current).as_deref(),
            Some("Price: 5.00 -> 6.00, Stock: 10 -> 12")
        );
    }

    #[test]
    fn test_audit_details_none_for_unaudited_fields() {
        let current = product(500, 200, 10);
        let update = ProductUpdate {
            name: Some("Dark Roast".to_string()),
            category: Some("Coffee".to_string()),
            ..Default::default()
        };
        assert_eq!(update.audit_details(&current), None);
    }

    #[test]
    fn test_payment_method_defaults_to_cash() {
        let request: SaleRequest =
            serde_json::from_str(r#"{"items":[{"product_id":"p-1","quantity":1}]}"#).unwrap();
        assert_eq!(request.payment_method, PaymentMethod::Cash);

        let request: SaleRequest =
            serde_json::from_str(r#"{"items":[],"payment_method":"card"}"#).unwrap();
        assert_eq!(request.payment_method, PaymentMethod::Card);
    }

    #[test]
    fn test_log_action_wire_names() {
        assert_eq!(
            serde_json::to_string(&LogAction::Restock).unwrap(),
            "\"RESTOCK\""
        );
        assert_eq!(LogAction::Sale.to_string(), "SALE");
    }

    #[test]
    fn test_sale_reconciles_with_items() {
        let item = SaleItem {
            id: "i-1".to_string(),
            sale_id: "s-1".to_string(),
            product_id: "p-1".to_string(),
            product_name: "Coffee Beans".to_string(),
            quantity: 3,
            price_at_sale: Money::from_cents(500),
            cost_at_sale: Money::from_cents(200),
        };
        let mut sale = Sale {
            id: "s-1".to_string(),
            date_time: Utc::now(),
            total_amount: Money::from_cents(1500),
            total_profit: Money::from_cents(900),
            payment_method: PaymentMethod::Cash,
            items: vec![item],
        };
        assert!(sale.reconciles());

        sale.total_profit = Money::from_cents(901);
        assert!(!sale.reconciles());
    }
}
