//! # stockroom-core: Pure Business Logic for Stockroom
//!
//! This crate is the **heart** of Stockroom. It contains the inventory and
//! sales rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │    /api/products ──► /api/sales ──► /api/dashboard             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    stockroom-db (Database Layer)                │   │
//! │  │     repositories, SaleProcessor, one transaction per write      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockroom-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   sale    │  │ analytics │  │   │
//! │  │   │  Product  │  │   Money   │  │ Builder   │  │  7-day    │  │   │
//! │  │   │   Sale    │  │  (cents)  │  │ lines     │  │  trend    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, ProductLog, dashboard rows)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`sale`] - Sale line consolidation and totals accumulation
//! - [`analytics`] - Daily trend bucketing for the dashboard
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::money::Money;
//!
//! let price = Money::from_cents(500); // 5.00
//! let cost = Money::from_cents(200);  // 2.00
//!
//! assert_eq!(price.multiply_quantity(3).cents(), 1500);
//! assert_eq!((price - cost).multiply_quantity(3).cents(), 900);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod error;
pub mod money;
pub mod sale;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of distinct lines in a single sale request.
///
/// ## Business Reason
/// Keeps a single transaction short; the write lock is held for its duration.
pub const MAX_SALE_LINES: usize = 100;

/// Maximum quantity of a single line in a sale request.
///
/// ## Business Reason
/// Catches typing 1000 instead of 10 at the register.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest accepted product price or cost, in cents (99,999,999.99).
///
/// ## Business Reason
/// Keeps `price * MAX_ITEM_QUANTITY * MAX_SALE_LINES` far inside `i64`.
pub const MAX_AMOUNT_CENTS: i64 = 9_999_999_999;

/// Largest stock level a product can hold.
pub const MAX_STOCK: i64 = 999_999_999;

/// Products with stock strictly below this value are reported as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Length of the dashboard's low-stock and top-seller lists.
pub const DASHBOARD_LIST_LIMIT: i64 = 5;

/// Number of calendar days in the sales trend, today included.
pub const TREND_DAYS: u32 = 7;
