//! # stockroom-db: Database Layer for Stockroom
//!
//! SQLite storage for products, sales and the product audit log, accessed
//! through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /api/sales)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockroom-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ProductLogRepo│    │ 0001_initial │  │   │
//! │  │   │ retry/backoff │    │ SaleRepo      │    │   _schema    │  │   │
//! │  │   │               │    │ DashboardRepo │    │              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │                                │   │
//! │  │                      ┌─────────▼─────────┐                      │   │
//! │  │                      │   SaleProcessor   │ one tx per sale      │   │
//! │  │                      └───────────────────┘                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL mode)                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation, configuration and startup retry
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`sale_processor`] - Atomic sale recording
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./data/stockroom.db")).await?;
//!
//! let products = db.products().list_active().await?;
//! let sale = db.sale_processor().process(request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod sale_processor;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, RetryPolicy};
pub use sale_processor::SaleProcessor;

// Repository re-exports for convenience
pub use repository::dashboard::DashboardRepository;
pub use repository::product::ProductRepository;
pub use repository::product_log::ProductLogRepository;
pub use repository::sale::SaleRepository;
