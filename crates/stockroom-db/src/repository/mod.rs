//! # Repository Module
//!
//! Database repositories for Stockroom.
//!
//! ## Two Kinds of Methods
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Pool-scoped (&self)                  Connection-scoped (associated fn) │
//! │  ───────────────────                  ───────────────────────────────── │
//! │  db.products().create(input)          ProductRepository::decrement_stock│
//! │  db.products().restock(id, qty)         (conn: &mut SqliteConnection)   │
//! │  db.sales().list_recent(limit)        SaleRepository::insert(conn, ..)  │
//! │  db.dashboard().stats(now)            ProductLogRepository::record(..)  │
//! │       │                                       ▲                         │
//! │       │ opens and commits its own             │ runs inside the         │
//! │       │ transaction when it writes            │ caller's transaction    │
//! │       ▼                                       │                         │
//! │  SQLite  ◄────────────────────────────  SaleProcessor::process          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD, restock, soft delete
//! - [`ProductLogRepository`](product_log::ProductLogRepository) - Audit trail
//! - [`SaleRepository`](sale::SaleRepository) - Sales with their items
//! - [`DashboardRepository`](dashboard::DashboardRepository) - Aggregates and trend

pub mod dashboard;
pub mod product;
pub mod product_log;
pub mod sale;
