//! # Sale Module
//!
//! The pure half of recording a sale: request consolidation and totals.
//!
//! ## Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SaleRequest { items: [A×2, B×1, A×3] }                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  consolidate_lines() ← validates, merges duplicates: [A×5, B×1]        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  stockroom-db: guarded decrement per line (inside one transaction)     │
//! │       │  returns the product row as it is at that instant              │
//! │       ▼                                                                 │
//! │  SaleBuilder::add_line(&product, qty) ← snapshots price/cost/name,     │
//! │       │                                  accumulates checked totals     │
//! │       ▼                                                                 │
//! │  SaleBuilder::finish() → Sale { items, total_amount, total_profit }    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Totals are accumulated line by line in integer cents, so
//! `Sale::reconciles()` holds for every sale this builder produces.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{PaymentMethod, Product, Sale, SaleItem, SaleLineRequest};
use crate::validation::validate_quantity;
use crate::MAX_SALE_LINES;

// =============================================================================
// Line Consolidation
// =============================================================================

/// Validates the requested lines and merges repeated products.
///
/// ## Rules
/// - At least one line, at most `MAX_SALE_LINES`
/// - Every product id present, every quantity in `1..=MAX_ITEM_QUANTITY`
/// - Lines for the same product are summed into the first occurrence, so
///   each product is decremented, logged and stored exactly once
/// - A merged quantity obeys the same bound as a single line
pub fn consolidate_lines(lines: &[SaleLineRequest]) -> CoreResult<Vec<SaleLineRequest>> {
    if lines.is_empty() {
        return Err(CoreError::EmptySale);
    }
    if lines.len() > MAX_SALE_LINES {
        return Err(CoreError::TooManyLines {
            max: MAX_SALE_LINES,
        });
    }

    let mut merged: Vec<SaleLineRequest> = Vec::with_capacity(lines.len());
    for line in lines {
        let product_id = line.product_id.trim();
        if product_id.is_empty() {
            return Err(ValidationError::Required {
                field: "product_id".to_string(),
            }
            .into());
        }
        validate_quantity(line.quantity)?;

        match merged.iter_mut().find(|m| m.product_id == product_id) {
            Some(existing) => {
                existing.quantity += line.quantity;
                validate_quantity(existing.quantity)?;
            }
            None => merged.push(SaleLineRequest {
                product_id: product_id.to_string(),
                quantity: line.quantity,
            }),
        }
    }

    Ok(merged)
}

// =============================================================================
// Sale Builder
// =============================================================================

/// Accumulates line items and totals for one sale.
#[derive(Debug)]
pub struct SaleBuilder {
    sale_id: String,
    payment_method: PaymentMethod,
    date_time: DateTime<Utc>,
    items: Vec<SaleItem>,
    total_amount: Money,
    total_profit: Money,
}

impl SaleBuilder {
    pub fn new(sale_id: impl Into<String>, payment_method: PaymentMethod, date_time: DateTime<Utc>) -> Self {
        Self {
            sale_id: sale_id.into(),
            payment_method,
            date_time,
            items: Vec::new(),
            total_amount: Money::zero(),
            total_profit: Money::zero(),
        }
    }

    /// Adds a line priced from `product` as it is right now.
    ///
    /// `item_id` identifies the new line item. Fails with
    /// `CoreError::AmountOverflow` if a line or running total leaves `i64`,
    /// leaving the builder unchanged.
    pub fn add_line(
        &mut self,
        item_id: impl Into<String>,
        product: &Product,
        quantity: i64,
    ) -> CoreResult<&SaleItem> {
        let line_total = product
            .price
            .checked_multiply_quantity(quantity)
            .ok_or(CoreError::AmountOverflow)?;
        let line_profit = product
            .price
            .checked_sub(product.cost)
            .and_then(|margin| margin.checked_multiply_quantity(quantity))
            .ok_or(CoreError::AmountOverflow)?;
        let total_amount = self
            .total_amount
            .checked_add(line_total)
            .ok_or(CoreError::AmountOverflow)?;
        let total_profit = self
            .total_profit
            .checked_add(line_profit)
            .ok_or(CoreError::AmountOverflow)?;

        let item = SaleItem {
            id: item_id.into(),
            sale_id: self.sale_id.clone(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity,
            price_at_sale: product.price,
            cost_at_sale: product.cost,
        };

        self.total_amount = total_amount;
        self.total_profit = total_profit;
        self.items.push(item);

        Ok(&self.items[self.items.len() - 1])
    }

    pub fn finish(self) -> Sale {
        Sale {
            id: self.sale_id,
            date_time: self.date_time,
            total_amount: self.total_amount,
            total_profit: self.total_profit,
            payment_method: self.payment_method,
            items: self.items,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: &str, quantity: i64) -> SaleLineRequest {
        SaleLineRequest {
            product_id: product_id.to_string(),
            quantity,
        }
    }

    fn product(id: &str, price: i64, cost: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            category: "General".to_string(),
            sku: None,
            cost: Money::from_cents(cost),
            price: Money::from_cents(price),
            stock: 100,
            is_active: true,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_consolidate_merges_duplicates_in_first_seen_order() {
        let lines = [line("a", 2), line("b", 1), line("a", 3)];
        let merged = consolidate_lines(&lines).unwrap();
        assert_eq!(merged, vec![line("a", 5), line("b", 1)]);
    }

    #[test]
    fn test_consolidate_rejects_empty_and_bad_quantities() {
        assert!(matches!(consolidate_lines(&[]), Err(CoreError::EmptySale)));
        assert!(matches!(
            consolidate_lines(&[line("a", 0)]),
            Err(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));
        assert!(matches!(
            consolidate_lines(&[line(" ", 1)]),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));
    }

    #[test]
    fn test_consolidate_rejects_merged_quantity_over_limit() {
        assert_eq!(
            consolidate_lines(&[line("a", 500), line("a", 499)]).unwrap(),
            vec![line("a", 999)]
        );
        assert!(matches!(
            consolidate_lines(&[line("a", 600), line("b", 1), line("a", 600)]),
            Err(CoreError::Validation(ValidationError::OutOfRange { max: 999, .. }))
        ));
    }

    #[test]
    fn test_consolidate_rejects_too_many_lines() {
        let lines: Vec<_> = (0..=MAX_SALE_LINES).map(|i| line(&i.to_string(), 1)).collect();
        assert!(matches!(
            consolidate_lines(&lines),
            Err(CoreError::TooManyLines { .. })
        ));
    }

    #[test]
    fn test_builder_three_units_at_five_with_cost_two() {
        let mut builder = SaleBuilder::new("s-1", PaymentMethod::Cash, Utc::now());
        builder.add_line("i-1", &product("a", 500, 200), 3).unwrap();
        let sale = builder.finish();

        assert_eq!(sale.total_amount.to_string(), "15.00");
        assert_eq!(sale.total_profit.to_string(), "9.00");
        assert_eq!(sale.items[0].sale_id, "s-1");
        assert!(sale.reconciles());
    }

    #[test]
    fn test_builder_totals_reconcile_across_lines() {
        let mut builder = SaleBuilder::new("s-2", PaymentMethod::Transfer, Utc::now());
        builder.add_line("i-1", &product("a", 199, 120), 7).unwrap();
        builder.add_line("i-2", &product("b", 1050, 1100), 2).unwrap();
        builder.add_line("i-3", &product("c", 33, 0), 3).unwrap();

        let sale = builder.finish();
        assert_eq!(sale.total_amount.cents(), 199 * 7 + 1050 * 2 + 33 * 3);
        assert_eq!(sale.total_profit.cents(), 79 * 7 - 50 * 2 + 33 * 3);
        assert_eq!(sale.items.len(), 3);
        assert!(sale.reconciles());
    }

    #[test]
    fn test_builder_rejects_totals_that_overflow() {
        let mut builder = SaleBuilder::new("s-4", PaymentMethod::Cash, Utc::now());
        let huge = product("a", i64::MAX, 0);
        assert!(matches!(
            builder.add_line("i-1", &huge, 2),
            Err(CoreError::AmountOverflow)
        ));

        builder.add_line("i-2", &product("b", i64::MAX - 10, 0), 1).unwrap();
        assert!(matches!(
            builder.add_line("i-3", &product("c", 11, 0), 1),
            Err(CoreError::AmountOverflow)
        ));
        assert!(matches!(
            builder.add_line("i-4", &product("d", 0, i64::MAX), 2),
            Err(CoreError::AmountOverflow)
        ));

        let sale = builder.finish();
        assert_eq!(sale.items.len(), 1);
        assert_eq!(sale.total_amount.cents(), i64::MAX - 10);
        assert!(sale.reconciles());
    }

    #[test]
    fn test_snapshot_is_independent_of_later_product_edits() {
        let mut coffee = product("a", 500, 200);
        let mut builder = SaleBuilder::new("s-3", PaymentMethod::Card, Utc::now());
        builder.add_line("i-1", &coffee, 1).unwrap();

        coffee.price = Money::from_cents(900);
        let sale = builder.finish();
        assert_eq!(sale.items[0].price_at_sale.cents(), 500);
    }
}
