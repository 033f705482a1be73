//! # Validation Module
//!
//! Input validation utilities for Stockroom.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: JSON extraction (apps/api)                                   │
//! │  ├── Missing fields, wrong types                                       │
//! │  └── Money with more than two decimals                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE: Business rule validation                        │
//! │  ├── Names, categories, SKU format                                     │
//! │  └── Non-negative prices and stock, positive quantities                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0)                                                │
//! │  ├── UNIQUE (sku)                                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{NewProduct, ProductUpdate};
use crate::{MAX_AMOUNT_CENTS, MAX_ITEM_QUANTITY, MAX_STOCK};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 50 characters
/// - Should contain only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_sku;
///
/// assert!(validate_sku("COF-001").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("A".repeat(100).as_str()).is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Trims an optional SKU, maps blank to `None` and validates the rest.
pub fn normalize_sku(sku: Option<&str>) -> ValidationResult<Option<String>> {
    match sku.map(str::trim) {
        None | Some("") => Ok(None),
        Some(sku) => {
            validate_sku(sku)?;
            Ok(Some(sku.to_string()))
        }
    }
}

fn validate_label(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product name: required, at most 200 characters.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_label("name", name, 200)
}

/// Validates a product category: required, at most 100 characters.
pub fn validate_category(category: &str) -> ValidationResult<()> {
    validate_label("category", category, 100)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a restock quantity: positive and at most MAX_STOCK.
pub fn validate_restock_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if qty > MAX_STOCK {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_STOCK,
        });
    }
    Ok(())
}

/// Validates a stock level. Zero is allowed, negative is not.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if !(0..=MAX_STOCK).contains(&stock) {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: MAX_STOCK,
        });
    }
    Ok(())
}

/// Validates a unit price or cost. Zero is allowed (free items).
///
/// The cap keeps every line and sale total representable in cents.
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() || amount.cents() > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }
    Ok(())
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates a create request and returns it with trimmed text fields.
pub fn validate_new_product(input: NewProduct) -> ValidationResult<NewProduct> {
    validate_product_name(&input.name)?;
    validate_category(&input.category)?;
    validate_amount("cost", input.cost)?;
    validate_amount("price", input.price)?;
    validate_stock(input.stock)?;
    let sku = normalize_sku(input.sku.as_deref())?;

    Ok(NewProduct {
        name: input.name.trim().to_string(),
        category: input.category.trim().to_string(),
        sku,
        ..input
    })
}

/// Validates the fields present in a partial update.
pub fn validate_product_update(update: &ProductUpdate) -> ValidationResult<()> {
    if let Some(name) = &update.name {
        validate_product_name(name)?;
    }
    if let Some(category) = &update.category {
        validate_category(category)?;
    }
    if let Some(sku) = &update.sku {
        normalize_sku(Some(sku))?;
    }
    if let Some(cost) = update.cost {
        validate_amount("cost", cost)?;
    }
    if let Some(price) = update.price {
        validate_amount("price", price)?;
    }
    if let Some(stock) = update.stock {
        validate_stock(stock)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product() -> NewProduct {
        NewProduct {
            name: "  Coffee Beans ".to_string(),
            category: "Pantry".to_string(),
            sku: Some(" COF-001 ".to_string()),
            cost: Money::from_cents(200),
            price: Money::from_cents(500),
            stock: 10,
        }
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("COF-001").is_ok());
        assert!(validate_sku("product_1").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_normalize_sku_blank_is_none() {
        assert_eq!(normalize_sku(None).unwrap(), None);
        assert_eq!(normalize_sku(Some("   ")).unwrap(), None);
        assert_eq!(
            normalize_sku(Some(" ABC-1 ")).unwrap().as_deref(),
            Some("ABC-1")
        );
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_new_product_trims() {
        let product = validate_new_product(new_product()).unwrap();
        assert_eq!(product.name, "Coffee Beans");
        assert_eq!(product.sku.as_deref(), Some("COF-001"));
    }

    #[test]
    fn test_validate_new_product_rejects_bad_input() {
        let mut input = new_product();
        input.category = " ".to_string();
        assert!(matches!(
            validate_new_product(input),
            Err(ValidationError::Required { field }) if field == "category"
        ));

        let mut input = new_product();
        input.stock = -1;
        assert!(validate_new_product(input).is_err());

        let mut input = new_product();
        input.price = Money::from_cents(-1);
        assert!(validate_new_product(input).is_err());
    }

    #[test]
    fn test_validate_product_update_checks_present_fields_only() {
        assert!(validate_product_update(&ProductUpdate::default()).is_ok());

        let update = ProductUpdate {
            stock: Some(-5),
            ..Default::default()
        };
        assert!(validate_product_update(&update).is_err());

        let update = ProductUpdate {
            sku: Some(String::new()),
            ..Default::default()
        };
        assert!(validate_product_update(&update).is_ok());
    }

    #[test]
    fn test_amounts_are_capped() {
        assert!(validate_amount("price", Money::from_cents(MAX_AMOUNT_CENTS)).is_ok());
        assert!(validate_amount("price", Money::from_cents(MAX_AMOUNT_CENTS + 1)).is_err());

        let mut input = new_product();
        input.price = "92233720368547758.07".parse().unwrap();
        assert!(matches!(
            validate_new_product(input),
            Err(ValidationError::OutOfRange { field, max, .. })
                if field == "price" && max == MAX_AMOUNT_CENTS
        ));

        let update = ProductUpdate {
            cost: Some(Money::from_cents(i64::MAX)),
            ..Default::default()
        };
        assert!(validate_product_update(&update).is_err());
    }

    #[test]
    fn test_stock_and_restock_are_capped() {
        assert!(validate_stock(MAX_STOCK).is_ok());
        assert!(validate_stock(MAX_STOCK + 1).is_err());

        assert!(validate_restock_quantity(MAX_STOCK).is_ok());
        assert!(validate_restock_quantity(i64::MAX).is_err());
        assert!(validate_restock_quantity(0).is_err());
    }
}
