//! Product business logic - Handles all product-related operations.
//!
//! Products are the items on sale at the kiosk. Their unit price is the live
//! price; consumption records copy it when they are written. All functions are
//! async and return Result types for proper error handling throughout the system.

use crate::{
    entities::{Product, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::HashMap;

/// Retrieves all active products ordered by ID, the column order of the ledger grid.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_active_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::IsActive.eq(true))
        .order_by_asc(product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific product by its unique ID, active or not.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_id<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Loads the given products keyed by ID.
///
/// Used where historical records must be labelled even if the product has
/// since been deactivated.
pub async fn get_products_by_ids(
    db: &DatabaseConnection,
    product_ids: Vec<i64>,
) -> Result<HashMap<i64, product::Model>> {
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }

    Ok(Product::find()
        .filter(product::Column::Id.is_in(product_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|product| (product.id, product))
        .collect())
}

fn validate_price(price: f64) -> Result<()> {
    if price < 0.0 || !price.is_finite() {
        return Err(Error::InvalidAmount { amount: price });
    }
    Ok(())
}

/// Creates a new active product, performing input validation.
///
/// # Errors
/// Returns an error if:
/// - The product name is empty or whitespace-only
/// - The price is negative or not finite (NaN, infinity)
/// - The database insert operation fails
pub async fn create_product(
    db: &DatabaseConnection,
    name: String,
    unit_price: f64,
) -> Result<product::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Product name cannot be empty".to_string(),
        });
    }
    validate_price(unit_price)?;

    let product = product::ActiveModel {
        name: Set(name.trim().to_string()),
        unit_price: Set(unit_price),
        is_active: Set(true),
        ..Default::default()
    };
    product.insert(db).await.map_err(Into::into)
}

/// Changes the live price of a product. Existing consumption records keep the
/// price they captured.
///
/// # Errors
/// Returns an error if the price is invalid, the product does not exist or the
/// update fails.
pub async fn update_product_price(
    db: &DatabaseConnection,
    product_id: i64,
    new_price: f64,
) -> Result<product::Model> {
    validate_price(new_price)?;

    let mut product: product::ActiveModel = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?
        .into();

    product.unit_price = Set(new_price);
    product.update(db).await.map_err(Into::into)
}

/// Takes a product off sale without touching its history.
///
/// # Errors
/// Returns an error if the product does not exist or the update fails.
pub async fn deactivate_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    let mut product: product::ActiveModel = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?
        .into();

    product.is_active = Set(false);
    product.update(db).await.map_err(Into::into)
}
