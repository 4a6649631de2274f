//! Product entity - Items sold at the kiosk.
//!
//! The unit price here is the live price. Consumption records capture the price
//! at the moment they are written, so later price changes never touch history.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the product (e.g., "Galleta", "Refresco")
    pub name: String,
    /// Current price per unit
    pub unit_price: f64,
    /// Whether the product is currently on sale
    pub is_active: bool,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product appears in many consumption records
    #[sea_orm(has_many = "super::consumption::Entity")]
    Consumptions,
}

impl Related<super::consumption::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Consumptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
