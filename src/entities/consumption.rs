//! Consumption entity - What a student took from the kiosk on a given day.
//!
//! There is at most one record per (`student_id`, `product_id`, `consumed_on`).
//! `line_total` is always `quantity * unit_price` and is rewritten together with
//! the quantity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Consumption database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "consumptions")]
pub struct Model {
    /// Unique identifier for the record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Student who consumed the product
    pub student_id: i64,
    /// Product consumed
    pub product_id: i64,
    /// Number of units
    pub quantity: i32,
    /// Unit price captured when the record was last written
    pub unit_price: f64,
    /// `quantity * unit_price`
    pub line_total: f64,
    /// Day of the consumption
    pub consumed_on: Date,
}

/// Defines relationships between Consumption and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each record belongs to one student
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id"
    )]
    Student,
    /// Each record references one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
