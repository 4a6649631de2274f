//! Student entity - Kiosk customers.
//!
//! Students are immutable once created except for the `is_active` flag;
//! inactive students are hidden from every ledger view.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Student database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    /// Unique identifier for the student
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Given names
    pub given_names: String,
    /// Family names
    pub family_names: String,
    /// Grade the student is enrolled in
    pub grade_id: i64,
    /// Whether the student may currently buy at the kiosk
    pub is_active: bool,
}

impl Model {
    /// Name as shown in the ledger: `"Family, Given"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.family_names, self.given_names)
    }
}

/// Defines relationships between Student and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each student belongs to one grade
    #[sea_orm(
        belongs_to = "super::grade::Entity",
        from = "Column::GradeId",
        to = "super::grade::Column::Id"
    )]
    Grade,
    /// One student has many consumption records
    #[sea_orm(has_many = "super::consumption::Entity")]
    Consumptions,
    /// One student has many payments
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::grade::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Grade.def()
    }
}

impl Related<super::consumption::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Consumptions.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
