//! Grade entity - School grades students belong to.
//!
//! Grades are static reference data seeded from the catalog file.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Grade database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "grades")]
pub struct Model {
    /// Unique identifier for the grade
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Education level (`"Primaria"` or `"Secundaria"`)
    pub level: String,
    /// Ordinal name of the grade (e.g., "Quinto")
    pub name: String,
    /// Short year label (e.g., "5to")
    pub year_label: String,
}

impl Model {
    /// Name shown in selectors, e.g. `"5to Primaria"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.year_label, self.level)
    }
}

/// Defines relationships between Grade and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One grade has many students
    #[sea_orm(has_many = "super::student::Entity")]
    Students,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Students.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
