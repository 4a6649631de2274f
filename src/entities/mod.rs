//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod consumption;
pub mod grade;
pub mod payment;
pub mod product;
pub mod student;

// Re-export specific types to avoid conflicts
pub use consumption::{
    Column as ConsumptionColumn, Entity as Consumption, Model as ConsumptionModel,
};
pub use grade::{Column as GradeColumn, Entity as Grade, Model as GradeModel};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use student::{Column as StudentColumn, Entity as Student, Model as StudentModel};
