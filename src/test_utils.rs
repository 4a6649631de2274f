//! Shared test utilities for the kiosk ledger.
//!
//! Helpers for setting up in-memory databases and creating grades, students
//! and products with sensible defaults.

use crate::{
    core::{grade, product, student},
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a grade such as `("5to", "Primaria")`.
///
/// The grade name defaults to the year label.
pub async fn create_test_grade(
    db: &DatabaseConnection,
    year_label: &str,
    level: &str,
) -> Result<entities::grade::Model> {
    grade::create_grade(
        db,
        level.to_string(),
        year_label.to_string(),
        year_label.to_string(),
    )
    .await
}

/// Creates an active student in `grade_id`.
pub async fn create_test_student(
    db: &DatabaseConnection,
    given_names: &str,
    family_names: &str,
    grade_id: i64,
) -> Result<entities::student::Model> {
    student::create_student(db, given_names.to_string(), family_names.to_string(), grade_id).await
}

/// Creates an active product.
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    unit_price: f64,
) -> Result<entities::product::Model> {
    product::create_product(db, name.to_string(), unit_price).await
}

/// Sets up a database with one grade ("5to Primaria") and one student
/// ("Quispe, Ana").
pub async fn setup_with_student() -> Result<(DatabaseConnection, entities::student::Model)> {
    let db = setup_test_db().await?;
    let grade = create_test_grade(&db, "5to", "Primaria").await?;
    let student = create_test_student(&db, "Ana", "Quispe", grade.id).await?;
    Ok((db, student))
}

/// Like [`setup_with_student`], plus a product "Galleta" at `unit_price`.
pub async fn setup_with_student_and_product(
    unit_price: f64,
) -> Result<(
    DatabaseConnection,
    entities::student::Model,
    entities::product::Model,
)> {
    let (db, student) = setup_with_student().await?;
    let product = create_test_product(&db, "Galleta", unit_price).await?;
    Ok((db, student, product))
}
