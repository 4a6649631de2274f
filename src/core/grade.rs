//! Grade queries.
//!
//! Grades are reference data: the kiosk never edits them, it only lists them
//! for the grade selector and creates them when seeding an empty database.

use crate::{
    entities::{Grade, grade},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Retrieves every grade ordered by id, which is also school order.
pub async fn get_all_grades(db: &DatabaseConnection) -> Result<Vec<grade::Model>> {
    Grade::find()
        .order_by_asc(grade::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a grade by its unique ID.
pub async fn get_grade_by_id(db: &DatabaseConnection, grade_id: i64) -> Result<Option<grade::Model>> {
    Grade::find_by_id(grade_id).one(db).await.map_err(Into::into)
}

/// Creates a grade. Level and name must not be blank.
pub async fn create_grade(
    db: &DatabaseConnection,
    level: String,
    name: String,
    year_label: String,
) -> Result<grade::Model> {
    if level.trim().is_empty() || name.trim().is_empty() {
        return Err(Error::Config {
            message: "Grade level and name cannot be empty".to_string(),
        });
    }

    let grade = grade::ActiveModel {
        level: Set(level.trim().to_string()),
        name: Set(name.trim().to_string()),
        year_label: Set(year_label.trim().to_string()),
        ..Default::default()
    };
    grade.insert(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_grade_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_grade(&db, "  ".to_string(), "Quinto".to_string(), "5to".to_string()).await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_grades_are_listed_in_id_order() -> Result<()> {
        let db = setup_test_db().await?;
        let fifth = create_test_grade(&db, "5to", "Primaria").await?;
        let sixth = create_test_grade(&db, "6to", "Primaria").await?;

        let grades = get_all_grades(&db).await?;
        assert_eq!(grades, vec![fifth.clone(), sixth]);
        assert_eq!(grades[0].display_name(), "5to Primaria");

        let found = get_grade_by_id(&db, fifth.id).await?;
        assert_eq!(found, Some(fifth));
        assert!(get_grade_by_id(&db, 999).await?.is_none());

        Ok(())
    }
}
