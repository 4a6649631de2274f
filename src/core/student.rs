//! Student queries.
//!
//! Only active students take part in ledgers. The grade filter mirrors the
//! `grado` request parameter where `0` means every grade.

use crate::{
    entities::{Student, grade, student},
    errors::{Error, Result},
};
use sea_orm::{JoinType, QueryOrder, QuerySelect, Set, prelude::*};

/// Which students a ledger covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeFilter {
    /// Every active student
    All,
    /// Active students of one grade
    Grade(i64),
}

impl GradeFilter {
    /// Builds a filter from the numeric `grado` parameter; `0` (or anything
    /// non-positive) selects every grade.
    #[must_use]
    pub const fn from_id(grade_id: i64) -> Self {
        if grade_id > 0 {
            Self::Grade(grade_id)
        } else {
            Self::All
        }
    }

    /// Numeric form used in URLs.
    #[must_use]
    pub const fn as_id(self) -> i64 {
        match self {
            Self::All => 0,
            Self::Grade(id) => id,
        }
    }
}

/// Retrieves the active students selected by `filter`, ordered by grade level,
/// grade name, family names and given names.
pub async fn get_active_students(
    db: &DatabaseConnection,
    filter: GradeFilter,
) -> Result<Vec<student::Model>> {
    let mut query = Student::find()
        .join(JoinType::LeftJoin, student::Relation::Grade.def())
        .filter(student::Column::IsActive.eq(true));

    if let GradeFilter::Grade(grade_id) = filter {
        query = query.filter(student::Column::GradeId.eq(grade_id));
    }

    query
        .order_by_asc(grade::Column::Level)
        .order_by_asc(grade::Column::Name)
        .order_by_asc(student::Column::FamilyNames)
        .order_by_asc(student::Column::GivenNames)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a student by ID regardless of the active flag.
pub async fn get_student_by_id(
    db: &DatabaseConnection,
    student_id: i64,
) -> Result<Option<student::Model>> {
    Student::find_by_id(student_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Display name for a student id, or an empty string when the id is unknown.
pub async fn get_student_display_name(db: &DatabaseConnection, student_id: i64) -> Result<String> {
    Ok(get_student_by_id(db, student_id)
        .await?
        .map(|student| student.display_name())
        .unwrap_or_default())
}

/// Creates an active student in `grade_id`.
pub async fn create_student(
    db: &DatabaseConnection,
    given_names: String,
    family_names: String,
    grade_id: i64,
) -> Result<student::Model> {
    if given_names.trim().is_empty() || family_names.trim().is_empty() {
        return Err(Error::Config {
            message: "Student names cannot be empty".to_string(),
        });
    }

    let student = student::ActiveModel {
        given_names: Set(given_names.trim().to_string()),
        family_names: Set(family_names.trim().to_string()),
        grade_id: Set(grade_id),
        is_active: Set(true),
        ..Default::default()
    };
    student.insert(db).await.map_err(Into::into)
}

/// Flips the active flag, the only mutable attribute of a student.
pub async fn set_student_active(
    db: &DatabaseConnection,
    student_id: i64,
    is_active: bool,
) -> Result<Option<student::Model>> {
    let Some(existing) = get_student_by_id(db, student_id).await? else {
        return Ok(None);
    };

    let mut student: student::ActiveModel = existing.into();
    student.is_active = Set(is_active);
    Ok(Some(student.update(db).await?))
}
