//! Seeding of reference data from the catalog.
//!
//! Each table is filled only when it is empty, so restarting the server with
//! an edited catalog never duplicates or overwrites existing rows.

use crate::{
    config::catalog::Catalog,
    entities::{Grade, Product, Student, grade, product, student},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Rows inserted by [`seed_from_catalog`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    /// Grades inserted
    pub grades: usize,
    /// Products inserted
    pub products: usize,
    /// Students inserted
    pub students: usize,
}

/// Inserts the catalog's grades, products and students into empty tables.
///
/// Students are only seeded together with their grades: when the grades table
/// already had rows the catalog's 1-based grade positions are resolved against
/// the existing grades in id order.
pub async fn seed_from_catalog(db: &DatabaseConnection, catalog: &Catalog) -> Result<SeedReport> {
    let txn = db.begin().await?;
    let mut report = SeedReport::default();

    if Grade::find().count(&txn).await? == 0 {
        for seed in &catalog.grades {
            grade::ActiveModel {
                level: Set(seed.level.trim().to_string()),
                name: Set(seed.name.trim().to_string()),
                year_label: Set(seed.year_label.trim().to_string()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            report.grades += 1;
        }
    }

    if Product::find().count(&txn).await? == 0 {
        for seed in &catalog.products {
            if seed.unit_price < 0.0 || !seed.unit_price.is_finite() {
                return Err(Error::InvalidAmount {
                    amount: seed.unit_price,
                });
            }
            product::ActiveModel {
                name: Set(seed.name.trim().to_string()),
                unit_price: Set(seed.unit_price),
                is_active: Set(true),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            report.products += 1;
        }
    }

    if Student::find().count(&txn).await? == 0 && !catalog.students.is_empty() {
        let grade_ids: Vec<i64> = Grade::find()
            .order_by_asc(grade::Column::Id)
            .all(&txn)
            .await?
            .into_iter()
            .map(|grade| grade.id)
            .collect();

        for seed in &catalog.students {
            let grade_id = seed
                .grade
                .checked_sub(1)
                .and_then(|index| grade_ids.get(index))
                .copied()
                .ok_or_else(|| Error::Config {
                    message: format!(
                        "Student {} {} refers to missing grade {}",
                        seed.given_names, seed.family_names, seed.grade
                    ),
                })?;

            student::ActiveModel {
                given_names: Set(seed.given_names.trim().to_string()),
                family_names: Set(seed.family_names.trim().to_string()),
                grade_id: Set(grade_id),
                is_active: Set(true),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            report.students += 1;
        }
    }

    txn.commit().await?;

    tracing::info!(
        grades = report.grades,
        products = report.products,
        students = report.students,
        "Catalog seeding finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        config::catalog::parse_catalog,
        core::{grade::get_all_grades, product::get_all_active_products},
        test_utils::*,
    };

    const CATALOG: &str = r#"
        [[grades]]
        level = "Primaria"
        name = "Quinto"
        year_label = "5to"

        [[grades]]
        level = "Primaria"
        name = "Sexto"
        year_label = "6to"

        [[products]]
        name = "Galleta"
        unit_price = 1.0

        [[students]]
        given_names = "Ana"
        family_names = "Quispe"
        grade = 2
    "#;

    #[tokio::test]
    async fn test_seed_empty_database() -> Result<()> {
        let db = setup_test_db().await?;
        let catalog = parse_catalog(CATALOG)?;

        let report = seed_from_catalog(&db, &catalog).await?;
        assert_eq!(
            report,
            SeedReport {
                grades: 2,
                products: 1,
                students: 1
            }
        );

        let grades = get_all_grades(&db).await?;
        let ana = Student::find().one(&db).await?.unwrap();
        assert_eq!(ana.grade_id, grades[1].id);
        assert_eq!(grades[1].display_name(), "6to Primaria");

        Ok(())
    }

    #[tokio::test]
    async fn test_seeding_twice_inserts_nothing_new() -> Result<()> {
        let db = setup_test_db().await?;
        let catalog = parse_catalog(CATALOG)?;

        seed_from_catalog(&db, &catalog).await?;
        let report = seed_from_catalog(&db, &catalog).await?;

        assert_eq!(report, SeedReport::default());
        assert_eq!(get_all_grades(&db).await?.len(), 2);
        assert_eq!(get_all_active_products(&db).await?.len(), 1);
        assert_eq!(Student::find().count(&db).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_only_empty_tables_are_seeded() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "Chocolate", 2.0).await?;
        let catalog = parse_catalog(CATALOG)?;

        let report = seed_from_catalog(&db, &catalog).await?;

        assert_eq!(report.grades, 2);
        assert_eq!(report.products, 0);
        let products = get_all_active_products(&db).await?;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Chocolate");

        Ok(())
    }

    #[tokio::test]
    async fn test_failed_seed_rolls_back() -> Result<()> {
        let db = setup_test_db().await?;
        let catalog = parse_catalog(
            r#"
            [[grades]]
            level = "Primaria"
            name = "Quinto"
            year_label = "5to"

            [[products]]
            name = "Galleta"
            unit_price = -1.0
            "#,
        )?;

        assert!(seed_from_catalog(&db, &catalog).await.is_err());
        assert!(get_all_grades(&db).await?.is_empty());

        Ok(())
    }
}
