//! Consumption business logic - Records what each student took on each day.
//!
//! A consumption record is identified by (student, product, date). Writes go
//! through [`upsert_consumption`], which inserts, updates or deletes the single
//! record for that key depending on the requested quantity. The unit price is
//! re-read from the product on every write and the line total recomputed with it.

use crate::{
    core::product::get_product_by_id,
    entities::{Consumption, consumption},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;

/// What an upsert did to the stored record.
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    /// A new record was inserted
    Inserted(consumption::Model),
    /// The existing record got a new quantity, price and line total
    Updated(consumption::Model),
    /// The existing record was removed because the quantity dropped to zero
    Deleted,
    /// Quantity was zero and there was nothing to remove
    Unchanged,
}

/// Finds the record for (student, product, date), if any.
pub async fn find_consumption<C>(
    db: &C,
    student_id: i64,
    product_id: i64,
    consumed_on: NaiveDate,
) -> Result<Option<consumption::Model>>
where
    C: ConnectionTrait,
{
    Consumption::find()
        .filter(consumption::Column::StudentId.eq(student_id))
        .filter(consumption::Column::ProductId.eq(product_id))
        .filter(consumption::Column::ConsumedOn.eq(consumed_on))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Applies the upsert rule on an existing connection or transaction.
///
/// - no record and `quantity > 0`: insert with the product's current price
/// - `quantity <= 0`: delete the record if there is one
/// - otherwise: overwrite quantity, captured price and line total
pub async fn upsert_consumption_on<C>(
    db: &C,
    student_id: i64,
    product_id: i64,
    consumed_on: NaiveDate,
    quantity: i32,
) -> Result<UpsertOutcome>
where
    C: ConnectionTrait,
{
    let product = get_product_by_id(db, product_id)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })?;
    let unit_price = product.unit_price;
    let line_total = f64::from(quantity) * unit_price;

    let existing = find_consumption(db, student_id, product_id, consumed_on).await?;

    match existing {
        None if quantity <= 0 => Ok(UpsertOutcome::Unchanged),
        None => {
            let record = consumption::ActiveModel {
                student_id: Set(student_id),
                product_id: Set(product_id),
                quantity: Set(quantity),
                unit_price: Set(unit_price),
                line_total: Set(line_total),
                consumed_on: Set(consumed_on),
                ..Default::default()
            };
            Ok(UpsertOutcome::Inserted(record.insert(db).await?))
        }
        Some(record) if quantity <= 0 => {
            record.delete(db).await?;
            Ok(UpsertOutcome::Deleted)
        }
        Some(record) => {
            let mut record: consumption::ActiveModel = record.into();
            record.quantity = Set(quantity);
            record.unit_price = Set(unit_price);
            record.line_total = Set(line_total);
            Ok(UpsertOutcome::Updated(record.update(db).await?))
        }
    }
}

/// Sets the quantity of `product_id` consumed by `student_id` on `consumed_on`.
///
/// The existence check and the write run in one database transaction.
pub async fn upsert_consumption(
    db: &DatabaseConnection,
    student_id: i64,
    product_id: i64,
    consumed_on: NaiveDate,
    quantity: i32,
) -> Result<UpsertOutcome> {
    let txn = db.begin().await?;
    let outcome = upsert_consumption_on(&txn, student_id, product_id, consumed_on, quantity).await?;
    txn.commit().await?;

    tracing::debug!(
        student_id,
        product_id,
        %consumed_on,
        quantity,
        ?outcome,
        "Consumption upserted"
    );
    Ok(outcome)
}

/// Saves every product quantity of one student for one day.
///
/// All upserts share a single transaction: either the whole day is saved or
/// nothing is.
pub async fn save_day_quantities(
    db: &DatabaseConnection,
    student_id: i64,
    consumed_on: NaiveDate,
    quantities: &[(i64, i32)],
) -> Result<Vec<UpsertOutcome>> {
    let txn = db.begin().await?;
    let mut outcomes = Vec::with_capacity(quantities.len());
    for &(product_id, quantity) in quantities {
        outcomes
            .push(upsert_consumption_on(&txn, student_id, product_id, consumed_on, quantity).await?);
    }
    txn.commit().await?;

    tracing::info!(
        student_id,
        %consumed_on,
        products = quantities.len(),
        "Saved day consumption"
    );
    Ok(outcomes)
}

/// All records dated within `from..=to`, ordered by date then student.
pub async fn consumptions_in_range(
    db: &DatabaseConnection,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<consumption::Model>> {
    Consumption::find()
        .filter(consumption::Column::ConsumedOn.between(from, to))
        .order_by_asc(consumption::Column::ConsumedOn)
        .order_by_asc(consumption::Column::StudentId)
        .order_by_asc(consumption::Column::ProductId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Records of a single student within `from..=to`.
pub async fn consumptions_for_student_in_range(
    db: &DatabaseConnection,
    student_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<consumption::Model>> {
    Consumption::find()
        .filter(consumption::Column::StudentId.eq(student_id))
        .filter(consumption::Column::ConsumedOn.between(from, to))
        .order_by_asc(consumption::Column::ConsumedOn)
        .order_by_asc(consumption::Column::ProductId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Key of one cell in the consumption grid: (student id, day, product id).
pub type GridKey = (i64, NaiveDate, i64);

/// One stored consumption as seen by the views.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    /// Units consumed
    pub quantity: i32,
    /// Captured `quantity * unit_price`
    pub line_total: f64,
}

/// Consumption records keyed by (student, day, product).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsumptionGrid {
    cells: HashMap<GridKey, GridCell>,
}

impl ConsumptionGrid {
    /// Indexes `records` by their identity key.
    #[must_use]
    pub fn from_records(records: &[consumption::Model]) -> Self {
        let cells = records
            .iter()
            .map(|record| {
                (
                    (record.student_id, record.consumed_on, record.product_id),
                    GridCell {
                        quantity: record.quantity,
                        line_total: record.line_total,
                    },
                )
            })
            .collect();
        Self { cells }
    }

    /// Quantity for one cell; zero when nothing was recorded.
    #[must_use]
    pub fn quantity(&self, student_id: i64, day: NaiveDate, product_id: i64) -> i32 {
        self.cells
            .get(&(student_id, day, product_id))
            .map_or(0, |cell| cell.quantity)
    }

    /// Sum of the captured line totals of one student on one day.
    #[must_use]
    pub fn day_total(&self, student_id: i64, day: NaiveDate) -> f64 {
        self.cells
            .iter()
            .filter(|((student, date, _), _)| *student == student_id && *date == day)
            .map(|(_, cell)| cell.line_total)
            .sum()
    }

    /// Number of stored cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// No consumption recorded at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    async fn count_records(db: &DatabaseConnection) -> Result<u64> {
        Consumption::find().count(db).await.map_err(Into::into)
    }

    #[tokio::test]
    async fn test_insert_captures_price_and_line_total() -> Result<()> {
        let (db, student, product) = setup_with_student_and_product(2.5).await?;

        let outcome = upsert_consumption(&db, student.id, product.id, monday(), 3).await?;
        let UpsertOutcome::Inserted(record) = outcome else {
            panic!("expected an insert, got {outcome:?}");
        };

        assert_eq!(record.quantity, 3);
        assert_eq!(record.unit_price, 2.5);
        assert_eq!(record.line_total, 7.5);
        assert_eq!(record.consumed_on, monday());

        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() -> Result<()> {
        let (db, student, product) = setup_with_student_and_product(2.5).await?;

        upsert_consumption(&db, student.id, product.id, monday(), 4).await?;
        let first = find_consumption(&db, student.id, product.id, monday()).await?.unwrap();

        upsert_consumption(&db, student.id, product.id, monday(), 4).await?;
        let second = find_consumption(&db, student.id, product.id, monday()).await?.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.line_total, 10.0);
        assert_eq!(count_records(&db).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_zero_quantity_without_record_is_noop() -> Result<()> {
        let (db, student, product) = setup_with_student_and_product(2.5).await?;

        let outcome = upsert_consumption(&db, student.id, product.id, monday(), 0).await?;

        assert_eq!(outcome, UpsertOutcome::Unchanged);
        assert_eq!(count_records(&db).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_zero_or_negative_quantity_deletes_record() -> Result<()> {
        let (db, student, product) = setup_with_student_and_product(2.5).await?;

        upsert_consumption(&db, student.id, product.id, monday(), 2).await?;
        let outcome = upsert_consumption(&db, student.id, product.id, monday(), 0).await?;
        assert_eq!(outcome, UpsertOutcome::Deleted);
        assert_eq!(count_records(&db).await?, 0);

        upsert_consumption(&db, student.id, product.id, monday(), 2).await?;
        let outcome = upsert_consumption(&db, student.id, product.id, monday(), -1).await?;
        assert_eq!(outcome, UpsertOutcome::Deleted);
        assert_eq!(count_records(&db).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_recaptures_live_price() -> Result<()> {
        let (db, student, product) = setup_with_student_and_product(2.5).await?;

        upsert_consumption(&db, student.id, product.id, monday(), 2).await?;
        crate::core::product::update_product_price(&db, product.id, 3.0).await?;

        let outcome = upsert_consumption(&db, student.id, product.id, monday(), 3).await?;
        let UpsertOutcome::Updated(record) = outcome else {
            panic!("expected an update, got {outcome:?}");
        };

        assert_eq!(record.unit_price, 3.0);
        assert_eq!(record.line_total, 9.0);
        assert_eq!(count_records(&db).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_price_change_does_not_touch_untouched_records() -> Result<()> {
        let (db, student, product) = setup_with_student_and_product(2.5).await?;

        upsert_consumption(&db, student.id, product.id, monday(), 2).await?;
        crate::core::product::update_product_price(&db, product.id, 10.0).await?;

        let record = find_consumption(&db, student.id, product.id, monday()).await?.unwrap();
        assert_eq!(record.unit_price, 2.5);
        assert_eq!(record.line_total, 5.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_product_is_rejected() -> Result<()> {
        let (db, student, _product) = setup_with_student_and_product(2.5).await?;

        let result = upsert_consumption(&db, student.id, 999, monday(), 1).await;
        assert!(matches!(result.unwrap_err(), Error::ProductNotFound { id: 999 }));
        assert_eq!(count_records(&db).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_query_failure_is_reported() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_errors([DbErr::Custom("connection lost".to_string())])
            .into_connection();

        let result = upsert_consumption_on(&db, 1, 1, monday(), 1).await;
        assert!(matches!(result.unwrap_err(), Error::Database(_)));

        Ok(())
    }

    #[tokio::test]
    async fn test_save_day_quantities() -> Result<()> {
        let (db, student, cookie) = setup_with_student_and_product(1.5).await?;
        let juice = create_test_product(&db, "Jugo", 2.0).await?;

        upsert_consumption(&db, student.id, juice.id, monday(), 5).await?;

        let outcomes =
            save_day_quantities(&db, student.id, monday(), &[(cookie.id, 2), (juice.id, 0)])
                .await?;
        assert!(matches!(outcomes[0], UpsertOutcome::Inserted(_)));
        assert_eq!(outcomes[1], UpsertOutcome::Deleted);

        let records = consumptions_for_student_in_range(&db, student.id, monday(), monday()).await?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].product_id, cookie.id);
        assert_eq!(records[0].line_total, 3.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_save_day_quantities_is_all_or_nothing() -> Result<()> {
        let (db, student, cookie) = setup_with_student_and_product(1.5).await?;

        let result =
            save_day_quantities(&db, student.id, monday(), &[(cookie.id, 2), (999, 1)]).await;
        assert!(result.is_err());
        assert_eq!(count_records(&db).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_consumptions_in_range_and_grid() -> Result<()> {
        let (db, student, product) = setup_with_student_and_product(2.5).await?;
        let tuesday = monday().succ_opt().unwrap();
        let next_monday = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap();

        upsert_consumption(&db, student.id, product.id, monday(), 1).await?;
        upsert_consumption(&db, student.id, product.id, tuesday, 2).await?;
        upsert_consumption(&db, student.id, product.id, next_monday, 3).await?;

        let saturday = NaiveDate::from_ymd_opt(2025, 1, 11).unwrap();
        let records = consumptions_in_range(&db, monday(), saturday).await?;
        assert_eq!(records.len(), 2);

        let grid = ConsumptionGrid::from_records(&records);
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.quantity(student.id, tuesday, product.id), 2);
        assert_eq!(grid.quantity(student.id, next_monday, product.id), 0);
        assert_eq!(grid.day_total(student.id, tuesday), 5.0);
        assert_eq!(grid.day_total(student.id + 1, tuesday), 0.0);

        Ok(())
    }
}
