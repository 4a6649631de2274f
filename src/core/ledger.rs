//! Weekly ledger calculation.
//!
//! For every active student of a grade the ledger shows
//!
//! ```text
//! total = subtotal (this week's consumption) + prior debt - payments this week
//! ```
//!
//! where prior debt is everything consumed before the week's Monday minus
//! everything paid before it. Per-student figures come from two grouped
//! queries (consumption before the week, payments split at Monday), so the
//! cost of a ledger does not grow with the number of students.
//! The single-student helpers compute the same figures one student at a time;
//! the printable statement uses them and the tests use them to cross-check the
//! batch path.

use crate::{
    core::{
        consumption::{ConsumptionGrid, consumptions_in_range},
        product::get_all_active_products,
        student::{GradeFilter, get_active_students},
        week::WeekWindow,
    },
    entities::{Consumption, Payment, consumption, payment, product, student},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{
    QuerySelect,
    prelude::*,
    sea_query::{Alias, Expr, SimpleExpr},
};
use std::collections::HashMap;

/// One student's figures for a week.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    /// The student the row belongs to
    pub student: student::Model,
    /// Sum of this week's line totals
    pub subtotal: f64,
    /// Unpaid balance carried from before the week
    pub prior_debt: f64,
    /// Payments received during the week
    pub payments: f64,
    /// `subtotal + prior_debt - payments`; negative when over-paid
    pub total: f64,
}

impl LedgerRow {
    /// Builds a row, deriving the total.
    #[must_use]
    pub fn new(student: student::Model, subtotal: f64, prior_debt: f64, payments: f64) -> Self {
        Self {
            student,
            subtotal,
            prior_debt,
            payments,
            total: subtotal + prior_debt - payments,
        }
    }
}

/// Everything the weekly view needs.
#[derive(Debug, Clone)]
pub struct WeeklyLedger {
    /// Week being shown
    pub window: WeekWindow,
    /// Grade selection the rows were computed for
    pub filter: GradeFilter,
    /// Active products, in grid column order
    pub products: Vec<product::Model>,
    /// One row per active student of the selection
    pub rows: Vec<LedgerRow>,
    /// This week's quantities keyed by (student, day, product)
    pub grid: ConsumptionGrid,
}

/// `CAST(SUM(expr) AS DOUBLE PRECISION)` so every backend hands back a float.
fn sum_as_double(expr: impl Into<SimpleExpr>) -> SimpleExpr {
    Expr::expr(expr).sum().cast_as(Alias::new("DOUBLE PRECISION"))
}

/// Σ line totals per student for records dated before `cutoff`.
async fn consumed_before_by_student(
    db: &DatabaseConnection,
    student_ids: &[i64],
    cutoff: NaiveDate,
) -> Result<HashMap<i64, f64>> {
    let rows: Vec<(i64, Option<f64>)> = Consumption::find()
        .select_only()
        .column(consumption::Column::StudentId)
        .column_as(
            sum_as_double(Expr::col(consumption::Column::LineTotal)),
            "consumed",
        )
        .filter(consumption::Column::StudentId.is_in(student_ids.iter().copied()))
        .filter(consumption::Column::ConsumedOn.lt(cutoff))
        .group_by(consumption::Column::StudentId)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(student_id, consumed)| (student_id, consumed.unwrap_or_default()))
        .collect())
}

/// Payments per student split at `cutoff` in one grouped query: the sum paid
/// before `cutoff` and the sum paid from `cutoff` through `through`.
async fn paid_by_student(
    db: &DatabaseConnection,
    student_ids: &[i64],
    cutoff: NaiveDate,
    through: NaiveDate,
) -> Result<HashMap<i64, (f64, f64)>> {
    let before = Expr::case(
        payment::Column::PaidOn.lt(cutoff),
        Expr::col(payment::Column::Amount),
    )
    .finally(0.0);
    let within = Expr::case(
        payment::Column::PaidOn.gte(cutoff),
        Expr::col(payment::Column::Amount),
    )
    .finally(0.0);

    let rows: Vec<(i64, Option<f64>, Option<f64>)> = Payment::find()
        .select_only()
        .column(payment::Column::StudentId)
        .column_as(sum_as_double(before), "paid_before")
        .column_as(sum_as_double(within), "paid_within")
        .filter(payment::Column::StudentId.is_in(student_ids.iter().copied()))
        .filter(payment::Column::PaidOn.lte(through))
        .group_by(payment::Column::StudentId)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(student_id, before, within)| {
            (
                student_id,
                (before.unwrap_or_default(), within.unwrap_or_default()),
            )
        })
        .collect())
}

/// Balance figures of one student for a week.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct WeekBalance {
    /// Consumed minus paid before the week's Monday
    pub prior_debt: f64,
    /// Paid Monday through Saturday
    pub payments: f64,
}

/// Prior debt and week payments for each of `student_ids`, using exactly two
/// aggregate queries whatever the number of students.
///
/// Every requested student gets an entry; students without any history get
/// zeros.
pub async fn balances_by_student(
    db: &DatabaseConnection,
    student_ids: &[i64],
    window: &WeekWindow,
) -> Result<HashMap<i64, WeekBalance>> {
    if student_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let consumed = consumed_before_by_student(db, student_ids, window.monday()).await?;
    let paid = paid_by_student(db, student_ids, window.monday(), window.saturday()).await?;

    Ok(student_ids
        .iter()
        .map(|id| {
            let (paid_before, paid_within) = paid.get(id).copied().unwrap_or_default();
            let balance = WeekBalance {
                prior_debt: consumed.get(id).copied().unwrap_or_default() - paid_before,
                payments: paid_within,
            };
            (*id, balance)
        })
        .collect())
}

/// Prior debt as of `cutoff` for each of `student_ids`.
///
/// Every requested student gets an entry; students without any history get 0.
pub async fn prior_debts_by_student(
    db: &DatabaseConnection,
    student_ids: &[i64],
    cutoff: NaiveDate,
) -> Result<HashMap<i64, f64>> {
    if student_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let consumed = consumed_before_by_student(db, student_ids, cutoff).await?;
    let paid = paid_by_student(db, student_ids, cutoff, cutoff).await?;

    Ok(student_ids
        .iter()
        .map(|id| {
            let (paid_before, _) = paid.get(id).copied().unwrap_or_default();
            (*id, consumed.get(id).copied().unwrap_or_default() - paid_before)
        })
        .collect())
}

/// Payments received within `window` for each of `student_ids` (0 when none).
pub async fn payments_by_student(
    db: &DatabaseConnection,
    student_ids: &[i64],
    window: &WeekWindow,
) -> Result<HashMap<i64, f64>> {
    if student_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let paid = paid_by_student(db, student_ids, window.monday(), window.saturday()).await?;

    Ok(student_ids
        .iter()
        .map(|id| {
            let (_, paid_within) = paid.get(id).copied().unwrap_or_default();
            (*id, paid_within)
        })
        .collect())
}

/// Prior debt of a single student as of `cutoff`.
pub async fn prior_debt_for_student(
    db: &DatabaseConnection,
    student_id: i64,
    cutoff: NaiveDate,
) -> Result<f64> {
    let consumed: Option<Option<f64>> = Consumption::find()
        .select_only()
        .column_as(sum_as_double(Expr::col(consumption::Column::LineTotal)), "consumed")
        .filter(consumption::Column::StudentId.eq(student_id))
        .filter(consumption::Column::ConsumedOn.lt(cutoff))
        .into_tuple()
        .one(db)
        .await?;

    let paid: Option<Option<f64>> = Payment::find()
        .select_only()
        .column_as(sum_as_double(Expr::col(payment::Column::Amount)), "paid")
        .filter(payment::Column::StudentId.eq(student_id))
        .filter(payment::Column::PaidOn.lt(cutoff))
        .into_tuple()
        .one(db)
        .await?;

    Ok(consumed.flatten().unwrap_or_default() - paid.flatten().unwrap_or_default())
}

/// Payments of a single student received within `window`.
pub async fn payments_total_for_student(
    db: &DatabaseConnection,
    student_id: i64,
    window: &WeekWindow,
) -> Result<f64> {
    let paid: Option<Option<f64>> = Payment::find()
        .select_only()
        .column_as(sum_as_double(Expr::col(payment::Column::Amount)), "paid")
        .filter(payment::Column::StudentId.eq(student_id))
        .filter(payment::Column::PaidOn.between(window.monday(), window.saturday()))
        .into_tuple()
        .one(db)
        .await?;

    Ok(paid.flatten().unwrap_or_default())
}

/// Computes the weekly ledger for `filter` over `window`.
///
/// Any failing query aborts the whole computation; partial ledgers are never
/// returned.
pub async fn weekly_ledger(
    db: &DatabaseConnection,
    filter: GradeFilter,
    window: WeekWindow,
) -> Result<WeeklyLedger> {
    let students = get_active_students(db, filter).await?;
    let products = get_all_active_products(db).await?;
    let records = consumptions_in_range(db, window.monday(), window.saturday()).await?;

    let mut subtotals: HashMap<i64, f64> = HashMap::with_capacity(students.len());
    for record in &records {
        *subtotals.entry(record.student_id).or_default() += record.line_total;
    }

    let student_ids: Vec<i64> = students.iter().map(|student| student.id).collect();
    let balances = balances_by_student(db, &student_ids, &window).await?;

    let rows: Vec<LedgerRow> = students
        .into_iter()
        .map(|student| {
            let id = student.id;
            let balance = balances.get(&id).copied().unwrap_or_default();
            LedgerRow::new(
                student,
                subtotals.get(&id).copied().unwrap_or_default(),
                balance.prior_debt,
                balance.payments,
            )
        })
        .collect();

    tracing::debug!(
        grade = filter.as_id(),
        monday = %window.monday(),
        students = rows.len(),
        records = records.len(),
        "Weekly ledger computed"
    );

    Ok(WeeklyLedger {
        window,
        filter,
        products,
        rows,
        grid: ConsumptionGrid::from_records(&records),
    })
}
