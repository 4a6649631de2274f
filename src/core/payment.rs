//! Payment business logic - Money received against a student's balance.
//!
//! Payments are created by explicit entry and removed by id. They are never
//! edited in place.

use crate::{
    core::week::WeekWindow,
    entities::{Payment, payment},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};

/// Records a payment for `student_id`.
///
/// # Errors
/// Returns [`Error::InvalidAmount`] when `amount` is zero, negative or not
/// finite; nothing is written in that case.
pub async fn record_payment(
    db: &DatabaseConnection,
    student_id: i64,
    amount: f64,
    paid_on: NaiveDate,
) -> Result<payment::Model> {
    if amount <= 0.0 || !amount.is_finite() {
        return Err(Error::InvalidAmount { amount });
    }

    let payment = payment::ActiveModel {
        student_id: Set(student_id),
        amount: Set(amount),
        paid_on: Set(paid_on),
        ..Default::default()
    };
    let payment = payment.insert(db).await?;

    tracing::info!(
        payment_id = payment.id,
        student_id,
        amount,
        %paid_on,
        "Payment recorded"
    );
    Ok(payment)
}

/// Deletes a payment by id and returns the number of rows removed.
///
/// Deleting an id that does not exist is not an error; it reports zero rows.
pub async fn delete_payment(db: &DatabaseConnection, payment_id: i64) -> Result<u64> {
    let result = Payment::delete_by_id(payment_id).exec(db).await?;

    tracing::info!(payment_id, rows = result.rows_affected, "Payment deleted");
    Ok(result.rows_affected)
}

/// Payments of one student received within `window`, newest first.
pub async fn payments_for_student_in_window(
    db: &DatabaseConnection,
    student_id: i64,
    window: &WeekWindow,
) -> Result<Vec<payment::Model>> {
    Payment::find()
        .filter(payment::Column::StudentId.eq(student_id))
        .filter(payment::Column::PaidOn.between(window.monday(), window.saturday()))
        .order_by_desc(payment::Column::PaidOn)
        .order_by_desc(payment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sum of the given payments.
#[must_use]
pub fn total_paid(payments: &[payment::Model]) -> f64 {
    payments.iter().map(|payment| payment.amount).sum()
}
