//! Printable weekly statement for one student.

use crate::{
    core::{
        consumption::consumptions_for_student_in_range,
        ledger::{payments_total_for_student, prior_debt_for_student},
        product::get_products_by_ids,
        student::get_student_display_name,
        week::WeekWindow,
    },
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// One product line of a statement day.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementLine {
    /// Product the line is for
    pub product_id: i64,
    /// Current product name, or a placeholder for deleted products
    pub product_name: String,
    /// Units consumed that day
    pub quantity: i32,
    /// Price captured when the record was written
    pub unit_price: f64,
    /// `quantity * unit_price` as stored
    pub line_total: f64,
}

/// A kiosk day on which the student consumed something.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementDay {
    /// Kiosk day
    pub date: NaiveDate,
    /// Lines in product order
    pub lines: Vec<StatementLine>,
    /// Sum of the day's line totals
    pub total: f64,
}

/// Consumption, carried debt and payments of one student for one week.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyStatement {
    /// Student the statement is for
    pub student_id: i64,
    /// Empty when the student does not exist
    pub student_name: String,
    /// Week covered
    pub window: WeekWindow,
    /// Only days with consumption, Monday first
    pub days: Vec<StatementDay>,
    /// Sum of the week's line totals
    pub subtotal: f64,
    /// Balance carried from before the week
    pub prior_debt: f64,
    /// Payments received during the week
    pub payments: f64,
    /// `subtotal + prior_debt - payments`
    pub total: f64,
}

impl WeeklyStatement {
    /// Whether anything was consumed during the week.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Builds the statement of `student_id` for `window`.
///
/// Product names are resolved for every product that appears in the week,
/// including products no longer on sale.
pub async fn weekly_statement(
    db: &DatabaseConnection,
    student_id: i64,
    window: WeekWindow,
) -> Result<WeeklyStatement> {
    let student_name = get_student_display_name(db, student_id).await?;
    let records =
        consumptions_for_student_in_range(db, student_id, window.monday(), window.saturday())
            .await?;

    let mut product_ids: Vec<i64> = records.iter().map(|record| record.product_id).collect();
    product_ids.sort_unstable();
    product_ids.dedup();
    let products = get_products_by_ids(db, product_ids).await?;

    let mut days: Vec<StatementDay> = Vec::new();
    for record in &records {
        let line = StatementLine {
            product_id: record.product_id,
            product_name: products
                .get(&record.product_id)
                .map_or_else(|| format!("Producto #{}", record.product_id), |p| p.name.clone()),
            quantity: record.quantity,
            unit_price: record.unit_price,
            line_total: record.line_total,
        };

        // Records arrive ordered by date, so a new day only ever appends
        match days.last_mut() {
            Some(day) if day.date == record.consumed_on => {
                day.total += line.line_total;
                day.lines.push(line);
            }
            _ => days.push(StatementDay {
                date: record.consumed_on,
                total: line.line_total,
                lines: vec![line],
            }),
        }
    }

    let subtotal: f64 = days.iter().map(|day| day.total).sum();
    let prior_debt = prior_debt_for_student(db, student_id, window.monday()).await?;
    let payments = payments_total_for_student(db, student_id, &window).await?;

    tracing::debug!(student_id, monday = %window.monday(), days = days.len(), "Statement built");

    Ok(WeeklyStatement {
        student_id,
        student_name,
        window,
        days,
        subtotal,
        prior_debt,
        payments,
        total: subtotal + prior_debt - payments,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{
        core::{
            consumption::upsert_consumption, payment::record_payment, product::deactivate_product,
        },
        test_utils::*,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_statement_lists_only_days_with_consumption() -> Result<()> {
        let (db, student, cookie) = setup_with_student_and_product(1.5).await?;
        let juice = create_test_product(&db, "Jugo", 2.0).await?;

        upsert_consumption(&db, student.id, cookie.id, date(2025, 1, 6), 2).await?;
        upsert_consumption(&db, student.id, juice.id, date(2025, 1, 6), 1).await?;
        upsert_consumption(&db, student.id, juice.id, date(2025, 1, 9), 3).await?;
        // Outside the window
        upsert_consumption(&db, student.id, juice.id, date(2025, 1, 13), 3).await?;

        let statement =
            weekly_statement(&db, student.id, WeekWindow::containing(date(2025, 1, 8))).await?;

        assert_eq!(statement.student_name, "Quispe, Ana");
        assert_eq!(statement.days.len(), 2);

        let monday = &statement.days[0];
        assert_eq!(monday.date, date(2025, 1, 6));
        assert_eq!(monday.lines.len(), 2);
        assert_eq!(monday.lines[0].product_name, "Galleta");
        assert_eq!(monday.lines[0].line_total, 3.0);
        assert_eq!(monday.total, 5.0);

        let thursday = &statement.days[1];
        assert_eq!(thursday.date, date(2025, 1, 9));
        assert_eq!(thursday.total, 6.0);

        assert_eq!(statement.subtotal, 11.0);
        assert_eq!(statement.total, 11.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_statement_totals_include_debt_and_payments() -> Result<()> {
        let (db, student, product) = setup_with_student_and_product(2.5).await?;

        upsert_consumption(&db, student.id, product.id, date(2025, 1, 3), 4).await?;
        upsert_consumption(&db, student.id, product.id, date(2025, 1, 6), 3).await?;
        record_payment(&db, student.id, 5.0, date(2025, 1, 7)).await?;

        let statement =
            weekly_statement(&db, student.id, WeekWindow::containing(date(2025, 1, 6))).await?;

        assert_eq!(statement.subtotal, 7.5);
        assert_eq!(statement.prior_debt, 10.0);
        assert_eq!(statement.payments, 5.0);
        assert_eq!(statement.total, 12.5);

        Ok(())
    }

    #[tokio::test]
    async fn test_statement_keeps_names_of_retired_products() -> Result<()> {
        let (db, student, product) = setup_with_student_and_product(2.5).await?;

        upsert_consumption(&db, student.id, product.id, date(2025, 1, 6), 1).await?;
        deactivate_product(&db, product.id).await?;

        let statement =
            weekly_statement(&db, student.id, WeekWindow::containing(date(2025, 1, 6))).await?;
        assert_eq!(statement.days[0].lines[0].product_name, "Galleta");

        Ok(())
    }

    #[tokio::test]
    async fn test_statement_for_unknown_student_is_empty() -> Result<()> {
        let db = setup_test_db().await?;

        let statement = weekly_statement(&db, 42, WeekWindow::containing(date(2025, 1, 6))).await?;

        assert!(statement.is_empty());
        assert_eq!(statement.student_name, "");
        assert_eq!(statement.total, 0.0);

        Ok(())
    }
}
