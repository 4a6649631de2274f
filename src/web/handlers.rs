//! Route handlers.
//!
//! Each handler parses its parameters, calls into [`crate::core`] and either
//! renders a page or redirects (303) back to the view the request came from.

use crate::{
    core::{
        consumption::{
            ConsumptionGrid, consumptions_for_student_in_range, save_day_quantities,
            upsert_consumption,
        },
        days::day_states,
        grade::get_all_grades,
        ledger::weekly_ledger,
        payment::{delete_payment, payments_for_student_in_window, record_payment},
        product::get_all_active_products,
        statement::weekly_statement,
        student::get_student_display_name,
        week::WeekWindow,
    },
    errors::Result,
    web::{
        AppState,
        params::Params,
        views::{self, LedgerPage, view_query},
    },
};
use axum::{
    Form,
    extract::{Query, State},
    response::{Html, Redirect},
};
use chrono::{Local, NaiveDate};
use std::collections::HashMap;
use tracing::debug;

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `GET /`
pub async fn ledger(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>> {
    let params = Params::from(params);
    let reference = params.optional_date("fecha")?.unwrap_or_else(today);
    let filter = params.grade_filter(state.default_grade)?;
    let disabled = params.disabled_days()?;
    debug!(%reference, grade = filter.as_id(), dias_off = %disabled.to_param(), "Ledger requested");

    let window = WeekWindow::containing(reference);
    let ledger = weekly_ledger(&state.db, filter, window).await?;
    let grades = get_all_grades(&state.db).await?;
    let states = day_states(&window, &disabled);

    let html = views::render_ledger(&LedgerPage {
        ledger: &ledger,
        grades: &grades,
        day_states: &states,
        disabled: &disabled,
        reference,
    })?;
    Ok(Html(html))
}

/// `GET /editar-consumos`
pub async fn edit_consumption(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>> {
    let params = Params::from(params);
    let student_id = params.required_id("id_estudiante")?;
    let day = params.required_date("fecha")?;
    let filter = params.grade_filter(state.default_grade)?;

    let student_name = get_student_display_name(&state.db, student_id).await?;
    let products = get_all_active_products(&state.db).await?;
    let records = consumptions_for_student_in_range(&state.db, student_id, day, day).await?;
    let grid = ConsumptionGrid::from_records(&records);

    let html =
        views::render_consumption_editor(student_id, &student_name, day, &products, &grid, filter)?;
    Ok(Html(html))
}

/// `POST /guardar-consumos-dia`
///
/// Every active product is saved with its `cantidad_<id>` value; a missing or
/// blank field means zero. One malformed quantity rejects the whole form.
pub async fn save_day(
    State(state): State<AppState>,
    Form(params): Form<HashMap<String, String>>,
) -> Result<Redirect> {
    let params = Params::from(params);
    let student_id = params.required_id("id_estudiante")?;
    let day = params.required_date("fecha")?;
    let filter = params.grade_filter(state.default_grade)?;

    let products = get_all_active_products(&state.db).await?;
    let quantities = products
        .iter()
        .map(|product| -> Result<(i64, i32)> {
            let quantity = params.quantity(&format!("cantidad_{}", product.id))?;
            Ok((product.id, quantity))
        })
        .collect::<Result<Vec<_>>>()?;

    save_day_quantities(&state.db, student_id, day, &quantities).await?;

    Ok(Redirect::to(&format!("/?{}", view_query(day, filter))))
}

/// `POST /registrar-consumo`
pub async fn register_consumption(
    State(state): State<AppState>,
    Form(params): Form<HashMap<String, String>>,
) -> Result<Redirect> {
    let params = Params::from(params);
    let student_id = params.required_id("id_estudiante")?;
    let product_id = params.required_id("id_producto")?;
    let quantity = params.quantity("cantidad")?;
    let day = params.required_date("fecha")?;
    let filter = params.grade_filter(state.default_grade)?;

    upsert_consumption(&state.db, student_id, product_id, day, quantity).await?;

    Ok(Redirect::to(&format!("/?{}", view_query(day, filter))))
}

/// `GET /editar-pagos`
pub async fn edit_payments(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>> {
    let params = Params::from(params);
    let student_id = params.required_id("id_estudiante")?;
    let reference = params.optional_date("fecha")?.unwrap_or_else(today);
    let filter = params.grade_filter(state.default_grade)?;

    let window = WeekWindow::containing(reference);
    let student_name = get_student_display_name(&state.db, student_id).await?;
    let payments = payments_for_student_in_window(&state.db, student_id, &window).await?;

    let html = views::render_payments(student_id, &student_name, reference, &payments, filter)?;
    Ok(Html(html))
}

/// `POST /registrar-pago`
///
/// `fecha` is the week being viewed (today when absent); `fecha_pago`, when
/// given, is the date the payment is booked on.
pub async fn register_payment(
    State(state): State<AppState>,
    Form(params): Form<HashMap<String, String>>,
) -> Result<Redirect> {
    let params = Params::from(params);
    let student_id = params.required_id("id_estudiante")?;
    let amount = params.amount("monto")?;
    let reference = params.optional_date("fecha")?.unwrap_or_else(today);
    let paid_on = params.optional_date("fecha_pago")?.unwrap_or(reference);
    let filter = params.grade_filter(state.default_grade)?;

    record_payment(&state.db, student_id, amount, paid_on).await?;

    let query = view_query(reference, filter);
    let target = if params.get("redirect") == Some("editar-pagos") {
        format!("/editar-pagos?id_estudiante={student_id}&{query}")
    } else {
        format!("/?{query}")
    };
    Ok(Redirect::to(&target))
}

/// `POST /eliminar-pago`
pub async fn remove_payment(
    State(state): State<AppState>,
    Form(params): Form<HashMap<String, String>>,
) -> Result<Redirect> {
    let params = Params::from(params);
    let payment_id = params.required_id("id_pago")?;
    let student_id = params.required_id("id_estudiante")?;
    let reference = params.optional_date("fecha")?.unwrap_or_else(today);
    let filter = params.grade_filter(state.default_grade)?;

    delete_payment(&state.db, payment_id).await?;

    Ok(Redirect::to(&format!(
        "/editar-pagos?id_estudiante={student_id}&{}",
        view_query(reference, filter)
    )))
}

/// `GET /ver-consumo-semanal`
pub async fn weekly_statement_page(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>> {
    let params = Params::from(params);
    let student_id = params.required_id("id_estudiante")?;
    let reference = params.optional_date("fecha")?.unwrap_or_else(today);
    let filter = params.grade_filter(state.default_grade)?;

    let statement =
        weekly_statement(&state.db, student_id, WeekWindow::containing(reference)).await?;

    Ok(Html(views::render_statement(&statement, filter)?))
}
