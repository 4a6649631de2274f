//! Server-side HTML rendering.
//!
//! Pages are plain strings assembled with `write!`. Every piece of stored text
//! (student, product and grade names) goes through [`escape_html`].

use crate::{
    core::{
        consumption::ConsumptionGrid,
        days::{DayState, DisabledDays, enabled_days},
        ledger::{LedgerRow, WeeklyLedger},
        payment::total_paid,
        statement::WeeklyStatement,
        student::GradeFilter,
        week::{WeekWindow, format_iso_date, week_label},
    },
    entities::{grade, payment, product},
    errors::Result,
};
use chrono::{Datelike, NaiveDate};
use std::fmt::Write;

const WEEKDAYS_SHORT: [&str; 7] = ["Lun", "Mar", "Mié", "Jue", "Vie", "Sáb", "Dom"];
const WEEKDAYS_LONG: [&str; 7] = [
    "Lunes",
    "Martes",
    "Miércoles",
    "Jueves",
    "Viernes",
    "Sábado",
    "Domingo",
];
const MONTHS: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Products per row in the per-day editing form.
pub const PRODUCTS_PER_ROW: usize = 3;

const STYLE: &str = "body{font-family:sans-serif;margin:1.5rem}\
table{border-collapse:collapse;margin:1rem 0}\
th,td{border:1px solid #ccc;padding:.3rem .5rem;text-align:right}\
td.name,th.name{text-align:left}\
.negative{color:#b00}\
a.off{color:#999;text-decoration:line-through}\
.row{display:flex;gap:1rem;margin:.5rem 0}\
@media print{nav,form,.no-print{display:none}}";

/// Two decimals, no currency symbol: `7.5` becomes `"7.50"`.
#[must_use]
pub fn format_money(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Abbreviated weekday and day of month, e.g. `"Lun 6"`.
#[must_use]
pub fn format_short_day(date: NaiveDate) -> String {
    format!(
        "{} {}",
        WEEKDAYS_SHORT[date.weekday().num_days_from_monday() as usize],
        date.day()
    )
}

/// Long form, e.g. `"Lunes 06 de Enero"`.
#[must_use]
pub fn format_long_date(date: NaiveDate) -> String {
    format!(
        "{} {:02} de {}",
        WEEKDAYS_LONG[date.weekday().num_days_from_monday() as usize],
        date.day(),
        MONTHS[date.month0() as usize]
    )
}

/// Escapes text for use in element content and quoted attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// `fecha=...&grado=...`, the pair every view carries in its links.
#[must_use]
pub fn view_query(date: NaiveDate, grade: GradeFilter) -> String {
    format!("fecha={}&grado={}", format_iso_date(date), grade.as_id())
}

/// Splits products into rows of [`PRODUCTS_PER_ROW`].
#[must_use]
pub fn product_rows(products: &[product::Model]) -> Vec<&[product::Model]> {
    products.chunks(PRODUCTS_PER_ROW).collect()
}

fn amount_class(amount: f64) -> &'static str {
    if amount < 0.0 { "negative" } else { "" }
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        escape_html(title)
    )
}

fn hidden(out: &mut String, name: &str, value: &str) -> Result<()> {
    writeln!(
        out,
        "<input type=\"hidden\" name=\"{name}\" value=\"{}\">",
        escape_html(value)
    )?;
    Ok(())
}

/// Data of the weekly ledger page besides the ledger itself.
#[derive(Debug, Clone, Copy)]
pub struct LedgerPage<'a> {
    /// The computed ledger
    pub ledger: &'a WeeklyLedger,
    /// Options of the grade selector
    pub grades: &'a [grade::Model],
    /// Enabled/disabled state of the six kiosk days
    pub day_states: &'a [DayState],
    /// Current `dias_off` value
    pub disabled: &'a DisabledDays,
    /// Date the request asked for
    pub reference: NaiveDate,
}

fn write_week_nav(out: &mut String, window: &WeekWindow, grade: GradeFilter) -> Result<()> {
    writeln!(
        out,
        "<nav><a href=\"/?{}\">&laquo; Semana anterior</a> | <a href=\"/?{}\">Semana siguiente &raquo;</a></nav>",
        view_query(window.previous().monday(), grade),
        view_query(window.next().monday(), grade)
    )?;
    Ok(())
}

fn write_grade_selector(
    out: &mut String,
    grades: &[grade::Model],
    selected: GradeFilter,
    reference: NaiveDate,
) -> Result<()> {
    out.push_str("<form method=\"get\" action=\"/\">\n");
    hidden(out, "fecha", &format_iso_date(reference))?;
    out.push_str("<select name=\"grado\">\n");
    writeln!(
        out,
        "<option value=\"0\"{}>Todos los grados</option>",
        if selected == GradeFilter::All { " selected" } else { "" }
    )?;
    for grade in grades {
        let is_selected = selected == GradeFilter::Grade(grade.id);
        writeln!(
            out,
            "<option value=\"{}\"{}>{}</option>",
            grade.id,
            if is_selected { " selected" } else { "" },
            escape_html(&grade.display_name())
        )?;
    }
    out.push_str("</select>\n<button type=\"submit\">Ver</button>\n</form>\n");
    Ok(())
}

fn write_day_toggles(out: &mut String, page: &LedgerPage<'_>) -> Result<()> {
    let base = view_query(page.reference, page.ledger.filter);
    out.push_str("<p class=\"days\">Días:");
    for state in page.day_states {
        writeln!(
            out,
            " <a class=\"{}\" href=\"/?{base}&dias_off={}\" title=\"{}\">{}</a>",
            if state.enabled { "on" } else { "off" },
            page.disabled.toggled(state.date).to_param(),
            if state.enabled { "Deshabilitar" } else { "Habilitar" },
            format_short_day(state.date)
        )?;
    }
    out.push_str("</p>\n");
    Ok(())
}

fn write_quick_entry(
    out: &mut String,
    row: &LedgerRow,
    days: &[NaiveDate],
    products: &[product::Model],
    grade: GradeFilter,
) -> Result<()> {
    out.push_str("<form method=\"post\" action=\"/registrar-consumo\">");
    hidden(out, "id_estudiante", &row.student.id.to_string())?;
    hidden(out, "grado", &grade.as_id().to_string())?;
    out.push_str("<select name=\"fecha\">");
    for day in days {
        write!(
            out,
            "<option value=\"{}\">{}</option>",
            format_iso_date(*day),
            format_short_day(*day)
        )?;
    }
    out.push_str("</select><select name=\"id_producto\">");
    for product in products {
        write!(
            out,
            "<option value=\"{}\">{}</option>",
            product.id,
            escape_html(&product.name)
        )?;
    }
    out.push_str(
        "</select><input type=\"number\" name=\"cantidad\" min=\"0\" value=\"1\" size=\"3\">\
         <button type=\"submit\">+</button></form>",
    );
    Ok(())
}

/// Main page: the weekly ledger of one grade (or all).
pub fn render_ledger(ledger_page: &LedgerPage<'_>) -> Result<String> {
    let ledger = ledger_page.ledger;
    let grade = ledger.filter;
    let days = enabled_days(ledger_page.day_states);
    let mut body = String::new();

    writeln!(body, "<h1>Kiosko: semana del {}</h1>", week_label(&ledger.window))?;
    write_week_nav(&mut body, &ledger.window, grade)?;
    write_grade_selector(&mut body, ledger_page.grades, grade, ledger_page.reference)?;
    write_day_toggles(&mut body, ledger_page)?;

    body.push_str("<table>\n<thead><tr><th class=\"name\">Estudiante</th>");
    for day in &days {
        write!(body, "<th>{}</th>", format_short_day(*day))?;
    }
    body.push_str(
        "<th>Subtotal</th><th>Deuda anterior</th><th>Pagos</th><th>Total</th>\
         <th class=\"no-print\"></th></tr></thead>\n<tbody>\n",
    );

    if ledger.rows.is_empty() {
        writeln!(
            body,
            "<tr><td class=\"name\" colspan=\"{}\">No hay estudiantes activos.</td></tr>",
            days.len() + 6
        )?;
    }

    for row in &ledger.rows {
        let student_id = row.student.id;
        write!(
            body,
            "<tr><td class=\"name\">{}</td>",
            escape_html(&row.student.display_name())
        )?;
        for day in &days {
            let total = ledger.grid.day_total(student_id, *day);
            write!(
                body,
                "<td><a href=\"/editar-consumos?id_estudiante={student_id}&{}\">{}</a></td>",
                view_query(*day, grade),
                if total.abs() < f64::EPSILON { "-".to_string() } else { format_money(total) }
            )?;
        }
        write!(
            body,
            "<td>{}</td><td class=\"{}\">{}</td><td>{}</td><td class=\"{}\"><strong>{}</strong></td>",
            format_money(row.subtotal),
            amount_class(row.prior_debt),
            format_money(row.prior_debt),
            format_money(row.payments),
            amount_class(row.total),
            format_money(row.total)
        )?;

        let query = view_query(ledger_page.reference, grade);
        write!(
            body,
            "<td class=\"no-print\"><a href=\"/editar-pagos?id_estudiante={student_id}&{query}\">Pagos</a> \
             <a href=\"/ver-consumo-semanal?id_estudiante={student_id}&{query}\">Comprobante</a> "
        )?;
        if !days.is_empty() && !ledger.products.is_empty() {
            write_quick_entry(&mut body, row, &days, &ledger.products, grade)?;
        }
        body.push_str("</td></tr>\n");
    }
    body.push_str("</tbody>\n</table>\n");

    Ok(page("Kiosko", &body))
}

/// Form to edit every product quantity of one student on one day.
pub fn render_consumption_editor(
    student_id: i64,
    student_name: &str,
    day: NaiveDate,
    products: &[product::Model],
    grid: &ConsumptionGrid,
    grade: GradeFilter,
) -> Result<String> {
    let mut body = String::new();

    writeln!(body, "<h1>Consumos de {}</h1>", escape_html(student_name))?;
    writeln!(body, "<h2>{}</h2>", format_long_date(day))?;

    body.push_str("<form method=\"post\" action=\"/guardar-consumos-dia\">\n");
    hidden(&mut body, "id_estudiante", &student_id.to_string())?;
    hidden(&mut body, "fecha", &format_iso_date(day))?;
    hidden(&mut body, "grado", &grade.as_id().to_string())?;

    if products.is_empty() {
        body.push_str("<p>No hay productos activos.</p>\n");
    }
    for row in product_rows(products) {
        body.push_str("<div class=\"row\">\n");
        for product in row {
            writeln!(
                body,
                "<label>{} ({}) <input type=\"number\" min=\"0\" name=\"cantidad_{}\" value=\"{}\"></label>",
                escape_html(&product.name),
                format_money(product.unit_price),
                product.id,
                grid.quantity(student_id, day, product.id)
            )?;
        }
        body.push_str("</div>\n");
    }

    writeln!(
        body,
        "<p>Total del día: <strong>{}</strong></p>",
        format_money(grid.day_total(student_id, day))
    )?;
    writeln!(
        body,
        "<button type=\"submit\">Guardar</button> <a href=\"/?{}\">Volver</a>\n</form>",
        view_query(day, grade)
    )?;

    Ok(page("Editar consumos", &body))
}

/// The week's payments of one student with add and delete forms.
pub fn render_payments(
    student_id: i64,
    student_name: &str,
    reference: NaiveDate,
    payments: &[payment::Model],
    grade: GradeFilter,
) -> Result<String> {
    let window = WeekWindow::containing(reference);
    let reference_param = format_iso_date(reference);
    let mut body = String::new();

    writeln!(body, "<h1>Pagos de {}</h1>", escape_html(student_name))?;
    writeln!(body, "<h2>Semana del {}</h2>", week_label(&window))?;

    if payments.is_empty() {
        body.push_str("<p>No hay pagos registrados esta semana.</p>\n");
    } else {
        body.push_str("<table>\n<thead><tr><th class=\"name\">Fecha</th><th>Monto</th><th></th></tr></thead>\n<tbody>\n");
        for payment in payments {
            write!(
                body,
                "<tr><td class=\"name\">{}</td><td>{}</td><td>\
                 <form method=\"post\" action=\"/eliminar-pago\">",
                format_long_date(payment.paid_on),
                format_money(payment.amount)
            )?;
            hidden(&mut body, "id_pago", &payment.id.to_string())?;
            hidden(&mut body, "id_estudiante", &student_id.to_string())?;
            hidden(&mut body, "fecha", &reference_param)?;
            hidden(&mut body, "grado", &grade.as_id().to_string())?;
            body.push_str("<button type=\"submit\">Eliminar</button></form></td></tr>\n");
        }
        body.push_str("</tbody>\n</table>\n");
    }

    writeln!(
        body,
        "<p>Total pagado: <strong>{}</strong></p>",
        format_money(total_paid(payments))
    )?;

    body.push_str("<form method=\"post\" action=\"/registrar-pago\">\n");
    hidden(&mut body, "id_estudiante", &student_id.to_string())?;
    hidden(&mut body, "fecha", &reference_param)?;
    hidden(&mut body, "grado", &grade.as_id().to_string())?;
    hidden(&mut body, "redirect", "editar-pagos")?;
    writeln!(
        body,
        "<label>Monto <input type=\"number\" name=\"monto\" step=\"0.01\" min=\"0.01\" required></label>\n\
         <label>Fecha <input type=\"date\" name=\"fecha_pago\" value=\"{reference_param}\"></label>\n\
         <button type=\"submit\">Registrar pago</button>\n</form>"
    )?;
    writeln!(
        body,
        "<p><a href=\"/?{}\">Volver</a></p>",
        view_query(reference, grade)
    )?;

    Ok(page("Pagos", &body))
}

/// Printable statement.
pub fn render_statement(statement: &WeeklyStatement, grade: GradeFilter) -> Result<String> {
    let mut body = String::new();

    body.push_str("<h1>Comprobante de consumo semanal</h1>\n");
    writeln!(
        body,
        "<p><strong>{}</strong><br>Semana del {}</p>",
        escape_html(&statement.student_name),
        week_label(&statement.window)
    )?;

    if statement.is_empty() {
        body.push_str("<p>Sin consumos esta semana.</p>\n");
    }

    for day in &statement.days {
        writeln!(body, "<h3>{}</h3>", format_long_date(day.date))?;
        body.push_str(
            "<table>\n<thead><tr><th class=\"name\">Producto</th><th>Cantidad</th>\
             <th>Precio</th><th>Importe</th></tr></thead>\n<tbody>\n",
        );
        for line in &day.lines {
            writeln!(
                body,
                "<tr><td class=\"name\">{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&line.product_name),
                line.quantity,
                format_money(line.unit_price),
                format_money(line.line_total)
            )?;
        }
        writeln!(
            body,
            "<tr><td class=\"name\" colspan=\"3\">Total del día</td><td><strong>{}</strong></td></tr>\n</tbody>\n</table>",
            format_money(day.total)
        )?;
    }

    writeln!(
        body,
        "<table>\n\
         <tr><td class=\"name\">Subtotal</td><td>{}</td></tr>\n\
         <tr><td class=\"name\">Deuda anterior</td><td class=\"{}\">{}</td></tr>\n\
         <tr><td class=\"name\">Pagos de la semana</td><td>{}</td></tr>\n\
         <tr><td class=\"name\"><strong>Total a pagar</strong></td><td class=\"{}\"><strong>{}</strong></td></tr>\n\
         </table>",
        format_money(statement.subtotal),
        amount_class(statement.prior_debt),
        format_money(statement.prior_debt),
        format_money(statement.payments),
        amount_class(statement.total),
        format_money(statement.total)
    )?;
    writeln!(
        body,
        "<p class=\"no-print\"><a href=\"/?{}\">Volver</a></p>",
        view_query(statement.window.monday(), grade)
    )?;

    Ok(page("Comprobante", &body))
}
