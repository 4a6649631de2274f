//! Request parameter parsing.
//!
//! Query strings and urlencoded forms are both read as a flat string map.
//! Anything that is present but malformed becomes [`Error::InvalidInput`], which
//! the error layer answers with 400.

use crate::{
    core::{days::DisabledDays, student::GradeFilter, week::parse_iso_date},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Parameters of one request.
#[derive(Debug, Clone, Default)]
pub struct Params {
    values: HashMap<String, String>,
}

impl From<HashMap<String, String>> for Params {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl Params {
    /// Trimmed value of `field`; blank counts as absent.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values
            .get(field)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// A mandatory numeric id.
    pub fn required_id(&self, field: &str) -> Result<i64> {
        let raw = self.get(field).ok_or_else(|| Error::invalid_input(field, ""))?;
        raw.parse().map_err(|_| Error::invalid_input(field, raw))
    }

    /// A mandatory `YYYY-MM-DD` date.
    pub fn required_date(&self, field: &str) -> Result<NaiveDate> {
        self.optional_date(field)?
            .ok_or_else(|| Error::invalid_input(field, ""))
    }

    /// An optional `YYYY-MM-DD` date; malformed values are still rejected.
    pub fn optional_date(&self, field: &str) -> Result<Option<NaiveDate>> {
        self.get(field)
            .map(|raw| parse_iso_date(raw).ok_or_else(|| Error::invalid_input(field, raw)))
            .transpose()
    }

    /// The `grado` selection: absent means `default_grade`, `0` means all grades.
    pub fn grade_filter(&self, default_grade: i64) -> Result<GradeFilter> {
        let id = match self.get("grado") {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| Error::invalid_input("grado", raw))?,
            None => default_grade,
        };
        Ok(GradeFilter::from_id(id))
    }

    /// A quantity; missing or blank means zero.
    pub fn quantity(&self, field: &str) -> Result<i32> {
        self.get(field).map_or(Ok(0), |raw| {
            raw.parse().map_err(|_| Error::invalid_input(field, raw))
        })
    }

    /// A mandatory decimal amount. Accepts a comma as decimal separator.
    pub fn amount(&self, field: &str) -> Result<f64> {
        let raw = self.get(field).ok_or_else(|| Error::invalid_input(field, ""))?;
        raw.replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|amount| amount.is_finite())
            .ok_or_else(|| Error::invalid_input(field, raw))
    }

    /// The `dias_off` list.
    pub fn disabled_days(&self) -> Result<DisabledDays> {
        self.get("dias_off")
            .map_or_else(|| Ok(DisabledDays::default()), DisabledDays::parse)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect::<HashMap<_, _>>()
            .into()
    }

    #[test]
    fn test_required_id() {
        let p = params(&[("id_estudiante", " 12 "), ("id_producto", "abc")]);

        assert_eq!(p.required_id("id_estudiante").unwrap(), 12);
        assert!(matches!(
            p.required_id("id_producto").unwrap_err(),
            Error::InvalidInput { field, .. } if field == "id_producto"
        ));
        assert!(p.required_id("id_pago").is_err());
    }

    #[test]
    fn test_dates() {
        let p = params(&[("fecha", "2025-01-07"), ("fecha_pago", "07/01/2025"), ("vacio", " ")]);

        assert_eq!(
            p.required_date("fecha").unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 7).unwrap()
        );
        assert!(p.optional_date("fecha_pago").is_err());
        assert_eq!(p.optional_date("vacio").unwrap(), None);
        assert!(p.required_date("vacio").is_err());
        assert!(params(&[("fecha", "+202-01-06")]).required_date("fecha").is_err());
    }

    #[test]
    fn test_grade_filter() {
        assert_eq!(params(&[]).grade_filter(1).unwrap(), GradeFilter::Grade(1));
        assert_eq!(params(&[("grado", "0")]).grade_filter(1).unwrap(), GradeFilter::All);
        assert_eq!(
            params(&[("grado", "4")]).grade_filter(1).unwrap(),
            GradeFilter::Grade(4)
        );
        assert!(params(&[("grado", "cuarto")]).grade_filter(1).is_err());
    }

    #[test]
    fn test_quantity() {
        let p = params(&[("cantidad_1", "3"), ("cantidad_2", ""), ("cantidad_3", "x")]);

        assert_eq!(p.quantity("cantidad_1").unwrap(), 3);
        assert_eq!(p.quantity("cantidad_2").unwrap(), 0);
        assert_eq!(p.quantity("cantidad_9").unwrap(), 0);
        assert!(p.quantity("cantidad_3").is_err());
    }

    #[test]
    fn test_amount() {
        assert_eq!(params(&[("monto", "5.50")]).amount("monto").unwrap(), 5.5);
        assert_eq!(params(&[("monto", "5,50")]).amount("monto").unwrap(), 5.5);
        // Sign is a business rule, checked when the payment is recorded
        assert_eq!(params(&[("monto", "-2")]).amount("monto").unwrap(), -2.0);
        assert!(params(&[("monto", "cinco")]).amount("monto").is_err());
        assert!(params(&[("monto", "NaN")]).amount("monto").is_err());
        assert!(params(&[]).amount("monto").is_err());
    }

    #[test]
    fn test_disabled_days() {
        assert!(params(&[]).disabled_days().unwrap().is_empty());
        let disabled = params(&[("dias_off", "2025-01-07")]).disabled_days().unwrap();
        assert!(disabled.contains(NaiveDate::from_ymd_opt(2025, 1, 7).unwrap()));
        assert!(params(&[("dias_off", "lunes")]).disabled_days().is_err());
    }
}
