//! Reference-data catalog loading from a TOML file.
//!
//! The catalog lists the grades, products and students a fresh installation
//! starts with. It is read once at startup and used to seed empty tables; a
//! database that already has data is never modified by it.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// The whole catalog file.
#[derive(Debug, Default, Deserialize)]
pub struct Catalog {
    /// Grades in school order
    #[serde(default)]
    pub grades: Vec<GradeSeed>,
    /// Products on sale
    #[serde(default)]
    pub products: Vec<ProductSeed>,
    /// Enrolled students
    #[serde(default)]
    pub students: Vec<StudentSeed>,
}

/// One `[[grades]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct GradeSeed {
    /// `Primaria` or `Secundaria`
    pub level: String,
    /// Full name, e.g. `Quinto`
    pub name: String,
    /// Short label, e.g. `5to`
    pub year_label: String,
}

/// One `[[products]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSeed {
    /// Display name
    pub name: String,
    /// Price per unit, never negative
    pub unit_price: f64,
}

/// One `[[students]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct StudentSeed {
    /// Given names
    pub given_names: String,
    /// Family names
    pub family_names: String,
    /// 1-based position of the student's grade in `grades`
    pub grade: usize,
}

impl Catalog {
    /// Checks that every student points at a listed grade.
    pub fn validate(&self) -> Result<()> {
        for student in &self.students {
            if student.grade == 0 || student.grade > self.grades.len() {
                return Err(Error::Config {
                    message: format!(
                        "Student {} {} refers to grade {} but the catalog lists {} grades",
                        student.given_names,
                        student.family_names,
                        student.grade,
                        self.grades.len()
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Parses catalog text.
pub fn parse_catalog(contents: &str) -> Result<Catalog> {
    let catalog: Catalog = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse catalog: {e}"),
    })?;
    catalog.validate()?;
    Ok(catalog)
}

/// Loads the catalog from `path`.
///
/// # Errors
/// Returns an error if the file cannot be read, the TOML is invalid or a
/// student refers to a grade that is not listed.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!(
            "Failed to read catalog file {}: {e}",
            path.as_ref().display()
        ),
    })?;
    parse_catalog(&contents)
}

/// Loads the catalog when the file exists; a missing file means "nothing to seed".
pub fn load_catalog_if_present<P: AsRef<Path>>(path: P) -> Result<Option<Catalog>> {
    if path.as_ref().exists() {
        load_catalog(path).map(Some)
    } else {
        Ok(None)
    }
}
