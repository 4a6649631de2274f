//! Core business logic, independent of the HTTP surface.
//!
//! Every function takes a `SeaORM` connection and returns [`crate::errors::Result`].

/// Per-student, per-product, per-day consumption records and the upsert rule
pub mod consumption;
/// Operator-disabled kiosk days
pub mod days;
/// Grade reference data
pub mod grade;
/// Weekly balances: subtotal, prior debt, payments, total
pub mod ledger;
/// Payments received from students
pub mod payment;
/// Product catalog and live prices
pub mod product;
/// Initial reference data from the catalog file
pub mod seed;
/// One student's printable weekly statement
pub mod statement;
/// Students and grade filtering
pub mod student;
/// Monday to Saturday week windows
pub mod week;
