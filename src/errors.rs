//! Unified error type for the kiosk ledger.
//!
//! Every fallible operation in the crate returns [`Result`]. The HTTP layer turns
//! an [`Error`] into a status code plus a short message through its
//! [`IntoResponse`] implementation, so handlers can simply use `?`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use thiserror::Error;

/// All errors produced by the kiosk ledger.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human readable description of the problem
        message: String,
    },

    /// Any failure reported by the database driver
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Amount is not a strictly positive, finite number
    #[error("Invalid amount: {amount} (must be greater than zero)")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// A request parameter could not be parsed
    #[error("Invalid value for `{field}`: {value:?}")]
    InvalidInput {
        /// Name of the offending parameter
        field: String,
        /// Raw value as received
        value: String,
    },

    /// Product id does not exist
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// The product id that was looked up
        id: i64,
    },

    /// I/O failure (catalog file, socket binding)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing a rendered page into its buffer failed
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

impl Error {
    /// Builds an [`Error::InvalidInput`] for a request parameter.
    pub fn invalid_input(field: &str, value: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            value: value.into(),
        }
    }

    /// HTTP status used when this error reaches a client.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Self::ProductNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Config { .. }
            | Self::Database(_)
            | Self::InvalidAmount { .. }
            | Self::Io(_)
            | Self::Fmt(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Rejected request: {}", self);
        }

        (status, self.to_string()).into_response()
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
