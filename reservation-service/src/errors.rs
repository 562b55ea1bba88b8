use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// No usable identity on the request.
    #[error("authentication required")]
    Unauthenticated,

    /// Reservation date outside the allowed booking window.
    #[error("reservation date must be between {min} and {max}")]
    OutOfWindow { min: NaiveDate, max: NaiveDate },

    /// Times not hour-aligned, out of order, or outside business hours.
    #[error("{message}")]
    InvalidTimeRange { message: String },

    /// Missing or unparseable date input.
    #[error("{message}")]
    InvalidDate { message: String },

    /// Confirmed load plus the request would exceed the per-slot limit.
    #[error("requested {requested} participants but only {remaining} remaining in this time range")]
    CapacityExceeded { requested: i32, remaining: i32 },

    /// Status or role rules forbid the operation.
    #[error("you do not have permission to perform this action")]
    Forbidden,

    /// Missing id, or a reservation the requester may not see.
    #[error("reservation not found")]
    NotFound,

    /// Storage-boundary invariant breach. Should not happen when the
    /// validator runs first.
    #[error("{message}")]
    ConstraintViolation { message: String },

    #[error(transparent)]
    Database(diesel::result::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::OutOfWindow { .. }
            | Error::InvalidTimeRange { .. }
            | Error::InvalidDate { .. }
            | Error::CapacityExceeded { .. }
            | Error::ConstraintViolation { .. } => StatusCode::BAD_REQUEST,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Database(_) | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error as DieselError};

        match err {
            DieselError::NotFound => Error::NotFound,
            DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, info) => {
                Error::ConstraintViolation {
                    message: info.message().to_string(),
                }
            }
            other => Error::Database(other),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Database(_) | Error::Other(_) => {
                tracing::error!("internal service error: {}", self);
            }
            Error::ConstraintViolation { .. } => {
                tracing::warn!("storage constraint rejected a write: {}", self);
            }
            _ => {
                tracing::debug!("client error: {}", self);
            }
        }

        let status = self.status_code();
        // Validation messages go back verbatim; internals do not leak.
        let error = match &self {
            Error::Database(_) | Error::Other(_) => "internal server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
