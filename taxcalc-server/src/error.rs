//! Maps engine errors to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use taxcalc_core::{CalculationError, RepositoryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Calculation(#[from] CalculationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("{0}")]
    BadRequest(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound | RepositoryError::TaxYearNotFound(_) => StatusCode::NOT_FOUND,
        RepositoryError::DuplicateTaxYear(_) | RepositoryError::DuplicateRate { .. } => {
            StatusCode::CONFLICT
        }
        RepositoryError::InvalidRateValue(_) | RepositoryError::InvalidDateRange { .. } => {
            StatusCode::BAD_REQUEST
        }
        RepositoryError::Database(_)
        | RepositoryError::Connection(_)
        | RepositoryError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            // Rate lookups report a missing year as 404 instead.
            ApiError::Calculation(CalculationError::TaxYearNotFound(_))
            | ApiError::Calculation(CalculationError::MissingRate { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Calculation(CalculationError::UnknownEmployee(_)) => StatusCode::NOT_FOUND,
            ApiError::Calculation(
                CalculationError::NegativeIncome(_)
                | CalculationError::NegativeTurnover(_)
                | CalculationError::InvalidPeriod { .. }
                | CalculationError::AmountOutOfRange,
            ) => StatusCode::BAD_REQUEST,
            ApiError::Calculation(CalculationError::Repository(err))
            | ApiError::Repository(err) => repository_status(err),
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        let body = serde_json::json!({
            "error": {
                "code": status.as_u16(),
                "message": self.to_string(),
            }
        });
        (status, axum::Json(body)).into_response()
    }
}
