use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::inference::InferenceError;
use crate::models::ErrorResponse;
use crate::validation::{FieldViolation, ValidationError, ViolationKind};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("request body is not valid JSON: {0}")]
    MalformedBody(String),
    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),
    #[error("blocking task failed: {0}")]
    Blocking(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::MalformedBody(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Inference(_) | ApiError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Validation(err) => {
                ErrorResponse::with_detail("validation failed", err.violations.clone())
            }
            ApiError::MalformedBody(reason) => ErrorResponse::with_detail(
                "validation failed",
                vec![FieldViolation::new(
                    "body",
                    ViolationKind::JsonInvalid,
                    reason.clone(),
                )],
            ),
            // Causes stay in the server log.
            ApiError::Inference(_) | ApiError::Blocking(_) => {
                ErrorResponse::new("internal server error")
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
