use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::fmt;

use crate::api_types::{ApiErrorResponse, ValidationErrorResponse};
use crate::rules::FieldErrors;

#[derive(Debug)]
pub enum AppError {
    Db(sqlx::Error),
    Validation(FieldErrors),
    NotFound,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Db(e) => write!(f, "Database error: {e}"),
            AppError::Validation(e) => write!(f, "Validation failed: {e}"),
            AppError::NotFound => write!(f, "Not found"),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Validation(errors) => {
                HttpResponse::UnprocessableEntity().json(ValidationErrorResponse {
                    errors: errors.full_messages(),
                })
            }
            AppError::NotFound => HttpResponse::NotFound().json(ApiErrorResponse {
                error: "Not found".to_string(),
            }),
            AppError::Db(_) => {
                log::error!("{self}");
                HttpResponse::InternalServerError().json(ApiErrorResponse {
                    error: "Internal server error".to_string(),
                })
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Db(e)
    }
}
