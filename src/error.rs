use crate::database::DbError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::debug;
use thiserror::Error;

/// Errors a handler can answer with. Internal causes are logged, clients only
/// get the short message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error")]
    Database(#[from] DbError),
    #[error("Template error")]
    Template(#[from] tera::Error),
    #[error("Verification error")]
    Verification(#[from] bcrypt::BcryptError),
    #[error("Not authenticated")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Database(err) => debug!("{:?}", err),
            AppError::Template(err) => debug!("{:?}", err),
            AppError::Verification(err) => debug!("{:?}", err),
            _ => {}
        }
        HttpResponse::build(self.status_code()).body(self.to_string())
    }
}
