//! Error type shared by both services.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::error::{DatabaseError, ErrorKind};
use thiserror::Error;

pub const CODIGO_BARRAS_CONSTRAINT: &str = "productos_codigo_barras_key";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    /// Unique or other integrity constraint violated in the store.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    /// The random-meal source failed or answered with a non-success status.
    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if is_integrity_violation(&**db) => {
                AppError::Conflict(conflict_message(&**db))
            }
            _ => AppError::Internal(e.to_string()),
        }
    }
}

fn is_integrity_violation(db: &dyn DatabaseError) -> bool {
    !matches!(db.kind(), ErrorKind::Other)
}

fn conflict_message(db: &dyn DatabaseError) -> String {
    match db.constraint() {
        Some(CODIGO_BARRAS_CONSTRAINT) => "Ya existe un producto con ese código de barras".into(),
        _ => format!("Violación de integridad: {}", db.message()),
    }
}

pub type AppResult<T> = Result<T, AppError>;
