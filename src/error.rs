use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Message returned when an update targets an unknown id. Clients of the
/// original API match on this exact text.
pub const NOT_FOUND_MESSAGE: &str = "User not found";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
    #[error("not found")]
    NotFound,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Config(_) | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            // Store failures are surfaced like bad input, not as a separate kind.
            AppError::Database(_)
            | AppError::Migrate(_)
            | AppError::Validation(_)
            | AppError::BadRequest(_)
            | AppError::Other(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
        };

        let body = match self {
            AppError::NotFound => json!({ "message": NOT_FOUND_MESSAGE }),
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// A single schema violation: the dotted path of the offending field and
/// why it was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub reason: String,
}

/// Every violation found while checking one trip payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub fn single(path: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut err = Self::default();
        err.push(path, reason);
        err
    }

    pub fn push(&mut self, path: impl Into<String>, reason: impl Into<String>) {
        self.violations.push(Violation {
            path: path.into(),
            reason: reason.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn has_path(&self, path: &str) -> bool {
        self.violations.iter().any(|v| v.path == path)
    }

    /// `Ok(())` when nothing was recorded, otherwise the collected violations.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trip validation failed")?;
        for (idx, violation) in self.violations.iter().enumerate() {
            let sep = if idx == 0 { ": " } else { ", " };
            write!(f, "{sep}{}: {}", violation.path, violation.reason)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
