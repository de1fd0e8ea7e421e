//! Dashboard error handling
//!
//! Fatal conditions (configuration, data source) and request validation
//! failures share one type so every endpoint reports them the same way.
//! An empty filter result is not an error and never appears here.

use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Data source error: {0}")]
    DataSource(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<QueryRejection> for DashboardError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl DashboardError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::DataSource(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::DataSource(_) => "DATA_SOURCE_ERROR",
            Self::BadRequest(_) => "BAD_REQUEST",
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Configuration(msg) | Self::BadRequest(msg) => msg.clone(),
            // Don't leak connection details
            Self::DataSource(_) => "Error loading tender data".to_string(),
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        match &self {
            Self::DataSource(e) => {
                tracing::error!(error = ?e, "Data source error");
            }
            Self::Configuration(msg) => {
                tracing::error!(error = %msg, "Configuration error");
            }
            Self::BadRequest(_) => {
                tracing::warn!(error = %self, "Rejected dashboard request");
            }
        }

        let status = self.status_code();
        let body = ErrorResponse {
            code: self.error_code().to_string(),
            message: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}

pub type DashboardResult<T> = Result<T, DashboardError>;
