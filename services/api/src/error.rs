//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how each
//! error is turned into an HTTP response.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use meal_planner_core::lifecycle::LifecycleError;
use meal_planner_core::ports::PortError;
use meal_planner_core::{AggregationError, PlanningError};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Plan generation could not fill the requested slots.
    #[error("{0}")]
    Planning(#[from] PlanningError),

    /// A status change or edit the plan's lifecycle does not allow.
    #[error("{0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Shopping list aggregation failed: {0}")]
    Aggregation(#[from] AggregationError),

    /// The request was well-formed JSON but made no sense.
    #[error("{0}")]
    BadRequest(String),

    /// The caller is authenticated but may not touch this resource.
    #[error("Insufficient permission: {0}")]
    Forbidden(String),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Port(PortError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Port(PortError::Conflict(_)) => StatusCode::CONFLICT,
            ApiError::Port(PortError::Unauthorized) => StatusCode::UNAUTHORIZED,
            ApiError::Planning(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Lifecycle(LifecycleError::Forbidden(_) | LifecycleError::CutoffPassed(_))
            | ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Lifecycle(LifecycleError::InvalidTransition { .. } | LifecycleError::Frozen(_)) => {
                StatusCode::CONFLICT
            }
            ApiError::Config(_)
            | ApiError::Port(PortError::Unexpected(_))
            | ApiError::Database(_)
            | ApiError::Aggregation(_)
            | ApiError::Io(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The JSON body of every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            error!("Request failed: {:?}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
