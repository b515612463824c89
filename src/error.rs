//! Error taxonomy for the HTTP surface and the body every failure renders as.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Fixed status and label for one class of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCategory {
    pub status: StatusCode,
    pub description: &'static str,
}

pub const BAD_REQUEST: ErrorCategory = ErrorCategory {
    status: StatusCode::BAD_REQUEST,
    description: "BAD_REQUEST",
};

pub const NOT_FOUND: ErrorCategory = ErrorCategory {
    status: StatusCode::NOT_FOUND,
    description: "NOT_FOUND",
};

pub const INTERNAL: ErrorCategory = ErrorCategory {
    status: StatusCode::INTERNAL_SERVER_ERROR,
    description: "INTERNAL_SERVER_ERROR",
};

/// Wire shape: the category fields merged with the message.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub description: &'static str,
    pub message: String,
}

impl ErrorBody {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            status: category.status.as_u16(),
            description: category.description,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ApiError::BadRequest(_) => BAD_REQUEST,
            ApiError::NotFound(_) => NOT_FOUND,
            ApiError::Internal(_) => INTERNAL,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let category = self.category();
        let message = match self {
            ApiError::BadRequest(m) | ApiError::NotFound(m) => m,
            ApiError::Internal(e) => {
                error!(error = ?e, "request failed");
                "Internal server error".to_string()
            }
        };
        (category.status, Json(ErrorBody::new(category, message))).into_response()
    }
}
