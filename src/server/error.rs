//! Error types for the server

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::HeartIqError;

use super::form::FormError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid input: {}", join_errors(.0))]
    InvalidForm(Vec<FormError>),

    #[error("Invalid request body: {0}")]
    InvalidJson(#[from] JsonRejection),

    #[error("{0}")]
    ModelUnavailable(String),

    #[error("Prediction failed: {0}")]
    Prediction(#[from] HeartIqError),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn join_errors(errors: &[FormError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::InvalidForm(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::InvalidJson(rejection) => rejection.status(),
            ServerError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Prediction(e) => match e {
                HeartIqError::ValidationError(_)
                | HeartIqError::UnknownCategory { .. }
                | HeartIqError::SchemaMismatch(_) => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to a client; internal details only go to the log
    pub fn public_message(&self) -> String {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(detail = %self, "Internal server error");
            return "An internal error occurred".to_string();
        }
        match self {
            ServerError::Prediction(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = json!({
            "error": true,
            "message": self.public_message(),
        });
        if let ServerError::InvalidForm(errors) = &self {
            body["fields"] = json!(errors);
        }

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
