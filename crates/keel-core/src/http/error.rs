//! Request-time errors.
//!
//! Handlers return [`RequestError`]. Its `IntoResponse` impl produces a JSON
//! envelope and stashes the error in the response extensions so that
//! [`dispatch_errors`](crate::http::dispatch_errors) can re-render it in the
//! negotiated format.
use std::sync::Arc;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One failed validation rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFieldError {
    pub field: String,
    pub tag: String,
    pub value: String,
    pub message: String,
}

/// Body of a validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub errors: Vec<ValidationFieldError>,
}

/// JSON error body used by every branch of the dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub status: u16,
    pub message: String,
    pub errors: Vec<ValidationFieldError>,
}

#[derive(Debug, Error)]
pub enum RequestError {
    /// Error carrying an explicit HTTP status
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    /// The requested record does not exist
    #[error("record not found")]
    RecordNotFound,

    #[error("validation failed for {} rule(s)", .0.len())]
    Validation(Vec<ValidationFieldError>),

    /// Unexpected failure; only the canonical reason is exposed to clients
    #[error("internal error: {0}")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Dispatcher branch selected for an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Unauthorized,
    NotFound,
    Validation,
    Internal,
    Other(StatusCode),
}

impl Disposition {
    pub fn status(&self) -> StatusCode {
        match self {
            Disposition::Unauthorized => StatusCode::UNAUTHORIZED,
            Disposition::NotFound => StatusCode::NOT_FOUND,
            Disposition::Validation => StatusCode::BAD_REQUEST,
            Disposition::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Disposition::Other(status) => *status,
        }
    }
}

impl RequestError {
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        RequestError::Status {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::status(StatusCode::UNAUTHORIZED, "restricted access")
    }

    pub fn not_found() -> Self {
        Self::status(StatusCode::NOT_FOUND, "not found")
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::status(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal<E>(source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        RequestError::Internal(source.into())
    }

    /// Branch of the dispatcher handling this error.
    ///
    /// An explicit status wins; a missing record maps to 404, a validation
    /// failure to 400 and anything else to 500.
    pub fn disposition(&self) -> Disposition {
        match self {
            RequestError::Status { status, .. } => match *status {
                StatusCode::UNAUTHORIZED => Disposition::Unauthorized,
                StatusCode::NOT_FOUND => Disposition::NotFound,
                StatusCode::INTERNAL_SERVER_ERROR => Disposition::Internal,
                other => Disposition::Other(other),
            },
            RequestError::RecordNotFound => Disposition::NotFound,
            RequestError::Validation(_) => Disposition::Validation,
            RequestError::Internal(_) => Disposition::Internal,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.disposition().status()
    }

    /// Message safe to show to a client
    pub fn public_message(&self) -> String {
        match self {
            RequestError::Status { message, .. } => message.clone(),
            RequestError::Internal(_) => canonical_reason(StatusCode::INTERNAL_SERVER_ERROR),
            other => other.to_string(),
        }
    }

    pub fn field_errors(&self) -> &[ValidationFieldError] {
        match self {
            RequestError::Validation(errors) => errors,
            _ => &[],
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            status: self.status_code().as_u16(),
            message: self.public_message(),
            errors: self.field_errors().to_vec(),
        }
    }
}

pub(crate) fn canonical_reason(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("Unknown").to_string()
}

/// Marker left in response extensions by a failed handler
#[derive(Debug, Clone)]
pub struct DeferredError(pub Arc<RequestError>);

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let mut response = (self.status_code(), Json(self.envelope())).into_response();
        response
            .extensions_mut()
            .insert(DeferredError(Arc::new(self)));
        response
    }
}

impl From<sqlx::Error> for RequestError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RequestError::RecordNotFound,
            other => RequestError::Internal(Box::new(other)),
        }
    }
}

impl From<validator::ValidationErrors> for RequestError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<(String, Vec<validator::ValidationError>)> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| (field.to_string(), errs.clone()))
            .collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let converted = fields
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.into_iter()
                    .map(move |err| field_error(&field, &err))
            })
            .collect();
        RequestError::Validation(converted)
    }
}

fn field_error(field: &str, err: &validator::ValidationError) -> ValidationFieldError {
    let tag = err.code.to_string();

    // Rule parameters, without the offending value itself.
    let mut params: Vec<String> = err
        .params
        .iter()
        .filter(|(name, _)| **name != "value")
        .map(|(name, value)| match value {
            serde_json::Value::String(s) => format!("{name}={s}"),
            other => format!("{name}={other}"),
        })
        .collect();
    params.sort();

    let message = match &err.message {
        Some(message) => message.to_string(),
        None => format!(
            "Key: '{field}' Error:Field validation for '{field}' failed on the '{tag}' tag"
        ),
    };

    ValidationFieldError {
        field: field.to_string(),
        tag,
        value: params.join(","),
        message,
    }
}
