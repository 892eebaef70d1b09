use std::collections::BTreeMap;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde_json::json;
use tracing::{debug, error};

use shelf_dal::validation::TAKEN;

pub type ApiResult<T, E = ApiError> = std::result::Result<T, E>;

/// Attribute name to ordered list of violation messages
pub type ValidationErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// First offending query parameter as `key=value`
    #[error("Invalid query parameter: {0}")]
    InvalidQuery(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unprocessable request: {0:?}")]
    UnprocessableRequest(ValidationErrors),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidQuery(_) | ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::UnprocessableRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::InvalidQuery(param) | ApiError::InvalidRequest(param) => {
                debug!("Rejected request parameter {param}");
                json!({"error": {"invalid_params": param}})
            }
            ApiError::UnprocessableRequest(errors) => {
                json!({"error": {"invalid_params": errors}})
            }
            ApiError::ResourceNotFound(what) => {
                json!({"error": {"message": format!("{what} not found")}})
            }
            ApiError::Unauthorized(msg) | ApiError::Forbidden(msg) => {
                json!({"error": {"message": msg}})
            }
            ApiError::InternalError(msg) => {
                error!("Internal error: {msg}");
                json!({"error": {"message": "Internal server error"}})
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<shelf_dal::Error> for ApiError {
    fn from(value: shelf_dal::Error) -> Self {
        match value {
            shelf_dal::Error::RecordNotFound(what) => ApiError::ResourceNotFound(what),
            shelf_dal::Error::InvalidOrderByField(field) => {
                ApiError::InvalidQuery(format!("sort={field}"))
            }
            shelf_dal::Error::InvalidFilterField(field) => {
                ApiError::InvalidQuery(format!("q={field}"))
            }
            shelf_dal::Error::Conflict { field } => {
                let mut errors = ValidationErrors::new();
                errors.insert(field.to_string(), vec![TAKEN.to_string()]);
                ApiError::UnprocessableRequest(errors)
            }
            shelf_dal::Error::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or password".to_string())
            }
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl From<garde::Report> for ApiError {
    fn from(report: garde::Report) -> Self {
        let mut errors = ValidationErrors::new();
        for (path, error) in report.iter() {
            errors
                .entry(path.to_string())
                .or_default()
                .push(error.message().to_string());
        }
        ApiError::UnprocessableRequest(errors)
    }
}

impl From<shelf_auth::Error> for ApiError {
    fn from(value: shelf_auth::Error) -> Self {
        ApiError::InternalError(format!("Token error: {value}"))
    }
}
