// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::error;
use validator::ValidationErrors;

use crate::domain::models::feature_request::DomainError;
use crate::utils::errors::{ClientError, OrchestratorError, RepositoryError};

/// 应用错误类型
///
/// 封装所有可能的应用层错误，提供统一的错误处理接口
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    pub fn inner(&self) -> &anyhow::Error {
        &self.0
    }

    /// 状态码、对外错误信息和字段详情
    fn classify(&self) -> (StatusCode, String, Option<Value>) {
        if let Some(errors) = self.0.downcast_ref::<ValidationErrors>() {
            return (
                StatusCode::BAD_REQUEST,
                "validation failed".to_string(),
                serde_json::to_value(errors).ok(),
            );
        }
        if let Some(err) = self.0.downcast_ref::<RepositoryError>() {
            return repository_status(err);
        }
        if let Some(err) = self.0.downcast_ref::<DomainError>() {
            return domain_status(err);
        }
        if let Some(err) = self.0.downcast_ref::<OrchestratorError>() {
            return match err {
                OrchestratorError::Busy => (StatusCode::CONFLICT, err.to_string(), None),
                OrchestratorError::InvalidConfig(_) => {
                    (StatusCode::BAD_REQUEST, err.to_string(), None)
                }
                OrchestratorError::Repository(inner) => repository_status(inner),
                OrchestratorError::Domain(inner) => domain_status(inner),
                OrchestratorError::Client(inner) => client_status(inner),
            };
        }
        if let Some(err) = self.0.downcast_ref::<ClientError>() {
            return client_status(err);
        }
        internal()
    }
}

fn internal() -> (StatusCode, String, Option<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal server error".to_string(),
        None,
    )
}

fn repository_status(err: &RepositoryError) -> (StatusCode, String, Option<Value>) {
    match err {
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "resource not found".to_string(), None),
        RepositoryError::AlreadyExists(_) => (StatusCode::CONFLICT, err.to_string(), None),
        RepositoryError::Unavailable(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "storage unavailable".to_string(),
            None,
        ),
        RepositoryError::Database(_) => internal(),
    }
}

fn domain_status(err: &DomainError) -> (StatusCode, String, Option<Value>) {
    match err {
        DomainError::InvalidStateTransition { .. } => (StatusCode::CONFLICT, err.to_string(), None),
        DomainError::ValidationError(_) => (StatusCode::BAD_REQUEST, err.to_string(), None),
    }
}

fn client_status(err: &ClientError) -> (StatusCode, String, Option<Value>) {
    match err {
        ClientError::NotConfigured(_) => (StatusCode::SERVICE_UNAVAILABLE, err.to_string(), None),
        ClientError::InvalidInput(_) => (StatusCode::BAD_REQUEST, err.to_string(), None),
        _ => internal(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = self.classify();
        if status.is_server_error() {
            error!("Request failed: {:#}", self.0);
        }

        let mut body = json!({ "success": false, "error": message });
        if let Some(details) = details {
            body["details"] = details;
        }
        (status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
