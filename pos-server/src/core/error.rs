use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::StorageError;
use crate::sales::SaleError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("验证错误: {0}")]
    Validation(String),

    #[error("冲突: {message}")]
    Conflict {
        message: String,
        /// Structured shortfall for the front end (offending product,
        /// available vs requested)
        details: Option<serde_json::Value>,
    },

    #[error("内部服务器错误")]
    Internal(#[from] anyhow::Error),
}

impl From<SaleError> for ServerError {
    fn from(err: SaleError) -> Self {
        let message = err.to_string();
        match err {
            SaleError::ProductNotFound(_)
            | SaleError::TableNotFound(_)
            | SaleError::LineItemNotFound(_) => ServerError::NotFound(message),
            SaleError::InvalidLineItem(_)
            | SaleError::EmptySale
            | SaleError::InvalidPayment(_)
            | SaleError::PaymentMismatch { .. } => ServerError::Validation(message),
            SaleError::InsufficientStock {
                product_id,
                available,
                requested,
            } => ServerError::Conflict {
                message,
                details: Some(serde_json::json!({
                    "product_id": product_id,
                    "available": available,
                    "requested": requested,
                })),
            },
            SaleError::ProductVanished(product_id) => ServerError::Conflict {
                message,
                details: Some(serde_json::json!({ "product_id": product_id })),
            },
            SaleError::TableNotEmpty(_) | SaleError::CommitConflict { .. } => {
                ServerError::Conflict {
                    message,
                    details: None,
                }
            }
            SaleError::StorageUnavailable(e) => ServerError::Internal(e.into()),
        }
    }
}

impl From<StorageError> for ServerError {
    fn from(err: StorageError) -> Self {
        ServerError::Internal(err.into())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ServerError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg, None)
            }
            ServerError::Conflict { message, details } => {
                (StatusCode::CONFLICT, "conflict", message, details)
            }
            ServerError::Internal(err) => {
                // 记录内部错误但不暴露详细信息
                tracing::error!(error = ?err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// 处理器的 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
