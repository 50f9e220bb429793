//! 统一错误处理
//!
//! 所有服务共用的应用级错误类型和 HTTP 映射。
//!
//! # 错误码规范
//!
//! | 前缀 | 分类 | 示例 |
//! |------|------|------|
//! | E0xxx | 通用业务错误 | E0003 资源不存在 |
//! | E1xxx | 认证错误 | E1001 未登录 |
//! | E2xxx | 权限错误 | E2001 无权限 |
//! | E4xxx | 预订/订单状态错误 | E4001 无可用桌台 |
//! | E9xxx | 系统错误 | E9002 数据库错误 |
//!
//! # 失败语义
//!
//! 上游依赖失败的降级策略由调用方决定，不在这里硬编码：
//! 分配器把 [`AppError::Upstream`] 降级为 [`AppError::Capacity`] (fail closed)，
//! 预订校验器降级为拒绝，结算桥记录日志后丢弃 (fail open)。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::response::ApiResponse;

/// 应用错误枚举
///
/// 所有核心操作返回 `Result<T, AppError>`，不抛未分类异常。
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== 认证错误 (401) ==========
    #[error("Authentication required")]
    Unauthorized,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    // ========== 权限错误 (403) ==========
    #[error("Permission denied: {0}")]
    Forbidden(String),

    // ========== 业务逻辑错误 (4xx) ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    Duplicate(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// 无可用桌台 (分配失败或存储层冲突)
    #[error("No capacity: {0}")]
    Capacity(String),

    /// 非法状态迁移，错误信息同时点名当前状态和目标状态
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    // ========== 系统错误 (5xx) ==========
    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // Authentication errors (401)
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "E1001", "Please login first".to_string())
            }
            AppError::TokenExpired => {
                (StatusCode::UNAUTHORIZED, "E1003", "Token expired".to_string())
            }
            AppError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, "E1002", msg.clone()),

            // Authorization errors (403)
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "E2001", msg.clone()),

            // Not found (404)
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.clone()),

            // Conflict (409)
            AppError::Duplicate(msg) => (StatusCode::CONFLICT, "E0004", msg.clone()),
            AppError::Capacity(msg) => (StatusCode::CONFLICT, "E4001", msg.clone()),
            AppError::InvalidTransition { .. } => {
                (StatusCode::CONFLICT, "E4002", self.to_string())
            }

            // Validation (400)
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.clone()),

            // Upstream errors (502)
            AppError::Upstream(msg) => {
                error!(target: "upstream", error = %msg, "Upstream service error");
                (
                    StatusCode::BAD_GATEWAY,
                    "E9003",
                    "Upstream service error".to_string(),
                )
            }

            // Database errors (500)
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9002",
                    "Database error".to_string(),
                )
            }

            // Internal errors (500)
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ApiResponse::<()>::error(code, message));
        (status, body).into_response()
    }
}

// ========== Helper Constructors ==========

impl AppError {
    pub fn unauthorized() -> Self {
        Self::Unauthorized
    }

    pub fn token_expired() -> Self {
        Self::TokenExpired
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::InvalidToken(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::Duplicate(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn capacity(msg: impl Into<String>) -> Self {
        Self::Capacity(msg.into())
    }

    /// 状态迁移错误，`from`/`to` 用业务状态的展示名
    pub fn invalid_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::InvalidTransition {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Application-level Result type
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_error_names_both_states() {
        let err = AppError::invalid_transition("PREPARING", "PENDING");
        let msg = err.to_string();
        assert!(msg.contains("PREPARING"));
        assert!(msg.contains("PENDING"));
    }
}
