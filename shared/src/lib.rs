//! Shared types for the Forchetta platform
//!
//! Common building blocks used by every service:
//! - [`error`] - 统一错误类型 (AppError) 和 HTTP 映射
//! - [`response`] - 统一 API 响应结构 (ApiResponse)
//! - [`auth`] - JWT 验证、角色和能力检查
//! - [`client`] - 出站 HTTP 调用 (超时 + 有限重试)
//! - [`models`] - 跨服务的数据模型和状态枚举

pub mod auth;
pub mod client;
#[cfg(feature = "db")]
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod response;

// Re-exports
pub use auth::{Capability, Claims, CurrentUser, JwtConfig, JwtError, JwtService, Role};
pub use client::{CallPolicy, ClientError, ServiceClient};
pub use error::{AppError, AppResult};
pub use response::ApiResponse;

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
