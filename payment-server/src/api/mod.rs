//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`payments`] - 支付接口 (用户令牌认证)

pub mod health;
pub mod payments;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// 组装完整路由
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(payments::router(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
