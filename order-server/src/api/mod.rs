//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 订单接口 (用户令牌认证)
//! - [`internal`] - 内部接口 (静态共享密钥认证，仅结算桥使用)

pub mod health;
pub mod internal;
pub mod orders;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// 组装完整路由
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(orders::router(&state))
        .merge(internal::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
