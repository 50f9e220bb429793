//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`reservations`] - 预订接口 (读取端点同时服务订单服务的预订校验)

pub mod health;
pub mod reservations;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// 组装完整路由
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(reservations::router(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
