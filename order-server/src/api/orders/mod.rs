//! Order API 模块
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/orders | POST | 创建订单 |
//! | /api/orders/my | GET | 我的订单 |
//! | /api/orders/{id} | GET | 读取订单 |
//! | /api/orders/{id}/status | PUT | 推进订单状态 (员工) |
//! | /api/orders/restaurant/{id} | GET | 餐厅订单列表 (员工) |
//!
//! 全部路由要求 Bearer 令牌。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/orders", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/my", get(handler::list_mine))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/status", put(handler::update_status))
        .route("/restaurant/{restaurant_id}", get(handler::list_for_restaurant))
        .layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            shared::auth::require_auth,
        ))
}
