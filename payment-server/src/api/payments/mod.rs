//! Payment API 模块
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/payments | POST | 创建支付 (结账发起) |
//! | /api/payments/my | GET | 我的支付记录 |
//! | /api/payments/{id} | GET | 读取支付 |
//! | /api/payments/{id}/confirm | POST | 网关确认成功 → PAID + 结算桥 |
//! | /api/payments/{id}/fail | POST | 网关确认失败 → FAILED |
//! | /api/payments/{id}/refund | POST | 退款 → REFUNDED |
//!
//! 全部路由要求 Bearer 令牌。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/payments", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/my", get(handler::list_mine))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/confirm", post(handler::confirm))
        .route("/{id}/fail", post(handler::fail))
        .route("/{id}/refund", post(handler::refund))
        .layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            shared::auth::require_auth,
        ))
}
