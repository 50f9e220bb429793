//! Reservation API 模块
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/reservations | POST | 创建预订 |
//! | /api/reservations/my | GET | 我的预订 |
//! | /api/reservations/{id} | GET | 读取预订 (订单服务校验也走这里) |
//! | /api/reservations/{id} | PUT | 更新预订 |
//! | /api/reservations/{id} | DELETE | 取消预订 |
//! | /api/reservations/restaurant/{id} | GET | 餐厅预订列表 (员工) |
//!
//! 全部路由要求 Bearer 令牌。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/reservations", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/my", get(handler::list_mine))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::cancel),
        )
        .route("/restaurant/{restaurant_id}", get(handler::list_for_restaurant))
        .layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            shared::auth::require_auth,
        ))
}
