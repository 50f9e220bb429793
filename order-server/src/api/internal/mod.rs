//! 内部接口 - 结算桥专用
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /internal/orders/{id}/paid | POST | 标记订单已支付 (幂等) |
//!
//! 认证用 `X-Internal-Token` 静态共享密钥头。这是服务网络内的
//! 弱信任边界 (比用户令牌弱)，只对支付服务开放。

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use http::HeaderMap;
use shared::error::{AppError, AppResult};
use shared::models::{INTERNAL_TOKEN_HEADER, MarkPaidRequest};
use shared::response::{self, ApiResponse};
use shared::security_log;

use crate::core::ServerState;
use crate::db::models::Order;

pub fn router() -> Router<ServerState> {
    Router::new().route("/internal/orders/{id}/paid", post(mark_paid))
}

/// POST /internal/orders/{id}/paid - 标记订单已支付
///
/// 幂等：重复投递返回当前订单，不报错。
pub async fn mark_paid(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<MarkPaidRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let token = headers
        .get(INTERNAL_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok());

    if token != Some(state.config.internal_shared_secret.as_str()) {
        security_log!(
            "WARN",
            "internal_token_rejected",
            order = id.clone()
        );
        return Err(AppError::unauthorized());
    }

    let order = state
        .orders
        .mark_paid(&id, &payload.payment_reference)
        .await?;
    Ok(response::ok(order))
}
