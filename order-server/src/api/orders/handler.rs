//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use shared::auth::{CurrentUser, JwtService};
use shared::error::{AppError, AppResult};
use shared::models::{OrderStatus, OrderType};
use shared::response::{self, ApiResponse};
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::Order;
use crate::orders::{CreateOrder, CreateOrderItem};

/// 创建订单的行项目
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub menu_item_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub unit_price: f64,
    pub quantity: i32,
    #[validate(length(max = 500))]
    pub special_requests: Option<String>,
}

/// 创建订单请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub restaurant_id: i64,
    pub order_type: OrderType,
    /// 堂食必填
    pub reservation_id: Option<String>,
    #[validate(length(min = 1), nested)]
    pub items: Vec<OrderItemRequest>,
}

/// 推进订单状态请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: Option<OrderStatus>,
}

/// POST /api/orders - 创建订单
///
/// 堂食订单把调用方的 Bearer 令牌原样转发给预订服务做校验。
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    // 转发用的原始令牌 (认证中间件已验证过存在性和有效性)
    let bearer = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(JwtService::extract_from_header)
        .ok_or_else(AppError::unauthorized)?;

    let created = state
        .orders
        .create(
            &user,
            CreateOrder {
                restaurant_id: payload.restaurant_id,
                order_type: payload.order_type,
                reservation_id: payload.reservation_id,
                items: payload
                    .items
                    .into_iter()
                    .map(|item| CreateOrderItem {
                        menu_item_id: item.menu_item_id,
                        name: item.name,
                        unit_price: item.unit_price,
                        quantity: item.quantity,
                        special_requests: item.special_requests,
                    })
                    .collect(),
            },
            bearer,
        )
        .await?;

    Ok(response::ok(created))
}

/// GET /api/orders/{id} - 读取单个订单
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state.orders.get(&user, &id).await?;
    Ok(response::ok(order))
}

/// GET /api/orders/my - 我的订单列表
pub async fn list_mine(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let orders = state.orders.list_mine(&user).await?;
    Ok(response::ok(orders))
}

/// GET /api/orders/restaurant/{restaurant_id} - 餐厅订单列表 (员工)
pub async fn list_for_restaurant(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(restaurant_id): Path<i64>,
    Query(filter): Query<StatusFilter>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let orders = state
        .orders
        .list_for_restaurant(&user, restaurant_id, filter.status)
        .await?;
    Ok(response::ok(orders))
}

/// PUT /api/orders/{id}/status - 推进订单状态 (员工)
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let updated = state.orders.update_status(&user, &id, payload.status).await?;
    Ok(response::ok(updated))
}
