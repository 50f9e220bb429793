//! Reservation API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::auth::CurrentUser;
use shared::error::{AppError, AppResult};
use shared::models::{ReservationStatus, ReservationView};
use shared::response::{self, ApiResponse};
use validator::Validate;

use crate::core::ServerState;
use crate::reservations::{CreateReservation, UpdateReservation};

/// 创建预订请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub restaurant_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub restaurant_name: String,
    #[validate(length(max = 200))]
    pub customer_name: Option<String>,
    /// 用餐开始时间 (RFC3339)
    pub start_at: DateTime<Utc>,
    #[validate(range(min = 1, max = 50))]
    pub party_size: i32,
    #[validate(length(max = 20))]
    pub phone_number: Option<String>,
    #[validate(length(max = 1000))]
    pub special_requests: Option<String>,
}

/// 更新预订请求 - 只有出现的字段会被修改
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservationRequest {
    pub start_at: Option<DateTime<Utc>>,
    #[validate(range(min = 1, max = 50))]
    pub party_size: Option<i32>,
    #[validate(length(max = 20))]
    pub phone_number: Option<String>,
    #[validate(length(max = 1000))]
    pub special_requests: Option<String>,
    /// 状态变更 - 仅员工/管理员
    pub status: Option<ReservationStatus>,
}

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: Option<ReservationStatus>,
}

/// POST /api/reservations - 创建预订
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CreateReservationRequest>,
) -> AppResult<Json<ApiResponse<ReservationView>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let created = state
        .reservations
        .create(
            &user,
            CreateReservation {
                restaurant_id: payload.restaurant_id,
                restaurant_name: payload.restaurant_name,
                customer_name: payload.customer_name,
                start_at: payload.start_at,
                party_size: payload.party_size,
                phone_number: payload.phone_number,
                special_requests: payload.special_requests,
            },
        )
        .await?;

    Ok(response::ok(created.to_view()))
}

/// GET /api/reservations/{id} - 读取单个预订
///
/// 订单服务的预订校验器用客户转发的令牌调这个端点，
/// 每次都读当前状态，不做缓存。
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<ReservationView>>> {
    let reservation = state.reservations.get(&user, &id).await?;
    Ok(response::ok(reservation.to_view()))
}

/// GET /api/reservations/my - 我的预订列表
pub async fn list_mine(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<ReservationView>>>> {
    let reservations = state.reservations.list_mine(&user).await?;
    Ok(response::ok(
        reservations.iter().map(|r| r.to_view()).collect(),
    ))
}

/// GET /api/reservations/restaurant/{restaurant_id} - 餐厅预订列表 (员工)
pub async fn list_for_restaurant(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(restaurant_id): Path<i64>,
    Query(filter): Query<StatusFilter>,
) -> AppResult<Json<ApiResponse<Vec<ReservationView>>>> {
    let reservations = state
        .reservations
        .list_for_restaurant(&user, restaurant_id, filter.status)
        .await?;
    Ok(response::ok(
        reservations.iter().map(|r| r.to_view()).collect(),
    ))
}

/// PUT /api/reservations/{id} - 更新预订
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateReservationRequest>,
) -> AppResult<Json<ApiResponse<ReservationView>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let updated = state
        .reservations
        .update(
            &user,
            &id,
            UpdateReservation {
                start_at: payload.start_at,
                party_size: payload.party_size,
                phone_number: payload.phone_number,
                special_requests: payload.special_requests,
                status: payload.status,
            },
        )
        .await?;

    Ok(response::ok(updated.to_view()))
}

/// DELETE /api/reservations/{id} - 取消预订 (仅本人)
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<ReservationView>>> {
    let cancelled = state.reservations.cancel(&user, &id).await?;
    Ok(response::ok(cancelled.to_view()))
}
