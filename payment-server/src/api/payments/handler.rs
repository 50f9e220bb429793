//! Payment API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::auth::CurrentUser;
use shared::error::{AppError, AppResult};
use shared::models::PaymentMethod;
use shared::response::{self, ApiResponse};
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::Payment;
use crate::payments::CreatePayment;

/// 创建支付请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    #[validate(length(min = 1))]
    pub order_id: String,
    pub amount: f64,
    /// ISO 4217 货币码 (如 EUR)
    #[validate(length(equal = 3))]
    pub currency: String,
    pub method: PaymentMethod,
}

/// 网关确认成功请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    /// 网关侧引用，缺省沿用创建时的 session 引用
    pub provider_reference: Option<String>,
}

/// 网关确认失败请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FailPaymentRequest {
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

/// POST /api/payments - 创建支付 (结账发起)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CreatePaymentRequest>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let created = state
        .payments
        .create(
            &user,
            CreatePayment {
                order_id: payload.order_id,
                amount: payload.amount,
                currency: payload.currency,
                method: payload.method,
            },
        )
        .await?;

    Ok(response::ok(created))
}

/// GET /api/payments/{id} - 读取单个支付
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let payment = state.payments.get(&user, &id).await?;
    Ok(response::ok(payment))
}

/// GET /api/payments/my - 我的支付记录
pub async fn list_mine(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<Payment>>>> {
    let payments = state.payments.list_mine(&user).await?;
    Ok(response::ok(payments))
}

/// POST /api/payments/{id}/confirm - 网关确认成功
///
/// PENDING → PAID，然后触发结算桥 (尽力而为)。
pub async fn confirm(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ConfirmPaymentRequest>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let confirmed = state
        .payments
        .confirm(&user, &id, payload.provider_reference)
        .await?;
    Ok(response::ok(confirmed))
}

/// POST /api/payments/{id}/fail - 网关确认失败
pub async fn fail(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<FailPaymentRequest>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let failed = state.payments.fail(&user, &id, payload.reason).await?;
    Ok(response::ok(failed))
}

/// POST /api/payments/{id}/refund - 退款 (本人或管理员)
pub async fn refund(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let refunded = state.payments.refund(&user, &id).await?;
    Ok(response::ok(refunded))
}
