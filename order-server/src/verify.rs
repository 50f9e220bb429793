//! Booking Verifier
//!
//! 堂食订单唯一的防线：确认客户声称的预订真实存在、属于本人、
//! 对应同一家餐厅、且处于 CONFIRMED 状态。
//!
//! 校验通过转发调用方的 Bearer 令牌调预订服务的读取端点完成，
//! 不使用服务间凭证 - 预订服务自己的所有权检查同时生效。
//! 每次校验都重新读取当前状态，绝不缓存：
//! 取消和下单可能任意交错。
//!
//! 任何失败 (网络错误、非 2xx、四项检查任一不过) 都是硬拒绝，
//! 订单不落库 (fail closed)。

use std::sync::Arc;

use async_trait::async_trait;
use shared::client::{CallPolicy, ClientError, ServiceClient};
use shared::error::AppError;
use shared::models::{ReservationStatus, ReservationView};
use shared::response::ApiResponse;

/// 预订服务读取端点的抽象，测试用桩实现替换
#[async_trait]
pub trait BookingGateway: Send + Sync {
    /// Fetch a reservation with the caller's forwarded bearer token
    async fn fetch_reservation(
        &self,
        reservation_id: &str,
        bearer: &str,
    ) -> Result<ApiResponse<ReservationView>, ClientError>;
}

/// 生产实现：调用预订服务
pub struct HttpBookingGateway {
    client: ServiceClient,
}

impl HttpBookingGateway {
    pub fn new(base_url: impl Into<String>, policy: CallPolicy) -> Self {
        Self {
            client: ServiceClient::new(base_url, policy),
        }
    }
}

#[async_trait]
impl BookingGateway for HttpBookingGateway {
    async fn fetch_reservation(
        &self,
        reservation_id: &str,
        bearer: &str,
    ) -> Result<ApiResponse<ReservationView>, ClientError> {
        self.client
            .get_json(
                &format!("/api/reservations/{}", reservation_id),
                Some(bearer),
            )
            .await
    }
}

/// 预订校验器
#[derive(Clone)]
pub struct BookingVerifier {
    gateway: Arc<dyn BookingGateway>,
}

impl BookingVerifier {
    pub fn new(gateway: Arc<dyn BookingGateway>) -> Self {
        Self { gateway }
    }

    /// 按顺序校验：存在 → 本人 → 同餐厅 → CONFIRMED
    ///
    /// 失败返回 [`AppError::Forbidden`] 和人类可读的原因；
    /// 上游不可达也按拒绝处理 (fail closed)。
    pub async fn verify(
        &self,
        reservation_id: &str,
        customer_id: i64,
        restaurant_id: i64,
        bearer: &str,
    ) -> Result<ReservationView, AppError> {
        let response = match self.gateway.fetch_reservation(reservation_id, bearer).await {
            Ok(response) => response,
            Err(ClientError::Status { status, .. }) if status.is_client_error() => {
                return Err(AppError::forbidden(format!(
                    "Reservation {} not found or not accessible",
                    reservation_id
                )));
            }
            Err(e) => {
                tracing::warn!(
                    reservation_id,
                    error = %e,
                    "Booking service unreachable, rejecting dine-in order"
                );
                return Err(AppError::forbidden(
                    "Reservation could not be verified: booking service unavailable",
                ));
            }
        };

        if !response.is_success() {
            return Err(AppError::forbidden(format!(
                "Reservation {} not found",
                reservation_id
            )));
        }
        let reservation = response.data.ok_or_else(|| {
            AppError::forbidden(format!("Reservation {} not found", reservation_id))
        })?;

        if reservation.customer_id != customer_id {
            return Err(AppError::forbidden(
                "Reservation belongs to another customer",
            ));
        }

        if reservation.restaurant_id != restaurant_id {
            return Err(AppError::forbidden(
                "Reservation is for a different restaurant",
            ));
        }

        if reservation.status != ReservationStatus::Confirmed {
            return Err(AppError::forbidden(format!(
                "Reservation is not confirmed (status: {})",
                reservation.status
            )));
        }

        Ok(reservation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    /// 可编程的桩网关
    struct StubGateway {
        result: StubResult,
    }

    enum StubResult {
        Reservation(ReservationView),
        NotFound,
        Unavailable,
    }

    #[async_trait]
    impl BookingGateway for StubGateway {
        async fn fetch_reservation(
            &self,
            _reservation_id: &str,
            _bearer: &str,
        ) -> Result<ApiResponse<ReservationView>, ClientError> {
            match &self.result {
                StubResult::Reservation(r) => Ok(ApiResponse::ok(r.clone())),
                StubResult::NotFound => Err(ClientError::Status {
                    status: http::StatusCode::NOT_FOUND,
                    body: String::new(),
                }),
                StubResult::Unavailable => Err(ClientError::Timeout("deadline exceeded".into())),
            }
        }
    }

    fn reservation(customer_id: i64, restaurant_id: i64, status: ReservationStatus) -> ReservationView {
        ReservationView {
            id: "reservation:r1".into(),
            customer_id,
            restaurant_id,
            table_id: Some(1),
            start_at: Utc::now(),
            end_at: Utc::now(),
            party_size: 2,
            status,
        }
    }

    fn verifier(result: StubResult) -> BookingVerifier {
        BookingVerifier::new(Arc::new(StubGateway { result }))
    }

    #[tokio::test]
    async fn accepts_confirmed_own_reservation() {
        let v = verifier(StubResult::Reservation(reservation(
            1,
            10,
            ReservationStatus::Confirmed,
        )));
        assert!(v.verify("reservation:r1", 1, 10, "token").await.is_ok());
    }

    #[tokio::test]
    async fn rejects_foreign_customer() {
        let v = verifier(StubResult::Reservation(reservation(
            2,
            10,
            ReservationStatus::Confirmed,
        )));
        let err = v.verify("reservation:r1", 1, 10, "token").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn rejects_wrong_restaurant() {
        let v = verifier(StubResult::Reservation(reservation(
            1,
            11,
            ReservationStatus::Confirmed,
        )));
        let err = v.verify("reservation:r1", 1, 10, "token").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn rejects_unconfirmed_status() {
        for status in [
            ReservationStatus::Pending,
            ReservationStatus::Cancelled,
            ReservationStatus::Completed,
            ReservationStatus::NoShow,
        ] {
            let v = verifier(StubResult::Reservation(reservation(1, 10, status)));
            let err = v.verify("reservation:r1", 1, 10, "token").await.unwrap_err();
            assert!(matches!(err, AppError::Forbidden(_)));
        }
    }

    #[tokio::test]
    async fn rejects_missing_reservation() {
        let v = verifier(StubResult::NotFound);
        let err = v.verify("reservation:r1", 1, 10, "token").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn upstream_failure_fails_closed() {
        let v = verifier(StubResult::Unavailable);
        let err = v.verify("reservation:r1", 1, 10, "token").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
