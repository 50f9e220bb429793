//! 订单生命周期集成测试
//!
//! 内存数据库 + 桩预订网关，覆盖堂食校验、状态流转和幂等支付标记。

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use shared::auth::{CurrentUser, Role};
use shared::client::ClientError;
use shared::error::AppError;
use shared::models::{OrderStatus, OrderType, ReservationStatus, ReservationView};
use shared::response::ApiResponse;

use order_server::db;
use order_server::db::repository::OrderRepository;
use order_server::orders::{CreateOrder, CreateOrderItem, OrderService};
use order_server::verify::{BookingGateway, BookingVerifier};

/// 可变状态的桩网关：测试中途翻转预订状态，模拟取消与下单交错
struct StubGateway {
    reservation: Mutex<Option<ReservationView>>,
}

impl StubGateway {
    fn with_reservation(reservation: ReservationView) -> Arc<Self> {
        Arc::new(Self {
            reservation: Mutex::new(Some(reservation)),
        })
    }

    fn set_status(&self, status: ReservationStatus) {
        if let Some(r) = self.reservation.lock().unwrap().as_mut() {
            r.status = status;
        }
    }
}

#[async_trait]
impl BookingGateway for StubGateway {
    async fn fetch_reservation(
        &self,
        _reservation_id: &str,
        _bearer: &str,
    ) -> Result<ApiResponse<ReservationView>, ClientError> {
        match self.reservation.lock().unwrap().clone() {
            Some(r) => Ok(ApiResponse::ok(r)),
            None => Err(ClientError::Status {
                status: http::StatusCode::NOT_FOUND,
                body: String::new(),
            }),
        }
    }
}

fn customer(id: i64) -> CurrentUser {
    CurrentUser {
        id,
        email: format!("customer{}@example.com", id),
        role: Role::Customer,
    }
}

fn staff() -> CurrentUser {
    CurrentUser {
        id: 900,
        email: "owner@example.com".into(),
        role: Role::RestaurantOwner,
    }
}

fn confirmed_reservation(customer_id: i64, restaurant_id: i64) -> ReservationView {
    ReservationView {
        id: "reservation:r1".into(),
        customer_id,
        restaurant_id,
        table_id: Some(1),
        start_at: Utc::now(),
        end_at: Utc::now(),
        party_size: 2,
        status: ReservationStatus::Confirmed,
    }
}

async fn service_with_gateway(gateway: Arc<StubGateway>) -> OrderService {
    let db = db::connect_memory().await.unwrap();
    let repo = OrderRepository::new(db);
    OrderService::new(repo, BookingVerifier::new(gateway))
}

fn dine_in_request(restaurant_id: i64) -> CreateOrder {
    CreateOrder {
        restaurant_id,
        order_type: OrderType::DineIn,
        reservation_id: Some("reservation:r1".into()),
        items: vec![
            CreateOrderItem {
                menu_item_id: 1,
                name: "Margherita".into(),
                unit_price: 8.50,
                quantity: 2,
                special_requests: None,
            },
            CreateOrderItem {
                menu_item_id: 2,
                name: "Tiramisù".into(),
                unit_price: 5.25,
                quantity: 1,
                special_requests: Some("no cocoa".into()),
            },
        ],
    }
}

#[tokio::test]
async fn dine_in_with_confirmed_reservation_succeeds() {
    let gateway = StubGateway::with_reservation(confirmed_reservation(1, 10));
    let service = service_with_gateway(gateway).await;

    let order = service
        .create(&customer(1), dine_in_request(10), "token")
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert!(!order.paid);
    assert_eq!(order.reservation_id.as_deref(), Some("reservation:r1"));
    // 8.50 * 2 + 5.25 = 22.25 (Decimal 计算)
    assert_eq!(order.total_amount, 22.25);
    assert_eq!(order.items[0].subtotal, 17.0);
}

#[tokio::test]
async fn dine_in_requires_reservation_id() {
    let gateway = StubGateway::with_reservation(confirmed_reservation(1, 10));
    let service = service_with_gateway(gateway).await;

    let mut req = dine_in_request(10);
    req.reservation_id = None;

    let err = service
        .create(&customer(1), req, "token")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(service.list_mine(&customer(1)).await.unwrap().is_empty());
}

#[tokio::test]
async fn dine_in_rejected_for_foreign_reservation() {
    // 预订属于客户 2，客户 1 来下单
    let gateway = StubGateway::with_reservation(confirmed_reservation(2, 10));
    let service = service_with_gateway(gateway).await;

    let err = service
        .create(&customer(1), dine_in_request(10), "token")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn dine_in_rejected_for_wrong_restaurant() {
    let gateway = StubGateway::with_reservation(confirmed_reservation(1, 11));
    let service = service_with_gateway(gateway).await;

    let err = service
        .create(&customer(1), dine_in_request(10), "token")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn dine_in_rejected_for_pending_reservation() {
    let mut reservation = confirmed_reservation(1, 10);
    reservation.status = ReservationStatus::Pending;
    let gateway = StubGateway::with_reservation(reservation);
    let service = service_with_gateway(gateway).await;

    let err = service
        .create(&customer(1), dine_in_request(10), "token")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

/// 同一个预订，第一单成功；餐厅取消预订后重试被拒绝。
/// 校验器每次都重读当前状态，不缓存。
#[tokio::test]
async fn retry_after_cancellation_is_rejected() {
    let gateway = StubGateway::with_reservation(confirmed_reservation(1, 10));
    let service = service_with_gateway(gateway.clone()).await;

    service
        .create(&customer(1), dine_in_request(10), "token")
        .await
        .unwrap();

    gateway.set_status(ReservationStatus::Cancelled);

    let err = service
        .create(&customer(1), dine_in_request(10), "token")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn takeaway_never_stores_a_reservation() {
    let gateway = StubGateway::with_reservation(confirmed_reservation(1, 10));
    let service = service_with_gateway(gateway).await;

    let mut req = dine_in_request(10);
    req.order_type = OrderType::Takeaway;
    // 即使传了 reservation_id 也不存储
    let order = service
        .create(&customer(1), req, "token")
        .await
        .unwrap();
    assert_eq!(order.reservation_id, None);
}

#[tokio::test]
async fn status_transitions_follow_whitelist() {
    let gateway = StubGateway::with_reservation(confirmed_reservation(1, 10));
    let service = service_with_gateway(gateway).await;

    let order = service
        .create(&customer(1), dine_in_request(10), "token")
        .await
        .unwrap();
    let id = order.id.as_ref().unwrap().to_string();

    // 客户不能推进状态
    let err = service
        .update_status(&customer(1), &id, OrderStatus::Preparing)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // PENDING -> PREPARING -> COMPLETED
    let preparing = service
        .update_status(&staff(), &id, OrderStatus::Preparing)
        .await
        .unwrap();
    assert_eq!(preparing.status, OrderStatus::Preparing);

    // PREPARING -> PENDING 回退被拒，错误信息点名两个状态
    let err = service
        .update_status(&staff(), &id, OrderStatus::Pending)
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("PREPARING") && msg.contains("PENDING"));

    let completed = service
        .update_status(&staff(), &id, OrderStatus::Completed)
        .await
        .unwrap();
    assert_eq!(completed.status, OrderStatus::Completed);

    // COMPLETED -> 任何状态都被拒
    for target in [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Cancelled,
    ] {
        let err = service
            .update_status(&staff(), &id, target)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }
}

#[tokio::test]
async fn mark_paid_is_idempotent() {
    let gateway = StubGateway::with_reservation(confirmed_reservation(1, 10));
    let service = service_with_gateway(gateway).await;

    let order = service
        .create(&customer(1), dine_in_request(10), "token")
        .await
        .unwrap();
    let id = order.id.as_ref().unwrap().to_string();

    let first = service.mark_paid(&id, "pi_abc123").await.unwrap();
    assert!(first.paid);
    assert_eq!(first.payment_reference.as_deref(), Some("pi_abc123"));

    // 重复投递：同样的最终状态，引用不被覆盖，不报错
    for _ in 0..3 {
        let again = service.mark_paid(&id, "pi_other").await.unwrap();
        assert!(again.paid);
        assert_eq!(again.payment_reference.as_deref(), Some("pi_abc123"));
    }
}

/// 支付确认到达时订单已被取消 - 照样标记已支付。
/// 支付标记和履约状态是独立的两条轴。
#[tokio::test]
async fn cancelled_order_can_still_be_marked_paid() {
    let gateway = StubGateway::with_reservation(confirmed_reservation(1, 10));
    let service = service_with_gateway(gateway).await;

    let order = service
        .create(&customer(1), dine_in_request(10), "token")
        .await
        .unwrap();
    let id = order.id.as_ref().unwrap().to_string();

    service
        .update_status(&staff(), &id, OrderStatus::Cancelled)
        .await
        .unwrap();

    let paid = service.mark_paid(&id, "pi_late").await.unwrap();
    assert!(paid.paid);
    assert_eq!(paid.status, OrderStatus::Cancelled);
}
