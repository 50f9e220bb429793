//! Order Lifecycle
//!
//! 订单的组成和状态流转。状态机：
//!
//! ```text
//! PENDING ──(staff)──> PREPARING ──(staff)──> COMPLETED
//!    │                     │
//!    └──────(staff)────────┴──> CANCELLED
//! ```
//!
//! 支付标记 (`paid`) 不在状态机里：它由结算桥通过内部端点设置，
//! 与履约状态互相独立。

use chrono::Utc;
use shared::auth::{Capability, CurrentUser};
use shared::error::{AppError, AppResult};
use shared::models::{OrderStatus, OrderType};

use crate::db::models::{Order, OrderItem};
use crate::db::repository::OrderRepository;
use crate::money;
use crate::verify::BookingVerifier;

/// 状态迁移白名单 - 不在表里的迁移一律拒绝
const ALLOWED_TRANSITIONS: &[(OrderStatus, OrderStatus)] = &[
    (OrderStatus::Pending, OrderStatus::Preparing),
    (OrderStatus::Pending, OrderStatus::Cancelled),
    (OrderStatus::Preparing, OrderStatus::Completed),
    (OrderStatus::Preparing, OrderStatus::Cancelled),
];

/// 订单状态迁移是否合法
pub fn transition_allowed(from: OrderStatus, to: OrderStatus) -> bool {
    ALLOWED_TRANSITIONS.contains(&(from, to))
}

/// 创建订单的行项目输入
#[derive(Debug, Clone)]
pub struct CreateOrderItem {
    pub menu_item_id: i64,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i32,
    pub special_requests: Option<String>,
}

/// 创建订单的服务层输入
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub restaurant_id: i64,
    pub order_type: OrderType,
    /// 堂食必填；外带即使传了也不会存储
    pub reservation_id: Option<String>,
    pub items: Vec<CreateOrderItem>,
}

/// 订单生命周期服务
#[derive(Clone)]
pub struct OrderService {
    repo: OrderRepository,
    verifier: BookingVerifier,
}

impl OrderService {
    pub fn new(repo: OrderRepository, verifier: BookingVerifier) -> Self {
        Self { repo, verifier }
    }

    /// 创建订单
    ///
    /// 堂食订单必须先通过预订校验 (存在 → 本人 → 同餐厅 → 已确认)，
    /// 校验失败订单不落库。金额用 Decimal 计算后落库。
    pub async fn create(
        &self,
        user: &CurrentUser,
        req: CreateOrder,
        bearer: &str,
    ) -> AppResult<Order> {
        if req.items.is_empty() {
            return Err(AppError::validation("Order must contain at least one item"));
        }
        for item in &req.items {
            money::validate_item(&item.name, item.unit_price, item.quantity)?;
        }

        // 堂食订单的预订校验；外带订单不关联预订
        let reservation_id = match req.order_type {
            OrderType::DineIn => {
                let reservation_id = req.reservation_id.as_deref().ok_or_else(|| {
                    AppError::validation("A reservation is required for dine-in orders")
                })?;
                self.verifier
                    .verify(reservation_id, user.id, req.restaurant_id, bearer)
                    .await?;
                Some(reservation_id.to_string())
            }
            OrderType::Takeaway => None,
        };

        let items: Vec<OrderItem> = req
            .items
            .iter()
            .map(|item| OrderItem {
                menu_item_id: item.menu_item_id,
                name: item.name.clone(),
                unit_price: item.unit_price,
                quantity: item.quantity,
                special_requests: item.special_requests.clone(),
                subtotal: money::line_subtotal(item.unit_price, item.quantity),
            })
            .collect();
        let total_amount =
            money::order_total(items.iter().map(|i| (i.unit_price, i.quantity)));

        let now = Utc::now().timestamp_millis();
        let order = Order {
            id: None,
            customer_id: user.id,
            restaurant_id: req.restaurant_id,
            reservation_id,
            order_type: req.order_type,
            status: OrderStatus::Pending,
            paid: false,
            payment_reference: None,
            items,
            total_amount,
            created_at: now,
            updated_at: now,
        };

        let created = self.repo.create(order).await?;
        tracing::info!(
            customer_id = user.id,
            restaurant_id = created.restaurant_id,
            order_type = %created.order_type,
            total = created.total_amount,
            "Order created"
        );
        Ok(created)
    }

    /// 读取单个订单 - 本人或员工/管理员
    pub async fn get(&self, user: &CurrentUser, id: &str) -> AppResult<Order> {
        let order = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;

        if order.customer_id != user.id && !user.role.can(Capability::ReadAnyOrder) {
            return Err(AppError::forbidden("Not allowed to read this order"));
        }

        Ok(order)
    }

    /// 我的订单列表
    pub async fn list_mine(&self, user: &CurrentUser) -> AppResult<Vec<Order>> {
        Ok(self.repo.find_by_customer(user.id).await?)
    }

    /// 餐厅订单列表 (员工看板)
    pub async fn list_for_restaurant(
        &self,
        user: &CurrentUser,
        restaurant_id: i64,
        status: Option<OrderStatus>,
    ) -> AppResult<Vec<Order>> {
        if !user.role.can(Capability::ListRestaurantOrders) {
            return Err(AppError::forbidden("Not allowed to list restaurant orders"));
        }
        Ok(self.repo.find_by_restaurant(restaurant_id, status).await?)
    }

    /// 推进订单状态 - 仅员工，走迁移白名单
    pub async fn update_status(
        &self,
        user: &CurrentUser,
        id: &str,
        new_status: OrderStatus,
    ) -> AppResult<Order> {
        if !user.role.can(Capability::UpdateOrderStatus) {
            return Err(AppError::forbidden("Only restaurant staff may update order status"));
        }

        let order = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;

        if !transition_allowed(order.status, new_status) {
            return Err(AppError::invalid_transition(
                order.status.to_string(),
                new_status.to_string(),
            ));
        }

        let record_id = order
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Loaded order has no id"))?;
        Ok(self
            .repo
            .set_status(&record_id, new_status, Utc::now().timestamp_millis())
            .await?)
    }

    /// 标记订单已支付 - 结算桥的唯一入口，幂等
    ///
    /// 已支付的订单原样返回 (at-least-once 投递安全)；
    /// 不看履约状态 - 已取消的订单照样标记，钱已经收了。
    pub async fn mark_paid(&self, id: &str, payment_reference: &str) -> AppResult<Order> {
        let order = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;

        if order.paid {
            tracing::info!(order = id, "Order already paid, skipping");
            return Ok(order);
        }

        let record_id = order
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Loaded order has no id"))?;
        let paid = self
            .repo
            .mark_paid(
                &record_id,
                payment_reference.to_string(),
                Utc::now().timestamp_millis(),
            )
            .await?;

        tracing::info!(order = id, payment_reference, "Order marked as paid");
        Ok(paid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_whitelist() {
        use OrderStatus::*;

        assert!(transition_allowed(Pending, Preparing));
        assert!(transition_allowed(Preparing, Completed));
        assert!(transition_allowed(Pending, Cancelled));
        assert!(transition_allowed(Preparing, Cancelled));

        // 不允许回退
        assert!(!transition_allowed(Preparing, Pending));
        // 终态不再迁移
        assert!(!transition_allowed(Completed, Pending));
        assert!(!transition_allowed(Completed, Preparing));
        assert!(!transition_allowed(Completed, Cancelled));
        assert!(!transition_allowed(Cancelled, Pending));
        assert!(!transition_allowed(Cancelled, Preparing));
        // 不能跳过制作直接完成
        assert!(!transition_allowed(Pending, Completed));
    }
}
