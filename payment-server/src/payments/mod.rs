//! Payment Lifecycle
//!
//! 支付记录的创建和状态流转。状态机：
//!
//! ```text
//! PENDING ──(provider confirms)──> PAID ──(refund)──> REFUNDED
//!    │
//!    └──(provider declines)──> FAILED
//! ```
//!
//! 状态迁移走仓库层的条件更新：前置状态不满足直接落空，
//! 所以 PENDING → PAID 最多成功一次，结算桥也只会被触发一次。
//! 与外部支付网关的真实交互 (建立 session、webhook 验签) 在本服务之外；
//! 这里只消费确认结果。

use chrono::Utc;
use rust_decimal::prelude::*;
use shared::auth::{Capability, CurrentUser};
use shared::error::{AppError, AppResult};
use shared::models::{PaymentMethod, PaymentStatus};
use uuid::Uuid;

use crate::db::models::Payment;
use crate::db::repository::PaymentRepository;
use crate::settlement::SettlementBridge;

/// Maximum allowed payment amount (€1,000,000)
const MAX_AMOUNT: f64 = 1_000_000.0;

/// 创建支付的服务层输入
#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub order_id: String,
    pub amount: f64,
    pub currency: String,
    pub method: PaymentMethod,
}

/// 支付生命周期服务
#[derive(Clone)]
pub struct PaymentService {
    repo: PaymentRepository,
    bridge: SettlementBridge,
}

impl PaymentService {
    pub fn new(repo: PaymentRepository, bridge: SettlementBridge) -> Self {
        Self { repo, bridge }
    }

    /// 创建支付记录 (结账发起)
    ///
    /// 卡支付在这里生成网关 session 引用；货到付款没有网关参与。
    /// 新记录始终是 PENDING。
    pub async fn create(&self, user: &CurrentUser, req: CreatePayment) -> AppResult<Payment> {
        if !req.amount.is_finite() || req.amount <= 0.0 {
            return Err(AppError::validation(format!(
                "Payment amount must be positive, got {}",
                req.amount
            )));
        }
        if req.amount > MAX_AMOUNT {
            return Err(AppError::validation(format!(
                "Payment amount exceeds maximum allowed ({})",
                MAX_AMOUNT
            )));
        }
        if req.order_id.is_empty() {
            return Err(AppError::validation("Order id is required"));
        }
        if req.currency.len() != 3 {
            return Err(AppError::validation(format!(
                "Currency must be an ISO 4217 code, got '{}'",
                req.currency
            )));
        }

        // 金额归一到 2 位小数 (half-up)，避免 f64 噪声进入账面
        let amount = Decimal::from_f64(req.amount)
            .unwrap_or(Decimal::ZERO)
            .round_dp(2)
            .to_f64()
            .unwrap_or(0.0);

        let provider_reference = match req.method {
            PaymentMethod::Card => Some(format!("pi_{}", Uuid::new_v4().simple())),
            PaymentMethod::CashOnDelivery => None,
        };

        let now = Utc::now().timestamp_millis();
        let payment = Payment {
            id: None,
            customer_id: user.id,
            customer_email: user.email.clone(),
            order_id: req.order_id,
            amount,
            currency: req.currency.to_uppercase(),
            method: req.method,
            status: PaymentStatus::Pending,
            provider_reference,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        };

        let created = self.repo.create(payment).await?;
        tracing::info!(
            customer_id = user.id,
            order_id = %created.order_id,
            amount = created.amount,
            method = %created.method,
            "Payment created"
        );
        Ok(created)
    }

    /// 网关确认成功：PENDING → PAID，然后触发结算桥
    ///
    /// 条件更新保证恰好一个确认者赢；重复确认报状态错误。
    /// 结算桥尽力而为，通知失败不影响支付状态。
    pub async fn confirm(
        &self,
        user: &CurrentUser,
        id: &str,
        provider_reference: Option<String>,
    ) -> AppResult<Payment> {
        let payment = self.get(user, id).await?;
        let record_id = payment
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Loaded payment has no id"))?;

        // 卡支付沿用创建时的 session 引用；货到付款生成收款回执号
        let reference = provider_reference
            .or_else(|| payment.provider_reference.clone())
            .unwrap_or_else(|| format!("cash_{}", Uuid::new_v4().simple()));

        let confirmed = self
            .repo
            .confirm_paid(&record_id, reference, Utc::now().timestamp_millis())
            .await?
            .ok_or_else(|| {
                AppError::invalid_transition(
                    payment.status.to_string(),
                    PaymentStatus::Paid.to_string(),
                )
            })?;

        // PAID 已落库，money is in the till - 结算回传尽力而为
        let reference = confirmed
            .provider_reference
            .clone()
            .unwrap_or_default();
        self.bridge.settle(&confirmed.order_id, &reference).await;

        Ok(confirmed)
    }

    /// 网关确认失败：PENDING → FAILED，不触发结算桥
    pub async fn fail(&self, user: &CurrentUser, id: &str, reason: String) -> AppResult<Payment> {
        let payment = self.get(user, id).await?;
        let record_id = payment
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Loaded payment has no id"))?;

        self.repo
            .mark_failed(&record_id, reason, Utc::now().timestamp_millis())
            .await?
            .ok_or_else(|| {
                AppError::invalid_transition(
                    payment.status.to_string(),
                    PaymentStatus::Failed.to_string(),
                )
            })
    }

    /// 退款：PAID → REFUNDED - 本人或管理员
    ///
    /// 只改支付记录，不回写订单 (支付与履约独立，
    /// 取消即退款是未裁决的业务决策)。
    pub async fn refund(&self, user: &CurrentUser, id: &str) -> AppResult<Payment> {
        let payment = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Payment {} not found", id)))?;

        if payment.customer_id != user.id && !user.role.can(Capability::RefundAnyPayment) {
            return Err(AppError::forbidden("Not allowed to refund this payment"));
        }

        let record_id = payment
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Loaded payment has no id"))?;

        let refunded = self
            .repo
            .mark_refunded(&record_id, Utc::now().timestamp_millis())
            .await?
            .ok_or_else(|| {
                AppError::invalid_transition(
                    payment.status.to_string(),
                    PaymentStatus::Refunded.to_string(),
                )
            })?;

        tracing::info!(payment = id, order_id = %refunded.order_id, "Payment refunded");
        Ok(refunded)
    }

    /// 读取单个支付 - 本人或管理员
    pub async fn get(&self, user: &CurrentUser, id: &str) -> AppResult<Payment> {
        let payment = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Payment {} not found", id)))?;

        if payment.customer_id != user.id && !user.role.can(Capability::ReadAnyPayment) {
            return Err(AppError::forbidden("Not allowed to read this payment"));
        }

        Ok(payment)
    }

    /// 我的支付列表
    pub async fn list_mine(&self, user: &CurrentUser) -> AppResult<Vec<Payment>> {
        Ok(self.repo.find_by_customer(user.id).await?)
    }
}
