//! Payment Settlement Bridge
//!
//! 支付记录迁移到 PAID 之后，向订单服务的内部 mark-paid 端点
//! 发一次通知。尽力而为 (fail open)：
//!
//! - 通知失败只记日志，不回滚支付的 PAID 状态 - 钱已经收了，
//!   拒绝不是可选项
//! - 订单侧 mark-paid 幂等，所以有限重试 / 人工重投是安全的
//! - 反方向没有回调 (订单服务不查支付服务)，对账是已知的缺口

use std::sync::Arc;

use async_trait::async_trait;
use shared::client::{CallPolicy, ClientError, ServiceClient};
use shared::models::{INTERNAL_TOKEN_HEADER, MarkPaidRequest};
use shared::response::ApiResponse;

/// 订单服务通知的抽象，测试用桩实现替换
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    /// Notify the order service that an order has been paid
    async fn notify_paid(&self, order_id: &str, payment_reference: &str)
    -> Result<(), ClientError>;
}

/// 生产实现：调用订单服务的内部端点，静态共享密钥认证
pub struct HttpOrderNotifier {
    client: ServiceClient,
    internal_secret: String,
}

impl HttpOrderNotifier {
    pub fn new(
        base_url: impl Into<String>,
        internal_secret: impl Into<String>,
        policy: CallPolicy,
    ) -> Self {
        Self {
            client: ServiceClient::new(base_url, policy),
            internal_secret: internal_secret.into(),
        }
    }
}

#[async_trait]
impl OrderNotifier for HttpOrderNotifier {
    async fn notify_paid(
        &self,
        order_id: &str,
        payment_reference: &str,
    ) -> Result<(), ClientError> {
        let _: ApiResponse<serde_json::Value> = self
            .client
            .post_json(
                &format!("/internal/orders/{}/paid", order_id),
                &MarkPaidRequest {
                    payment_reference: payment_reference.to_string(),
                },
                &[(INTERNAL_TOKEN_HEADER, self.internal_secret.as_str())],
            )
            .await?;
        Ok(())
    }
}

/// 结算桥
#[derive(Clone)]
pub struct SettlementBridge {
    notifier: Arc<dyn OrderNotifier>,
}

impl SettlementBridge {
    pub fn new(notifier: Arc<dyn OrderNotifier>) -> Self {
        Self { notifier }
    }

    /// 把确认的支付回传到订单服务
    ///
    /// 失败记日志后吞掉；调用方不需要也不应该根据结果回滚支付。
    pub async fn settle(&self, order_id: &str, payment_reference: &str) {
        match self.notifier.notify_paid(order_id, payment_reference).await {
            Ok(()) => {
                tracing::info!(order_id, payment_reference, "Order marked as paid");
            }
            Err(e) => {
                tracing::error!(
                    order_id,
                    payment_reference,
                    error = %e,
                    "Failed to notify order service of settlement; payment stays PAID"
                );
            }
        }
    }
}
