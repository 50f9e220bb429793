//! Payment Model

use serde::{Deserialize, Serialize};
use shared::db::serde_helpers;
use shared::models::{PaymentMethod, PaymentStatus};
use surrealdb::RecordId;

/// Payment entity (支付记录)
///
/// 状态机：PENDING → PAID | FAILED；PAID → REFUNDED。
/// PENDING → PAID 的迁移恰好触发一次结算桥通知。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,

    /// 客户 ID (身份服务)
    pub customer_id: i64,
    /// 客户邮箱快照 (收据用)
    pub customer_email: String,

    /// 关联订单 ("order:xxx")
    pub order_id: String,

    pub amount: f64,
    /// ISO 4217 货币码
    pub currency: String,

    pub method: PaymentMethod,
    pub status: PaymentStatus,

    /// 外部支付网关的 session/intent 引用
    pub provider_reference: Option<String>,
    /// 失败原因 (status = FAILED 时)
    pub failure_reason: Option<String>,

    pub created_at: i64,
    pub updated_at: i64,
}
