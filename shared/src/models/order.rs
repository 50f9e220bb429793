//! Order wire types

use serde::{Deserialize, Serialize};
use std::fmt;

/// 订单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Completed,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// 订单类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    DineIn,
    Takeaway,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderType::DineIn => "DINE_IN",
            OrderType::Takeaway => "TAKEAWAY",
        };
        f.write_str(s)
    }
}

/// 内部端点共享密钥头 (结算桥 → 订单服务)
pub const INTERNAL_TOKEN_HEADER: &str = "X-Internal-Token";

/// 内部标记已支付请求 - 结算桥 → 订单服务
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkPaidRequest {
    /// 支付服务侧的支付引用 (provider reference)
    pub payment_reference: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_matches_platform_convention() {
        assert_eq!(
            serde_json::to_string(&OrderType::DineIn).unwrap(),
            "\"DINE_IN\""
        );
        let req = MarkPaidRequest {
            payment_reference: "pi_123".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"paymentReference":"pi_123"}"#
        );
    }
}
