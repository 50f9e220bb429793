//! Payment wire types

use serde::{Deserialize, Serialize};
use std::fmt;

/// 支付状态
///
/// PENDING → PAID 的迁移最多发生一次，并且恰好触发一次结算桥通知。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Refunded => "REFUNDED",
        };
        f.write_str(s)
    }
}

/// 支付方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// 卡支付，通过外部支付网关的 session/intent 完成
    Card,
    /// 货到付款，无外部网关参与
    CashOnDelivery,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentMethod::Card => "CARD",
            PaymentMethod::CashOnDelivery => "CASH_ON_DELIVERY",
        };
        f.write_str(s)
    }
}
