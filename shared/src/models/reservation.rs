//! Reservation wire types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 预订状态
///
/// 终态: CANCELLED / COMPLETED / NO_SHOW。
/// 只有 CANCELLED 释放桌台时间窗；COMPLETED/NO_SHOW 的历史时间窗保持占用
/// (不影响新预订，因为新预订只能订未来时间)。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
}

impl ReservationStatus {
    /// 终态不允许再迁移
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ReservationStatus::Cancelled
                | ReservationStatus::Completed
                | ReservationStatus::NoShow
        )
    }

    /// 该状态是否占用桌台时间窗
    pub fn occupies_table(self) -> bool {
        self != ReservationStatus::Cancelled
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReservationStatus::Pending => "PENDING",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::Cancelled => "CANCELLED",
            ReservationStatus::Completed => "COMPLETED",
            ReservationStatus::NoShow => "NO_SHOW",
        };
        f.write_str(s)
    }
}

/// 预订读取视图 - 预订服务读取端点的响应体
///
/// 订单服务的预订校验器消费这个结构，字段保持平台 camelCase 线格式。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationView {
    /// 预订 ID ("reservation:xxx")
    pub id: String,
    pub customer_id: i64,
    pub restaurant_id: i64,
    pub table_id: Option<i64>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub party_size: i32,
    pub status: ReservationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&ReservationStatus::NoShow).unwrap(),
            "\"NO_SHOW\""
        );
        assert_eq!(
            serde_json::from_str::<ReservationStatus>("\"CONFIRMED\"").unwrap(),
            ReservationStatus::Confirmed
        );
    }

    #[test]
    fn only_cancelled_frees_the_table() {
        assert!(!ReservationStatus::Cancelled.occupies_table());
        assert!(ReservationStatus::Pending.occupies_table());
        assert!(ReservationStatus::Confirmed.occupies_table());
        assert!(ReservationStatus::Completed.occupies_table());
        assert!(ReservationStatus::NoShow.occupies_table());
    }
}
