//! Reservation Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::db::serde_helpers;
use shared::models::{ReservationStatus, ReservationView};
use surrealdb::RecordId;

/// Reservation entity (预订)
///
/// 时间戳统一用 Unix millis 存储，repository 层只处理 `i64`；
/// API 层通过 [`Reservation::to_view`] 转回 RFC3339。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,

    /// 客户 ID (身份服务)
    pub customer_id: i64,
    /// 客户邮箱快照
    pub customer_email: String,
    /// 客户姓名快照
    pub customer_name: String,

    /// 餐厅 ID (餐厅服务)
    pub restaurant_id: i64,
    /// 餐厅名称快照
    pub restaurant_name: String,

    /// 分配的桌台 ID，分配成功前为空
    pub table_id: Option<i64>,

    /// 用餐开始时间 (Unix millis)
    pub start_at: i64,
    /// 用餐结束时间 = start_at + 固定时长 (Unix millis)
    pub end_at: i64,

    /// 就餐人数
    pub party_size: i32,

    pub phone_number: Option<String>,
    pub special_requests: Option<String>,

    pub status: ReservationStatus,

    pub created_at: i64,
    pub updated_at: i64,
}

impl Reservation {
    /// 转为跨服务读取视图
    pub fn to_view(&self) -> ReservationView {
        ReservationView {
            id: self.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            customer_id: self.customer_id,
            restaurant_id: self.restaurant_id,
            table_id: self.table_id,
            start_at: millis_to_datetime(self.start_at),
            end_at: millis_to_datetime(self.end_at),
            party_size: self.party_size,
            status: self.status,
        }
    }
}

/// Unix millis → DateTime<Utc>，越界时钳到 Unix 纪元
pub fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
