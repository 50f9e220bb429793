//! Order Model

use serde::{Deserialize, Serialize};
use shared::db::serde_helpers;
use shared::models::{OrderStatus, OrderType};
use surrealdb::RecordId;

/// 订单行项目
///
/// 名称和单价是下单时的快照，菜单后续改动不影响已存在的订单。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    /// 菜单项 ID (餐厅服务)
    pub menu_item_id: i64,
    /// 菜名快照
    pub name: String,
    /// 单价快照
    pub unit_price: f64,
    pub quantity: i32,
    pub special_requests: Option<String>,
    /// unit_price * quantity，下单时用 Decimal 算好落库
    pub subtotal: f64,
}

/// Order entity (订单)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,

    /// 客户 ID (身份服务)
    pub customer_id: i64,
    /// 餐厅 ID (餐厅服务)
    pub restaurant_id: i64,

    /// 关联预订 ("reservation:xxx")，仅堂食订单有值
    pub reservation_id: Option<String>,

    pub order_type: OrderType,
    pub status: OrderStatus,

    /// 支付标记和履约状态是两条独立的轴：
    /// 已取消的订单仍然可以被标记为已支付 (钱已经收了)。
    pub paid: bool,
    /// 支付服务侧的支付引用
    pub payment_reference: Option<String>,

    pub items: Vec<OrderItem>,
    /// 行项目小计之和
    pub total_amount: f64,

    pub created_at: i64,
    pub updated_at: i64,
}
