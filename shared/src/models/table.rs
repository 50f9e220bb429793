//! Table registry wire types
//!
//! 桌台归餐厅服务所有，这里只是注册表端点返回的只读视图。
//! `status` 是粗粒度的展示状态，冲突检测不信它 - 以预订窗口为准。

use serde::{Deserialize, Serialize};

/// 桌台展示状态 (advisory only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    Available,
    Occupied,
}

/// 注册表返回的桌台信息
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableInfo {
    pub id: i64,
    pub table_number: i32,
    pub capacity: i32,
    #[serde(default)]
    pub status: Option<TableStatus>,
}
