//! Table Registry Client
//!
//! 桌台归餐厅服务所有。分配器只信它的桌台存在性和容量，
//! 不信它的展示状态 - 冲突检测以本服务的预订窗口为准。

use async_trait::async_trait;
use shared::client::{CallPolicy, ClientError, ServiceClient};
use shared::models::TableInfo;

/// 桌台注册表的抽象，测试用桩实现替换
#[async_trait]
pub trait TableRegistry: Send + Sync {
    /// List all tables of a restaurant
    async fn tables_for(&self, restaurant_id: i64) -> Result<Vec<TableInfo>, ClientError>;
}

/// 生产实现：调用餐厅服务的注册表端点
pub struct HttpTableRegistry {
    client: ServiceClient,
}

impl HttpTableRegistry {
    pub fn new(base_url: impl Into<String>, policy: CallPolicy) -> Self {
        Self {
            client: ServiceClient::new(base_url, policy),
        }
    }
}

#[async_trait]
impl TableRegistry for HttpTableRegistry {
    async fn tables_for(&self, restaurant_id: i64) -> Result<Vec<TableInfo>, ClientError> {
        self.client
            .get_json(&format!("/api/tables/restaurant/{}", restaurant_id), None)
            .await
    }
}
