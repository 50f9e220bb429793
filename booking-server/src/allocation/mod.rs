//! Table Allocation
//!
//! 给预订挑一张桌台：
//!
//! 1. 从桌台注册表拉取餐厅的全部桌台 (跨服务调用)
//! 2. 过滤容量 >= 就餐人数
//! 3. 容量升序排序 (减少大桌浪费；同容量保持注册表顺序)
//! 4. 逐个跑重叠检测，返回第一张空闲桌台
//!
//! 注册表不可达或没有桌台时按无容量处理 (fail closed)，
//! 绝不在未检查的情况下放行预订。
//!
//! 这里的检查-再-分配没有跨服务锁；最终的防双订约束
//! 由 [`ReservationRepository::create_checked`] 的存储层事务保证。

pub mod registry;

pub use registry::{HttpTableRegistry, TableRegistry};

use std::sync::Arc;

use shared::error::{AppError, AppResult};

use crate::db::repository::ReservationRepository;

/// 半开区间重叠谓词
///
/// `[existing_start, existing_end)` 与 `[candidate_start, candidate_end)`
/// 相交当且仅当 `existing_start < candidate_end && candidate_start < existing_end`。
/// 一个预订恰好在另一个开始时结束不算重叠。
pub fn windows_overlap(
    existing_start: i64,
    existing_end: i64,
    candidate_start: i64,
    candidate_end: i64,
) -> bool {
    existing_start < candidate_end && candidate_start < existing_end
}

/// 桌台分配器
#[derive(Clone)]
pub struct TableAllocator {
    registry: Arc<dyn TableRegistry>,
    repo: ReservationRepository,
}

impl TableAllocator {
    pub fn new(registry: Arc<dyn TableRegistry>, repo: ReservationRepository) -> Self {
        Self { registry, repo }
    }

    /// Allocate a table for the window `[start_at, end_at)` (Unix millis)
    ///
    /// 返回第一张容量够且窗口空闲的桌台 ID；
    /// 没有可用桌台或注册表失败时返回 [`AppError::Capacity`]。
    /// 给定相同的桌台列表和预订集合，结果是确定性的。
    pub async fn allocate(
        &self,
        restaurant_id: i64,
        start_at: i64,
        end_at: i64,
        party_size: i32,
    ) -> AppResult<i64> {
        let mut tables = match self.registry.tables_for(restaurant_id).await {
            Ok(tables) => tables,
            Err(e) => {
                tracing::warn!(
                    restaurant_id,
                    error = %e,
                    "Table registry unavailable, failing closed"
                );
                return Err(AppError::capacity("Table registry unavailable"));
            }
        };

        tables.retain(|t| t.capacity >= party_size);
        if tables.is_empty() {
            return Err(AppError::capacity(format!(
                "No table fits a party of {}",
                party_size
            )));
        }

        // 容量升序；sort_by_key 是稳定排序，同容量保持注册表顺序
        tables.sort_by_key(|t| t.capacity);

        for table in &tables {
            if !self.repo.has_overlap(table.id, start_at, end_at).await? {
                return Ok(table.id);
            }
        }

        Err(AppError::capacity(
            "No table available for the requested time window",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shared::client::ClientError;
    use shared::models::{ReservationStatus, TableInfo};

    use crate::db;
    use crate::db::models::Reservation;

    struct StubRegistry {
        tables: Vec<TableInfo>,
        fail: bool,
    }

    #[async_trait]
    impl TableRegistry for StubRegistry {
        async fn tables_for(&self, _restaurant_id: i64) -> Result<Vec<TableInfo>, ClientError> {
            if self.fail {
                return Err(ClientError::Transport("connection refused".into()));
            }
            Ok(self.tables.clone())
        }
    }

    fn table(id: i64, capacity: i32) -> TableInfo {
        TableInfo {
            id,
            table_number: id as i32,
            capacity,
            status: None,
        }
    }

    fn reservation(table_id: i64, start_at: i64, end_at: i64) -> Reservation {
        Reservation {
            id: None,
            customer_id: 1,
            customer_email: "a@example.com".into(),
            customer_name: "A".into(),
            restaurant_id: 10,
            restaurant_name: "Trattoria".into(),
            table_id: Some(table_id),
            start_at,
            end_at,
            party_size: 2,
            phone_number: None,
            special_requests: None,
            status: ReservationStatus::Pending,
            created_at: 0,
            updated_at: 0,
        }
    }

    async fn allocator_with(tables: Vec<TableInfo>, fail: bool) -> TableAllocator {
        let db = db::connect_memory().await.unwrap();
        let repo = ReservationRepository::new(db);
        TableAllocator::new(Arc::new(StubRegistry { tables, fail }), repo)
    }

    #[test]
    fn half_open_interval_semantics() {
        // 19:00-21:00 vs 20:00-22:00 重叠
        assert!(windows_overlap(1900, 2100, 2000, 2200));
        // 背靠背不重叠
        assert!(!windows_overlap(1900, 2100, 2100, 2300));
        assert!(!windows_overlap(2100, 2300, 1900, 2100));
        // 完全包含
        assert!(windows_overlap(1900, 2300, 2000, 2100));
        // 相同窗口
        assert!(windows_overlap(1900, 2100, 1900, 2100));
    }

    #[tokio::test]
    async fn picks_smallest_table_that_fits() {
        let allocator = allocator_with(
            vec![table(1, 8), table(2, 2), table(3, 4)],
            false,
        )
        .await;

        // 3 人: 容量 2 不够，容量 4 是最小合适
        let picked = allocator.allocate(10, 0, 100, 3).await.unwrap();
        assert_eq!(picked, 3);
    }

    #[tokio::test]
    async fn allocation_is_deterministic() {
        let allocator = allocator_with(vec![table(1, 4), table(2, 4)], false).await;
        for _ in 0..3 {
            assert_eq!(allocator.allocate(10, 0, 100, 2).await.unwrap(), 1);
        }
    }

    #[tokio::test]
    async fn skips_occupied_table() {
        let allocator = allocator_with(vec![table(1, 4), table(2, 4)], false).await;
        allocator
            .repo
            .create_checked(reservation(1, 0, 100))
            .await
            .unwrap();

        assert_eq!(allocator.allocate(10, 0, 100, 2).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn no_capacity_when_all_windows_taken() {
        let allocator = allocator_with(vec![table(1, 4)], false).await;
        allocator
            .repo
            .create_checked(reservation(1, 0, 100))
            .await
            .unwrap();

        let err = allocator.allocate(10, 50, 150, 2).await.unwrap_err();
        assert!(matches!(err, AppError::Capacity(_)));
    }

    #[tokio::test]
    async fn registry_failure_fails_closed() {
        let allocator = allocator_with(vec![], true).await;
        let err = allocator.allocate(10, 0, 100, 2).await.unwrap_err();
        assert!(matches!(err, AppError::Capacity(_)));
    }

    #[tokio::test]
    async fn no_table_fits_party_size() {
        let allocator = allocator_with(vec![table(1, 2)], false).await;
        let err = allocator.allocate(10, 0, 100, 6).await.unwrap_err();
        assert!(matches!(err, AppError::Capacity(_)));
    }

    #[tokio::test]
    async fn cancelled_reservation_frees_the_window() {
        let allocator = allocator_with(vec![table(1, 4)], false).await;
        let created = allocator
            .repo
            .create_checked(reservation(1, 0, 100))
            .await
            .unwrap();
        allocator
            .repo
            .set_status(created.id.as_ref().unwrap(), ReservationStatus::Cancelled, 1)
            .await
            .unwrap();

        assert_eq!(allocator.allocate(10, 0, 100, 2).await.unwrap(), 1);
    }
}
