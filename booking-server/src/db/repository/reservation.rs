//! Reservation Repository
//!
//! 预订的持久化访问。重叠判定的权威实现在 [`create_checked`] 的
//! 数据库事务里：检查和写入在同一个事务内完成，两个并发的
//! 分配请求里输的一方会拿到 [`RepoError::Conflict`]，
//! 不会产生同桌台的重叠预订。

use shared::models::ReservationStatus;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use uuid::Uuid;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Reservation;

const TABLE: &str = "reservation";

/// THROW 标记，事务内冲突通过错误信息识别
const WINDOW_CONFLICT: &str = "reservation window conflict";

/// 事务化的检查-写入：
/// 同桌台、非 CANCELLED、半开区间相交 ([start, end) 语义) 即冲突。
const CREATE_CHECKED_SQL: &str = r#"
BEGIN TRANSACTION;
LET $conflicts = (
    SELECT VALUE id FROM reservation
    WHERE table_id = $table_id
      AND status != 'CANCELLED'
      AND start_at < $end_at
      AND $start_at < end_at
);
IF array::len($conflicts) > 0 { THROW 'reservation window conflict' };
CREATE $id CONTENT $data;
COMMIT TRANSACTION;
"#;

#[derive(Clone)]
pub struct ReservationRepository {
    base: BaseRepository,
}

impl ReservationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a reservation, enforcing the table-window exclusion constraint
    ///
    /// `data.table_id` 必须已由分配器填好。成功返回带 id 的完整行；
    /// 时间窗被并发请求抢走时返回 [`RepoError::Conflict`]。
    pub async fn create_checked(&self, mut data: Reservation) -> RepoResult<Reservation> {
        let table_id = data
            .table_id
            .ok_or_else(|| RepoError::Validation("Reservation has no table assigned".into()))?;

        let id = RecordId::from_table_key(TABLE, Uuid::new_v4().simple().to_string());
        data.id = None;

        let result = self
            .base
            .db()
            .query(CREATE_CHECKED_SQL)
            .bind(("table_id", table_id))
            .bind(("start_at", data.start_at))
            .bind(("end_at", data.end_at))
            .bind(("id", id.clone()))
            .bind(("data", data.clone()))
            .await
            .and_then(|response| response.check());

        match result {
            Ok(_) => {
                data.id = Some(id);
                Ok(data)
            }
            Err(e) => {
                let msg = e.to_string();
                if msg.contains(WINDOW_CONFLICT) {
                    Err(RepoError::Conflict(
                        "Table already reserved for an overlapping time window".into(),
                    ))
                } else {
                    Err(RepoError::Database(msg))
                }
            }
        }
    }

    /// Overlap Detector 的持久化查询
    ///
    /// 某桌台在候选窗口 [start_at, end_at) 内是否已有非 CANCELLED 预订。
    /// 纯读查询，无副作用。
    pub async fn has_overlap(&self, table_id: i64, start_at: i64, end_at: i64) -> RepoResult<bool> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT VALUE id FROM reservation \
                 WHERE table_id = $table_id \
                   AND status != 'CANCELLED' \
                   AND start_at < $end_at \
                   AND $start_at < end_at",
            )
            .bind(("table_id", table_id))
            .bind(("start_at", start_at))
            .bind(("end_at", end_at))
            .await?;
        let ids: Vec<RecordId> = result.take(0)?;
        Ok(!ids.is_empty())
    }

    /// Find reservation by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Reservation>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let reservation: Option<Reservation> = self.base.db().select(thing).await?;
        Ok(reservation)
    }

    /// 同客户+同餐厅+同开始时间的已确认预订 (重复预订守卫)
    pub async fn find_confirmed_duplicate(
        &self,
        customer_id: i64,
        restaurant_id: i64,
        start_at: i64,
    ) -> RepoResult<Option<Reservation>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM reservation \
                 WHERE customer_id = $customer_id \
                   AND restaurant_id = $restaurant_id \
                   AND start_at = $start_at \
                   AND status = 'CONFIRMED'",
            )
            .bind(("customer_id", customer_id))
            .bind(("restaurant_id", restaurant_id))
            .bind(("start_at", start_at))
            .await?;
        let rows: Vec<Reservation> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// Find all reservations of a customer, newest dining time first
    pub async fn find_by_customer(&self, customer_id: i64) -> RepoResult<Vec<Reservation>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM reservation WHERE customer_id = $customer_id ORDER BY start_at DESC",
            )
            .bind(("customer_id", customer_id))
            .await?;
        let rows: Vec<Reservation> = result.take(0)?;
        Ok(rows)
    }

    /// Find reservations of a restaurant, optionally filtered by status
    pub async fn find_by_restaurant(
        &self,
        restaurant_id: i64,
        status: Option<ReservationStatus>,
    ) -> RepoResult<Vec<Reservation>> {
        let rows: Vec<Reservation> = match status {
            Some(status) => {
                let mut result = self
                    .base
                    .db()
                    .query(
                        "SELECT * FROM reservation \
                         WHERE restaurant_id = $restaurant_id AND status = $status \
                         ORDER BY start_at DESC",
                    )
                    .bind(("restaurant_id", restaurant_id))
                    .bind(("status", status))
                    .await?;
                result.take(0)?
            }
            None => {
                let mut result = self
                    .base
                    .db()
                    .query(
                        "SELECT * FROM reservation \
                         WHERE restaurant_id = $restaurant_id \
                         ORDER BY start_at DESC",
                    )
                    .bind(("restaurant_id", restaurant_id))
                    .await?;
                result.take(0)?
            }
        };
        Ok(rows)
    }

    /// Replace a reservation row (id taken from `id`, not from `data`)
    pub async fn update(&self, id: &RecordId, mut data: Reservation) -> RepoResult<Reservation> {
        data.id = None;
        let updated: Option<Reservation> =
            self.base.db().update(id.clone()).content(data).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Reservation {} not found", id)))
    }

    /// 单字段状态迁移 (行级锁内的原子更新)
    pub async fn set_status(
        &self,
        id: &RecordId,
        status: ReservationStatus,
        updated_at: i64,
    ) -> RepoResult<Reservation> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $id SET status = $status, updated_at = $updated_at")
            .bind(("id", id.clone()))
            .bind(("status", status))
            .bind(("updated_at", updated_at))
            .await?;
        let rows: Vec<Reservation> = result.take(0)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Reservation {} not found", id)))
    }
}
