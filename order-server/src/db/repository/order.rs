//! Order Repository

use shared::models::OrderStatus;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Order;

const TABLE: &str = "order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a new order
    pub async fn create(&self, data: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(TABLE).content(data).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let order: Option<Order> = self.base.db().select(thing).await?;
        Ok(order)
    }

    /// Find all orders of a customer, newest first
    pub async fn find_by_customer(&self, customer_id: i64) -> RepoResult<Vec<Order>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM order WHERE customer_id = $customer_id ORDER BY created_at DESC")
            .bind(("customer_id", customer_id))
            .await?;
        let rows: Vec<Order> = result.take(0)?;
        Ok(rows)
    }

    /// Find orders of a restaurant
    ///
    /// 全量按创建时间倒序；按状态过滤时正序 (厨房按先来后到出餐)。
    pub async fn find_by_restaurant(
        &self,
        restaurant_id: i64,
        status: Option<OrderStatus>,
    ) -> RepoResult<Vec<Order>> {
        let rows: Vec<Order> = match status {
            Some(status) => {
                let mut result = self
                    .base
                    .db()
                    .query(
                        "SELECT * FROM order \
                         WHERE restaurant_id = $restaurant_id AND status = $status \
                         ORDER BY created_at ASC",
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
                        "SELECT * FROM order \
                         WHERE restaurant_id = $restaurant_id \
                         ORDER BY created_at DESC",
                    )
                    .bind(("restaurant_id", restaurant_id))
                    .await?;
                result.take(0)?
            }
        };
        Ok(rows)
    }

    /// 单字段状态迁移 (行级锁内的原子更新)
    pub async fn set_status(
        &self,
        id: &RecordId,
        status: OrderStatus,
        updated_at: i64,
    ) -> RepoResult<Order> {
        let mut result = self
            .base
            .db()
            .query("UPDATE $id SET status = $status, updated_at = $updated_at")
            .bind(("id", id.clone()))
            .bind(("status", status))
            .bind(("updated_at", updated_at))
            .await?;
        let rows: Vec<Order> = result.take(0)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))
    }

    /// 设置支付标记和支付引用
    pub async fn mark_paid(
        &self,
        id: &RecordId,
        payment_reference: String,
        updated_at: i64,
    ) -> RepoResult<Order> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $id SET paid = true, payment_reference = $payment_reference, \
                 updated_at = $updated_at",
            )
            .bind(("id", id.clone()))
            .bind(("payment_reference", payment_reference))
            .bind(("updated_at", updated_at))
            .await?;
        let rows: Vec<Order> = result.take(0)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))
    }
}
