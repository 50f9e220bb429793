//! Payment Repository
//!
//! 状态迁移用带 WHERE 守卫的条件更新：迁移前置状态不满足时
//! 返回 None，调用方据此报状态错误。PENDING → PAID 恰好成功一次，
//! 并发确认里输的一方拿不到行。

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Payment;

const TABLE: &str = "payment";

#[derive(Clone)]
pub struct PaymentRepository {
    base: BaseRepository,
}

impl PaymentRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a new payment record
    pub async fn create(&self, data: Payment) -> RepoResult<Payment> {
        let created: Option<Payment> = self.base.db().create(TABLE).content(data).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create payment".to_string()))
    }

    /// Find payment by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Payment>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let payment: Option<Payment> = self.base.db().select(thing).await?;
        Ok(payment)
    }

    /// Find all payments of a customer, newest first
    pub async fn find_by_customer(&self, customer_id: i64) -> RepoResult<Vec<Payment>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM payment WHERE customer_id = $customer_id ORDER BY created_at DESC",
            )
            .bind(("customer_id", customer_id))
            .await?;
        let rows: Vec<Payment> = result.take(0)?;
        Ok(rows)
    }

    /// Find all payments attached to an order
    pub async fn find_by_order(&self, order_id: &str) -> RepoResult<Vec<Payment>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM payment WHERE order_id = $order_id ORDER BY created_at DESC")
            .bind(("order_id", order_id.to_string()))
            .await?;
        let rows: Vec<Payment> = result.take(0)?;
        Ok(rows)
    }

    /// PENDING → PAID，条件更新
    ///
    /// 返回 None 表示守卫未命中 (支付不在 PENDING，或并发确认输了)。
    pub async fn confirm_paid(
        &self,
        id: &RecordId,
        provider_reference: String,
        updated_at: i64,
    ) -> RepoResult<Option<Payment>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $id SET status = 'PAID', provider_reference = $provider_reference, \
                 updated_at = $updated_at WHERE status = 'PENDING'",
            )
            .bind(("id", id.clone()))
            .bind(("provider_reference", provider_reference))
            .bind(("updated_at", updated_at))
            .await?;
        let rows: Vec<Payment> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// PENDING → FAILED，条件更新
    pub async fn mark_failed(
        &self,
        id: &RecordId,
        failure_reason: String,
        updated_at: i64,
    ) -> RepoResult<Option<Payment>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $id SET status = 'FAILED', failure_reason = $failure_reason, \
                 updated_at = $updated_at WHERE status = 'PENDING'",
            )
            .bind(("id", id.clone()))
            .bind(("failure_reason", failure_reason))
            .bind(("updated_at", updated_at))
            .await?;
        let rows: Vec<Payment> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// PAID → REFUNDED，条件更新
    pub async fn mark_refunded(
        &self,
        id: &RecordId,
        updated_at: i64,
    ) -> RepoResult<Option<Payment>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $id SET status = 'REFUNDED', updated_at = $updated_at \
                 WHERE status = 'PAID'",
            )
            .bind(("id", id.clone()))
            .bind(("updated_at", updated_at))
            .await?;
        let rows: Vec<Payment> = result.take(0)?;
        Ok(rows.into_iter().next())
    }
}

// PaymentStatus 在条件更新里以字面量出现，保持与 serde 形式一致
#[cfg(test)]
mod tests {
    use shared::models::PaymentStatus;

    #[test]
    fn status_literals_match_serde_form() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Paid).unwrap(),
            "\"PAID\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Pending).unwrap(),
            "\"PENDING\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Failed).unwrap(),
            "\"FAILED\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Refunded).unwrap(),
            "\"REFUNDED\""
        );
    }
}
