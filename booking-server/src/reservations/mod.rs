//! Reservation Lifecycle
//!
//! 预订的创建/改期/取消和状态流转。
//! 状态机：
//!
//! ```text
//! PENDING ──(staff confirm)──> CONFIRMED ──(staff)──> COMPLETED | NO_SHOW
//!    │                             │
//!    └──────(owner/staff cancel)───┴──> CANCELLED
//! ```

use chrono::{DateTime, Utc};
use shared::auth::{Capability, CurrentUser};
use shared::error::{AppError, AppResult};
use shared::models::ReservationStatus;

use crate::allocation::TableAllocator;
use crate::db::models::Reservation;
use crate::db::repository::ReservationRepository;

/// 状态迁移白名单 - 不在表里的迁移一律拒绝
const ALLOWED_TRANSITIONS: &[(ReservationStatus, ReservationStatus)] = &[
    (ReservationStatus::Pending, ReservationStatus::Confirmed),
    (ReservationStatus::Pending, ReservationStatus::Cancelled),
    (ReservationStatus::Confirmed, ReservationStatus::Cancelled),
    (ReservationStatus::Confirmed, ReservationStatus::Completed),
    (ReservationStatus::Confirmed, ReservationStatus::NoShow),
];

/// 预订状态迁移是否合法
pub fn transition_allowed(from: ReservationStatus, to: ReservationStatus) -> bool {
    ALLOWED_TRANSITIONS.contains(&(from, to))
}

/// 创建预订的服务层输入
#[derive(Debug, Clone)]
pub struct CreateReservation {
    pub restaurant_id: i64,
    pub restaurant_name: String,
    /// 展示用姓名，缺省时落到令牌里的邮箱
    pub customer_name: Option<String>,
    pub start_at: DateTime<Utc>,
    pub party_size: i32,
    pub phone_number: Option<String>,
    pub special_requests: Option<String>,
}

/// 更新预订的服务层输入 - 只有出现的字段会被修改
#[derive(Debug, Clone, Default)]
pub struct UpdateReservation {
    pub start_at: Option<DateTime<Utc>>,
    pub party_size: Option<i32>,
    pub phone_number: Option<String>,
    pub special_requests: Option<String>,
    pub status: Option<ReservationStatus>,
}

/// 预订生命周期服务
#[derive(Clone)]
pub struct ReservationService {
    repo: ReservationRepository,
    allocator: TableAllocator,
    duration: chrono::Duration,
}

impl ReservationService {
    pub fn new(
        repo: ReservationRepository,
        allocator: TableAllocator,
        duration: chrono::Duration,
    ) -> Self {
        Self {
            repo,
            allocator,
            duration,
        }
    }

    /// 创建预订
    ///
    /// 校验 → 重复预订守卫 → 桌台分配 → 持久化 (PENDING)。
    /// 分配失败时不写任何数据；持久化走存储层排他约束，
    /// 输掉并发竞争时返回容量错误。
    pub async fn create(
        &self,
        user: &CurrentUser,
        req: CreateReservation,
    ) -> AppResult<Reservation> {
        if req.party_size <= 0 {
            return Err(AppError::validation("Party size must be greater than 0"));
        }

        let now = Utc::now();
        if req.start_at <= now {
            return Err(AppError::validation("Reservation must be in the future"));
        }

        let start_at = req.start_at.timestamp_millis();
        let end_at = (req.start_at + self.duration).timestamp_millis();

        // 重复预订守卫：同客户+同餐厅+同时间已有确认预订
        if self
            .repo
            .find_confirmed_duplicate(user.id, req.restaurant_id, start_at)
            .await?
            .is_some()
        {
            return Err(AppError::duplicate(
                "You already have a confirmed reservation for this restaurant at this time",
            ));
        }

        let table_id = self
            .allocator
            .allocate(req.restaurant_id, start_at, end_at, req.party_size)
            .await?;

        let now_millis = now.timestamp_millis();
        let reservation = Reservation {
            id: None,
            customer_id: user.id,
            customer_email: user.email.clone(),
            customer_name: req.customer_name.unwrap_or_else(|| user.email.clone()),
            restaurant_id: req.restaurant_id,
            restaurant_name: req.restaurant_name,
            table_id: Some(table_id),
            start_at,
            end_at,
            party_size: req.party_size,
            phone_number: req.phone_number,
            special_requests: req.special_requests,
            status: ReservationStatus::Pending,
            created_at: now_millis,
            updated_at: now_millis,
        };

        let created = self.repo.create_checked(reservation).await?;
        tracing::info!(
            customer_id = user.id,
            restaurant_id = created.restaurant_id,
            table_id = created.table_id,
            "Reservation created"
        );
        Ok(created)
    }

    /// 读取单个预订 - 本人或管理员
    pub async fn get(&self, user: &CurrentUser, id: &str) -> AppResult<Reservation> {
        let reservation = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Reservation {} not found", id)))?;

        if reservation.customer_id != user.id && !user.role.can(Capability::ReadAnyReservation) {
            return Err(AppError::forbidden("Not allowed to read this reservation"));
        }

        Ok(reservation)
    }

    /// 我的预订列表
    pub async fn list_mine(&self, user: &CurrentUser) -> AppResult<Vec<Reservation>> {
        Ok(self.repo.find_by_customer(user.id).await?)
    }

    /// 餐厅预订列表 (员工看板)
    pub async fn list_for_restaurant(
        &self,
        user: &CurrentUser,
        restaurant_id: i64,
        status: Option<ReservationStatus>,
    ) -> AppResult<Vec<Reservation>> {
        if !user.role.can(Capability::ListRestaurantReservations) {
            return Err(AppError::forbidden(
                "Not allowed to list restaurant reservations",
            ));
        }
        Ok(self.repo.find_by_restaurant(restaurant_id, status).await?)
    }

    /// 更新预订
    ///
    /// 只有出现的字段会被修改。改期不会重新跑桌台分配 -
    /// 原桌台保留 (时间变更是否需要餐厅人工确认仍是待定的产品决策)。
    /// 状态变更只对员工/管理员开放，并走迁移白名单。
    pub async fn update(
        &self,
        user: &CurrentUser,
        id: &str,
        patch: UpdateReservation,
    ) -> AppResult<Reservation> {
        let mut reservation = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Reservation {} not found", id)))?;

        if reservation.customer_id != user.id && !user.role.is_staff() {
            return Err(AppError::forbidden("Not allowed to update this reservation"));
        }

        let changes_fields = patch.start_at.is_some()
            || patch.party_size.is_some()
            || patch.phone_number.is_some()
            || patch.special_requests.is_some();

        if changes_fields
            && !matches!(
                reservation.status,
                ReservationStatus::Pending | ReservationStatus::Confirmed
            )
        {
            return Err(AppError::validation(format!(
                "Reservation in status {} cannot be modified",
                reservation.status
            )));
        }

        if let Some(start_at) = patch.start_at {
            if start_at <= Utc::now() {
                return Err(AppError::validation("New reservation time must be in the future"));
            }
            reservation.start_at = start_at.timestamp_millis();
            reservation.end_at = (start_at + self.duration).timestamp_millis();
        }

        if let Some(party_size) = patch.party_size {
            if party_size <= 0 {
                return Err(AppError::validation("Party size must be greater than 0"));
            }
            reservation.party_size = party_size;
        }

        if let Some(phone) = patch.phone_number {
            reservation.phone_number = Some(phone);
        }

        if let Some(notes) = patch.special_requests {
            reservation.special_requests = Some(notes);
        }

        if let Some(status) = patch.status {
            if !user.role.can(Capability::SetReservationStatus) {
                return Err(AppError::forbidden(
                    "Customers cannot change reservation status",
                ));
            }
            if !transition_allowed(reservation.status, status) {
                return Err(AppError::invalid_transition(
                    reservation.status.to_string(),
                    status.to_string(),
                ));
            }
            reservation.status = status;
        }

        reservation.updated_at = Utc::now().timestamp_millis();

        let record_id = reservation
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Loaded reservation has no id"))?;
        Ok(self.repo.update(&record_id, reservation).await?)
    }

    /// 取消预订 - 仅本人，只允许从 PENDING/CONFIRMED 取消
    ///
    /// 重复取消返回状态错误 (CANCELLED -> CANCELLED 不在白名单)，
    /// 已取消状态不会被覆盖。
    pub async fn cancel(&self, user: &CurrentUser, id: &str) -> AppResult<Reservation> {
        let reservation = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Reservation {} not found", id)))?;

        if reservation.customer_id != user.id {
            return Err(AppError::forbidden("Not allowed to cancel this reservation"));
        }

        if !transition_allowed(reservation.status, ReservationStatus::Cancelled) {
            return Err(AppError::invalid_transition(
                reservation.status.to_string(),
                ReservationStatus::Cancelled.to_string(),
            ));
        }

        let record_id = reservation
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Loaded reservation has no id"))?;
        let cancelled = self
            .repo
            .set_status(
                &record_id,
                ReservationStatus::Cancelled,
                Utc::now().timestamp_millis(),
            )
            .await?;

        tracing::info!(customer_id = user.id, reservation = %record_id, "Reservation cancelled");
        Ok(cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_whitelist() {
        use ReservationStatus::*;

        assert!(transition_allowed(Pending, Confirmed));
        assert!(transition_allowed(Pending, Cancelled));
        assert!(transition_allowed(Confirmed, Cancelled));
        assert!(transition_allowed(Confirmed, Completed));
        assert!(transition_allowed(Confirmed, NoShow));

        // 取消是单向的
        assert!(!transition_allowed(Cancelled, Pending));
        assert!(!transition_allowed(Cancelled, Cancelled));
        // 终态不再迁移
        assert!(!transition_allowed(Completed, Confirmed));
        assert!(!transition_allowed(NoShow, Confirmed));
        // 不能跳过确认
        assert!(!transition_allowed(Pending, Completed));
        assert!(!transition_allowed(Pending, NoShow));
    }
}
