//! 预订生命周期集成测试
//!
//! 内存数据库 + 桩注册表，覆盖分配、取消和状态流转的端到端场景。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use shared::auth::{CurrentUser, Role};
use shared::client::ClientError;
use shared::error::AppError;
use shared::models::{ReservationStatus, TableInfo};

use booking_server::allocation::{TableAllocator, TableRegistry};
use booking_server::db;
use booking_server::db::repository::ReservationRepository;
use booking_server::reservations::{CreateReservation, ReservationService, UpdateReservation};

struct StubRegistry {
    tables: Vec<TableInfo>,
}

#[async_trait]
impl TableRegistry for StubRegistry {
    async fn tables_for(&self, _restaurant_id: i64) -> Result<Vec<TableInfo>, ClientError> {
        Ok(self.tables.clone())
    }
}

fn customer(id: i64) -> CurrentUser {
    CurrentUser {
        id,
        email: format!("customer{}@example.com", id),
        role: Role::Customer,
    }
}

fn staff() -> CurrentUser {
    CurrentUser {
        id: 900,
        email: "owner@example.com".into(),
        role: Role::RestaurantOwner,
    }
}

async fn service_with_tables(tables: Vec<TableInfo>) -> ReservationService {
    let db = db::connect_memory().await.unwrap();
    let repo = ReservationRepository::new(db);
    let allocator = TableAllocator::new(Arc::new(StubRegistry { tables }), repo.clone());
    ReservationService::new(repo, allocator, Duration::hours(2))
}

fn one_table() -> Vec<TableInfo> {
    vec![TableInfo {
        id: 1,
        table_number: 1,
        capacity: 4,
        status: None,
    }]
}

fn request_at(start: chrono::DateTime<Utc>, party_size: i32) -> CreateReservation {
    CreateReservation {
        restaurant_id: 10,
        restaurant_name: "Trattoria da Mario".into(),
        customer_name: None,
        start_at: start,
        party_size,
        phone_number: Some("+39 333 1234567".into()),
        special_requests: None,
    }
}

/// 一张 4 人桌。
/// A 订 19:00 两人 → 分到桌台；
/// B 订 20:00 两人 → 与 19:00-21:00 重叠 → 无容量；
/// B 订 21:30 → 不重叠 → 分到同一张桌台。
#[tokio::test]
async fn single_table_overlap_scenario() {
    let service = service_with_tables(one_table()).await;

    let tomorrow_19 = Utc::now() + Duration::days(1);
    let tomorrow_20 = tomorrow_19 + Duration::hours(1);
    let tomorrow_21_30 = tomorrow_19 + Duration::minutes(150);

    let a = service
        .create(&customer(1), request_at(tomorrow_19, 2))
        .await
        .unwrap();
    assert_eq!(a.table_id, Some(1));
    assert_eq!(a.status, ReservationStatus::Pending);

    let err = service
        .create(&customer(2), request_at(tomorrow_20, 2))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Capacity(_)));

    let b = service
        .create(&customer(2), request_at(tomorrow_21_30, 2))
        .await
        .unwrap();
    assert_eq!(b.table_id, Some(1));
}

#[tokio::test]
async fn past_booking_is_rejected_before_any_side_effect() {
    let service = service_with_tables(one_table()).await;

    let err = service
        .create(&customer(1), request_at(Utc::now() - Duration::hours(1), 2))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    assert!(service.list_mine(&customer(1)).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_confirmed_reservation_is_rejected() {
    let service = service_with_tables(vec![
        TableInfo {
            id: 1,
            table_number: 1,
            capacity: 4,
            status: None,
        },
        TableInfo {
            id: 2,
            table_number: 2,
            capacity: 4,
            status: None,
        },
    ])
    .await;

    let start = Utc::now() + Duration::days(2);
    let created = service
        .create(&customer(1), request_at(start, 2))
        .await
        .unwrap();

    // 员工确认后，同客户同餐厅同时间的第二次预订被重复守卫拦下
    let id = created.id.as_ref().unwrap().to_string();
    service
        .update(
            &staff(),
            &id,
            UpdateReservation {
                status: Some(ReservationStatus::Confirmed),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = service
        .create(&customer(1), request_at(start, 2))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Duplicate(_)));
}

#[tokio::test]
async fn cancel_is_one_way() {
    let service = service_with_tables(one_table()).await;
    let user = customer(1);

    let created = service
        .create(&user, request_at(Utc::now() + Duration::days(1), 2))
        .await
        .unwrap();
    let id = created.id.as_ref().unwrap().to_string();

    let cancelled = service.cancel(&user, &id).await.unwrap();
    assert_eq!(cancelled.status, ReservationStatus::Cancelled);

    // 第二次取消是状态错误，不是 panic，状态保持 CANCELLED
    let err = service.cancel(&user, &id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));

    let after = service.get(&user, &id).await.unwrap();
    assert_eq!(after.status, ReservationStatus::Cancelled);
}

#[tokio::test]
async fn only_owner_may_cancel() {
    let service = service_with_tables(one_table()).await;

    let created = service
        .create(&customer(1), request_at(Utc::now() + Duration::days(1), 2))
        .await
        .unwrap();
    let id = created.id.as_ref().unwrap().to_string();

    let err = service.cancel(&customer(2), &id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn customer_cannot_change_status_via_update() {
    let service = service_with_tables(one_table()).await;
    let user = customer(1);

    let created = service
        .create(&user, request_at(Utc::now() + Duration::days(1), 2))
        .await
        .unwrap();
    let id = created.id.as_ref().unwrap().to_string();

    let err = service
        .update(
            &user,
            &id,
            UpdateReservation {
                status: Some(ReservationStatus::Confirmed),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn staff_status_change_follows_whitelist() {
    let service = service_with_tables(one_table()).await;

    let created = service
        .create(&customer(1), request_at(Utc::now() + Duration::days(1), 2))
        .await
        .unwrap();
    let id = created.id.as_ref().unwrap().to_string();

    // PENDING -> COMPLETED 不在白名单
    let err = service
        .update(
            &staff(),
            &id,
            UpdateReservation {
                status: Some(ReservationStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));

    // PENDING -> CONFIRMED 合法
    let confirmed = service
        .update(
            &staff(),
            &id,
            UpdateReservation {
                status: Some(ReservationStatus::Confirmed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(confirmed.status, ReservationStatus::Confirmed);
}

#[tokio::test]
async fn reschedule_keeps_assigned_table() {
    let service = service_with_tables(one_table()).await;
    let user = customer(1);

    let created = service
        .create(&user, request_at(Utc::now() + Duration::days(1), 2))
        .await
        .unwrap();
    let id = created.id.as_ref().unwrap().to_string();

    // 改期不重新分配，桌台保留
    let moved = service
        .update(
            &user,
            &id,
            UpdateReservation {
                start_at: Some(Utc::now() + Duration::days(3)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.table_id, created.table_id);
    assert_eq!(
        moved.end_at - moved.start_at,
        Duration::hours(2).num_milliseconds()
    );
}

/// 属性：同桌台上非 CANCELLED 预订的半开窗口两两不相交
#[tokio::test]
async fn non_cancelled_windows_are_disjoint() {
    let service = service_with_tables(one_table()).await;
    let base = Utc::now() + Duration::days(1);

    // 背靠背 + 有重叠尝试混合提交
    let offsets_minutes = [0i64, 120, 60, 240, 180, 300];
    for (i, offset) in offsets_minutes.iter().enumerate() {
        let _ = service
            .create(
                &customer(i as i64 + 1),
                request_at(base + Duration::minutes(*offset), 2),
            )
            .await;
    }

    let staff = CurrentUser {
        id: 999,
        email: "admin@example.com".into(),
        role: Role::Admin,
    };
    let all = service
        .list_for_restaurant(&staff, 10, None)
        .await
        .unwrap();
    let active: Vec<_> = all
        .iter()
        .filter(|r| r.status.occupies_table())
        .collect();

    for a in &active {
        for b in &active {
            if a.id == b.id {
                continue;
            }
            assert!(
                a.end_at <= b.start_at || b.end_at <= a.start_at,
                "overlapping windows persisted: [{}, {}) vs [{}, {})",
                a.start_at,
                a.end_at,
                b.start_at,
                b.end_at
            );
        }
    }
}
