use std::sync::Arc;

use shared::auth::JwtService;
use shared::error::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::allocation::{HttpTableRegistry, TableAllocator, TableRegistry};
use crate::core::Config;
use crate::db;
use crate::db::repository::ReservationRepository;
use crate::reservations::ReservationService;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | db | 嵌入式数据库 (SurrealDB) |
/// | jwt | JWT 验证服务 |
/// | reservations | 预订生命周期服务 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub jwt: Arc<JwtService>,
    pub reservations: ReservationService,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 打开数据目录下的数据库，装配注册表客户端、分配器和预订服务。
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        std::fs::create_dir_all(&config.data_dir)
            .map_err(|e| AppError::internal(format!("Failed to create data dir: {}", e)))?;

        let db_path = format!("{}/booking.db", config.data_dir);
        let db = db::connect(&db_path).await?;

        let registry: Arc<dyn TableRegistry> = Arc::new(HttpTableRegistry::new(
            config.restaurant_service_url.clone(),
            config.call_policy.clone(),
        ));

        Ok(Self::with_registry(config.clone(), db, registry))
    }

    /// 使用外部注入的数据库和注册表装配状态 (测试用桩注册表)
    pub fn with_registry(
        config: Config,
        db: Surreal<Db>,
        registry: Arc<dyn TableRegistry>,
    ) -> Self {
        let repo = ReservationRepository::new(db.clone());
        let allocator = TableAllocator::new(registry, repo.clone());
        let reservations =
            ReservationService::new(repo, allocator, config.reservation_duration());
        let jwt = Arc::new(JwtService::with_config(config.jwt.clone()));

        Self {
            config,
            db,
            jwt,
            reservations,
        }
    }
}
