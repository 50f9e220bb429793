use std::sync::Arc;

use shared::auth::JwtService;
use shared::error::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::core::Config;
use crate::db;
use crate::db::repository::OrderRepository;
use crate::orders::OrderService;
use crate::verify::{BookingGateway, BookingVerifier, HttpBookingGateway};

/// 服务器状态 - 持有所有服务的共享引用
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | db | 嵌入式数据库 (SurrealDB) |
/// | jwt | JWT 验证服务 |
/// | orders | 订单生命周期服务 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub jwt: Arc<JwtService>,
    pub orders: OrderService,
}

impl ServerState {
    /// 初始化服务器状态
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        std::fs::create_dir_all(&config.data_dir)
            .map_err(|e| AppError::internal(format!("Failed to create data dir: {}", e)))?;

        let db_path = format!("{}/order.db", config.data_dir);
        let db = db::connect(&db_path).await?;

        let gateway: Arc<dyn BookingGateway> = Arc::new(HttpBookingGateway::new(
            config.booking_service_url.clone(),
            config.call_policy.clone(),
        ));

        Ok(Self::with_gateway(config.clone(), db, gateway))
    }

    /// 使用外部注入的数据库和预订网关装配状态 (测试用桩网关)
    pub fn with_gateway(config: Config, db: Surreal<Db>, gateway: Arc<dyn BookingGateway>) -> Self {
        let repo = OrderRepository::new(db.clone());
        let verifier = BookingVerifier::new(gateway);
        let orders = OrderService::new(repo, verifier);
        let jwt = Arc::new(JwtService::with_config(config.jwt.clone()));

        Self {
            config,
            db,
            jwt,
            orders,
        }
    }
}
