use std::sync::Arc;

use shared::auth::JwtService;
use shared::error::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::core::Config;
use crate::db;
use crate::db::repository::PaymentRepository;
use crate::payments::PaymentService;
use crate::settlement::{HttpOrderNotifier, OrderNotifier, SettlementBridge};

/// 服务器状态 - 持有所有服务的共享引用
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | db | 嵌入式数据库 (SurrealDB) |
/// | jwt | JWT 验证服务 |
/// | payments | 支付生命周期服务 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub jwt: Arc<JwtService>,
    pub payments: PaymentService,
}

impl ServerState {
    /// 初始化服务器状态
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        std::fs::create_dir_all(&config.data_dir)
            .map_err(|e| AppError::internal(format!("Failed to create data dir: {}", e)))?;

        let db_path = format!("{}/payment.db", config.data_dir);
        let db = db::connect(&db_path).await?;

        let notifier: Arc<dyn OrderNotifier> = Arc::new(HttpOrderNotifier::new(
            config.order_service_url.clone(),
            config.internal_shared_secret.clone(),
            config.call_policy.clone(),
        ));

        Ok(Self::with_notifier(config.clone(), db, notifier))
    }

    /// 使用外部注入的数据库和通知器装配状态 (测试用桩通知器)
    pub fn with_notifier(
        config: Config,
        db: Surreal<Db>,
        notifier: Arc<dyn OrderNotifier>,
    ) -> Self {
        let repo = PaymentRepository::new(db.clone());
        let bridge = SettlementBridge::new(notifier);
        let payments = PaymentService::new(repo, bridge);
        let jwt = Arc::new(JwtService::with_config(config.jwt.clone()));

        Self {
            config,
            db,
            jwt,
            payments,
        }
    }
}
