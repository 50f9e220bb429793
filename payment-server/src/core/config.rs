use std::time::Duration;

use shared::auth::JwtConfig;
use shared::client::CallPolicy;

/// 支付服务配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | DATA_DIR | /var/lib/forchetta/payment | 数据目录 |
/// | HTTP_PORT | 8087 | HTTP 服务端口 |
/// | ORDER_SERVICE_URL | http://localhost:8086 | 订单服务地址 |
/// | INTERNAL_SHARED_SECRET | (开发默认) | 内部端点共享密钥 |
/// | UPSTREAM_TIMEOUT_MS | 5000 | 出站调用超时 (毫秒) |
/// | UPSTREAM_RETRY_ATTEMPTS | 2 | 出站调用总尝试次数 |
/// | ENVIRONMENT | development | 运行环境 |
#[derive(Debug, Clone)]
pub struct Config {
    /// 数据目录，存储嵌入式数据库文件
    pub data_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 订单服务地址 (结算桥)
    pub order_service_url: String,
    /// 内部端点共享密钥 (与订单服务一致)
    pub internal_shared_secret: String,
    /// 出站调用策略
    pub call_policy: CallPolicy,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        let timeout_ms: u64 = std::env::var("UPSTREAM_TIMEOUT_MS")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);
        let attempts: u32 = std::env::var("UPSTREAM_RETRY_ATTEMPTS")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(2);

        Self {
            data_dir: std::env::var("DATA_DIR")
                .unwrap_or_else(|_| "/var/lib/forchetta/payment".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8087),
            order_service_url: std::env::var("ORDER_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8086".into()),
            internal_shared_secret: std::env::var("INTERNAL_SHARED_SECRET")
                .unwrap_or_else(|_| "forchetta-internal-dev-secret".into()),
            call_policy: CallPolicy {
                timeout: Duration::from_millis(timeout_ms),
                attempts,
                ..CallPolicy::default()
            },
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
