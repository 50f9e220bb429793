use std::time::Duration;

use shared::auth::JwtConfig;
use shared::client::CallPolicy;

/// 预订服务配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | DATA_DIR | /var/lib/forchetta/booking | 数据目录 |
/// | HTTP_PORT | 8085 | HTTP 服务端口 |
/// | RESTAURANT_SERVICE_URL | http://localhost:8081 | 餐厅服务 (桌台注册表) |
/// | RESERVATION_DURATION_MINUTES | 120 | 固定用餐时长 (分钟) |
/// | UPSTREAM_TIMEOUT_MS | 5000 | 出站调用超时 (毫秒) |
/// | UPSTREAM_RETRY_ATTEMPTS | 2 | 出站调用总尝试次数 |
/// | ENVIRONMENT | development | 运行环境 |
#[derive(Debug, Clone)]
pub struct Config {
    /// 数据目录，存储嵌入式数据库文件
    pub data_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 餐厅服务地址 (桌台注册表)
    pub restaurant_service_url: String,
    /// 固定用餐时长 (分钟) - 每个预订占用 [start, start + duration)
    pub reservation_duration_minutes: i64,
    /// 出站调用策略
    pub call_policy: CallPolicy,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
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
                .unwrap_or_else(|_| "/var/lib/forchetta/booking".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8085),
            restaurant_service_url: std::env::var("RESTAURANT_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8081".into()),
            reservation_duration_minutes: std::env::var("RESERVATION_DURATION_MINUTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(120),
            call_policy: CallPolicy {
                timeout: Duration::from_millis(timeout_ms),
                attempts,
                ..CallPolicy::default()
            },
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// 固定用餐时长
    pub fn reservation_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.reservation_duration_minutes)
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
