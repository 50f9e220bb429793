//! JWT 令牌服务
//!
//! 令牌由身份服务签发，各业务服务通过共享密钥验证签名和有效期，
//! 然后读取 claims。服务自身不签发、不续期用户令牌
//! (generate_token 仅用于测试和本地工具)。

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AppError;
use crate::auth::role::Role;

/// JWT 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// 共享密钥 (应至少 32 字节)
    pub secret: String,
    /// 令牌过期时间 (分钟) - 仅测试签发使用
    pub expiration_minutes: i64,
    /// 令牌签发者
    pub issuer: String,
    /// 令牌受众
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        let secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if secret.len() >= 32 => secret,
            Ok(_) => {
                #[cfg(debug_assertions)]
                {
                    tracing::warn!("JWT_SECRET is shorter than 32 bytes, using it anyway (dev)");
                    std::env::var("JWT_SECRET").unwrap_or_default()
                }
                #[cfg(not(debug_assertions))]
                {
                    panic!("JWT_SECRET must be at least 32 bytes in production");
                }
            }
            Err(_) => {
                #[cfg(debug_assertions)]
                {
                    tracing::warn!("⚠️  JWT_SECRET not set! Using development-only key.");
                    "forchetta-development-secret-do-not-use".to_string()
                }
                #[cfg(not(debug_assertions))]
                {
                    panic!("JWT_SECRET environment variable must be set in production");
                }
            }
        };

        Self {
            secret,
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1440), // 默认 24 小时
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "identity-service".to_string()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "forchetta".to_string()),
        }
    }
}

/// 存储在令牌中的 JWT Claims
///
/// 身份服务的令牌格式：`sub` 是用户 ID 的十进制字符串。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID (Subject)
    pub sub: String,
    /// 用户邮箱
    pub email: String,
    /// 角色名称 (CUSTOMER | RESTAURANT_OWNER | ADMIN)
    pub role: String,
    /// 过期时间戳
    pub exp: i64,
    /// 签发时间戳
    pub iat: i64,
    /// 签发者
    pub iss: String,
    /// 受众
    pub aud: String,
}

/// JWT 错误
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),
}

/// JWT 令牌服务
#[derive(Debug, Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// 使用默认配置创建新的 JWT 服务
    pub fn new() -> Self {
        Self::with_config(JwtConfig::default())
    }

    /// 使用指定配置创建新的 JWT 服务
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 签发令牌 - 测试和本地工具使用，生产令牌来自身份服务
    pub fn generate_token(&self, user_id: i64, email: &str, role: Role) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// 验证并解码令牌
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }

    /// 从 Authorization 头提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

impl Default for JwtService {
    fn default() -> Self {
        Self::new()
    }
}

/// 当前用户上下文 (从 JWT Claims 解析)
///
/// 由认证中间件创建，注入到请求扩展
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// 用户 ID (身份服务分配的数字 ID)
    pub id: i64,
    /// 用户邮箱
    pub email: String,
    /// 角色
    pub role: Role,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = String;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id: i64 = claims
            .sub
            .parse()
            .map_err(|_| format!("Non-numeric subject claim: {}", claims.sub))?;
        let role: Role = claims
            .role
            .parse()
            .map_err(|_| format!("Unknown role claim: {}", claims.role))?;

        Ok(Self {
            id,
            email: claims.email,
            role,
        })
    }
}

/// CurrentUser 提取器
///
/// 认证中间件验证令牌后把 CurrentUser 放进请求扩展，
/// 处理函数通过这个提取器读取。未经过中间件的路由提取时返回 401。
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(AppError::unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        JwtService::with_config(JwtConfig {
            secret: "test-secret-key-that-is-long-enough!".to_string(),
            expiration_minutes: 60,
            issuer: "identity-service".to_string(),
            audience: "forchetta".to_string(),
        })
    }

    #[test]
    fn round_trip_claims() {
        let svc = test_service();
        let token = svc
            .generate_token(42, "mario@example.com", Role::Customer)
            .unwrap();
        let claims = svc.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "mario@example.com");
        assert_eq!(claims.role, "CUSTOMER");

        let user = CurrentUser::try_from(claims).unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.role, Role::Customer);
    }

    #[test]
    fn rejects_wrong_secret() {
        let svc = test_service();
        let token = svc.generate_token(1, "a@b.c", Role::Admin).unwrap();

        let other = JwtService::with_config(JwtConfig {
            secret: "a-completely-different-secret-key!!!".to_string(),
            ..svc.config.clone()
        });
        assert!(matches!(
            other.validate_token(&token),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn rejects_malformed_role() {
        let claims = Claims {
            sub: "7".to_string(),
            email: "a@b.c".to_string(),
            role: "SUPERUSER".to_string(),
            exp: 0,
            iat: 0,
            iss: String::new(),
            aud: String::new(),
        };
        assert!(CurrentUser::try_from(claims).is_err());
    }

    #[test]
    fn extract_from_header_strips_bearer() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }
}
