//! 认证授权模块
//!
//! 平台的令牌由身份服务签发，这里只做验证侧：
//! - [`JwtService`] - JWT 验证 (共享密钥 HS256)
//! - [`CurrentUser`] - 当前用户上下文
//! - [`Role`] / [`Capability`] - 封闭角色枚举和能力检查
//! - [`require_auth`] - 认证中间件

pub mod jwt;
pub mod middleware;
pub mod role;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
pub use role::{Capability, Role};
