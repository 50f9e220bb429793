//! Forchetta Order Server - 订单服务
//!
//! # 架构概述
//!
//! 订单服务拥有订单的组成和状态流转：
//!
//! - **预订校验** (`verify`): 堂食订单创建前，用客户转发的令牌
//!   到预订服务做只读校验 (存在 → 本人 → 同餐厅 → 已确认)
//! - **订单生命周期** (`orders`): 创建/状态推进/标记已支付，
//!   状态迁移走严格白名单
//! - **金额计算** (`money`): rust_decimal 精确运算，f64 落库
//! - **内部端点** (`api::internal`): 结算桥调用的 mark-paid，
//!   静态共享密钥头认证
//!
//! # 模块结构
//!
//! ```text
//! order-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── verify.rs      # 预订校验器
//! ├── orders/        # 订单生命周期服务
//! ├── money.rs       # 金额计算
//! ├── api/           # HTTP 路由和处理器
//! └── db/            # 数据库层 (嵌入式 SurrealDB)
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod money;
pub mod orders;
pub mod verify;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use orders::OrderService;
pub use verify::{BookingGateway, BookingVerifier};

pub fn print_banner() {
    println!(
        r#"
    ______              __         __  __
   / ____/___  _____  / /_  ___  / /_/ /_____ _
  / /_  / __ \/ ___/ / __ \/ _ \/ __/ __/ __ `/
 / __/ / /_/ / /    / /_/ /  __/ /_/ /_/ /_/ /
/_/    \____/_/     \_.___/\___/\__/\__/\__,_/
                                    orders
    "#
    );
}
