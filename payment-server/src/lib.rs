//! Forchetta Payment Server - 支付服务
//!
//! # 架构概述
//!
//! 支付服务拥有支付记录和结算回传：
//!
//! - **支付生命周期** (`payments`): 创建 (PENDING)、确认 (PAID)、
//!   失败 (FAILED)、退款 (REFUNDED)；PENDING → PAID 最多发生一次
//! - **结算桥** (`settlement`): 支付确认后向订单服务的内部端点
//!   发一次 mark-paid 通知。尽力而为：通知失败只记日志，
//!   不回滚支付状态 - 钱已经收了 (fail open)。
//!   订单侧的 mark-paid 幂等，at-least-once 重投安全。
//!
//! # 模块结构
//!
//! ```text
//! payment-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── payments/      # 支付生命周期服务
//! ├── settlement.rs  # 订单服务通知桥
//! ├── api/           # HTTP 路由和处理器
//! └── db/            # 数据库层 (嵌入式 SurrealDB)
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod payments;
pub mod settlement;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use payments::PaymentService;
pub use settlement::{OrderNotifier, SettlementBridge};

pub fn print_banner() {
    println!(
        r#"
    ______              __         __  __
   / ____/___  _____  / /_  ___  / /_/ /_____ _
  / /_  / __ \/ ___/ / __ \/ _ \/ __/ __/ __ `/
 / __/ / /_/ / /    / /_/ /  __/ /_/ /_/ /_/ /
/_/    \____/_/     \_.___/\___/\__/\__/\__,_/
                                  payments
    "#
    );
}
