//! Forchetta Booking Server - 预订服务
//!
//! # 架构概述
//!
//! 预订服务拥有预订的全生命周期，并负责桌台分配：
//!
//! - **桌台分配** (`allocation`): 查询餐厅服务的桌台注册表，
//!   按容量升序找到第一张时间窗空闲的桌台
//! - **重叠检测** (`allocation` + `db::repository`): 半开区间
//!   `[start, start + duration)` 的纯谓词和持久化查询
//! - **预订生命周期** (`reservations`): 创建/改期/取消/状态流转
//! - **HTTP API** (`api`): RESTful API 接口，
//!   其中读取端点同时服务订单服务的预订校验
//!
//! # 模块结构
//!
//! ```text
//! booking-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── allocation/    # 桌台注册表客户端 + 分配器
//! ├── reservations/  # 预订生命周期服务
//! ├── api/           # HTTP 路由和处理器
//! └── db/            # 数据库层 (嵌入式 SurrealDB)
//! ```

pub mod allocation;
pub mod api;
pub mod core;
pub mod db;
pub mod reservations;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use allocation::{TableAllocator, TableRegistry};
pub use reservations::ReservationService;

pub fn print_banner() {
    println!(
        r#"
    ______              __         __  __
   / ____/___  _____  / /_  ___  / /_/ /_____ _
  / /_  / __ \/ ___/ / __ \/ _ \/ __/ __/ __ `/
 / __/ / /_/ / /    / /_/ /  __/ /_/ /_/ /_/ /
/_/    \____/_/     \_.___/\___/\__/\__/\__,_/
                                  booking
    "#
    );
}
