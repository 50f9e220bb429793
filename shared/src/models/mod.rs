//! 跨服务数据模型
//!
//! 只放服务之间通过 HTTP 交换的类型和状态枚举；
//! 各服务自己的持久化模型在各自的 `db::models` 里。

pub mod order;
pub mod payment;
pub mod reservation;
pub mod table;

pub use order::{INTERNAL_TOKEN_HEADER, MarkPaidRequest, OrderStatus, OrderType};
pub use payment::{PaymentMethod, PaymentStatus};
pub use reservation::{ReservationStatus, ReservationView};
pub use table::{TableInfo, TableStatus};
